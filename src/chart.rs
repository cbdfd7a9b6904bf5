use crate::types::{Component, Slot};

/// Number of invocations a worker spends decoding a matched pair before it can
/// deposit the product.
pub const DECODE_TICKS: u8 = 4;

/// State of a worker's assembly flow.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChartState {
    /// Hands are free; take whichever raw component passes by.
    #[default]
    Fetch,
    /// Holding an A, waiting for a partner (B or C).
    AwaitPartner,
    /// Holding a partner, waiting for an A.
    AwaitA,
    /// A complete pair is being assembled.
    Decode {
        /// Invocations left before the product can be deposited.
        remaining: u8,
    },
    /// Product ready, and a freshly picked raw component in the other hand.
    Full {
        /// Component picked up while the product was being finished.
        held: Component,
    },
}

/// Restorable value of an [`AssemblyStateChart`]: state, countdown and the
/// component in hand.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChartSnapshot {
    /// Current state.
    pub state: ChartState,
    /// Last raw component recorded as held.
    pub in_hand: Option<Component>,
}

/// Per-worker assembly state machine.
///
/// `process` applies one transition to a private slot copy and tentatively moves
/// to the next state. The worker then either keeps it (`commit`) or, having lost
/// the publish race, discards it (`rollback`), restoring the value captured at
/// the start of the invocation.
#[must_use]
#[derive(Debug, Default, Clone)]
pub struct AssemblyStateChart {
    current: ChartSnapshot,
    previous: ChartSnapshot,
}

impl AssemblyStateChart {
    /// A chart in [`ChartState::Fetch`] with empty hands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ChartState {
        self.current.state
    }

    /// Last raw component recorded as held.
    #[inline]
    #[must_use]
    pub fn in_hand(&self) -> Option<Component> {
        self.current.in_hand
    }

    /// Whole current value.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> ChartSnapshot {
        self.current
    }

    /// Runs one invocation against `slot`.
    ///
    /// Returns `true` when a transition fired; the slot copy then carries the
    /// mutation and is marked handled. Returns `false` (and leaves `slot`
    /// untouched) when nothing applies.
    pub fn process(&mut self, slot: &mut Slot) -> bool {
        self.previous = self.current;

        if let ChartState::Decode { remaining } = &mut self.current.state {
            *remaining = remaining.saturating_sub(1);
        }

        let next = match self.current.state {
            ChartState::Fetch => {
                if slot.test(Component::A) {
                    slot.clear(Component::A);
                    Some(ChartState::AwaitPartner)
                } else if slot.has_partner() {
                    slot.clear_partners();
                    Some(ChartState::AwaitA)
                } else {
                    None
                }
            }
            ChartState::AwaitPartner => slot.has_partner().then(|| {
                slot.clear_partners();
                ChartState::Decode {
                    remaining: DECODE_TICKS,
                }
            }),
            ChartState::AwaitA => slot.test(Component::A).then(|| {
                slot.clear(Component::A);
                ChartState::Decode {
                    remaining: DECODE_TICKS,
                }
            }),
            ChartState::Decode { remaining: 0 } if slot.is_empty() => {
                slot.set(Component::Product);
                Some(ChartState::Fetch)
            }
            ChartState::Decode { remaining: 0 } if slot.has_any_raw() => {
                let held = pick_up_arrival(slot);
                self.current.in_hand = Some(held);
                Some(ChartState::Full { held })
            }
            ChartState::Decode { .. } => None,
            ChartState::Full { held } => slot.is_empty().then(|| {
                slot.set(Component::Product);
                match held {
                    Component::A => ChartState::AwaitPartner,
                    Component::B | Component::C => ChartState::AwaitA,
                    Component::Product => ChartState::Fetch,
                }
            }),
        };

        match next {
            Some(state) => {
                self.current.state = state;
                slot.mark_handled();
                true
            }
            None => false,
        }
    }

    /// Keeps the outcome of the last `process` call.
    #[inline]
    pub fn commit(&mut self) {
        self.previous = self.current;
    }

    /// Discards the outcome of the last `process` call.
    #[inline]
    pub fn rollback(&mut self) {
        self.current = self.previous;
    }

    /// Whether the worker is midway through a product: waiting for a second
    /// component, or decoding / full while having recorded a held component.
    #[must_use]
    pub fn holds_unfinished_product(&self) -> bool {
        match self.current.state {
            ChartState::Fetch => false,
            ChartState::AwaitPartner | ChartState::AwaitA => true,
            ChartState::Decode { .. } | ChartState::Full { .. } => self.current.in_hand.is_some(),
        }
    }
}

/// Takes every raw component present off `slot`. A partner wins over an A
/// arriving in the same occupancy.
fn pick_up_arrival(slot: &mut Slot) -> Component {
    let mut held = Component::A;
    if slot.test(Component::A) {
        slot.clear(Component::A);
    }
    if slot.has_partner() {
        held = if slot.test(Component::B) {
            Component::B
        } else {
            Component::C
        };
        slot.clear_partners();
    }
    held
}
