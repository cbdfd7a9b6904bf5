use core::fmt;

/// Kind of component that can occupy a belt slot.
///
/// `B` and `C` are interchangeable partner kinds: the assembly logic treats
/// "B present" and "C present" identically. The absence of any component is
/// expressed as `Option::<Component>::None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// Raw component A.
    A,
    /// Raw partner component B.
    B,
    /// Raw partner component C.
    C,
    /// Finished product deposited by a worker.
    Product,
}

impl Component {
    /// Raw kinds a feed may place on the belt.
    pub const RAW: [Self; 3] = [Self::A, Self::B, Self::C];

    #[inline]
    const fn mask(self) -> u8 {
        match self {
            Self::A => 1 << 0,
            Self::B => 1 << 1,
            Self::C => 1 << 2,
            Self::Product => 1 << 3,
        }
    }

    /// `true` for the partner kinds `B` and `C`.
    #[inline]
    #[must_use]
    pub const fn is_partner(self) -> bool {
        matches!(self, Self::B | Self::C)
    }
}

const COMPONENT_MASK: u8 = 0b0000_1111;
const RAW_MASK: u8 = 0b0000_0111;
const PARTNER_MASK: u8 = 0b0000_0110;
const HANDLED: u8 = 1 << 7;

/// Value held by one belt cell: a set of component flags plus the
/// "already handled for this occupancy" marker.
///
/// Packed into a single byte so the whole value moves between threads with one
/// atomic load or store. Fields are never updated independently: callers
/// transform a private copy and publish it back through [`crate::belt::Belt`].
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Slot(u8);

impl Slot {
    /// An unhandled slot holding nothing.
    pub const EMPTY: Self = Self(0);

    /// Brand-new feeder value: the given component (if any), not handled.
    #[inline]
    #[must_use]
    pub const fn fresh(component: Option<Component>) -> Self {
        match component {
            Some(component) => Self(component.mask()),
            None => Self::EMPTY,
        }
    }

    #[inline]
    pub(crate) const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub(crate) const fn bits(self) -> u8 {
        self.0
    }

    /// No component flag is set. The handled marker is not considered.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 & COMPONENT_MASK == 0
    }

    /// At least one raw component (A, B or C) is present.
    #[inline]
    #[must_use]
    pub const fn has_any_raw(self) -> bool {
        self.0 & RAW_MASK != 0
    }

    /// A partner component (B or C) is present.
    #[inline]
    #[must_use]
    pub const fn has_partner(self) -> bool {
        self.0 & PARTNER_MASK != 0
    }

    /// Whether `component` is present.
    #[inline]
    #[must_use]
    pub const fn test(self, component: Component) -> bool {
        self.0 & component.mask() != 0
    }

    /// Sets the flag of `component`.
    #[inline]
    pub fn set(&mut self, component: Component) {
        self.0 |= component.mask();
    }

    /// Clears the flag of `component`.
    #[inline]
    pub fn clear(&mut self, component: Component) {
        self.0 &= !component.mask();
    }

    /// Clears both partner flags.
    #[inline]
    pub fn clear_partners(&mut self) {
        self.0 &= !PARTNER_MASK;
    }

    /// A mutation has already been committed for the current occupancy.
    #[inline]
    #[must_use]
    pub const fn is_handled(self) -> bool {
        self.0 & HANDLED != 0
    }

    /// Marks the value as carrying a committed mutation.
    #[inline]
    pub fn mark_handled(&mut self) {
        self.0 |= HANDLED;
    }

    /// Components currently present, in `A, B, C, Product` order.
    pub fn components(self) -> impl Iterator<Item = Component> {
        [Component::A, Component::B, Component::C, Component::Product]
            .into_iter()
            .filter(move |&component| self.test(component))
    }
}

impl From<Component> for Slot {
    fn from(component: Component) -> Self {
        Self::fresh(Some(component))
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("components", &self.components().collect::<Vec<_>>())
            .field("handled", &self.is_handled())
            .finish()
    }
}
