#![allow(missing_docs)]

use conveyor::{
    chart::{AssemblyStateChart, ChartState, DECODE_TICKS},
    types::{Component, Slot},
};

fn slot_with(components: &[Component]) -> Slot {
    let mut slot = Slot::EMPTY;
    for &component in components {
        slot.set(component);
    }
    slot
}

/// Runs one invocation on a fresh copy of `slot`, keeping the outcome.
fn step(chart: &mut AssemblyStateChart, slot: Slot) -> (bool, Slot) {
    let mut draft = slot;
    let changed = chart.process(&mut draft);
    if changed {
        chart.commit();
    }
    (changed, draft)
}

fn chart_in_decode() -> AssemblyStateChart {
    let mut chart = AssemblyStateChart::new();
    assert!(step(&mut chart, Slot::from(Component::A)).0);
    assert!(step(&mut chart, Slot::from(Component::B)).0);
    assert_eq!(
        chart.state(),
        ChartState::Decode {
            remaining: DECODE_TICKS
        }
    );
    chart
}

#[test]
fn fetch_takes_a_and_waits_for_partner() {
    let mut chart = AssemblyStateChart::new();
    let (changed, slot) = step(&mut chart, Slot::from(Component::A));
    assert!(changed);
    assert!(slot.is_handled());
    assert!(slot.is_empty());
    assert_eq!(chart.state(), ChartState::AwaitPartner);
}

#[test]
fn fetch_takes_partner_and_clears_both_kinds() {
    let mut chart = AssemblyStateChart::new();
    let (changed, slot) = step(&mut chart, slot_with(&[Component::B, Component::C]));
    assert!(changed);
    assert!(slot.is_empty());
    assert_eq!(chart.state(), ChartState::AwaitA);

    let (changed, _) = step(&mut chart, Slot::from(Component::C));
    assert!(!changed, "a second partner is not what AwaitA wants");
    let (changed, _) = step(&mut chart, Slot::from(Component::A));
    assert!(changed);
    assert!(matches!(chart.state(), ChartState::Decode { .. }));
}

#[test]
fn fetch_prefers_a_when_both_kinds_present() {
    let mut chart = AssemblyStateChart::new();
    let (_, slot) = step(&mut chart, slot_with(&[Component::A, Component::C]));
    assert_eq!(chart.state(), ChartState::AwaitPartner);
    assert!(slot.test(Component::C));
    assert!(!slot.test(Component::A));
}

#[test]
fn no_transition_leaves_slot_untouched() {
    let mut chart = AssemblyStateChart::new();
    for slot in [Slot::EMPTY, Slot::from(Component::Product)] {
        let (changed, after) = step(&mut chart, slot);
        assert!(!changed);
        assert_eq!(after, slot);
        assert!(!after.is_handled());
    }
    assert_eq!(chart.state(), ChartState::Fetch);
}

#[test]
fn decode_deposits_product_after_countdown_and_marks_handled() {
    let mut chart = chart_in_decode();
    for remaining in (1..DECODE_TICKS).rev() {
        let (changed, slot) = step(&mut chart, Slot::EMPTY);
        assert!(!changed);
        assert_eq!(slot, Slot::EMPTY);
        assert_eq!(chart.state(), ChartState::Decode { remaining });
    }

    let (changed, slot) = step(&mut chart, Slot::EMPTY);
    assert!(changed);
    assert!(slot.test(Component::Product));
    // Depositing the product is a committed mutation like any other.
    assert!(slot.is_handled());
    assert_eq!(chart.state(), ChartState::Fetch);
    assert!(!chart.holds_unfinished_product());
}

#[test]
fn decode_ignores_arrivals_until_countdown_expires() {
    let mut chart = chart_in_decode();
    let (changed, slot) = step(&mut chart, Slot::from(Component::A));
    assert!(!changed);
    assert!(slot.test(Component::A));
    assert_eq!(chart.state(), ChartState::Decode { remaining: 3 });
}

#[test]
fn decode_expiring_on_arrival_goes_full_then_deposits() {
    let mut chart = chart_in_decode();
    for _ in 1..DECODE_TICKS {
        step(&mut chart, Slot::EMPTY);
    }

    let (changed, slot) = step(&mut chart, Slot::from(Component::C));
    assert!(changed);
    assert!(slot.is_empty());
    assert!(slot.is_handled());
    assert_eq!(
        chart.state(),
        ChartState::Full {
            held: Component::C
        }
    );
    assert_eq!(chart.in_hand(), Some(Component::C));
    assert!(chart.holds_unfinished_product());

    let (changed, _) = step(&mut chart, Slot::from(Component::A));
    assert!(!changed, "Full needs an empty slot to deposit");

    let (changed, slot) = step(&mut chart, Slot::EMPTY);
    assert!(changed);
    assert!(slot.test(Component::Product));
    assert_eq!(chart.state(), ChartState::AwaitA);
}

#[test]
fn full_holding_a_returns_to_await_partner() {
    let mut chart = chart_in_decode();
    for _ in 1..DECODE_TICKS {
        step(&mut chart, Slot::EMPTY);
    }
    step(&mut chart, Slot::from(Component::A));
    assert_eq!(
        chart.state(),
        ChartState::Full {
            held: Component::A
        }
    );
    step(&mut chart, Slot::EMPTY);
    assert_eq!(chart.state(), ChartState::AwaitPartner);
}

#[test]
fn decode_arrival_of_both_kinds_records_partner() {
    let mut chart = chart_in_decode();
    for _ in 1..DECODE_TICKS {
        step(&mut chart, Slot::EMPTY);
    }
    let (changed, slot) = step(&mut chart, slot_with(&[Component::A, Component::B]));
    assert!(changed);
    assert!(slot.is_empty());
    assert_eq!(
        chart.state(),
        ChartState::Full {
            held: Component::B
        }
    );
}

#[test]
fn rollback_restores_state_countdown_and_hand() {
    let mut chart = chart_in_decode();
    for _ in 1..DECODE_TICKS {
        step(&mut chart, Slot::EMPTY);
    }
    let before = chart.snapshot();
    assert_eq!(before.state, ChartState::Decode { remaining: 1 });

    let mut draft = Slot::from(Component::B);
    assert!(chart.process(&mut draft));
    assert_ne!(chart.snapshot(), before);
    chart.rollback();
    assert_eq!(chart.snapshot(), before);

    let mut draft = Slot::EMPTY;
    assert!(chart.process(&mut draft));
    chart.rollback();
    assert_eq!(chart.snapshot(), before);
}

#[test]
fn unfinished_product_reporting() {
    let mut chart = AssemblyStateChart::new();
    assert!(!chart.holds_unfinished_product());
    step(&mut chart, Slot::from(Component::B));
    assert!(chart.holds_unfinished_product());
    step(&mut chart, Slot::from(Component::A));
    // Decoding a first pair: nothing has been recorded in hand yet.
    assert!(matches!(chart.state(), ChartState::Decode { .. }));
    assert!(!chart.holds_unfinished_product());
}
