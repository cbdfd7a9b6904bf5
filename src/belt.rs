use crate::{
    sync::{AtomicU8, Ordering},
    types::Slot,
};
use core::fmt;
use derive_more::Deref;

/// Fixed-length circular array of slots shared by the feeder and all workers.
///
/// Every cell sits on its own cache line, and every access moves the whole
/// [`Slot`] value: `read` is an Acquire load, `write` a Release store. There is
/// no partial-field update; mutators read a copy, transform it off to the side
/// and republish it in one step.
#[must_use]
pub struct Belt {
    slots: Box<[SlotCell]>,
}

#[derive(Deref)]
#[repr(align(128))]
struct SlotCell(AtomicU8);

impl Belt {
    /// A belt of `len` empty, unhandled slots.
    pub fn new(len: u16) -> Self {
        let slots = (0..len)
            .map(|_| SlotCell(AtomicU8::new(Slot::EMPTY.bits())))
            .collect();
        Self { slots }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u16 {
        self.slots.len().try_into().expect("Belt::len")
    }

    /// `true` if the belt has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Snapshot of the slot at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn read(&self, index: u16) -> Slot {
        Slot::from_bits(self.slots[index as usize].load(Ordering::Acquire))
    }

    /// Replaces the slot at `index` with `value`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    pub fn write(&self, index: u16, value: Slot) {
        self.slots[index as usize].store(value.bits(), Ordering::Release);
    }
}

impl fmt::Debug for Belt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.len()).map(|index| self.read(index)))
            .finish()
    }
}
