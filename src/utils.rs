pub(crate) trait WrappingPredecessor: Sized {
    /// The position "after" `self` on a belt of `len` slots: one index earlier,
    /// wrapping from `0` to `len - 1`.
    fn wrapping_pred(self, len: u16) -> Self;
}

impl WrappingPredecessor for u16 {
    #[inline]
    fn wrapping_pred(self, len: u16) -> Self {
        match self.checked_sub(1) {
            Some(prev) => prev,
            None => len
                .checked_sub(1)
                .expect("WrappingPredecessor::wrapping_pred"),
        }
    }
}
