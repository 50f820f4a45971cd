//! Sinks that recipes are materialized into
//!
//! [`Target`] is the append-only counterpart of a byte buffer. Every recipe
//! element writes itself with a single [`Target::push_all`] call, so a
//! `Target` sees the recipe's literal snapshots in build order.

/// Byte-oriented buffer with an infallible append operation
///
/// In most ways, it is convenient to think of `Target` as an analogue of
/// [`std::io::Write`]. The difference is that [`push_all`](Target::push_all)
/// is infallible and total; the returned count is used only for book-keeping
/// on the caller side and never signals partial success.
pub trait Target {
    /// Reserves room for `extra` additional bytes, if the implementor has a notion of capacity.
    ///
    /// `extra` is a hint and may saturate at `usize::MAX` for oversized recipes.
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh, empty `Self`
    fn create() -> Self;

    /// Appends every byte of `buf`, in order, returning `buf.len()`.
    fn push_all(&mut self, buf: &[u8]) -> usize;
}

impl Target for Vec<u8> {
    /// Reserves `extra` bytes, skipping hints that no allocation could satisfy
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        if let Err(err) = self.try_reserve(extra) {
            tracing::debug!(%err, extra, "skipping capacity hint");
        }
    }

    #[inline]
    #[must_use]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}
