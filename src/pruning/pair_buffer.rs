//! Pair output buffer with amortized room checks.
//!
//! While a buffer is live it takes over appending into its host vector's
//! storage through raw cursors. Writers call [`PairOutputBuffer::ensure_room`]
//! once per reported block and may then append up to [`PAIR_BUFFER_SLACK`]
//! words before the next check, so block stores can write full vectors
//! without per-lane bounds tests. The storage and final length are handed
//! back to the host when the buffer drops, on every exit path.

use crate::PruningError;

/// Distance from the high watermark to the end of the allocation, in words.
/// One full eight-wide block of pairs fits in this slack.
pub(crate) const PAIR_BUFFER_SLACK: usize = 16;

pub(crate) struct PairOutputBuffer<'a> {
    host: &'a mut Vec<u32>,
    begin: *mut u32,
    end: *mut u32,
    high_watermark: *mut u32,
}

impl<'a> PairOutputBuffer<'a> {
    /// Takes over the host's storage. Existing host contents are kept and
    /// appended after.
    pub fn acquire(host: &'a mut Vec<u32>) -> Result<Self, PruningError> {
        if host.capacity() < PAIR_BUFFER_SLACK {
            host.try_reserve_exact(PAIR_BUFFER_SLACK - host.len())
                .map_err(|_| PruningError::AllocationFailure)?;
        }
        let begin = host.as_mut_ptr();
        let end = unsafe { begin.add(host.len()) };
        let high_watermark = unsafe { begin.add(host.capacity() - PAIR_BUFFER_SLACK) };
        Ok(Self {
            host,
            begin,
            end,
            high_watermark,
        })
    }

    /// Guarantees room for one more block of appends. The hot path is a
    /// single pointer compare.
    #[inline(always)]
    pub fn ensure_room(&mut self) -> Result<(), PruningError> {
        if self.end > self.high_watermark {
            self.grow()?;
        }
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) -> Result<(), PruningError> {
        let size = self.len();
        // The host must know the real length before it reallocates, or the
        // copy into the new storage drops the appended words.
        unsafe { self.host.set_len(size) };
        let target_capacity = size
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(2 * PAIR_BUFFER_SLACK))
            .ok_or(PruningError::AllocationFailure)?;
        self.host
            .try_reserve_exact(target_capacity - size)
            .map_err(|_| PruningError::AllocationFailure)?;
        self.begin = self.host.as_mut_ptr();
        self.end = unsafe { self.begin.add(size) };
        self.high_watermark =
            unsafe { self.begin.add(self.host.capacity() - PAIR_BUFFER_SLACK) };
        Ok(())
    }

    /// Raw append cursor for block stores. After a successful
    /// [`Self::ensure_room`], up to [`PAIR_BUFFER_SLACK`] words past this
    /// pointer are writable.
    #[inline(always)]
    pub fn end(&mut self) -> *mut u32 {
        self.end
    }

    /// Commits `count` words written past the cursor.
    #[inline(always)]
    pub fn advance(&mut self, count: usize) {
        debug_assert!(count <= PAIR_BUFFER_SLACK);
        debug_assert!(self.end <= self.high_watermark);
        self.end = unsafe { self.end.add(count) };
    }

    /// Appends a single pair.
    #[inline(always)]
    pub fn push_pair(&mut self, first: u32, second: u32) -> Result<(), PruningError> {
        self.ensure_room()?;
        unsafe {
            *self.end = first;
            *self.end.add(1) = second;
            self.end = self.end.add(2);
        }
        Ok(())
    }

    /// Words appended so far, preexisting host content included.
    #[inline(always)]
    pub fn len(&self) -> usize {
        unsafe { self.end.offset_from(self.begin) as usize }
    }
}

impl Drop for PairOutputBuffer<'_> {
    fn drop(&mut self) {
        let size = self.len();
        unsafe { self.host.set_len(size) };
    }
}
