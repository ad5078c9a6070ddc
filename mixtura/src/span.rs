//! Span iteration over a row of pixels, `LANES` at a time.
//!
//! Every iteration but the last covers a full vector. The last one covers
//! `width % LANES` pixels when that is non-zero, and is the only place a
//! partial lane mask is ever built.

/// A run of pixels processed by one vector iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

/// Iterator over the spans of a `width`-pixel row.
#[derive(Debug, Clone)]
pub struct Spans {
    width: usize,
    lanes: usize,
    offset: usize,
}

impl Spans {
    pub fn new(width: usize, lanes: usize) -> Self {
        assert!(lanes > 0, "lane count must be positive");
        Self {
            width,
            lanes,
            offset: 0,
        }
    }
}

impl Iterator for Spans {
    type Item = Span;

    #[inline(always)]
    fn next(&mut self) -> Option<Span> {
        if self.offset >= self.width {
            return None;
        }
        let len = self.lanes.min(self.width - self.offset);
        let span = Span {
            offset: self.offset,
            len,
        };
        self.offset += len;
        Some(span)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.width - self.offset.min(self.width)).div_ceil(self.lanes);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Spans {}

/// Per-lane selector for `N` 32-bit lanes: all bits set on active lanes,
/// zero on inactive ones. The sign bit is what hardware masked loads and
/// stores look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(32))]
pub struct SpanMask<const N: usize> {
    words: [i32; N],
}

impl<const N: usize> SpanMask<N> {
    /// Mask with the first `active` lanes enabled.
    ///
    /// `active == 0` yields a mask that loads zeros and stores nothing.
    ///
    /// # Panics
    /// If `active > N`.
    #[inline]
    pub fn new(active: usize) -> Self {
        assert!(
            active <= N,
            "span mask of {} lanes cannot enable {} lanes",
            N,
            active
        );
        Self {
            words: std::array::from_fn(|i| if i < active { -1 } else { 0 }),
        }
    }

    #[inline]
    pub fn full() -> Self {
        Self { words: [-1; N] }
    }

    #[inline]
    pub fn words(&self) -> &[i32; N] {
        &self.words
    }

}
