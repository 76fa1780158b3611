//! Abstractions for row-range pagination.

/// Inclusive range of 1-based row positions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    /// Position of the first row.
    first: u32,

    /// Position of the last row.
    last: u32,
}

impl Range {
    /// Creates a new [`Range`] of rows `first..=last`.
    ///
    /// [`None`] is returned if `first` is not positive or `last` is less than
    /// `first`.
    #[must_use]
    pub fn new<Num>(first: Num, last: Num) -> Option<Self>
    where
        Num: TryInto<u32>,
    {
        let (first, last) = (first.try_into().ok()?, last.try_into().ok()?);
        (first >= 1 && last >= first).then_some(Self { first, last })
    }

    /// Returns position of the first row in this [`Range`].
    #[must_use]
    pub const fn first(&self) -> u32 {
        self.first
    }

    /// Returns position of the last row in this [`Range`].
    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }

    /// Fits this [`Range`] into the `total` number of rows, cutting its tail.
    ///
    /// [`None`] is returned if this [`Range`] starts past the `total`.
    #[must_use]
    pub fn clamp(self, total: u32) -> Option<Self> {
        (self.first <= total).then(|| Self {
            first: self.first,
            last: self.last.min(total),
        })
    }

    /// Returns number of rows preceding this [`Range`].
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.first - 1
    }

    /// Returns number of rows covered by this [`Range`].
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.last - self.first + 1
    }
}

/// Rows selected by a [`Range`].
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// Selected rows.
    pub rows: Vec<T>,

    /// Effective [`Range`] of the selected rows.
    pub range: Range,

    /// Total number of rows available.
    pub total: u32,
}

#[cfg(test)]
mod spec {
    use super::Range;

    #[test]
    fn rejects_malformed_ranges() {
        assert!(Range::new(0, 5).is_none());
        assert!(Range::new(-1, 5).is_none());
        assert!(Range::new(4, 3).is_none());
        assert!(Range::new(1, -3).is_none());
        assert!(Range::new(3, 3).is_some());
    }

    #[test]
    fn clamps_to_total() {
        let range = Range::new(2, 10).unwrap();

        let clamped = range.clamp(4).unwrap();
        assert_eq!((clamped.first(), clamped.last()), (2, 4));
        assert_eq!((clamped.offset(), clamped.limit()), (1, 3));

        assert_eq!(range.clamp(2).map(|r| r.limit()), Some(1));
        assert!(range.clamp(1).is_none());
        assert!(range.clamp(0).is_none());
    }
}
