//! Row partitioning for striped processing.

use std::ops::Range;

/// Split of the output rows into contiguous stripes.
///
/// Every stripe except possibly the last holds `rows_per_stripe` rows, which
/// is at least the region height so a stripe never re-seeds more rows than it
/// produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripePlan {
    height: usize,
    rows_per_stripe: usize,
}

impl StripePlan {
    /// Plans `requested` stripes over `height` rows.
    ///
    /// The stripe size is `max(ceil(height / requested), region_height)`, so
    /// the actual count may be lower than requested. Zero requests are
    /// treated as one.
    pub fn new(height: usize, region_height: usize, requested: usize) -> Self {
        let requested = requested.max(1);
        let rows_per_stripe = height.div_ceil(requested).max(region_height).max(1);
        Self {
            height,
            rows_per_stripe,
        }
    }

    /// Rows in every stripe but the last.
    pub fn rows_per_stripe(&self) -> usize {
        self.rows_per_stripe
    }

    /// Number of stripes.
    pub fn count(&self) -> usize {
        self.height.div_ceil(self.rows_per_stripe)
    }

    /// Output rows of stripe `index`.
    pub fn stripe(&self, index: usize) -> Range<usize> {
        let start = (index * self.rows_per_stripe).min(self.height);
        let end = (start + self.rows_per_stripe).min(self.height);
        start..end
    }

    /// Iterates over the output rows of every stripe.
    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.count()).map(move |index| self.stripe(index))
    }
}

#[cfg(test)]
mod tests {
    use super::StripePlan;

    #[test]
    fn stripes_cover_rows_once() {
        let plan = StripePlan::new(23, 3, 4);
        assert_eq!(plan.rows_per_stripe(), 6);
        assert_eq!(plan.count(), 4);
        let rows: Vec<usize> = plan.iter().flatten().collect();
        assert_eq!(rows, (0..23).collect::<Vec<_>>());
        assert_eq!(plan.stripe(3), 18..23);
    }

    #[test]
    fn stripes_are_never_shorter_than_a_region() {
        let plan = StripePlan::new(10, 7, 8);
        assert_eq!(plan.rows_per_stripe(), 7);
        assert_eq!(plan.count(), 2);
        assert_eq!(StripePlan::new(10, 1, 0).count(), 1);
    }
}
