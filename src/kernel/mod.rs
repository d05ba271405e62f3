//! Row scoring kernels.
//!
//! A [`RowScorer`] turns one image row into box-filtered matching costs for
//! every valid `(column, disparity)` pair. Vertical aggregation is left to the
//! region accumulator so each row is scored exactly once per pass.

use crate::disparity::ScoreGeometry;
use crate::image::StereoPair;
use crate::numeric::{Pixel, Score};
use crate::order::ScoreOrder;

pub mod ncc;
pub mod sad;

#[cfg(feature = "simd")]
pub(crate) mod simd;

pub use ncc::NccRowScorer;
pub use sad::SadRowScorer;

/// Scores one image row against every disparity in a range.
pub trait RowScorer: Send + Sync {
    /// Input sample type.
    type Pixel: Pixel;
    /// Score type produced per row and accumulated per region.
    type Score: Score;
    /// Whether lower or higher scores indicate better matches.
    type Order: ScoreOrder;

    /// Upper bound of a single per-pixel score before any box summation.
    fn max_element_score(&self) -> f64 {
        f64::from(<Self::Pixel as Pixel>::FULL_SCALE)
    }

    /// Whether region sums must pass through [`RowScorer::normalize_region`]
    /// before selection.
    fn requires_normalize(&self) -> bool {
        false
    }

    /// Writes the box-filtered scores of image row `row` into `scores`.
    ///
    /// `scores` has `geometry.row_len()` entries laid out as described by
    /// [`ScoreGeometry`]; entries outside the valid centre columns are zeroed.
    /// `element` is caller-owned scratch that may be grown.
    fn score_row(
        &self,
        pair: &StereoPair<'_, Self::Pixel>,
        row: usize,
        geometry: &ScoreGeometry,
        element: &mut Vec<Self::Score>,
        scores: &mut [Self::Score],
    );

    /// Converts a vertical region sum centred on `centre_row` into its final
    /// form. The default is the identity.
    #[allow(clippy::too_many_arguments)]
    fn normalize_region(
        &self,
        pair: &StereoPair<'_, Self::Pixel>,
        centre_row: usize,
        geometry: &ScoreGeometry,
        region: &[Self::Score],
        scratch: &mut NormalizeScratch,
        out: &mut [Self::Score],
    ) {
        let _ = (pair, centre_row, geometry, scratch);
        out.copy_from_slice(region);
    }
}

/// Scratch owned by one stripe for [`RowScorer::normalize_region`].
///
/// Keeps per-column sums over the window rows of the last centre row, so a
/// scorer called on consecutive centre rows can update them by one row.
#[derive(Debug, Default)]
pub struct NormalizeScratch {
    pub(crate) columns: Vec<f32>,
    pub(crate) stats: Vec<f32>,
    pub(crate) width: usize,
    pub(crate) centre: Option<usize>,
}

impl NormalizeScratch {
    /// Creates empty scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the rolling state; the next call sums its window directly.
    pub fn reset(&mut self) {
        self.centre = None;
    }

    /// Sizes the buffers for rows of `width` and `blocks` values per column.
    pub(crate) fn prepare(&mut self, width: usize, blocks: usize) {
        if self.width != width {
            self.centre = None;
            self.width = width;
        }
        if self.columns.len() < blocks * width {
            self.columns.resize(blocks * width, 0.0);
        }
        if self.stats.len() < blocks * width {
            self.stats.resize(blocks * width, 0.0);
        }
    }
}

/// Sliding horizontal box sum of `element` for centres `first..=last`.
///
/// Each output is the sum of `element[x - radius..=x + radius]`; the caller
/// guarantees that span is in bounds for every centre.
#[inline]
pub(crate) fn box_filter_row<S: Score>(
    element: &[S],
    first: usize,
    last: usize,
    radius: usize,
    out: &mut [S],
) {
    let mut sum = S::ZERO;
    for &value in &element[first - radius..=first + radius] {
        sum = sum + value;
    }
    out[first] = sum;
    for x in first + 1..=last {
        sum = sum + element[x + radius] - element[x - radius - 1];
        out[x] = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::box_filter_row;

    #[test]
    fn box_filter_matches_direct_sums() {
        let element: Vec<i32> = (0..12).map(|v| (v * 7) % 5).collect();
        let radius = 2;
        let mut out = vec![0i32; element.len()];
        box_filter_row(&element, 3, 9, radius, &mut out);
        for x in 3..=9 {
            let direct: i32 = element[x - radius..=x + radius].iter().sum();
            assert_eq!(out[x], direct);
        }
        assert_eq!(out[0], 0);
        assert_eq!(out[10], 0);
    }
}
