//! Sum-of-absolute-differences row scorer.

use crate::disparity::ScoreGeometry;
use crate::image::StereoPair;
use crate::kernel::{box_filter_row, RowScorer};
use crate::numeric::{Pixel, Score};
use crate::order::LowerIsBetter;
use std::marker::PhantomData;

/// SAD error metric: lower scores are better matches.
///
/// Integer images accumulate in `i32`, `f32` images in `f32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SadRowScorer<P> {
    _pixel: PhantomData<P>,
}

impl<P: Pixel> SadRowScorer<P> {
    /// Creates the scorer.
    pub fn new() -> Self {
        Self {
            _pixel: PhantomData,
        }
    }
}

impl<P: Pixel> RowScorer for SadRowScorer<P> {
    type Pixel = P;
    type Score = P::Error;
    type Order = LowerIsBetter;

    fn score_row(
        &self,
        pair: &StereoPair<'_, P>,
        row: usize,
        geometry: &ScoreGeometry,
        element: &mut Vec<P::Error>,
        scores: &mut [P::Error],
    ) {
        let width = geometry.width();
        let radius = geometry.radius().x;
        let min = geometry.range().min();
        let left = pair.left().row_unchecked(row);
        let right = pair.right().row_unchecked(row);
        if element.len() < width {
            element.resize(width, <P::Error as Score>::ZERO);
        }

        for (index, block) in scores
            .chunks_exact_mut(width)
            .take(geometry.disparities())
            .enumerate()
        {
            block.fill(<P::Error as Score>::ZERO);
            let Some((first, last)) = geometry.centre_columns(index) else {
                continue;
            };
            let d = min + index;
            for x in d..width {
                element[x] = left[x].abs_error(right[x - d]);
            }
            box_filter_row(&element[..], first, last, radius, block);
        }
    }
}
