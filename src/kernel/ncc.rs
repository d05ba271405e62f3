//! Normalized cross-correlation row scorer.
//!
//! Rows carry box sums of `L(x) * R(x - d)`. Once the region accumulator has
//! summed them vertically, [`NccRowScorer::normalize_region`] turns the
//! product sum into a correlation coefficient using the left and right window
//! statistics of the centre row:
//!
//! `ncc = (Σ LR / n - μL μR) / (σL σR + eps)`
//!
//! The column sums behind those statistics roll from one centre row to the
//! next and are re-summed on the same row interval as region sums.

use crate::disparity::ScoreGeometry;
use crate::image::StereoPair;
use crate::kernel::{box_filter_row, NormalizeScratch, RowScorer};
use crate::numeric::Pixel;
use crate::order::HigherIsBetter;
use crate::region::RESEED_INTERVAL;
use std::marker::PhantomData;

/// Regularizer added to the standard-deviation product.
pub const DEFAULT_NCC_EPS: f32 = 1e-3;

/// NCC correlation metric: higher scores are better matches.
#[derive(Clone, Copy, Debug)]
pub struct NccRowScorer<P> {
    eps: f32,
    _pixel: PhantomData<P>,
}

impl<P: Pixel> Default for NccRowScorer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pixel> NccRowScorer<P> {
    /// Creates the scorer with [`DEFAULT_NCC_EPS`].
    pub fn new() -> Self {
        Self {
            eps: DEFAULT_NCC_EPS,
            _pixel: PhantomData,
        }
    }

    /// Overrides the regularizer.
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }
}

impl<P: Pixel> RowScorer for NccRowScorer<P> {
    type Pixel = P;
    type Score = f32;
    type Order = HigherIsBetter;

    fn requires_normalize(&self) -> bool {
        true
    }

    fn score_row(
        &self,
        pair: &StereoPair<'_, P>,
        row: usize,
        geometry: &ScoreGeometry,
        element: &mut Vec<f32>,
        scores: &mut [f32],
    ) {
        let width = geometry.width();
        let radius = geometry.radius().x;
        let min = geometry.range().min();
        let left = pair.left().row_unchecked(row);
        let right = pair.right().row_unchecked(row);
        if element.len() < width {
            element.resize(width, 0.0);
        }

        for (index, block) in scores
            .chunks_exact_mut(width)
            .take(geometry.disparities())
            .enumerate()
        {
            block.fill(0.0);
            let Some((first, last)) = geometry.centre_columns(index) else {
                continue;
            };
            let d = min + index;
            for x in d..width {
                element[x] = left[x].to_f32() * right[x - d].to_f32();
            }
            box_filter_row(&element[..], first, last, radius, block);
        }
    }

    fn max_element_score(&self) -> f64 {
        f64::from(P::FULL_SCALE) * f64::from(P::FULL_SCALE)
    }

    fn normalize_region(
        &self,
        pair: &StereoPair<'_, P>,
        centre_row: usize,
        geometry: &ScoreGeometry,
        region: &[f32],
        scratch: &mut NormalizeScratch,
        out: &mut [f32],
    ) {
        let width = geometry.width();
        let radius = geometry.radius();
        out.fill(0.0);
        if width < radius.width() {
            return;
        }
        scratch.prepare(width, 4);
        let start = centre_row - radius.y;
        let end = centre_row + radius.y;
        let rolling = centre_row
            .checked_sub(1)
            .is_some_and(|previous| scratch.centre == Some(previous))
            && start % RESEED_INTERVAL != 0;
        scratch.centre = Some(centre_row);

        let (left_sum, rest) = scratch.columns[..4 * width].split_at_mut(width);
        let (left_sq, rest) = rest.split_at_mut(width);
        let (right_sum, right_sq) = rest.split_at_mut(width);
        let (left_mean, rest) = scratch.stats[..4 * width].split_at_mut(width);
        let (left_std, rest) = rest.split_at_mut(width);
        let (right_mean, right_std) = rest.split_at_mut(width);

        if rolling {
            // Window moved down one row: drop `start - 1`, add `end`.
            let left_out = pair.left().row_unchecked(start - 1);
            let right_out = pair.right().row_unchecked(start - 1);
            let left_in = pair.left().row_unchecked(end);
            let right_in = pair.right().row_unchecked(end);
            for x in 0..width {
                let (lo, li) = (left_out[x].to_f32(), left_in[x].to_f32());
                let (ro, ri) = (right_out[x].to_f32(), right_in[x].to_f32());
                left_sum[x] = left_sum[x] - lo + li;
                left_sq[x] = left_sq[x] - lo * lo + li * li;
                right_sum[x] = right_sum[x] - ro + ri;
                right_sq[x] = right_sq[x] - ro * ro + ri * ri;
            }
        } else {
            left_sum.fill(0.0);
            left_sq.fill(0.0);
            right_sum.fill(0.0);
            right_sq.fill(0.0);
            for y in start..=end {
                let left = pair.left().row_unchecked(y);
                let right = pair.right().row_unchecked(y);
                for x in 0..width {
                    let l = left[x].to_f32();
                    let r = right[x].to_f32();
                    left_sum[x] += l;
                    left_sq[x] += l * l;
                    right_sum[x] += r;
                    right_sq[x] += r * r;
                }
            }
        }

        let first = radius.x;
        let last = width - radius.x - 1;
        let n = (radius.width() * radius.height()) as f32;
        box_filter_row(left_sum, first, last, radius.x, left_mean);
        box_filter_row(left_sq, first, last, radius.x, left_std);
        box_filter_row(right_sum, first, last, radius.x, right_mean);
        box_filter_row(right_sq, first, last, radius.x, right_std);
        for x in first..=last {
            left_mean[x] /= n;
            left_std[x] = (left_std[x] / n - left_mean[x] * left_mean[x]).max(0.0).sqrt();
            right_mean[x] /= n;
            right_std[x] = (right_std[x] / n - right_mean[x] * right_mean[x])
                .max(0.0)
                .sqrt();
        }

        let min = geometry.range().min();
        for index in 0..geometry.disparities() {
            let Some((first, last)) = geometry.centre_columns(index) else {
                continue;
            };
            let d = min + index;
            let base = index * width;
            for x in first..=last {
                let xr = x - d;
                let covariance = region[base + x] / n - left_mean[x] * right_mean[xr];
                out[base + x] = covariance / (left_std[x] * right_std[xr] + self.eps);
            }
        }
    }
}
