//! Winner-take-all disparity selection with validity checks.
//!
//! A selector reads one row of region scores, picks the best disparity per
//! column and writes either its offset or the invalid sentinel. Candidates
//! are rejected when the best score misses an absolute limit, when matching
//! back from the right image lands on a different disparity, or when the
//! runner-up is too close to call.

pub mod correlation;
pub mod error;

pub use correlation::CorrelationSelector;
pub use error::ErrorSelector;

use crate::disparity::{DisparityValue, ScoreGeometry};
use crate::numeric::Score;
use crate::order::ScoreOrder;
use crate::refine::refine_disparity;
use crate::util::{StereoMatchError, StereoMatchResult};

/// Validation settings shared by all selectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectConfig {
    /// Absolute limit on the winning score. Error metrics reject scores above
    /// it, correlation metrics reject scores below it. `None` disables.
    pub max_error: Option<f64>,
    /// Largest allowed difference between left-to-right and right-to-left
    /// disparities. Negative disables the check.
    pub right_to_left_tolerance: i32,
    /// Minimum relative margin between the best and second-best score.
    /// Correlation metrics scale it by the magnitude of the best score.
    /// Values `<= 0` disable the check.
    pub texture_threshold: f64,
    /// Fit a parabola around the winner when the map stores fractions.
    pub subpixel: bool,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            max_error: None,
            right_to_left_tolerance: 1,
            texture_threshold: 0.15,
            subpixel: false,
        }
    }
}

impl SelectConfig {
    /// Configuration with every validity check disabled.
    pub fn unchecked() -> Self {
        Self {
            max_error: None,
            right_to_left_tolerance: -1,
            texture_threshold: 0.0,
            subpixel: false,
        }
    }

    /// Rejects non-finite thresholds.
    pub fn validate(&self) -> StereoMatchResult<()> {
        if self.max_error.is_some_and(|limit| !limit.is_finite()) {
            return Err(StereoMatchError::InvalidConfig {
                reason: "max_error must be finite",
            });
        }
        if !self.texture_threshold.is_finite() {
            return Err(StereoMatchError::InvalidConfig {
                reason: "texture_threshold must be finite",
            });
        }
        Ok(())
    }
}

/// Chooses one disparity per column from a row of region scores.
pub trait DisparitySelector: Send + Sync {
    /// Score type consumed.
    type Score: Score;
    /// Ordering the scores follow.
    type Order: ScoreOrder;

    /// Selects disparities for every column of `out`.
    ///
    /// `scores` follows `geometry`'s layout. Columns without a single valid
    /// disparity receive the invalid sentinel. `scratch` is caller-owned and
    /// may be grown.
    fn select_row<D: DisparityValue>(
        &self,
        scores: &[Self::Score],
        geometry: &ScoreGeometry,
        scratch: &mut Vec<Self::Score>,
        out: &mut [D],
    );
}

/// Validity checks prepared for one score type.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Validation<S: Score> {
    max_error: Option<S>,
    tolerance: Option<usize>,
    ratio: Option<S::Ratio>,
    subpixel: bool,
}

impl<S: Score> Validation<S> {
    pub(crate) fn new(config: &SelectConfig) -> Self {
        Self {
            max_error: config.max_error.map(S::from_f64),
            tolerance: usize::try_from(config.right_to_left_tolerance).ok(),
            ratio: (config.texture_threshold > 0.0).then(|| S::ratio(config.texture_threshold)),
            subpixel: config.subpixel,
        }
    }

    /// Runs selection over a row.
    ///
    /// `smooth`, when given, filters each gathered column before the winner
    /// is chosen; the right-to-left check always reads the raw scores.
    pub(crate) fn select_row<O, D>(
        &self,
        scores: &[S],
        geometry: &ScoreGeometry,
        scratch: &mut Vec<S>,
        out: &mut [D],
        smooth: Option<fn(&[S], &mut [S])>,
    ) where
        O: ScoreOrder,
        D: DisparityValue,
    {
        let width = geometry.width();
        let range = geometry.disparities();
        let invalid = D::from_index(range);
        if scratch.len() < 2 * range {
            scratch.resize(2 * range, S::ZERO);
        }
        let (raw, filtered) = scratch.split_at_mut(range);

        for (x, value) in out.iter_mut().enumerate().take(width) {
            let local = geometry.local_range(x);
            if local == 0 {
                *value = invalid;
                continue;
            }
            let raw = &mut raw[..local];
            for (i, slot) in raw.iter_mut().enumerate() {
                *slot = scores[i * width + x];
            }
            let column: &[S] = match smooth {
                Some(filter) => {
                    let filtered = &mut filtered[..local];
                    filter(raw, filtered);
                    &*filtered
                }
                None => &*raw,
            };
            *value = self.select_column::<O, D>(column, scores, geometry, x);
        }
    }

    fn select_column<O: ScoreOrder, D: DisparityValue>(
        &self,
        column: &[S],
        scores: &[S],
        geometry: &ScoreGeometry,
        x: usize,
    ) -> D {
        let invalid = D::from_index(geometry.disparities());
        let best = argbest::<S, O>(column);
        let best_score = column[best];

        if let Some(limit) = self.max_error {
            if !O::within_limit(best_score, limit) {
                return invalid;
            }
        }
        if let Some(tolerance) = self.tolerance {
            let right = x - (geometry.range().min() + best);
            let reverse = right_to_left::<S, O>(scores, geometry, right);
            if reverse.abs_diff(best) > tolerance {
                return invalid;
            }
        }
        if let Some(ratio) = self.ratio {
            if column.len() >= 3 {
                if let Some(second) = second_best::<S, O>(column, best) {
                    let reference = O::texture_reference(best_score);
                    if S::within_ratio(O::margin(best_score, second), ratio, reference) {
                        return invalid;
                    }
                }
            }
        }

        if self.subpixel && D::SUBPIXEL {
            let refined = refine_disparity::<S, O>(column, best);
            D::from_subpixel(best, refined - best as f32)
        } else {
            D::from_index(best)
        }
    }
}

/// Index of the best score; ties keep the lowest index.
#[inline]
pub(crate) fn argbest<S: Score, O: ScoreOrder>(column: &[S]) -> usize {
    let mut best = 0;
    for (i, &value) in column.iter().enumerate().skip(1) {
        if O::is_better(value, column[best]) {
            best = i;
        }
    }
    best
}

/// Best disparity offset for right-image column `right`.
///
/// Walks the diagonal of the score row that holds every left column `right`
/// can match: offset `i` lives at left column `right + min + i`.
pub(crate) fn right_to_left<S: Score, O: ScoreOrder>(
    scores: &[S],
    geometry: &ScoreGeometry,
    right: usize,
) -> usize {
    let width = geometry.width();
    let start = right + geometry.range().min();
    let last_column = width - 1 - geometry.radius().x;
    let count = (geometry.disparities() - 1).min(last_column - start) + 1;

    let mut best = 0;
    let mut best_score = scores[start];
    for i in 1..count {
        let value = scores[i * width + start + i];
        if O::is_better(value, best_score) {
            best = i;
            best_score = value;
        }
    }
    best
}

/// Best score outside `best - 1..=best + 1`.
pub(crate) fn second_best<S: Score, O: ScoreOrder>(column: &[S], best: usize) -> Option<S> {
    column
        .iter()
        .enumerate()
        .filter(|(i, _)| i.abs_diff(best) > 1)
        .map(|(_, &value)| value)
        .reduce(|a, b| if O::is_better(b, a) { b } else { a })
}
