//! Selector for error metrics such as SAD.

use crate::disparity::{DisparityValue, ScoreGeometry};
use crate::numeric::Score;
use crate::order::LowerIsBetter;
use crate::select::{DisparitySelector, SelectConfig, Validation};
use crate::util::StereoMatchResult;

/// Picks the lowest score per column and validates it.
#[derive(Clone, Copy, Debug)]
pub struct ErrorSelector<S: Score> {
    validation: Validation<S>,
}

impl<S: Score> ErrorSelector<S> {
    /// Prepares the selector, pre-scaling thresholds for `S`.
    pub fn new(config: SelectConfig) -> StereoMatchResult<Self> {
        config.validate()?;
        Ok(Self {
            validation: Validation::new(&config),
        })
    }
}

impl<S: Score> DisparitySelector for ErrorSelector<S> {
    type Score = S;
    type Order = LowerIsBetter;

    fn select_row<D: DisparityValue>(
        &self,
        scores: &[S],
        geometry: &ScoreGeometry,
        scratch: &mut Vec<S>,
        out: &mut [D],
    ) {
        self.validation
            .select_row::<LowerIsBetter, D>(scores, geometry, scratch, out, None);
    }
}
