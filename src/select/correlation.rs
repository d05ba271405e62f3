//! Selector for correlation metrics such as NCC.

use crate::disparity::{DisparityValue, ScoreGeometry};
use crate::order::HigherIsBetter;
use crate::select::{DisparitySelector, SelectConfig, Validation};
use crate::util::StereoMatchResult;

/// Radius of the box filter applied along the disparity axis.
pub const SMOOTHING_RADIUS: usize = 2;

/// Picks the highest correlation per column and validates it.
///
/// With smoothing enabled, columns holding at least `2 * SMOOTHING_RADIUS + 1`
/// candidates are box filtered along the disparity axis before the winner is
/// chosen. Limits and the texture margin apply to the filtered curve.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationSelector {
    validation: Validation<f32>,
    smoothing: bool,
}

impl CorrelationSelector {
    /// Prepares the selector with smoothing enabled.
    pub fn new(config: SelectConfig) -> StereoMatchResult<Self> {
        config.validate()?;
        Ok(Self {
            validation: Validation::new(&config),
            smoothing: true,
        })
    }

    /// Enables or disables disparity-axis smoothing.
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }
}

impl DisparitySelector for CorrelationSelector {
    type Score = f32;
    type Order = HigherIsBetter;

    fn select_row<D: DisparityValue>(
        &self,
        scores: &[f32],
        geometry: &ScoreGeometry,
        scratch: &mut Vec<f32>,
        out: &mut [D],
    ) {
        let smooth = self.smoothing.then_some(smooth_column as fn(&[f32], &mut [f32]));
        self.validation
            .select_row::<HigherIsBetter, D>(scores, geometry, scratch, out, smooth);
    }
}

/// Box filter of radius [`SMOOTHING_RADIUS`]; ends average the samples that
/// exist. Short columns are copied unchanged.
fn smooth_column(column: &[f32], out: &mut [f32]) {
    let len = column.len();
    if len < 2 * SMOOTHING_RADIUS + 1 {
        out[..len].copy_from_slice(column);
        return;
    }
    for (i, o) in out.iter_mut().enumerate().take(len) {
        let lo = i.saturating_sub(SMOOTHING_RADIUS);
        let hi = (i + SMOOTHING_RADIUS).min(len - 1);
        let sum: f32 = column[lo..=hi].iter().sum();
        *o = sum / (hi - lo + 1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::{smooth_column, CorrelationSelector};
    use crate::disparity::{DisparityRange, RegionRadius, ScoreGeometry};
    use crate::select::{DisparitySelector, SelectConfig};

    #[test]
    fn smoothing_truncates_at_the_ends() {
        let column = [5.0f32, 0.0, 0.0, 0.0, 0.0, 10.0];
        let mut out = [0.0f32; 6];
        smooth_column(&column, &mut out);
        assert!((out[0] - 5.0 / 3.0).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
        assert!((out[5] - 10.0 / 3.0).abs() < 1e-6);

        let short = [1.0f32, 3.0, 2.0];
        let mut out = [0.0f32; 3];
        smooth_column(&short, &mut out);
        assert_eq!(out, short);
    }

    #[test]
    fn smoothing_prefers_broad_peaks_over_spikes() {
        let width = 14;
        let x = 12;
        let geometry =
            ScoreGeometry::new(width, DisparityRange::new(0, 9).unwrap(), RegionRadius::new(0, 0));
        let mut scores = vec![0.1f32; geometry.row_len()];
        for (index, value) in [(0usize, 0.95f32), (4, 0.3), (5, 0.7), (6, 0.8), (7, 0.7), (8, 0.3)] {
            scores[index * width + x] = value;
        }
        let selector = CorrelationSelector::new(SelectConfig::unchecked()).unwrap();
        let mut out = vec![0u8; width];
        selector.select_row(&scores, &geometry, &mut Vec::new(), &mut out);
        assert_eq!(out[x], 6);

        let raw = selector.with_smoothing(false);
        raw.select_row(&scores, &geometry, &mut Vec::new(), &mut out);
        assert_eq!(out[x], 0);
    }
}
