//! Parabola fit through the winning score and its two neighbours.

use crate::numeric::Score;
use crate::order::ScoreOrder;

/// Estimates the peak offset for samples at `-1, 0, +1`.
///
/// Values are on a larger-is-better axis. Returns the vertex offset of the
/// fitted parabola when it is concave and well conditioned, `None`
/// otherwise. The offset lies in `[-0.5, 0.5]` whenever `centre` is the
/// largest sample.
pub fn parabola_offset(before: f32, centre: f32, after: f32) -> Option<f32> {
    if !before.is_finite() || !centre.is_finite() || !after.is_finite() {
        return None;
    }

    let denom = before - 2.0 * centre + after;
    if denom > -1e-6 {
        return None;
    }

    let dx = 0.5 * (before - after) / denom;
    (dx.is_finite() && dx.abs() <= 1.0).then_some(dx)
}

/// Refines disparity offset `best` within a column of `scores`.
///
/// Offsets at either end of the column have a single neighbour and are
/// returned unchanged, as are flat or non-concave neighbourhoods.
pub fn refine_disparity<S: Score, O: ScoreOrder>(scores: &[S], best: usize) -> f32 {
    if best == 0 || best + 1 >= scores.len() {
        return best as f32;
    }
    let peak = |i: usize| O::as_peak(scores[i].to_f32());
    let offset = parabola_offset(peak(best - 1), peak(best), peak(best + 1)).unwrap_or(0.0);
    best as f32 + offset
}
