//! Compile-time score orderings.
//!
//! Error metrics (SAD) prefer small scores and correlation metrics (NCC)
//! prefer large ones. Scorers declare their ordering as an associated type and
//! every downstream stage is instantiated with the same policy.

use crate::numeric::Score;
use std::fmt::Debug;

/// Total order over scores used by aggregation and selection.
pub trait ScoreOrder: Copy + Debug + Default + Send + Sync + 'static {
    /// Whether smaller scores are better.
    const LOWER_IS_BETTER: bool;

    /// Returns `true` when `a` is strictly better than `b`.
    fn is_better<S: Score>(a: S, b: S) -> bool;

    /// Distance by which `best` beats `other`; non-negative when `best` is
    /// at least as good.
    fn margin<S: Score>(best: S, other: S) -> S;

    /// Scale the texture margin is compared against.
    fn texture_reference<S: Score>(best: S) -> S;

    /// Returns `true` when `best` satisfies the absolute quality `limit`.
    fn within_limit<S: Score>(best: S, limit: S) -> bool;

    /// Maps a score onto an axis where larger is better.
    fn as_peak(value: f32) -> f32;
}

/// Ordering for error metrics: lower scores win.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LowerIsBetter;

/// Ordering for correlation metrics: higher scores win.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HigherIsBetter;

impl ScoreOrder for LowerIsBetter {
    const LOWER_IS_BETTER: bool = true;

    #[inline]
    fn is_better<S: Score>(a: S, b: S) -> bool {
        a < b
    }

    #[inline]
    fn margin<S: Score>(best: S, other: S) -> S {
        other - best
    }

    #[inline]
    fn texture_reference<S: Score>(best: S) -> S {
        best
    }

    #[inline]
    fn within_limit<S: Score>(best: S, limit: S) -> bool {
        best <= limit
    }

    #[inline]
    fn as_peak(value: f32) -> f32 {
        -value
    }
}

impl ScoreOrder for HigherIsBetter {
    const LOWER_IS_BETTER: bool = false;

    #[inline]
    fn is_better<S: Score>(a: S, b: S) -> bool {
        a > b
    }

    #[inline]
    fn margin<S: Score>(best: S, other: S) -> S {
        best - other
    }

    /// Correlations may be negative, so the margin is scaled by `|best|`.
    #[inline]
    fn texture_reference<S: Score>(best: S) -> S {
        best.abs()
    }

    #[inline]
    fn within_limit<S: Score>(best: S, limit: S) -> bool {
        best >= limit
    }

    #[inline]
    fn as_peak(value: f32) -> f32 {
        value
    }
}
