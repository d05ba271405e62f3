//! Pixel and score types shared by every kernel.
//!
//! Kernels are generic over a small closed set of sample types (`u8`, `u16`,
//! `f32`) and accumulator types (`i32`, `f32`) so one implementation serves
//! every instantiation without runtime dispatch.

use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Fixed-point scale applied to fractional texture thresholds for integer
/// scores.
pub const TEXTURE_DISCRETIZER: i64 = 10_000;

/// Accumulated matching score.
pub trait Score:
    Copy
    + Debug
    + Default
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + 'static
{
    /// Additive identity.
    const ZERO: Self;
    /// Whether add/subtract sequences are exact (no rounding drift).
    const EXACT: bool;
    /// Largest magnitude a region sum may reach without overflowing.
    const MAX_SUM: f64;

    /// Pre-scaled form of a fractional texture threshold.
    type Ratio: Copy + Debug + Send + Sync;

    /// Converts a configuration value, saturating at the type bounds.
    fn from_f64(value: f64) -> Self;

    /// Converts to `f32` for curve fitting.
    fn to_f32(self) -> f32;

    /// Absolute value.
    fn abs(self) -> Self;

    /// Prepares `threshold` for repeated [`Score::within_ratio`] tests.
    fn ratio(threshold: f64) -> Self::Ratio;

    /// Returns `margin <= ratio * reference` without dividing.
    fn within_ratio(margin: Self, ratio: Self::Ratio, reference: Self) -> bool;

    /// Writes `prev - leaving + entering` element-wise into `out`.
    #[inline]
    fn rolling_update(prev: &[Self], leaving: &[Self], entering: &[Self], out: &mut [Self]) {
        for (((o, &p), &l), &e) in out.iter_mut().zip(prev).zip(leaving).zip(entering) {
            *o = p - l + e;
        }
    }

    /// Adds `row` element-wise into `acc`.
    #[inline]
    fn accumulate(acc: &mut [Self], row: &[Self]) {
        for (a, &r) in acc.iter_mut().zip(row) {
            *a = *a + r;
        }
    }
}

impl Score for i32 {
    const ZERO: Self = 0;
    const EXACT: bool = true;
    const MAX_SUM: f64 = i32::MAX as f64;

    type Ratio = i64;

    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn abs(self) -> Self {
        i32::abs(self)
    }

    fn ratio(threshold: f64) -> i64 {
        (TEXTURE_DISCRETIZER as f64 * threshold).round() as i64
    }

    #[inline]
    fn within_ratio(margin: Self, ratio: i64, reference: Self) -> bool {
        TEXTURE_DISCRETIZER * margin as i64 <= ratio * reference as i64
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn rolling_update(prev: &[Self], leaving: &[Self], entering: &[Self], out: &mut [Self]) {
        crate::kernel::simd::rolling_update_i32(prev, leaving, entering, out);
    }
}

impl Score for f32 {
    const ZERO: Self = 0.0;
    const EXACT: bool = false;
    const MAX_SUM: f64 = f32::MAX as f64;

    type Ratio = f32;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f32(self) -> f32 {
        self
    }

    fn abs(self) -> Self {
        f32::abs(self)
    }

    fn ratio(threshold: f64) -> f32 {
        threshold as f32
    }

    #[inline]
    fn within_ratio(margin: Self, ratio: f32, reference: Self) -> bool {
        margin <= ratio * reference
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn rolling_update(prev: &[Self], leaving: &[Self], entering: &[Self], out: &mut [Self]) {
        crate::kernel::simd::rolling_update_f32(prev, leaving, entering, out);
    }
}

/// Image sample type.
pub trait Pixel: Copy + Debug + Default + Send + Sync + 'static {
    /// Score type holding absolute differences and their sums.
    type Error: Score;
    /// Largest nominal sample value; floats are expected in the 8-bit range.
    const FULL_SCALE: f32;

    /// Returns `|self - other|` in the error score type.
    fn abs_error(self, other: Self) -> Self::Error;

    /// Converts the sample to `f32`.
    fn to_f32(self) -> f32;
}

impl Pixel for u8 {
    type Error = i32;
    const FULL_SCALE: f32 = u8::MAX as f32;

    #[inline]
    fn abs_error(self, other: Self) -> i32 {
        (self as i32 - other as i32).abs()
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Pixel for u16 {
    type Error = i32;
    const FULL_SCALE: f32 = u16::MAX as f32;

    #[inline]
    fn abs_error(self, other: Self) -> i32 {
        (self as i32 - other as i32).abs()
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Pixel for f32 {
    type Error = f32;
    const FULL_SCALE: f32 = 255.0;

    #[inline]
    fn abs_error(self, other: Self) -> f32 {
        (self - other).abs()
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}
