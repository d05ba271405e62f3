//! Disparity ranges, matching-window geometry and disparity maps.

use crate::util::{StereoMatchError, StereoMatchResult};
use std::fmt::Debug;

/// Inclusive disparity search interval `[min, max]` with `min < max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisparityRange {
    min: usize,
    max: usize,
}

impl DisparityRange {
    /// Creates a range, rejecting empty or inverted intervals.
    pub fn new(min: usize, max: usize) -> StereoMatchResult<Self> {
        if min >= max {
            return Err(StereoMatchError::InvalidDisparityRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest disparity searched.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Largest disparity searched.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of disparities searched, `max - min + 1`.
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    /// Always `false`; a valid range holds at least two disparities.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Half-size of the matching window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionRadius {
    /// Horizontal radius.
    pub x: usize,
    /// Vertical radius.
    pub y: usize,
}

impl RegionRadius {
    /// Creates a radius pair.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Window width, `2 * x + 1`.
    pub fn width(&self) -> usize {
        2 * self.x + 1
    }

    /// Window height, `2 * y + 1`.
    pub fn height(&self) -> usize {
        2 * self.y + 1
    }
}

/// Layout of one score row: `disparities` blocks of `width` scores each.
///
/// Block `i` holds the region scores for disparity `min + i`, indexed by the
/// region's centre column. A centre column `x` is valid for block `i` when the
/// whole window fits both images: `x - radius.x >= min + i` and
/// `x + radius.x < width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreGeometry {
    width: usize,
    range: DisparityRange,
    radius: RegionRadius,
}

impl ScoreGeometry {
    /// Creates the geometry for images of the given width.
    pub fn new(width: usize, range: DisparityRange, radius: RegionRadius) -> Self {
        Self {
            width,
            range,
            radius,
        }
    }

    /// Image width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Disparity search range.
    pub fn range(&self) -> DisparityRange {
        self.range
    }

    /// Matching-window radius.
    pub fn radius(&self) -> RegionRadius {
        self.radius
    }

    /// Number of disparity blocks.
    pub fn disparities(&self) -> usize {
        self.range.len()
    }

    /// Total number of scores in one row.
    pub fn row_len(&self) -> usize {
        self.width * self.range.len()
    }

    /// Valid centre columns `(first, last)` for disparity block `index`.
    pub fn centre_columns(&self, index: usize) -> Option<(usize, usize)> {
        let first = self.range.min + index + self.radius.x;
        let last = self.width.checked_sub(self.radius.x + 1)?;
        (first <= last).then_some((first, last))
    }

    /// Number of disparity blocks valid at centre column `x`.
    ///
    /// Zero for border columns whose window leaves the image at every
    /// disparity.
    pub fn local_range(&self, x: usize) -> usize {
        if x + self.radius.x >= self.width || x < self.range.min + self.radius.x {
            return 0;
        }
        (x - self.radius.x).min(self.range.max) - self.range.min + 1
    }
}

/// Value type stored in a [`DisparityMap`].
pub trait DisparityValue: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Largest range length whose sentinel still fits the type.
    const MAX_RANGE: usize;
    /// Whether fractional offsets survive storage.
    const SUBPIXEL: bool;

    /// Encodes an integer offset; `range.len()` encodes the sentinel.
    fn from_index(index: usize) -> Self;

    /// Encodes an offset refined by `delta` in `[-1, 1]`.
    fn from_subpixel(index: usize, delta: f32) -> Self {
        let _ = delta;
        Self::from_index(index)
    }

    /// Decodes the stored value.
    fn to_f32(self) -> f32;
}

impl DisparityValue for u8 {
    const MAX_RANGE: usize = u8::MAX as usize;
    const SUBPIXEL: bool = false;

    fn from_index(index: usize) -> Self {
        index as u8
    }

    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl DisparityValue for u16 {
    const MAX_RANGE: usize = u16::MAX as usize;
    const SUBPIXEL: bool = false;

    fn from_index(index: usize) -> Self {
        index as u16
    }

    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl DisparityValue for f32 {
    const MAX_RANGE: usize = 1 << 24;
    const SUBPIXEL: bool = true;

    fn from_index(index: usize) -> Self {
        index as f32
    }

    fn from_subpixel(index: usize, delta: f32) -> Self {
        index as f32 + delta
    }

    fn to_f32(self) -> f32 {
        self
    }
}

/// Per-pixel disparity offsets relative to `range.min()`.
///
/// Each value lies in `[0, range.len() - 1]` or equals [`DisparityMap::invalid`]
/// (`range.len()`), which marks pixels rejected by validation or lying in the
/// image border.
#[derive(Clone, Debug)]
pub struct DisparityMap<D = u8> {
    data: Vec<D>,
    width: usize,
    height: usize,
    range: DisparityRange,
}

impl<D: DisparityValue> DisparityMap<D> {
    /// Allocates a map filled with the invalid sentinel.
    pub fn new(width: usize, height: usize, range: DisparityRange) -> StereoMatchResult<Self> {
        check_capacity::<D>(range)?;
        Ok(Self {
            data: vec![D::from_index(range.len()); width * height],
            width,
            height,
            range,
        })
    }

    /// Resizes the map for a new input, reusing the allocation.
    pub fn reshape(
        &mut self,
        width: usize,
        height: usize,
        range: DisparityRange,
    ) -> StereoMatchResult<()> {
        check_capacity::<D>(range)?;
        self.width = width;
        self.height = height;
        self.range = range;
        self.data.clear();
        self.data.resize(width * height, D::from_index(range.len()));
        Ok(())
    }

    /// Map width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Disparity range the offsets refer to.
    pub fn range(&self) -> DisparityRange {
        self.range
    }

    /// The sentinel marking invalid pixels.
    pub fn invalid(&self) -> D {
        D::from_index(self.range.len())
    }

    /// Raw values in row-major order.
    pub fn data(&self) -> &[D] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [D] {
        &mut self.data
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[D]> {
        if y >= self.height {
            return None;
        }
        self.data.get(y * self.width..(y + 1) * self.width)
    }

    /// Returns the stored value at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<D> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns the absolute disparity at `(x, y)`, or `None` when invalid.
    pub fn disparity(&self, x: usize, y: usize) -> Option<f32> {
        let value = self.get(x, y)?;
        if value == self.invalid() {
            return None;
        }
        Some(self.range.min as f32 + value.to_f32())
    }

    /// Counts pixels holding a valid disparity.
    pub fn valid_count(&self) -> usize {
        let invalid = self.invalid();
        self.data.iter().filter(|&&v| v != invalid).count()
    }
}

fn check_capacity<D: DisparityValue>(range: DisparityRange) -> StereoMatchResult<()> {
    if range.len() > D::MAX_RANGE {
        return Err(StereoMatchError::RangeTooLarge {
            range: range.len(),
            max_range: D::MAX_RANGE,
        });
    }
    Ok(())
}
