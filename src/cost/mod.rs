//! Dense per-pixel matching costs for semi-global style consumers.
//!
//! [`CostVolumeBuilder`] evaluates a [`PixelCost`] for every pixel and every
//! disparity without any spatial aggregation. Costs are `u16` values in
//! `[0, MAX_COST]`; disparities whose right-image sample falls left of the
//! image store `MAX_COST`.

pub mod census;

pub use census::{census_transform, CensusWord, HammingCost};

use crate::disparity::DisparityRange;
use crate::image::StereoPair;
use crate::numeric::{Pixel, Score};
use crate::trace::{trace_event, trace_span};
use crate::util::StereoMatchResult;
use std::marker::PhantomData;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Largest cost; also stored where a disparity leaves the image.
///
/// Eleven bits leave headroom for path aggregation in `u16`.
pub const MAX_COST: u16 = 2047;

/// Cost of matching one left sample with one right sample.
pub trait PixelCost: Send + Sync {
    /// Sample type of both images.
    type Pixel: Copy + Send + Sync;

    /// Returns a cost in `[0, MAX_COST]`.
    fn cost(&self, left: Self::Pixel, right: Self::Pixel) -> u16;
}

/// Absolute intensity difference scaled so a full-scale step costs
/// [`MAX_COST`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsoluteDifferenceCost<P> {
    _pixel: PhantomData<P>,
}

impl<P: Pixel> AbsoluteDifferenceCost<P> {
    /// Creates the cost function.
    pub fn new() -> Self {
        Self {
            _pixel: PhantomData,
        }
    }
}

impl<P: Pixel> PixelCost for AbsoluteDifferenceCost<P> {
    type Pixel = P;

    #[inline]
    fn cost(&self, left: P, right: P) -> u16 {
        let scaled = MAX_COST as f32 * left.abs_error(right).to_f32() / P::FULL_SCALE;
        scaled.min(MAX_COST as f32) as u16
    }
}

/// Cost tensor with shape `(height, width, range.len())`.
#[derive(Clone, Debug)]
pub struct CostVolume {
    data: Vec<u16>,
    width: usize,
    height: usize,
    range: DisparityRange,
}

impl CostVolume {
    /// Allocates a volume filled with [`MAX_COST`].
    pub fn new(width: usize, height: usize, range: DisparityRange) -> Self {
        Self {
            data: vec![MAX_COST; width * height * range.len()],
            width,
            height,
            range,
        }
    }

    /// Resizes the volume, reusing the allocation.
    pub fn reshape(&mut self, width: usize, height: usize, range: DisparityRange) {
        self.width = width;
        self.height = height;
        self.range = range;
        self.data.clear();
        self.data.resize(width * height * range.len(), MAX_COST);
    }

    /// Volume width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Volume height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Disparity range along the last axis.
    pub fn range(&self) -> DisparityRange {
        self.range
    }

    /// Raw costs indexed by `(y * width + x) * range.len() + (d - min)`.
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// Costs of every disparity at `(x, y)`.
    pub fn costs(&self, x: usize, y: usize) -> Option<&[u16]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let len = self.range.len();
        let start = (y * self.width + x) * len;
        self.data.get(start..start + len)
    }

    /// Cost at `(x, y)` for absolute disparity `d`.
    pub fn get(&self, x: usize, y: usize, d: usize) -> Option<u16> {
        if d < self.range.min() || d > self.range.max() {
            return None;
        }
        self.costs(x, y)
            .and_then(|costs| costs.get(d - self.range.min()).copied())
    }
}

/// Fills [`CostVolume`]s from stereo pairs.
#[derive(Clone, Debug, Default)]
pub struct CostVolumeBuilder<C> {
    cost: C,
    parallel: bool,
}

impl<C: PixelCost> CostVolumeBuilder<C> {
    /// Creates a sequential builder.
    pub fn new(cost: C) -> Self {
        Self {
            cost,
            parallel: false,
        }
    }

    /// Fills rows on the rayon pool when the `rayon` feature is enabled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builds a new volume.
    pub fn compute(
        &self,
        pair: &StereoPair<'_, C::Pixel>,
        range: DisparityRange,
    ) -> StereoMatchResult<CostVolume> {
        let mut volume = CostVolume::new(pair.width(), pair.height(), range);
        self.build(pair, range, &mut volume)?;
        Ok(volume)
    }

    /// Fills `out`, reshaping it to the pair's size.
    pub fn build(
        &self,
        pair: &StereoPair<'_, C::Pixel>,
        range: DisparityRange,
        out: &mut CostVolume,
    ) -> StereoMatchResult<()> {
        let width = pair.width();
        let height = pair.height();
        let _span = trace_span!(
            "cost_volume",
            width = width,
            height = height,
            disparities = range.len()
        )
        .entered();
        out.reshape(width, height, range);
        let row_len = width * range.len();

        #[cfg(feature = "rayon")]
        if self.parallel {
            out.data
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| self.fill_row(pair, y, range, row));
            trace_event!("cost_volume_done", rows = height);
            return Ok(());
        }

        for (y, row) in out.data.chunks_mut(row_len).enumerate() {
            self.fill_row(pair, y, range, row);
        }
        trace_event!("cost_volume_done", rows = height);
        Ok(())
    }

    fn fill_row(
        &self,
        pair: &StereoPair<'_, C::Pixel>,
        y: usize,
        range: DisparityRange,
        out: &mut [u16],
    ) {
        let left = pair.left().row_unchecked(y);
        let right = pair.right().row_unchecked(y);
        let len = range.len();
        for (x, costs) in out.chunks_exact_mut(len).enumerate() {
            let l = left[x];
            for (i, cost) in costs.iter_mut().enumerate() {
                let d = range.min() + i;
                *cost = if d > x {
                    MAX_COST
                } else {
                    self.cost.cost(l, right[x - d])
                };
            }
        }
    }
}
