//! Per-stripe scratch buffers.

use crate::disparity::ScoreGeometry;
use crate::kernel::NormalizeScratch;
use crate::numeric::Score;
use crate::region::RegionAccumulator;

/// Buffers owned by one stripe for the duration of a pass.
///
/// Workspaces live in the matcher's pool and are reused across calls; every
/// buffer only grows.
#[derive(Debug, Default)]
pub struct Workspace<S> {
    pub(crate) accumulator: RegionAccumulator<S>,
    pub(crate) element: Vec<S>,
    pub(crate) five: Vec<S>,
    pub(crate) select: Vec<S>,
    pub(crate) normalize: NormalizeScratch,
}

impl<S: Score> Workspace<S> {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the buffers for `geometry`.
    pub(crate) fn prepare(&mut self, geometry: &ScoreGeometry, normalize: bool, five: bool) {
        self.accumulator
            .configure(geometry.radius().height(), geometry.row_len(), normalize);
        self.normalize.reset();
        if five && self.five.len() < geometry.row_len() {
            self.five.resize(geometry.row_len(), S::ZERO);
        }
    }
}
