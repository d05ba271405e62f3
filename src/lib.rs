//! Stereomatch is a CPU-first dense stereo disparity library.
//!
//! Block matching scores every disparity of a row once, aggregates rows with
//! a rolling vertical window and picks a winner per pixel with optional
//! validity checks. A separate builder produces raw per-pixel cost volumes for
//! semi-global style consumers. Parallelism is available via the `rayon`
//! feature and SIMD rolling updates via `simd`.
//!
//! ```
//! use stereomatch::{
//!     BlockMatchConfig, DisparityMap, ErrorSelector, ImageView, SadRowScorer, SelectConfig,
//!     StereoBlockMatcher, StereoPair,
//! };
//!
//! let left = [10u8, 10, 10, 50, 50, 50, 50, 50];
//! let right = [10u8, 50, 50, 50, 50, 50, 50, 50];
//! let pair = StereoPair::new(
//!     ImageView::from_slice(&left, 8, 1)?,
//!     ImageView::from_slice(&right, 8, 1)?,
//! )?;
//! let config = BlockMatchConfig {
//!     max_disparity: 4,
//!     radius_x: 1,
//!     radius_y: 0,
//!     ..BlockMatchConfig::default()
//! };
//! let selector = ErrorSelector::new(SelectConfig::unchecked())?;
//! let mut matcher = StereoBlockMatcher::new(SadRowScorer::<u8>::new(), selector, config)?;
//! let map: DisparityMap<u8> = matcher.compute(&pair)?;
//! assert_eq!(map.disparity(3, 0), Some(2.0));
//! assert_eq!(map.disparity(0, 0), None);
//! # Ok::<(), stereomatch::StereoMatchError>(())
//! ```

pub mod cost;
pub mod disparity;
pub mod engine;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod numeric;
pub mod order;
pub mod refine;
pub mod region;
pub mod select;
mod trace;
pub mod util;

pub use cost::{
    AbsoluteDifferenceCost, CostVolume, CostVolumeBuilder, HammingCost, PixelCost, MAX_COST,
};
pub use disparity::{DisparityMap, DisparityRange, DisparityValue, RegionRadius};
pub use engine::{Aggregation, BlockMatchConfig, StereoBlockMatcher};
pub use image::{ImageView, OwnedImage, StereoPair};
pub use kernel::{NccRowScorer, RowScorer, SadRowScorer};
pub use order::{HigherIsBetter, LowerIsBetter, ScoreOrder};
pub use select::{CorrelationSelector, DisparitySelector, ErrorSelector, SelectConfig};
pub use util::{StereoMatchError, StereoMatchResult};
