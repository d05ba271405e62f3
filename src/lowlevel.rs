//! Low-level building blocks for custom disparity pipelines.
//!
//! These items expose the stages that [`crate::StereoBlockMatcher`] chains
//! together: score geometry, the rolling region accumulator, five-region
//! combination, stripe planning and sub-pixel fitting. Most users should
//! prefer the top-level matcher and cost-volume builder.

pub use crate::cost::{census_transform, CensusWord};
pub use crate::disparity::ScoreGeometry;
pub use crate::engine::{StripePlan, Workspace};
pub use crate::kernel::NormalizeScratch;
pub use crate::numeric::{Pixel, Score, TEXTURE_DISCRETIZER};
pub use crate::refine::{parabola_offset, refine_disparity};
pub use crate::region::{best_two_sum, combine_five_regions, RegionAccumulator, RESEED_INTERVAL};
