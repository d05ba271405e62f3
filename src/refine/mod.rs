//! Sub-pixel refinement of winner-take-all disparities.

pub mod subpixel;

pub use subpixel::{parabola_offset, refine_disparity};
