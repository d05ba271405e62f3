//! Error types for stereomatch.

use thiserror::Error;

/// Result alias for stereomatch operations.
pub type StereoMatchResult<T> = std::result::Result<T, StereoMatchError>;

/// Errors that abort a disparity or cost-volume computation.
///
/// Pixels rejected by the validity checks are not errors; they are written as
/// the invalid sentinel of the output map.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StereoMatchError {
    /// The disparity range is empty or inverted.
    #[error("invalid disparity range: min {min} must be below max {max}")]
    InvalidDisparityRange { min: usize, max: usize },
    /// The disparity range does not fit the output value type.
    #[error("disparity range of {range} values exceeds output capacity {max_range}")]
    RangeTooLarge { range: usize, max_range: usize },
    /// Window scores could exceed what the score type can accumulate.
    #[error("window radius {radius_x}x{radius_y} overflows the score accumulator")]
    WindowTooLarge { radius_x: usize, radius_y: usize },
    /// A configuration value is out of its legal domain.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Left and right images differ in size.
    #[error(
        "image shapes differ: left {left_width}x{left_height}, right {right_width}x{right_height}"
    )]
    ShapeMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
    /// Image width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Image decoding or encoding failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
