//! Loading stereo inputs and saving disparity maps via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::disparity::DisparityMap;
use crate::image::{ImageView, OwnedImage};
use crate::util::{StereoMatchError, StereoMatchResult};
use std::path::Path;

fn io_error(err: image::ImageError) -> StereoMatchError {
    StereoMatchError::ImageIo {
        reason: err.to_string(),
    }
}

/// Creates a borrowed view from an 8-bit grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> StereoMatchResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Loads an image from disk as 8-bit grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> StereoMatchResult<OwnedImage<u8>> {
    let gray = image::open(path).map_err(io_error)?.to_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk as 16-bit grayscale.
pub fn load_gray16_image<P: AsRef<Path>>(path: P) -> StereoMatchResult<OwnedImage<u16>> {
    let gray = image::open(path).map_err(io_error)?.to_luma16();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Writes the raw disparity offsets as an 8-bit grayscale PNG.
///
/// Invalid pixels keep their sentinel value so downstream tools can mask them.
pub fn save_disparity_png<P: AsRef<Path>>(
    map: &DisparityMap<u8>,
    path: P,
) -> StereoMatchResult<()> {
    let img = image::GrayImage::from_raw(
        map.width() as u32,
        map.height() as u32,
        map.data().to_vec(),
    )
    .ok_or(StereoMatchError::InvalidDimensions {
        width: map.width(),
        height: map.height(),
    })?;
    img.save(path).map_err(io_error)
}
