//! Image views, owned buffers and rectified stereo pairs.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows.

use crate::util::{StereoMatchError, StereoMatchResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with an explicit stride.
#[derive(Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<T> Clone for ImageView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ImageView<'_, T> {}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> StereoMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> StereoMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(StereoMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Returns row `y`, which the caller guarantees to be in bounds.
    ///
    /// Kernels iterate over row indices derived from the view height, so a
    /// miss here is a logic error rather than bad input.
    #[inline]
    pub(crate) fn row_unchecked(&self, y: usize) -> &'a [T] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> StereoMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(StereoMatchError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(StereoMatchError::InvalidDimensions { width, height })
}

/// Owned contiguous image buffer.
#[derive(Clone, Debug)]
pub struct OwnedImage<T = u8> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a contiguous buffer of exactly `width * height` elements.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> StereoMatchResult<Self> {
        let needed = required_len(width, height, width)?;
        if data.len() < needed {
            return Err(StereoMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(StereoMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel buffer in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns a borrowed view of the whole image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

impl<T: Copy> OwnedImage<T> {
    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> StereoMatchResult<Self> {
        required_len(width, height, width)?;
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }
}

/// Left/right images of a rectified pair with matching shapes.
#[derive(Debug)]
pub struct StereoPair<'a, T> {
    left: ImageView<'a, T>,
    right: ImageView<'a, T>,
}

impl<T> Clone for StereoPair<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StereoPair<'_, T> {}

impl<'a, T> StereoPair<'a, T> {
    /// Pairs two views, failing when their shapes differ.
    pub fn new(left: ImageView<'a, T>, right: ImageView<'a, T>) -> StereoMatchResult<Self> {
        if left.width() != right.width() || left.height() != right.height() {
            return Err(StereoMatchError::ShapeMismatch {
                left_width: left.width(),
                left_height: left.height(),
                right_width: right.width(),
                right_height: right.height(),
            });
        }
        Ok(Self { left, right })
    }

    /// Returns the left (reference) image.
    pub fn left(&self) -> ImageView<'a, T> {
        self.left
    }

    /// Returns the right image.
    pub fn right(&self) -> ImageView<'a, T> {
        self.right
    }

    /// Returns the shared image width.
    pub fn width(&self) -> usize {
        self.left.width()
    }

    /// Returns the shared image height.
    pub fn height(&self) -> usize {
        self.left.height()
    }
}
