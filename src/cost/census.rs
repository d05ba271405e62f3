//! Census descriptors and their Hamming cost.

use crate::cost::{PixelCost, MAX_COST};
use crate::image::{ImageView, OwnedImage};
use crate::numeric::Pixel;
use crate::util::StereoMatchResult;
use std::marker::PhantomData;

/// Unsigned word holding one census descriptor.
pub trait CensusWord: Copy + Default + Send + Sync + 'static {
    /// Number of descriptor bits.
    const BITS: u32;

    /// Number of bits that differ between `self` and `other`.
    fn hamming(self, other: Self) -> u32;
}

macro_rules! impl_census_word {
    ($($ty:ty),*) => {
        $(
            impl CensusWord for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn hamming(self, other: Self) -> u32 {
                    (self ^ other).count_ones()
                }
            }
        )*
    };
}

impl_census_word!(u8, u16, u32, u64);

/// Hamming distance between census words, scaled so that all bits differing
/// costs [`MAX_COST`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HammingCost<W> {
    _word: PhantomData<W>,
}

impl<W: CensusWord> HammingCost<W> {
    /// Creates the cost function.
    pub fn new() -> Self {
        Self {
            _word: PhantomData,
        }
    }
}

impl<W: CensusWord> PixelCost for HammingCost<W> {
    type Pixel = W;

    #[inline]
    fn cost(&self, left: W, right: W) -> u16 {
        (MAX_COST as u32 * left.hamming(right) / W::BITS) as u16
    }
}

/// 3x3 census transform into 8-bit descriptors.
///
/// Bit `k` is set when the `k`-th neighbour (row-major, centre skipped) is
/// brighter than the centre. Border pixels get an all-zero descriptor.
pub fn census_transform<P: Pixel>(image: ImageView<'_, P>) -> StereoMatchResult<OwnedImage<u8>> {
    let width = image.width();
    let height = image.height();
    OwnedImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            return 0;
        }
        let centre = image.row_unchecked(y)[x].to_f32();
        let mut word = 0u8;
        let mut bit = 0;
        for ny in y - 1..=y + 1 {
            let row = image.row_unchecked(ny);
            for nx in x - 1..=x + 1 {
                if nx == x && ny == y {
                    continue;
                }
                if row[nx].to_f32() > centre {
                    word |= 1 << bit;
                }
                bit += 1;
            }
        }
        word
    })
}

#[cfg(test)]
mod tests {
    use super::{census_transform, CensusWord, HammingCost};
    use crate::cost::{PixelCost, MAX_COST};
    use crate::image::ImageView;

    #[test]
    fn hamming_cost_scales_with_word_width() {
        assert_eq!(0b1010u8.hamming(0b0101), 4);
        assert_eq!(HammingCost::<u8>::new().cost(0x00, 0xff), MAX_COST);
        assert_eq!(HammingCost::<u8>::new().cost(0x0f, 0x0f), 0);
        assert_eq!(HammingCost::<u32>::new().cost(0, 0xffff), MAX_COST / 2);
    }

    #[test]
    fn census_marks_brighter_neighbours() {
        #[rustfmt::skip]
        let data = [
            1u8, 9, 1,
            9, 5, 1,
            1, 1, 9,
        ];
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        let census = census_transform(view).unwrap();
        // Neighbours in order: (0,0) (1,0) (2,0) (0,1) (2,1) (0,2) (1,2) (2,2).
        assert_eq!(census.data()[4], 0b1000_1010);
        assert_eq!(census.data()[0], 0);
    }
}
