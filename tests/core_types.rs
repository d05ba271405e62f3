//! Construction-time validation of images, ranges and matcher settings.

use stereomatch::{
    Aggregation, BlockMatchConfig, DisparityMap, DisparityRange, ErrorSelector, ImageView,
    OwnedImage, SadRowScorer, SelectConfig, StereoBlockMatcher, StereoMatchError, StereoPair,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        StereoMatchError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        StereoMatchError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        StereoMatchError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_short_buffers() {
    let data = [0u8; 7];
    let err = ImageView::new(&data, 3, 2, 5).err().unwrap();
    assert_eq!(err, StereoMatchError::BufferTooSmall { needed: 8, got: 7 });
}

#[test]
fn strided_view_reads_rows() {
    let data = [1u8, 2, 3, 99, 4, 5, 6, 99];
    let view = ImageView::new(&data, 3, 2, 4).unwrap();
    assert_eq!(view.row(1), Some(&data[4..7]));
    assert_eq!(view.get(2, 1), Some(&6));
    assert!(view.get(3, 1).is_none());
}

#[test]
fn stereo_pair_requires_matching_shapes() {
    let left = OwnedImage::new(vec![0u8; 12], 4, 3).unwrap();
    let right = OwnedImage::new(vec![0u8; 12], 3, 4).unwrap();
    let err = StereoPair::new(left.view(), right.view()).err().unwrap();
    assert_eq!(
        err,
        StereoMatchError::ShapeMismatch {
            left_width: 4,
            left_height: 3,
            right_width: 3,
            right_height: 4,
        }
    );
}

#[test]
fn disparity_range_must_be_increasing() {
    assert_eq!(
        DisparityRange::new(5, 5).err().unwrap(),
        StereoMatchError::InvalidDisparityRange { min: 5, max: 5 }
    );
    assert!(DisparityRange::new(6, 2).is_err());
    let range = DisparityRange::new(2, 6).unwrap();
    assert_eq!(range.len(), 5);
}

#[test]
fn byte_maps_reject_ranges_without_room_for_the_sentinel() {
    let range = DisparityRange::new(0, 255).unwrap();
    let err = DisparityMap::<u8>::new(4, 4, range).err().unwrap();
    assert_eq!(
        err,
        StereoMatchError::RangeTooLarge {
            range: 256,
            max_range: 255,
        }
    );
    assert!(DisparityMap::<u16>::new(4, 4, range).is_ok());
}

#[test]
fn matcher_validates_configuration_up_front() {
    let selector = ErrorSelector::<i32>::new(SelectConfig::default()).unwrap();
    let bad_range = BlockMatchConfig {
        min_disparity: 10,
        max_disparity: 3,
        ..BlockMatchConfig::default()
    };
    assert!(matches!(
        StereoBlockMatcher::new(SadRowScorer::<u8>::new(), selector, bad_range),
        Err(StereoMatchError::InvalidDisparityRange { min: 10, max: 3 })
    ));

    let zero_stripes = BlockMatchConfig {
        stripes: Some(0),
        ..BlockMatchConfig::default()
    };
    assert!(matches!(
        StereoBlockMatcher::new(SadRowScorer::<u8>::new(), selector, zero_stripes),
        Err(StereoMatchError::InvalidConfig { .. })
    ));
}

#[test]
fn selector_rejects_non_finite_thresholds() {
    let config = SelectConfig {
        max_error: Some(f64::INFINITY),
        ..SelectConfig::default()
    };
    assert!(matches!(
        ErrorSelector::<i32>::new(config),
        Err(StereoMatchError::InvalidConfig { .. })
    ));
}

#[test]
fn border_follows_aggregation() {
    let selector = ErrorSelector::<i32>::new(SelectConfig::default()).unwrap();
    let config = BlockMatchConfig {
        radius_x: 4,
        radius_y: 2,
        aggregation: Aggregation::BestFive,
        ..BlockMatchConfig::default()
    };
    let matcher = StereoBlockMatcher::new(SadRowScorer::<u8>::new(), selector, config).unwrap();
    assert_eq!(matcher.border_x(), 4);
    assert_eq!(matcher.border_y(), 4);
}

#[test]
fn sixteen_bit_windows_that_could_overflow_are_rejected() {
    let selector = ErrorSelector::<i32>::new(SelectConfig::unchecked()).unwrap();
    let config = |radius: usize, aggregation| BlockMatchConfig {
        max_disparity: 4,
        radius_x: radius,
        radius_y: radius,
        aggregation,
        ..BlockMatchConfig::default()
    };

    // 3 * 111^2 * 65535 exceeds i32::MAX, 3 * 103^2 * 65535 does not.
    assert!(matches!(
        StereoBlockMatcher::new(
            SadRowScorer::<u16>::new(),
            selector,
            config(55, Aggregation::BestFive)
        ),
        Err(StereoMatchError::WindowTooLarge {
            radius_x: 55,
            radius_y: 55
        })
    ));
    assert!(StereoBlockMatcher::new(
        SadRowScorer::<u16>::new(),
        selector,
        config(51, Aggregation::BestFive)
    )
    .is_ok());

    // A single rectangle fits up to radius 90.
    assert!(StereoBlockMatcher::new(
        SadRowScorer::<u16>::new(),
        selector,
        config(90, Aggregation::Rectangle)
    )
    .is_ok());
    assert!(matches!(
        StereoBlockMatcher::new(
            SadRowScorer::<u16>::new(),
            selector,
            config(91, Aggregation::Rectangle)
        ),
        Err(StereoMatchError::WindowTooLarge { .. })
    ));

    // Eight-bit samples leave plenty of headroom.
    assert!(StereoBlockMatcher::new(
        SadRowScorer::<u8>::new(),
        selector,
        config(55, Aggregation::BestFive)
    )
    .is_ok());
}

#[test]
fn largest_accepted_sixteen_bit_window_matches_full_scale_input() {
    let (width, height, radius) = (112, 208, 51);
    let left: Vec<u16> = (0..width * height)
        .map(|i| if (i % width + i / width) % 2 == 0 { 0 } else { u16::MAX })
        .collect();
    let pair = StereoPair::new(
        ImageView::from_slice(&left, width, height).unwrap(),
        ImageView::from_slice(&left, width, height).unwrap(),
    )
    .unwrap();
    let config = BlockMatchConfig {
        max_disparity: 2,
        radius_x: radius,
        radius_y: radius,
        aggregation: Aggregation::BestFive,
        ..BlockMatchConfig::default()
    };
    let selector = ErrorSelector::<i32>::new(SelectConfig::unchecked()).unwrap();
    let mut matcher =
        StereoBlockMatcher::new(SadRowScorer::<u16>::new(), selector, config).unwrap();
    let map: DisparityMap<u8> = matcher.compute(&pair).unwrap();

    // Identical checkerboards: offset 1 differs everywhere, offsets 0 and 2
    // both match and the lower one wins.
    assert_eq!(map.get(radius + 2, 2 * radius), Some(0));
}
