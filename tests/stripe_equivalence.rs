//! Striped runs must reproduce the single-stripe map exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereomatch::{
    Aggregation, BlockMatchConfig, CorrelationSelector, DisparityMap, DisparitySelector,
    DisparityValue, ErrorSelector, ImageView, NccRowScorer, RowScorer, SadRowScorer, SelectConfig,
    StereoBlockMatcher, StereoPair,
};

const WIDTH: usize = 48;
const HEIGHT: usize = 83;
const SHIFT: usize = 4;

/// Random texture with a ramp of disparities so stripes see varying data.
fn textured_pair(seed: u64) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let left: Vec<u8> = (0..WIDTH * HEIGHT).map(|_| rng.random()).collect();
    let mut right = vec![0u8; WIDTH * HEIGHT];
    for y in 0..HEIGHT {
        let shift = SHIFT + y / 30;
        for x in 0..WIDTH {
            right[y * WIDTH + x] = if x + shift < WIDTH {
                left[y * WIDTH + x + shift]
            } else {
                rng.random()
            };
        }
    }
    (left, right)
}

fn config(aggregation: Aggregation, stripes: usize) -> BlockMatchConfig {
    BlockMatchConfig {
        min_disparity: 1,
        max_disparity: 12,
        radius_x: 2,
        radius_y: 3,
        aggregation,
        parallel: false,
        stripes: Some(stripes),
    }
}

fn run<R, Sel, D>(
    scorer: R,
    selector: Sel,
    config: BlockMatchConfig,
    pair: &StereoPair<'_, R::Pixel>,
) -> DisparityMap<D>
where
    R: RowScorer,
    Sel: DisparitySelector<Score = R::Score, Order = R::Order>,
    D: DisparityValue,
{
    let mut matcher = StereoBlockMatcher::new(scorer, selector, config).unwrap();
    matcher.compute(pair).unwrap()
}

fn assert_same<D: DisparityValue>(a: &DisparityMap<D>, b: &DisparityMap<D>, label: &str) {
    assert_eq!(a.width(), b.width());
    assert_eq!(a.height(), b.height());
    for (i, (x, y)) in a.data().iter().zip(b.data()).enumerate() {
        assert_eq!(x, y, "{label}: pixel {} differs", i);
    }
}

#[test]
fn sad_u8_is_identical_for_any_stripe_count() {
    let (left, right) = textured_pair(1);
    let pair = StereoPair::new(
        ImageView::from_slice(&left, WIDTH, HEIGHT).unwrap(),
        ImageView::from_slice(&right, WIDTH, HEIGHT).unwrap(),
    )
    .unwrap();
    let selector = ErrorSelector::<i32>::new(SelectConfig::default()).unwrap();

    for aggregation in [Aggregation::Rectangle, Aggregation::BestFive] {
        let reference: DisparityMap<u8> = run(
            SadRowScorer::<u8>::new(),
            selector,
            config(aggregation, 1),
            &pair,
        );
        assert!(reference.valid_count() > 0);
        for stripes in [2, 3, 7] {
            let map: DisparityMap<u8> = run(
                SadRowScorer::<u8>::new(),
                selector,
                config(aggregation, stripes),
                &pair,
            );
            assert_same(&reference, &map, &format!("{aggregation:?} x{stripes}"));
        }
    }
}

#[test]
fn float_scores_are_identical_for_any_stripe_count() {
    let (left, right) = textured_pair(2);
    let left: Vec<f32> = left.iter().map(|&v| v as f32 / 3.0).collect();
    let right: Vec<f32> = right.iter().map(|&v| v as f32 / 3.0).collect();
    let pair = StereoPair::new(
        ImageView::from_slice(&left, WIDTH, HEIGHT).unwrap(),
        ImageView::from_slice(&right, WIDTH, HEIGHT).unwrap(),
    )
    .unwrap();
    let select = SelectConfig {
        subpixel: true,
        ..SelectConfig::default()
    };
    let error = ErrorSelector::<f32>::new(select).unwrap();
    let correlation = CorrelationSelector::new(select).unwrap();

    for aggregation in [Aggregation::Rectangle, Aggregation::BestFive] {
        let sad: DisparityMap<f32> =
            run(SadRowScorer::<f32>::new(), error, config(aggregation, 1), &pair);
        let ncc: DisparityMap<f32> = run(
            NccRowScorer::<f32>::new(),
            correlation,
            config(aggregation, 1),
            &pair,
        );
        for stripes in [2, 3, 7] {
            let label = format!("{aggregation:?} x{stripes}");
            let map: DisparityMap<f32> = run(
                SadRowScorer::<f32>::new(),
                error,
                config(aggregation, stripes),
                &pair,
            );
            assert_same(&sad, &map, &format!("sad {label}"));
            let map: DisparityMap<f32> = run(
                NccRowScorer::<f32>::new(),
                correlation,
                config(aggregation, stripes),
                &pair,
            );
            assert_same(&ncc, &map, &format!("ncc {label}"));
        }
    }
}

#[test]
fn reused_matcher_reproduces_fresh_results() {
    let (left, right) = textured_pair(3);
    let pair = StereoPair::new(
        ImageView::from_slice(&left, WIDTH, HEIGHT).unwrap(),
        ImageView::from_slice(&right, WIDTH, HEIGHT).unwrap(),
    )
    .unwrap();
    let selector = ErrorSelector::<i32>::new(SelectConfig::default()).unwrap();
    let mut matcher = StereoBlockMatcher::new(
        SadRowScorer::<u8>::new(),
        selector,
        config(Aggregation::BestFive, 3),
    )
    .unwrap();

    let first: DisparityMap<u8> = matcher.compute(&pair).unwrap();
    let small = StereoPair::new(
        ImageView::from_slice(&left[..WIDTH * 20], WIDTH, 20).unwrap(),
        ImageView::from_slice(&right[..WIDTH * 20], WIDTH, 20).unwrap(),
    )
    .unwrap();
    let _: DisparityMap<u8> = matcher.compute(&small).unwrap();
    let mut again = DisparityMap::<u8>::new(1, 1, matcher.range()).unwrap();
    matcher.compute_into(&pair, &mut again).unwrap();
    assert_same(&first, &again, "reuse");
}
