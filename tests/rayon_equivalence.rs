#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereomatch::{
    Aggregation, BlockMatchConfig, CorrelationSelector, CostVolumeBuilder, DisparityMap,
    DisparityRange, ErrorSelector, HammingCost, ImageView, NccRowScorer, SadRowScorer,
    SelectConfig, StereoBlockMatcher, StereoPair,
};

fn random_image(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random()).collect()
}

#[test]
fn parallel_block_matching_matches_sequential() {
    let (width, height) = (64, 71);
    let left = random_image(width, height, 10);
    let right = random_image(width, height, 11);
    let pair = StereoPair::new(
        ImageView::from_slice(&left, width, height).unwrap(),
        ImageView::from_slice(&right, width, height).unwrap(),
    )
    .unwrap();

    for aggregation in [Aggregation::Rectangle, Aggregation::BestFive] {
        let base = BlockMatchConfig {
            max_disparity: 20,
            radius_x: 2,
            radius_y: 2,
            aggregation,
            ..BlockMatchConfig::default()
        };
        let parallel = BlockMatchConfig {
            parallel: true,
            stripes: Some(5),
            ..base.clone()
        };

        let selector = ErrorSelector::<i32>::new(SelectConfig::default()).unwrap();
        let mut seq = StereoBlockMatcher::new(SadRowScorer::<u8>::new(), selector, base.clone())
            .unwrap();
        let mut par =
            StereoBlockMatcher::new(SadRowScorer::<u8>::new(), selector, parallel.clone())
                .unwrap();
        let a: DisparityMap<u8> = seq.compute(&pair).unwrap();
        let b: DisparityMap<u8> = par.compute(&pair).unwrap();
        assert_eq!(a.data(), b.data(), "sad {aggregation:?}");

        let selector = CorrelationSelector::new(SelectConfig::default()).unwrap();
        let mut seq =
            StereoBlockMatcher::new(NccRowScorer::<u8>::new(), selector, base).unwrap();
        let mut par =
            StereoBlockMatcher::new(NccRowScorer::<u8>::new(), selector, parallel).unwrap();
        let a: DisparityMap<u16> = seq.compute(&pair).unwrap();
        let b: DisparityMap<u16> = par.compute(&pair).unwrap();
        assert_eq!(a.data(), b.data(), "ncc {aggregation:?}");
    }
}

#[test]
fn parallel_cost_volume_matches_sequential() {
    let (width, height) = (40, 30);
    let left = random_image(width, height, 20);
    let right = random_image(width, height, 21);
    let pair = StereoPair::new(
        ImageView::from_slice(&left, width, height).unwrap(),
        ImageView::from_slice(&right, width, height).unwrap(),
    )
    .unwrap();
    let range = DisparityRange::new(2, 17).unwrap();

    let seq = CostVolumeBuilder::new(HammingCost::<u8>::new());
    let par = CostVolumeBuilder::new(HammingCost::<u8>::new()).with_parallel(true);
    let a = seq.compute(&pair, range).unwrap();
    let b = par.compute(&pair, range).unwrap();
    assert_eq!(a.data(), b.data());
}
