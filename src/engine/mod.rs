//! Block-matching disparity engine.
//!
//! [`StereoBlockMatcher`] wires a [`RowScorer`], the region accumulator and a
//! [`DisparitySelector`] into a full-image pass. Rows are processed in
//! stripes; each stripe re-seeds its rolling window from a halo of rows above
//! it, so stripes share nothing and the map is identical for any stripe
//! count.

pub mod stripe;
mod workspace;

pub use stripe::StripePlan;
pub use workspace::Workspace;

use crate::disparity::{DisparityMap, DisparityRange, DisparityValue, RegionRadius, ScoreGeometry};
use crate::image::StereoPair;
use crate::kernel::RowScorer;
use crate::numeric::Score;
use crate::region::{combine_five_regions, RESEED_INTERVAL};
use crate::select::DisparitySelector;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{StereoMatchError, StereoMatchResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// How row scores are aggregated into a window score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Aggregation {
    /// Plain rectangular window.
    #[default]
    Rectangle,
    /// Centre window plus the best two of four overlapping corner windows.
    BestFive,
}

impl Aggregation {
    /// Rows above and below an output row that aggregation reads.
    pub fn halo(self, radius: RegionRadius) -> usize {
        match self {
            Aggregation::Rectangle => radius.y,
            Aggregation::BestFive => 2 * radius.y,
        }
    }

    /// Region sums added together for one window score.
    pub fn region_count(self) -> usize {
        match self {
            Aggregation::Rectangle => 1,
            Aggregation::BestFive => 3,
        }
    }
}

/// Configuration for [`StereoBlockMatcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMatchConfig {
    /// Smallest disparity searched.
    pub min_disparity: usize,
    /// Largest disparity searched; must exceed `min_disparity`.
    pub max_disparity: usize,
    /// Horizontal window radius.
    pub radius_x: usize,
    /// Vertical window radius.
    pub radius_y: usize,
    /// Window aggregation strategy.
    pub aggregation: Aggregation,
    /// Run stripes on the rayon pool when the `rayon` feature is enabled.
    pub parallel: bool,
    /// Stripe count; defaults to the rayon thread count when parallel and to
    /// one otherwise.
    pub stripes: Option<usize>,
}

impl Default for BlockMatchConfig {
    fn default() -> Self {
        Self {
            min_disparity: 0,
            max_disparity: 64,
            radius_x: 3,
            radius_y: 3,
            aggregation: Aggregation::Rectangle,
            parallel: false,
            stripes: None,
        }
    }
}

impl BlockMatchConfig {
    /// Checks the configuration and returns the derived range and radius.
    pub fn validate(&self) -> StereoMatchResult<(DisparityRange, RegionRadius)> {
        let range = DisparityRange::new(self.min_disparity, self.max_disparity)?;
        if self.stripes == Some(0) {
            return Err(StereoMatchError::InvalidConfig {
                reason: "stripes must be at least 1",
            });
        }
        Ok((range, RegionRadius::new(self.radius_x, self.radius_y)))
    }

    fn requested_stripes(&self) -> usize {
        self.stripes.unwrap_or_else(|| {
            if self.parallel {
                default_parallelism()
            } else {
                1
            }
        })
    }
}

#[cfg(feature = "rayon")]
fn default_parallelism() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "rayon"))]
fn default_parallelism() -> usize {
    1
}

/// Dense block matcher producing a [`DisparityMap`].
///
/// The scorer and selector must agree on score type and ordering, which the
/// type system enforces. Workspaces are pooled inside the matcher, so repeated
/// calls on same-sized images do not allocate.
pub struct StereoBlockMatcher<R: RowScorer, Sel> {
    scorer: R,
    selector: Sel,
    config: BlockMatchConfig,
    range: DisparityRange,
    radius: RegionRadius,
    workspaces: Vec<Workspace<R::Score>>,
}

impl<R, Sel> StereoBlockMatcher<R, Sel>
where
    R: RowScorer,
    Sel: DisparitySelector<Score = R::Score, Order = R::Order>,
{
    /// Creates a matcher after validating `config`.
    ///
    /// Fails with [`StereoMatchError::WindowTooLarge`] when a full-scale
    /// window could overflow the scorer's score type.
    pub fn new(scorer: R, selector: Sel, config: BlockMatchConfig) -> StereoMatchResult<Self> {
        let (range, radius) = config.validate()?;
        let area = (radius.width() * radius.height() * config.aggregation.region_count()) as f64;
        if scorer.max_element_score() * area > <R::Score as Score>::MAX_SUM {
            return Err(StereoMatchError::WindowTooLarge {
                radius_x: radius.x,
                radius_y: radius.y,
            });
        }
        Ok(Self {
            scorer,
            selector,
            config,
            range,
            radius,
            workspaces: Vec::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &BlockMatchConfig {
        &self.config
    }

    /// Disparity search range.
    pub fn range(&self) -> DisparityRange {
        self.range
    }

    /// Columns at the left and right image edges that never receive a valid
    /// disparity, counting the window radius only.
    pub fn border_x(&self) -> usize {
        self.radius.x
    }

    /// Rows at the top and bottom image edges that never receive a valid
    /// disparity.
    pub fn border_y(&self) -> usize {
        self.config.aggregation.halo(self.radius)
    }

    /// Computes a fresh disparity map.
    pub fn compute<D: DisparityValue>(
        &mut self,
        pair: &StereoPair<'_, R::Pixel>,
    ) -> StereoMatchResult<DisparityMap<D>> {
        let mut map = DisparityMap::new(pair.width(), pair.height(), self.range)?;
        self.compute_into(pair, &mut map)?;
        Ok(map)
    }

    /// Computes into `map`, reshaping it to the pair's size.
    pub fn compute_into<D: DisparityValue>(
        &mut self,
        pair: &StereoPair<'_, R::Pixel>,
        map: &mut DisparityMap<D>,
    ) -> StereoMatchResult<()> {
        let width = pair.width();
        let height = pair.height();
        map.reshape(width, height, self.range)?;

        let geometry = ScoreGeometry::new(width, self.range, self.radius);
        let plan = StripePlan::new(
            height,
            self.radius.height(),
            self.config.requested_stripes(),
        );
        let _span = trace_span!(
            "block_match",
            width = width,
            height = height,
            disparities = self.range.len(),
            stripes = plan.count()
        )
        .entered();

        if self.workspaces.len() < plan.count() {
            self.workspaces.resize_with(plan.count(), Workspace::new);
        }
        let stage = Stage {
            scorer: &self.scorer,
            selector: &self.selector,
            pair,
            geometry,
            aggregation: self.config.aggregation,
            height,
        };
        let chunk = plan.rows_per_stripe() * width;

        #[cfg(feature = "rayon")]
        if self.config.parallel {
            map.data_mut()
                .par_chunks_mut(chunk)
                .zip(self.workspaces.par_iter_mut())
                .enumerate()
                .for_each(|(index, (out, workspace))| {
                    stage.run(plan.stripe(index), workspace, out);
                });
            trace_event!("block_match_done", stripes = plan.count());
            return Ok(());
        }

        for (index, (out, workspace)) in map
            .data_mut()
            .chunks_mut(chunk)
            .zip(self.workspaces.iter_mut())
            .enumerate()
        {
            stage.run(plan.stripe(index), workspace, out);
        }
        trace_event!("block_match_done", stripes = plan.count());
        Ok(())
    }
}

/// Borrowed state shared by every stripe of one pass.
struct Stage<'a, 'p, R: RowScorer, Sel> {
    scorer: &'a R,
    selector: &'a Sel,
    pair: &'a StereoPair<'p, R::Pixel>,
    geometry: ScoreGeometry,
    aggregation: Aggregation,
    height: usize,
}

impl<R, Sel> Stage<'_, '_, R, Sel>
where
    R: RowScorer,
    Sel: DisparitySelector<Score = R::Score, Order = R::Order>,
{
    /// Fills the output rows `rows` of one stripe; `out` starts at `rows.start`.
    fn run<D: DisparityValue>(
        &self,
        rows: std::ops::Range<usize>,
        workspace: &mut Workspace<R::Score>,
        out: &mut [D],
    ) {
        let width = self.geometry.width();
        let ry = self.geometry.radius().y;
        let region_height = self.geometry.radius().height();
        let halo = self.aggregation.halo(self.geometry.radius());
        let five = self.aggregation == Aggregation::BestFive;

        // Rows whose aggregated window fits the image.
        let first = rows.start.max(halo);
        let end = rows.end.min(self.height.saturating_sub(halo));
        if first >= end {
            return;
        }
        trace_debug!("stripe", first = first, end = end);

        // Window starts (top row of each region) this stripe needs.
        let needed = first - halo;
        let last = end - 1 + halo - 2 * ry;
        let seed = if <R::Score as Score>::EXACT {
            needed
        } else {
            needed / RESEED_INTERVAL * RESEED_INTERVAL
        };

        let normalize = self.scorer.requires_normalize();
        workspace.prepare(&self.geometry, normalize, five);
        let Workspace {
            accumulator,
            element,
            five: combined,
            select,
            normalize: norm_scratch,
        } = workspace;

        for start in seed..=last {
            if start == seed {
                accumulator.seed(|k, buf| {
                    self.scorer
                        .score_row(self.pair, start + k, &self.geometry, element, buf)
                });
            } else {
                let resum = !<R::Score as Score>::EXACT && start % RESEED_INTERVAL == 0;
                let entering = start + region_height - 1;
                accumulator.advance(resum, |buf| {
                    self.scorer
                        .score_row(self.pair, entering, &self.geometry, element, buf)
                });
            }
            let centre = start + ry;
            if normalize {
                accumulator.normalize_latest(|sum, buf| {
                    self.scorer.normalize_region(
                        self.pair,
                        centre,
                        &self.geometry,
                        sum,
                        norm_scratch,
                        buf,
                    )
                });
            }
            if start < needed {
                continue;
            }

            if five {
                // The latest region is the bottom corner pair of row `centre - ry`.
                let y = centre - ry;
                if y < first {
                    continue;
                }
                let (Some(top), Some(middle), Some(bottom)) = (
                    accumulator.lagged(2 * ry),
                    accumulator.lagged(ry),
                    accumulator.lagged(0),
                ) else {
                    continue;
                };
                combine_five_regions::<R::Score, R::Order>(
                    top,
                    middle,
                    bottom,
                    &self.geometry,
                    combined,
                );
                let offset = (y - rows.start) * width;
                self.selector.select_row(
                    combined,
                    &self.geometry,
                    select,
                    &mut out[offset..offset + width],
                );
            } else {
                let offset = (centre - rows.start) * width;
                self.selector.select_row(
                    accumulator.latest(),
                    &self.geometry,
                    select,
                    &mut out[offset..offset + width],
                );
            }
        }
    }
}
