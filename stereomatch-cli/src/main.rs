use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use stereomatch::image::io::{load_gray_image, save_disparity_png};
use stereomatch::{
    Aggregation, BlockMatchConfig, CorrelationSelector, DisparityMap, DisparitySelector,
    ErrorSelector, NccRowScorer, RowScorer, SadRowScorer, SelectConfig, StereoBlockMatcher,
    StereoPair,
};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Stereomatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    Sad,
    Ncc,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AggregationConfig {
    Rectangle,
    BestFive,
}

impl From<AggregationConfig> for Aggregation {
    fn from(value: AggregationConfig) -> Self {
        match value {
            AggregationConfig::Rectangle => Aggregation::Rectangle,
            AggregationConfig::BestFive => Aggregation::BestFive,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SelectConfigJson {
    max_error: Option<f64>,
    right_to_left_tolerance: i32,
    texture_threshold: f64,
    smoothing: bool,
}

impl Default for SelectConfigJson {
    fn default() -> Self {
        let cfg = SelectConfig::default();
        Self {
            max_error: cfg.max_error,
            right_to_left_tolerance: cfg.right_to_left_tolerance,
            texture_threshold: cfg.texture_threshold,
            smoothing: true,
        }
    }
}

impl From<&SelectConfigJson> for SelectConfig {
    fn from(value: &SelectConfigJson) -> Self {
        SelectConfig {
            max_error: value.max_error,
            right_to_left_tolerance: value.right_to_left_tolerance,
            texture_threshold: value.texture_threshold,
            subpixel: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    metric: MetricConfig,
    aggregation: AggregationConfig,
    min_disparity: usize,
    max_disparity: usize,
    radius_x: usize,
    radius_y: usize,
    parallel: bool,
    stripes: Option<usize>,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = BlockMatchConfig::default();
        Self {
            metric: MetricConfig::Sad,
            aggregation: AggregationConfig::Rectangle,
            min_disparity: cfg.min_disparity,
            max_disparity: cfg.max_disparity,
            radius_x: cfg.radius_x,
            radius_y: cfg.radius_y,
            parallel: cfg.parallel,
            stripes: cfg.stripes,
        }
    }
}

impl From<&MatchConfigJson> for BlockMatchConfig {
    fn from(value: &MatchConfigJson) -> Self {
        BlockMatchConfig {
            min_disparity: value.min_disparity,
            max_disparity: value.max_disparity,
            radius_x: value.radius_x,
            radius_y: value.radius_y,
            aggregation: value.aggregation.into(),
            parallel: value.parallel,
            stripes: value.stripes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    left_path: String,
    right_path: String,
    disparity_path: Option<String>,
    output_path: Option<String>,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
    select: SelectConfigJson,
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    min_disparity: usize,
    max_disparity: usize,
    valid_pixels: usize,
    valid_fraction: f64,
    elapsed_ms: f64,
}

fn run<R, Sel>(
    scorer: R,
    selector: Sel,
    config: BlockMatchConfig,
    pair: &StereoPair<'_, u8>,
) -> Result<DisparityMap<u8>, Box<dyn std::error::Error>>
where
    R: RowScorer<Pixel = u8>,
    Sel: DisparitySelector<Score = R::Score, Order = R::Order>,
{
    let mut matcher = StereoBlockMatcher::new(scorer, selector, config)?;
    Ok(matcher.compute(pair)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stereomatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() || config.right_path.is_empty() {
        return Err("left_path and right_path must be set in the config".into());
    }

    let left = load_gray_image(&config.left_path)?;
    let right = load_gray_image(&config.right_path)?;
    let pair = StereoPair::new(left.view(), right.view())?;

    let match_cfg = BlockMatchConfig::from(&config.match_cfg);
    let select_cfg = SelectConfig::from(&config.select);
    let started = Instant::now();
    let map = match config.match_cfg.metric {
        MetricConfig::Sad => run(
            SadRowScorer::<u8>::new(),
            ErrorSelector::<i32>::new(select_cfg)?,
            match_cfg,
            &pair,
        )?,
        MetricConfig::Ncc => run(
            NccRowScorer::<u8>::new(),
            CorrelationSelector::new(select_cfg)?.with_smoothing(config.select.smoothing),
            match_cfg,
            &pair,
        )?,
    };
    let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

    if let Some(path) = &config.disparity_path {
        save_disparity_png(&map, path)?;
    }

    let total = map.width() * map.height();
    let output = Output {
        width: map.width(),
        height: map.height(),
        min_disparity: map.range().min(),
        max_disparity: map.range().max(),
        valid_pixels: map.valid_count(),
        valid_fraction: if total == 0 {
            0.0
        } else {
            map.valid_count() as f64 / total as f64
        },
        elapsed_ms,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
