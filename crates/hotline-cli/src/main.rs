//! hotline: render value-colored tracks to SVG or PNG.
//!
//! Reads projected vertices from a JSON file, runs them through the
//! hotline pipeline and writes the drawing. The input is either a single
//! path (`[{"x": .., "y": .., "z": ..}, ...]`) or a list of paths
//! (`[[...], [...]]`); `z` may be omitted for points without a value.
//!
//! Useful for:
//!
//! - Previewing palettes and value ranges on real tracks
//! - Tuning banding and smoothing parameters
//! - Producing static images of a track
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin hotline -- [OPTIONS] --output <OUTPUT> <INPUT>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path as FsPath, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use hotline_core::{Bounds, Dimensions, GradientConfig, Hotline, HotlineConfig, LineWeight, Path, Point};
use hotline_export::{PixmapSurface, SvgMetadata, SvgSurface};
use serde::Deserialize;

/// Render value-colored tracks.
///
/// Colors every vertex by its value on a palette, inserts short
/// transitions between color bands and draws the result with outlines.
#[derive(Parser)]
#[command(name = "hotline", version)]
struct Cli {
    /// Path to the JSON input (one path or a list of paths).
    input: PathBuf,

    /// Output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Output format. Inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 800, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 600, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: u32,

    /// Clip rectangle as `X0,Y0,X1,Y1`. Defaults to the whole surface.
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<Bounds>,

    /// Zoom level used to pick line and outline widths.
    #[arg(long)]
    zoom: Option<f64>,

    /// Value mapped to the start of the palette.
    #[arg(long, default_value_t = HotlineConfig::DEFAULT_MIN, allow_hyphen_values = true)]
    min: f64,

    /// Value mapped to the end of the palette.
    #[arg(long, default_value_t = HotlineConfig::DEFAULT_MAX, allow_hyphen_values = true)]
    max: f64,

    /// Width of the colored line in pixels, replacing the zoom table.
    #[arg(long)]
    weight: Option<f64>,

    /// Transition length as a percentage of the shorter neighboring band.
    #[arg(long, default_value_t = GradientConfig::DEFAULT_GRADIENT_PERCENT)]
    gradient_percent: f64,

    /// Shortest transition in pixels.
    #[arg(long, default_value_t = GradientConfig::DEFAULT_MIN_GRADIENT)]
    min_gradient: f64,

    /// Longest transition in pixels.
    #[arg(long, default_value_t = GradientConfig::DEFAULT_MAX_GRADIENT)]
    max_gradient: f64,

    /// Bands shorter than this (pixels) merge into a neighbor.
    #[arg(long, default_value_t = HotlineConfig::DEFAULT_MIN_COLOR_LENGTH)]
    min_color_length: f64,

    /// Simplification tolerance in pixels (0 disables).
    #[arg(long, default_value_t = HotlineConfig::DEFAULT_SMOOTH_FACTOR)]
    smooth_factor: f64,

    /// Draw the paths unclipped.
    #[arg(long)]
    no_clip: bool,

    /// Draw the line without outlines.
    #[arg(long)]
    no_outlines: bool,

    /// Full hotline config as a JSON string.
    ///
    /// When provided, all other styling flags are ignored. The JSON must
    /// be a valid `HotlineConfig` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Increase log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Scalable vector graphics with the config embedded as metadata.
    Svg,
    /// Anti-aliased raster image.
    Png,
}

impl Format {
    fn from_extension(path: &FsPath) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("svg") {
            Some(Self::Svg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else {
            None
        }
    }
}

/// Input file contents: one path or several.
#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Single(Vec<Point>),
    Many(Vec<Vec<Point>>),
}

impl Input {
    fn into_paths(self) -> Vec<Path> {
        match self {
            Self::Single(points) => vec![Path::new(points)],
            Self::Many(paths) => paths.into_iter().map(Path::new).collect(),
        }
    }
}

/// Parse `X0,Y0,X1,Y1` into a clip rectangle.
fn parse_viewport(s: &str) -> Result<Bounds, String> {
    let values = s
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number {v:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        &[x0, y0, x1, y1] => Ok(Bounds::new(x0, y0, x1, y1)),
        _ => Err(format!("expected X0,Y0,X1,Y1, got {} values", values.len())),
    }
}

/// Build a [`HotlineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual styling flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<HotlineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let defaults = HotlineConfig::default();
    Ok(HotlineConfig {
        min: cli.min,
        max: cli.max,
        weight: cli.weight.map_or(defaults.weight, LineWeight::fixed),
        outlines: if cli.no_outlines {
            Vec::new()
        } else {
            defaults.outlines
        },
        gradient: GradientConfig {
            gradient_percent: cli.gradient_percent,
            min_gradient: cli.min_gradient,
            max_gradient: cli.max_gradient,
            min_color_length: cli.min_color_length,
        },
        smooth_factor: cli.smooth_factor,
        no_clip: cli.no_clip,
        ..defaults
    })
}

fn read_input(path: &FsPath) -> Result<Vec<Path>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let input: Input = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    Ok(input.into_paths())
}

/// Draw `paths` and encode them in `format`.
fn render(
    hotline: &Hotline,
    paths: &[Path],
    viewport: &Bounds,
    dimensions: Dimensions,
    cli: &Cli,
    format: Format,
) -> Result<Vec<u8>, String> {
    match format {
        Format::Svg => {
            let mut surface = SvgSurface::new(dimensions);
            hotline.redraw(&mut surface, paths, viewport, cli.zoom);
            let config_json = serde_json::to_string(hotline.config())
                .map_err(|e| format!("Error serializing config: {e}"))?;
            let title = cli
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("hotline");
            let metadata = SvgMetadata {
                title: Some(title),
                description: None,
                config_json: Some(&config_json),
            };
            Ok(surface.into_svg(&metadata).into_bytes())
        }
        Format::Png => {
            let mut surface = PixmapSurface::new(dimensions).map_err(|e| e.to_string())?;
            hotline.redraw(&mut surface, paths, viewport, cli.zoom);
            surface.encode_png().map_err(|e| e.to_string())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    let Some(format) = cli.format.or_else(|| Format::from_extension(&cli.output)) else {
        eprintln!(
            "Cannot infer output format from {}; pass --format",
            cli.output.display()
        );
        return ExitCode::FAILURE;
    };

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let hotline = match Hotline::new(&config) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let rings = match read_input(&cli.input) {
        Ok(rings) => rings,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let dimensions = Dimensions {
        width: cli.width,
        height: cli.height,
    };
    let viewport = cli
        .viewport
        .unwrap_or_else(|| Bounds::from_dimensions(dimensions));

    log::info!(
        "read {} paths ({} points) from {}",
        rings.len(),
        rings.iter().map(Path::len).sum::<usize>(),
        cli.input.display(),
    );

    let paths = hotline.prepare(&rings, &viewport);
    if paths.is_empty() {
        log::warn!("nothing to draw inside {viewport:?}");
    }

    let bytes = match render(&hotline, &paths, &viewport, dimensions, &cli, format) {
        Ok(bytes) => bytes,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    match std::fs::write(&cli.output, &bytes) {
        Ok(()) => {
            eprintln!(
                "{format:?} written to {} ({} bytes)",
                cli.output.display(),
                bytes.len(),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", cli.output.display());
            ExitCode::FAILURE
        }
    }
}
