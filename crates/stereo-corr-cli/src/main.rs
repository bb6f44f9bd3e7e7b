use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stereo_corr::StereoEngine;
use stereo_corr_core::{DetectParams, FilterParams, MatchParams, OffsetPattern, Pixels, RankParams};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is {actual} bytes, expected {expected} for {width}x{height} at {channels} channel(s)")]
    SizeMismatch {
        path: PathBuf,
        actual: usize,
        expected: usize,
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("pipeline stage out of order: {0:?}")]
    Stage(#[from] stereo_corr_core::StereoError),
    #[error("failed to render matches as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ChannelLayout {
    Gray,
    Rgb,
}

impl From<ChannelLayout> for Pixels {
    fn from(value: ChannelLayout) -> Self {
        match value {
            ChannelLayout::Gray => Pixels::Gray,
            ChannelLayout::Rgb => Pixels::Rgb,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Pattern {
    Ring,
    Bar,
}

impl From<Pattern> for OffsetPattern {
    fn from(value: Pattern) -> Self {
        match value {
            Pattern::Ring => OffsetPattern::BresenhamRing24,
            Pattern::Bar => OffsetPattern::HorizontalBar30,
        }
    }
}

/// Run the sparse stereo correspondence pipeline over a pair of raw,
/// rectified image planes and print the ranked matches as JSON.
///
/// Expects headerless raw pixel data (row-major, top-left origin); this
/// binary performs no rectification, SPI transport, or image decoding of
/// its own.
#[derive(Parser, Debug)]
#[command(name = "stereo-corr", version, about)]
struct Args {
    /// Raw rectified left-camera image plane.
    #[arg(long)]
    left: PathBuf,
    /// Raw rectified right-camera image plane.
    #[arg(long)]
    right: PathBuf,
    #[arg(long)]
    width: usize,
    #[arg(long)]
    height: usize,
    #[arg(long, value_enum, default_value_t = ChannelLayout::Gray)]
    channels: ChannelLayout,

    #[arg(long, value_enum, default_value_t = Pattern::Ring)]
    pattern: Pattern,
    #[arg(long, default_value_t = 2)]
    vertical_sampling: u32,
    #[arg(long, default_value_t = 16)]
    inhibition_radius: i32,
    #[arg(long, default_value_t = 120)]
    minimum_response: u32,
    #[arg(long, default_value_t = -7)]
    calibration_offset_x: i32,
    #[arg(long, default_value_t = 3)]
    calibration_offset_y: i32,
    #[arg(long)]
    color_flags: bool,

    #[arg(long, default_value_t = 20)]
    max_disparity_percent: u32,
    #[arg(long)]
    descriptor_match_threshold: Option<u32>,
    #[arg(long, default_value_t = 1)]
    learn_desc: u32,
    #[arg(long, default_value_t = 1)]
    learn_luma: u32,
    #[arg(long, default_value_t = 1)]
    learn_disp: u32,

    #[arg(long, default_value_t = 3)]
    tolerance: u32,
    #[arg(long, default_value_t = 200)]
    ideal_no_of_matches: usize,
}

impl std::fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_possible_value().unwrap().get_name())
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_possible_value().unwrap().get_name())
    }
}

fn load_plane(path: &PathBuf, width: usize, height: usize, channels: Pixels) -> Result<Vec<u8>, CliError> {
    let data = fs::read(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })?;
    let expected = width * height * channels.count();
    if data.len() != expected {
        return Err(CliError::SizeMismatch {
            path: path.clone(),
            actual: data.len(),
            expected,
            width,
            height,
            channels: channels.count(),
        });
    }
    Ok(data)
}

fn run(args: Args) -> Result<(), CliError> {
    let channels: Pixels = args.channels.into();
    let left_data = load_plane(&args.left, args.width, args.height, channels)?;
    let right_data = load_plane(&args.right, args.width, args.height, channels)?;

    let pattern: OffsetPattern = args.pattern.into();
    let detect_params = DetectParams {
        pattern,
        vertical_sampling: args.vertical_sampling,
        inhibition_radius: args.inhibition_radius,
        minimum_response: args.minimum_response,
        calibration_offset_x: args.calibration_offset_x,
        calibration_offset_y: args.calibration_offset_y,
        color_flags: args.color_flags,
    };
    let match_params = MatchParams {
        max_disparity_percent: args.max_disparity_percent,
        descriptor_match_threshold: args
            .descriptor_match_threshold
            .unwrap_or_else(|| pattern.bits() * 30 / 100),
        learn_desc: args.learn_desc,
        learn_luma: args.learn_luma,
        learn_disp: args.learn_disp,
    };
    let filter_params = FilterParams {
        tolerance: args.tolerance,
    };
    let rank_params = RankParams {
        ideal_no_of_matches: args.ideal_no_of_matches,
    };

    let left_image = stereo_corr_core::ImageView {
        width: args.width,
        height: args.height,
        channels,
        data: &left_data,
    };
    let right_image = stereo_corr_core::ImageView {
        width: args.width,
        height: args.height,
        channels,
        data: &right_data,
    };

    let mut left_engine = StereoEngine::new(detect_params.vertical_sampling);
    let mut right_engine = StereoEngine::new(detect_params.vertical_sampling);

    let left_count = left_engine.detect(&left_image, &detect_params);
    let right_count = right_engine.detect(&right_image, &detect_params);
    tracing::info!(left_count, right_count, "feature detection complete");

    left_engine.receive_opposite(right_engine.local_table().clone());
    left_engine.match_(&match_params, &filter_params)?;
    let kept = left_engine.rank(&rank_params)?;
    tracing::info!(kept, "ranking complete");

    let matches = left_engine.consume()?;
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "stereo-corr failed");
            std::process::ExitCode::FAILURE
        }
    }
}
