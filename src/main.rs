mod annotations;
mod config;
mod display;
mod driver;
mod error;
mod frame_acquisition;
mod image_utils;
mod object_detection;
mod overlay;
mod source_selection;

use clap::Parser;
use config::{SourceMode, SourceOrientation, ViewerConfig};
use display::FrameSink;
use display::file_sink::FileSink;
use driver::run_session;
use error::ViewerError;
use object_detection::yolov11_bounding_box::Yolov11BoundingBox;
use std::error::Error;
use std::path::PathBuf;

/// Runs a YOLO11 detector on a random image or video from a dataset directory
/// and shows the annotated frames.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to pick the source from.
    #[arg(long)]
    dataset: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<SourceMode>,

    /// ONNX model file.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Class names, one per line.
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Where annotated frames are written when no window is used.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Show frames in a window instead of writing PNG files.
    #[arg(long)]
    window: bool,

    /// Seed for source selection.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    confidence: Option<f32>,

    /// Show video frames as decoded instead of flipping them vertically.
    #[arg(long)]
    upright: bool,
}

fn build_config(args: Args) -> Result<ViewerConfig, ViewerError> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(dataset) = args.dataset {
        config.dataset_path = dataset;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(classes) = args.classes {
        config.classes_path = classes;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = Some(output_dir);
    }
    if args.window {
        config.window = true;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(confidence) = args.confidence {
        config.confidence_threshold = confidence;
    }
    if args.upright {
        config.video_orientation = SourceOrientation::Upright;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "window")]
fn window_sink() -> Result<Box<dyn FrameSink>, ViewerError> {
    Ok(Box::new(display::window_sink::WindowSink::new()))
}

#[cfg(not(feature = "window"))]
fn window_sink() -> Result<Box<dyn FrameSink>, ViewerError> {
    Err(ViewerError::Config(
        "this build has no window support; rebuild with --features window".to_string(),
    ))
}

fn build_sink(config: &ViewerConfig) -> Result<Box<dyn FrameSink>, ViewerError> {
    if config.window {
        return window_sink();
    }
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("annotated"));
    log::info!("writing annotated frames to {}", output_dir.display());
    Ok(Box::new(FileSink::new(&output_dir)?))
}

fn run(args: Args) -> Result<(), ViewerError> {
    let config = build_config(args)?;
    let sink = build_sink(&config)?;
    let model = Yolov11BoundingBox::from_config(&config)?;
    log::info!("using model {}", model.model_name());
    let summary = run_session(&config, model, sink)?;
    log::info!(
        "{} frame(s) shown from {} mode source",
        summary.frames_rendered,
        config.mode
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "detection-viewer",
            "--mode",
            "video",
            "--dataset",
            "clips",
            "--seed",
            "9",
            "--confidence",
            "0.5",
            "--upright",
        ]);
        let config = build_config(args).unwrap();
        assert_eq!(config.mode, SourceMode::Video);
        assert_eq!(config.dataset_path, PathBuf::from("clips"));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.video_orientation, SourceOrientation::Upright);
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let args = Args::parse_from(["detection-viewer", "--confidence", "1.5"]);
        assert!(matches!(build_config(args), Err(ViewerError::Config(_))));
    }
}
