use crate::error::ViewerError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted as still images.
pub const IMAGE_EXTENSIONS: [&str; 11] = [
    "tiff", "mpo", "webp", "dng", "bmp", "pfm", "jpg", "tif", "jpeg", "heic", "png",
];

/// Extensions accepted as video containers.
pub const VIDEO_EXTENSIONS: [&str; 12] = [
    "asf", "avi", "gif", "m4v", "mkv", "mov", "mp4", "mpeg", "mpg", "ts", "wmv", "webm",
];

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Image,
    Video,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Image => write!(f, "image"),
            SourceMode::Video => write!(f, "video"),
        }
    }
}

/// Orientation of the frames a capture stream delivers.
///
/// `Flipped` sources are turned upside down before detection.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrientation {
    #[default]
    Flipped,
    Upright,
}

/// Settings for one viewer run.
///
/// Loaded from a JSON file when one is given; every field has a default so a
/// partial file (or none at all) is valid.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub dataset_path: PathBuf,
    pub mode: SourceMode,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub model_path: PathBuf,
    pub classes_path: PathBuf,
    pub input_width: usize,
    pub input_height: usize,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub video_orientation: SourceOrientation,
    pub output_dir: Option<PathBuf>,
    pub window: bool,
    pub seed: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            dataset_path: PathBuf::from("Data/val2017"),
            mode: SourceMode::Image,
            image_extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            model_path: PathBuf::from("./data/models/yolo11n.onnx"),
            classes_path: PathBuf::from("./data/model_metadata/coco-classes.txt"),
            input_width: 640,
            input_height: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            video_orientation: SourceOrientation::Flipped,
            output_dir: None,
            window: false,
            seed: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_file(filepath: &Path) -> Result<Self, ViewerError> {
        let contents = fs::read_to_string(filepath).map_err(|e| {
            ViewerError::Config(format!("cannot read {}: {}", filepath.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ViewerError> {
        let config: ViewerConfig =
            serde_json::from_str(contents).map_err(|e| ViewerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ViewerError::Config(format!(
                "model input size must be non-zero, got {}x{}",
                self.input_width, self.input_height
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ViewerError::Config(format!(
                "confidence threshold must lie in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ViewerError::Config(format!(
                "IoU threshold must lie in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }

    /// The extension allowlist for the configured mode.
    pub fn allowed_extensions(&self) -> &[String] {
        match self.mode {
            SourceMode::Image => &self.image_extensions,
            SourceMode::Video => &self.video_extensions,
        }
    }
}
