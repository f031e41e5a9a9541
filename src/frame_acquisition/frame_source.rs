use crate::config::{SourceMode, SourceOrientation, ViewerConfig};
use crate::error::ViewerError;
use crate::frame_acquisition::capture_stream::{CaptureStream, open_video};
use crate::image_utils::image_io::read_image_as_rgb8;
use image::RgbImage;
use image::imageops::flip_vertical_in_place;
use std::path::Path;

/// Anything the driver can pull frames from.
pub trait FrameSource {
    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<RgbImage>;

    /// Gives back any underlying resource. Safe to call more than once.
    fn release(&mut self) {}
}

/// A single decoded still image, handed out exactly once.
pub struct ImageFrameSource {
    frame: Option<RgbImage>,
}

impl ImageFrameSource {
    pub fn new(frame: RgbImage) -> Self {
        ImageFrameSource { frame: Some(frame) }
    }

    pub fn open(path: &Path) -> Result<Self, ViewerError> {
        let frame = read_image_as_rgb8(path)?;
        log::info!(
            "decoded {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );
        Ok(ImageFrameSource::new(frame))
    }
}

impl FrameSource for ImageFrameSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        self.frame.take()
    }
}

/// Frames pulled from a capture stream, corrected for the stream's orientation.
///
/// The stream is released exactly once: by `release`, or on drop if that never happened.
pub struct VideoFrameSource<S: CaptureStream> {
    stream: S,
    orientation: SourceOrientation,
    frames_read: u64,
    released: bool,
}

impl<S: CaptureStream> VideoFrameSource<S> {
    pub fn new(stream: S, orientation: SourceOrientation) -> Self {
        VideoFrameSource {
            stream,
            orientation,
            frames_read: 0,
            released: false,
        }
    }

    #[cfg(test)]
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl<S: CaptureStream> FrameSource for VideoFrameSource<S> {
    fn next_frame(&mut self) -> Option<RgbImage> {
        if self.released {
            return None;
        }
        let mut frame = match self.stream.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("capture stream ended after {} frames", self.frames_read);
                return None;
            }
            Err(e) => {
                log::warn!("capture failed after {} frames: {}", self.frames_read, e);
                return None;
            }
        };
        if self.orientation == SourceOrientation::Flipped {
            flip_vertical_in_place(&mut frame);
        }
        self.frames_read += 1;
        Some(frame)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stream.release();
            log::debug!("capture stream released");
        }
    }
}

impl<S: CaptureStream> Drop for VideoFrameSource<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Opens `path` as an image or a video source, depending on the configured mode.
pub fn open_source(path: &Path, config: &ViewerConfig) -> Result<Box<dyn FrameSource>, ViewerError> {
    match config.mode {
        SourceMode::Image => Ok(Box::new(ImageFrameSource::open(path)?)),
        SourceMode::Video => {
            let stream = open_video(path)?;
            Ok(Box::new(VideoFrameSource::new(
                stream,
                config.video_orientation,
            )))
        }
    }
}
