use crate::error::ViewerError;
use image::RgbImage;
use std::path::Path;

#[cfg(feature = "video-ffmpeg")]
use crate::frame_acquisition::ffmpeg_capture::FfmpegCapture;

/// A decoder handing out the frames of a video one at a time.
pub trait CaptureStream {
    /// The next decoded frame, or `Ok(None)` once the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, ViewerError>;

    /// Closes the underlying file or device. Called at most once.
    fn release(&mut self);
}

impl<S: CaptureStream + ?Sized> CaptureStream for Box<S> {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, ViewerError> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Opens a video file with the compiled-in decoder.
pub fn open_video(path: &Path) -> Result<Box<dyn CaptureStream>, ViewerError> {
    #[cfg(feature = "video-ffmpeg")]
    {
        Ok(Box::new(FfmpegCapture::open(path)?))
    }
    #[cfg(not(feature = "video-ffmpeg"))]
    {
        Err(ViewerError::source_open(
            path,
            "video decoding requires the video-ffmpeg feature",
        ))
    }
}
