pub mod capture_stream;
#[cfg(feature = "video-ffmpeg")]
pub mod ffmpeg_capture;
pub mod frame_source;
