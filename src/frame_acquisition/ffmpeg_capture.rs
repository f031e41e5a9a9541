//! Video file decoding through FFmpeg.

use crate::error::ViewerError;
use crate::frame_acquisition::capture_stream::CaptureStream;
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use std::path::{Path, PathBuf};

struct Decoding {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    eof_sent: bool,
}

/// Decodes the best video track of a local file into RGB frames.
pub struct FfmpegCapture {
    path: PathBuf,
    decoding: Option<Decoding>,
}

impl FfmpegCapture {
    pub fn open(path: &Path) -> Result<Self, ViewerError> {
        let fail = |e: &dyn std::fmt::Display| ViewerError::source_open(path, e.to_string());
        ffmpeg::init().map_err(|e| fail(&e))?;
        let input = ffmpeg::format::input(path).map_err(|e| fail(&e))?;
        let input_stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| ViewerError::source_open(path, "file has no video track"))?;
        let stream_index = input_stream.index();
        let context = ffmpeg::codec::context::Context::from_parameters(input_stream.parameters())
            .map_err(|e| fail(&e))?;
        let decoder = context.decoder().video().map_err(|e| fail(&e))?;
        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .map_err(|e| fail(&e))?;
        log::info!(
            "opened {} ({}x{})",
            path.display(),
            decoder.width(),
            decoder.height()
        );
        Ok(FfmpegCapture {
            path: path.to_path_buf(),
            decoding: Some(Decoding {
                input,
                stream_index,
                decoder,
                scaler,
                eof_sent: false,
            }),
        })
    }
}

impl Decoding {
    fn next(&mut self) -> Result<Option<RgbImage>, String> {
        let mut decoded = ffmpeg::frame::Video::empty();
        if let Some(frame) = receive(&mut self.decoder, &mut self.scaler, &mut decoded)? {
            return Ok(Some(frame));
        }
        if self.eof_sent {
            return Ok(None);
        }
        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }
            self.decoder
                .send_packet(&packet)
                .map_err(|e| format!("send packet to decoder: {}", e))?;
            if let Some(frame) = receive(&mut self.decoder, &mut self.scaler, &mut decoded)? {
                return Ok(Some(frame));
            }
        }
        // Out of packets: flush whatever the decoder still buffers.
        self.decoder
            .send_eof()
            .map_err(|e| format!("flush decoder: {}", e))?;
        self.eof_sent = true;
        receive(&mut self.decoder, &mut self.scaler, &mut decoded)
    }
}

fn receive(
    decoder: &mut ffmpeg::codec::decoder::Video,
    scaler: &mut ffmpeg::software::scaling::Context,
    decoded: &mut ffmpeg::frame::Video,
) -> Result<Option<RgbImage>, String> {
    if decoder.receive_frame(decoded).is_err() {
        return Ok(None);
    }
    let mut rgb_frame = ffmpeg::frame::Video::empty();
    scaler
        .run(decoded, &mut rgb_frame)
        .map_err(|e| format!("scale frame to RGB: {}", e))?;
    frame_to_image(&rgb_frame).map(Some)
}

impl CaptureStream for FfmpegCapture {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, ViewerError> {
        let Some(decoding) = self.decoding.as_mut() else {
            return Ok(None);
        };
        decoding
            .next()
            .map_err(|reason| ViewerError::source_open(&self.path, reason))
    }

    fn release(&mut self) {
        if self.decoding.take().is_some() {
            log::debug!("closed {}", self.path.display());
        }
    }
}

fn frame_to_image(frame: &ffmpeg::frame::Video) -> Result<RgbImage, String> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = (width as usize) * 3;
    let stride = frame.stride(0);
    let data = frame.data(0);

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        let end = start + row_bytes;
        pixels.extend_from_slice(
            data.get(start..end)
                .ok_or_else(|| "ffmpeg frame row is out of bounds".to_string())?,
        );
    }
    RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| "decoded frame does not match its dimensions".to_string())
}
