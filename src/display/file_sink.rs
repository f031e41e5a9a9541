use crate::display::{FrameSink, KeyPress, KeyWait};
use crate::error::ViewerError;
use crate::image_utils::image_io::write_rgb8;
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes every shown frame as `frame_NNNNNN.png` into a directory.
///
/// There is no keyboard, so `show` never reports a key press and never blocks.
pub struct FileSink {
    output_dir: PathBuf,
    written: usize,
}

impl FileSink {
    pub fn new(output_dir: &Path) -> Result<Self, ViewerError> {
        fs::create_dir_all(output_dir).map_err(|e| {
            ViewerError::Display(format!("cannot create {}: {}", output_dir.display(), e))
        })?;
        Ok(FileSink {
            output_dir: output_dir.to_path_buf(),
            written: 0,
        })
    }

    fn next_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("frame_{:06}.png", self.written))
    }
}

impl FrameSink for FileSink {
    fn show(&mut self, frame: &RgbImage, _wait: KeyWait) -> Result<Option<KeyPress>, ViewerError> {
        let path = self.next_path();
        write_rgb8(frame, &path)?;
        log::info!("wrote {}", path.display());
        self.written += 1;
        Ok(None)
    }

    fn close(&mut self) {
        log::debug!(
            "file sink closed after {} frames in {}",
            self.written,
            self.output_dir.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::time::Duration;

    #[test]
    fn frames_are_numbered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("annotated");
        let mut sink = FileSink::new(&out).unwrap();
        let frame = RgbImage::from_pixel(4, 4, Rgb([0, 255, 0]));
        assert_eq!(sink.show(&frame, KeyWait::Forever).unwrap(), None);
        assert_eq!(
            sink.show(&frame, KeyWait::Poll(Duration::from_millis(1)))
                .unwrap(),
            None
        );
        sink.close();

        assert_eq!(sink.written, 2);
        assert!(out.join("frame_000000.png").is_file());
        assert!(out.join("frame_000001.png").is_file());
        let saved = image::open(out.join("frame_000001.png")).unwrap().into_rgb8();
        assert_eq!(saved, frame);
    }
}
