pub mod file_sink;
#[cfg(feature = "window")]
pub mod window_sink;

use crate::error::ViewerError;
use image::RgbImage;
use std::time::Duration;

pub const WINDOW_TITLE: &str = "Object Detection";

/// How long `show` may wait for a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyWait {
    /// Block until a key arrives.
    Forever,
    /// Return after at most this long.
    Poll(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    Escape,
    #[cfg_attr(not(feature = "window"), allow(dead_code))]
    Other,
}

/// Where annotated frames end up.
pub trait FrameSink {
    /// Presents a frame and reports the key pressed while waiting, if any.
    fn show(&mut self, frame: &RgbImage, wait: KeyWait) -> Result<Option<KeyPress>, ViewerError>;

    /// Tears down whatever `show` opened. Safe to call more than once.
    fn close(&mut self);
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn show(&mut self, frame: &RgbImage, wait: KeyWait) -> Result<Option<KeyPress>, ViewerError> {
        (**self).show(frame, wait)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
