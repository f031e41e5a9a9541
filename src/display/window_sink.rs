use crate::display::{FrameSink, KeyPress, KeyWait, WINDOW_TITLE};
use crate::error::ViewerError;
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::thread;
use std::time::Duration;

const IDLE_REFRESH: Duration = Duration::from_millis(16);

/// An on-screen window. Closing it counts as pressing ESC.
pub struct WindowSink {
    window: Option<Window>,
    size: (usize, usize),
    buffer: Vec<u32>,
}

impl WindowSink {
    pub fn new() -> Self {
        WindowSink {
            window: None,
            size: (0, 0),
            buffer: Vec::new(),
        }
    }

    fn window_for(&mut self, width: usize, height: usize) -> Result<&mut Window, ViewerError> {
        let reopen = match &self.window {
            Some(window) => self.size != (width, height) || !window.is_open(),
            None => true,
        };
        if reopen {
            let window = Window::new(WINDOW_TITLE, width, height, WindowOptions::default())
                .map_err(|e| ViewerError::Display(e.to_string()))?;
            self.window = Some(window);
            self.size = (width, height);
        }
        self.window
            .as_mut()
            .ok_or_else(|| ViewerError::Display("window unavailable".to_string()))
    }
}

impl Default for WindowSink {
    fn default() -> Self {
        WindowSink::new()
    }
}

fn pressed_key(window: &Window) -> Option<KeyPress> {
    if !window.is_open() {
        return Some(KeyPress::Escape);
    }
    window
        .get_keys_pressed(KeyRepeat::No)
        .first()
        .map(|key| match key {
            Key::Escape => KeyPress::Escape,
            _ => KeyPress::Other,
        })
}

impl FrameSink for WindowSink {
    fn show(&mut self, frame: &RgbImage, wait: KeyWait) -> Result<Option<KeyPress>, ViewerError> {
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        self.buffer.clear();
        self.buffer.extend(frame.pixels().map(|p| {
            let [r, g, b] = p.0;
            ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        }));
        let buffer = std::mem::take(&mut self.buffer);
        let window = self.window_for(width, height)?;
        let updated = window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| ViewerError::Display(e.to_string()));
        self.buffer = buffer;
        updated?;

        let Some(window) = self.window.as_mut() else {
            return Ok(Some(KeyPress::Escape));
        };
        if let Some(key) = pressed_key(window) {
            return Ok(Some(key));
        }
        match wait {
            KeyWait::Forever => loop {
                thread::sleep(IDLE_REFRESH);
                window.update();
                if let Some(key) = pressed_key(window) {
                    return Ok(Some(key));
                }
            },
            KeyWait::Poll(timeout) => {
                thread::sleep(timeout);
                window.update();
                Ok(pressed_key(window))
            }
        }
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            log::debug!("closed window \"{}\"", WINDOW_TITLE);
        }
    }
}
