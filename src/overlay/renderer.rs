use crate::annotations::detection::Detection;
use crate::overlay::font::{draw_text_line, text_size};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

pub const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const STROKE_WIDTH: i32 = 2;
/// The label sits this many pixels above the bottom edge of its box.
pub const LABEL_OFFSET: i64 = 10;
/// Frame pixels per font pixel at font scale 1.
pub const LABEL_PIXEL_SIZE: u32 = 2;

/// `max(1, floor(frame_width / 800))`.
pub fn font_scale(frame_width: u32) -> u32 {
    (frame_width / 800).max(1)
}

/// Draws every detection onto `frame` in order and hands the same buffer back.
///
/// Boxes partly or wholly outside the frame are clipped; nothing here can fail.
pub fn render<'a>(
    frame: &'a mut RgbImage,
    detections: &[Detection],
    font_scale: u32,
) -> &'a mut RgbImage {
    for detection in detections {
        draw_box(frame, detection);
        draw_label(frame, detection, font_scale);
    }
    frame
}

fn draw_box(frame: &mut RgbImage, detection: &Detection) {
    let [x1, y1, x2, y2] = detection.annotation().as_xyxy();
    let left = clamp_coordinate(x1, frame.width());
    let top = clamp_coordinate(y1, frame.height());
    let right = clamp_coordinate(x2, frame.width());
    let bottom = clamp_coordinate(y2, frame.height());
    // The stroke grows inwards from the box edge.
    for inset in 0..STROKE_WIDTH {
        let (l, t, r, b) = (left + inset, top + inset, right - inset, bottom - inset);
        if r < l || b < t {
            break;
        }
        let rect = Rect::at(l, t).of_size((r - l + 1) as u32, (b - t + 1) as u32);
        draw_hollow_rect_mut(frame, rect, OVERLAY_COLOR);
    }
}

fn draw_label(frame: &mut RgbImage, detection: &Detection, font_scale: u32) {
    let text = detection.label_text();
    let pixel_size = LABEL_PIXEL_SIZE * font_scale.max(1);
    let (text_w, text_h) = text_size(&text, pixel_size);
    let margin = STROKE_WIDTH as f32;
    // Keep the anchor where some part of the text could still touch the frame.
    let anchor_x = detection
        .annotation()
        .top_left()
        .x
        .clamp(-(text_w as f32) - margin, frame.width() as f32 + margin);
    let baseline = (detection.annotation().bottom_right().y - LABEL_OFFSET as f32)
        .clamp(-margin, (frame.height() + text_h) as f32 + margin);
    draw_text_line(
        frame,
        anchor_x as i64,
        baseline as i64,
        &text,
        OVERLAY_COLOR,
        pixel_size,
    );
}

/// Pulls a coordinate into a band just outside the frame so the rectangle
/// arithmetic stays in range; the draw primitive clips the rest.
fn clamp_coordinate(value: f32, limit: u32) -> i32 {
    let margin = STROKE_WIDTH as f32;
    value.clamp(-margin, limit as f32 + margin) as i32
}
