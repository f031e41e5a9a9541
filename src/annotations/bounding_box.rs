use crate::annotations::point::Point;
use crate::error::ViewerError;

/// A struct representing a bounding box.
///
/// A bounding box is the rectangle a detector places around an object, together with the
/// category it believes the object belongs to.
///
/// This project uses the standard convention of the left side of the frame being x=0 and the top
/// of the frame being y=0.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    category: String,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        category: String,
    ) -> Result<Self, ViewerError> {
        if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
            Err(ViewerError::InvalidDetection(format!(
                "Failed to create BoundingBox, coordinates must be finite ({}, {}, {}, {}).",
                left, top, right, bottom
            )))
        } else if left > right {
            Err(ViewerError::InvalidDetection(format!(
                "Failed to create BoundingBox, value for left > value for right ({} > {}).",
                left, right
            )))
        } else if top > bottom {
            Err(ViewerError::InvalidDetection(format!(
                "Failed to create BoundingBox, value for top > value for bottom ({} > {}).",
                top, bottom
            )))
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
                category,
            })
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn top_left(&self) -> Point {
        Point {
            x: self.left,
            y: self.top,
        }
    }

    pub fn bottom_right(&self) -> Point {
        Point {
            x: self.right,
            y: self.bottom,
        }
    }

    pub fn as_xyxy(&self) -> [f32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes. Degenerate boxes give 0.
pub fn intersection_over_union(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let inter_w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let inter_h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let intersection = inter_w * inter_h;
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    let union = area_a + area_b - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}
