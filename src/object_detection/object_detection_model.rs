use crate::error::ViewerError;
use image::RgbImage;

/// One box exactly as a detector reports it, before any clean-up.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    /// `[x1, y1, x2, y2]` in frame pixel coordinates.
    pub xyxy: [f32; 4],
    pub class_index: usize,
    pub confidence: f32,
}

/// Defines a trait that all object detection models must follow.
///
/// Implementations receive the full frame in its original resolution and must report boxes in
/// that frame's pixel coordinates. Any resizing the model needs happens on a copy.
pub trait ObjectDetectionModel {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>, ViewerError>;

    /// Resolves a class index to its human readable label.
    fn class_label(&self, class_index: usize) -> Option<&str>;
}

impl<M: ObjectDetectionModel + ?Sized> ObjectDetectionModel for Box<M> {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>, ViewerError> {
        (**self).infer(frame)
    }

    fn class_label(&self, class_index: usize) -> Option<&str> {
        (**self).class_label(class_index)
    }
}
