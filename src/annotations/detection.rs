use crate::annotations::bounding_box::BoundingBox;
use crate::error::ViewerError;
use itertools::Itertools;

/// A detection is what is produced as output from an object detection model.
///
/// A detection is a bounding box combined with a confidence score: a probability value that
/// encodes the model's belief that the detection is true. Detections are never changed after
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    annotation: BoundingBox,
    confidence: f32,
}

/// All detections for one frame, in the order they will be drawn.
pub type DetectionSet = Vec<Detection>;

impl Detection {
    pub fn new(annotation: BoundingBox, confidence: f32) -> Result<Self, ViewerError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ViewerError::InvalidDetection(format!(
                "Failed to create Detection, confidence {} is outside [0, 1].",
                confidence
            )));
        }
        Ok(Detection {
            annotation,
            confidence,
        })
    }

    pub fn annotation(&self) -> &BoundingBox {
        &self.annotation
    }

    pub fn class_label(&self) -> &str {
        self.annotation.category()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// The overlay text for this detection, e.g. `cat(0.9000)`.
    pub fn label_text(&self) -> String {
        format!("{}({:.4})", self.class_label(), self.confidence)
    }
}

/// One-line summary of a detection set for logging, e.g. `2 detections: cat, dog`.
pub fn summarize(detections: &[Detection]) -> String {
    if detections.is_empty() {
        return "no detections".to_string();
    }
    format!(
        "{} detection{}: {}",
        detections.len(),
        if detections.len() == 1 { "" } else { "s" },
        detections.iter().map(Detection::class_label).join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(category: &str) -> BoundingBox {
        BoundingBox::new(10.0, 10.0, 50.0, 50.0, category.to_string()).unwrap()
    }

    #[test]
    fn label_text_uses_four_decimals() {
        let det = Detection::new(bbox("cat"), 0.9).unwrap();
        assert_eq!(det.label_text(), "cat(0.9000)");
    }

    #[test]
    fn confidence_outside_unit_interval_is_rejected() {
        assert!(Detection::new(bbox("cat"), 1.01).is_err());
        assert!(Detection::new(bbox("cat"), -0.1).is_err());
        assert!(Detection::new(bbox("cat"), f32::NAN).is_err());
        assert!(Detection::new(bbox("cat"), 1.0).is_ok());
        assert!(Detection::new(bbox("cat"), 0.0).is_ok());
    }

    #[test]
    fn summary_lists_labels() {
        let dets = vec![
            Detection::new(bbox("cat"), 0.9).unwrap(),
            Detection::new(bbox("dog"), 0.5).unwrap(),
        ];
        assert_eq!(summarize(&dets), "2 detections: cat, dog");
        assert_eq!(summarize(&[]), "no detections");
    }
}
