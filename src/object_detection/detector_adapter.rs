use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::{Detection, DetectionSet};
use crate::error::ViewerError;
use crate::object_detection::object_detection_model::{ObjectDetectionModel, RawDetection};
use image::RgbImage;

/// Runs a detector on a frame and turns its raw output into valid `Detection`s.
///
/// Failures of the underlying model are reported as `DetectorInvocation` and never retried.
pub struct DetectorAdapter<M> {
    model: M,
}

impl<M: ObjectDetectionModel> DetectorAdapter<M> {
    pub fn new(model: M) -> Self {
        DetectorAdapter { model }
    }

    pub fn detect(&mut self, frame: &RgbImage) -> Result<DetectionSet, ViewerError> {
        let raw = self.model.infer(frame).map_err(|e| match e {
            ViewerError::DetectorInvocation(_) => e,
            other => ViewerError::DetectorInvocation(other.to_string()),
        })?;
        let (width, height) = (frame.width() as f32, frame.height() as f32);
        let mut detections = DetectionSet::with_capacity(raw.len());
        for entry in raw {
            match self.normalize(&entry, width, height) {
                Some(det) => {
                    let [x1, y1, x2, y2] = det.annotation().as_xyxy();
                    log::info!(
                        "Object:{}, Confidence:{:.4}",
                        det.class_label(),
                        det.confidence()
                    );
                    log::info!(
                        "Coordinate of object:({:.2}),({:.2}),({:.2}),({:.2})",
                        x1,
                        y1,
                        x2,
                        y2
                    );
                    detections.push(det);
                }
                None => log::debug!("dropping malformed detector output {:?}", entry),
            }
        }
        Ok(detections)
    }

    /// Reorders swapped corners, clips the box to the frame and clamps the confidence.
    /// Entries carrying NaN or infinite values are discarded.
    fn normalize(&self, raw: &RawDetection, width: f32, height: f32) -> Option<Detection> {
        if !raw.confidence.is_finite() || !raw.xyxy.iter().all(|v| v.is_finite()) {
            return None;
        }
        let [x1, y1, x2, y2] = raw.xyxy;
        let left = x1.min(x2).clamp(0.0, width);
        let right = x1.max(x2).clamp(0.0, width);
        let top = y1.min(y2).clamp(0.0, height);
        let bottom = y1.max(y2).clamp(0.0, height);
        let label = match self.model.class_label(raw.class_index) {
            Some(label) => label.to_string(),
            None => raw.class_index.to_string(),
        };
        let annotation = BoundingBox::new(left, top, right, bottom, label).ok()?;
        Detection::new(annotation, raw.confidence.clamp(0.0, 1.0)).ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Returns the same raw output for every frame and counts its invocations.
    pub(crate) struct StubModel {
        pub output: Vec<RawDetection>,
        pub labels: Vec<String>,
        pub calls: Rc<Cell<usize>>,
        pub fail: bool,
    }

    impl StubModel {
        pub(crate) fn new(output: Vec<RawDetection>, labels: &[&str]) -> Self {
            StubModel {
                output,
                labels: labels.iter().map(|l| l.to_string()).collect(),
                calls: Rc::new(Cell::new(0)),
                fail: false,
            }
        }

        pub(crate) fn cat() -> Self {
            StubModel::new(
                vec![RawDetection {
                    xyxy: [10.0, 10.0, 50.0, 50.0],
                    class_index: 0,
                    confidence: 0.9,
                }],
                &["cat"],
            )
        }
    }

    impl ObjectDetectionModel for StubModel {
        fn infer(&mut self, _frame: &RgbImage) -> Result<Vec<RawDetection>, ViewerError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ViewerError::DetectorInvocation("stub failure".to_string()));
            }
            Ok(self.output.clone())
        }

        fn class_label(&self, class_index: usize) -> Option<&str> {
            self.labels.get(class_index).map(String::as_str)
        }
    }

    fn raw(xyxy: [f32; 4], class_index: usize, confidence: f32) -> RawDetection {
        RawDetection {
            xyxy,
            class_index,
            confidence,
        }
    }

    #[test]
    fn resolves_labels_and_keeps_order() {
        let model = StubModel::new(
            vec![raw([1., 2., 3., 4.], 1, 0.5), raw([5., 6., 7., 8.], 0, 0.8)],
            &["cat", "dog"],
        );
        let mut adapter = DetectorAdapter::new(model);
        let dets = adapter.detect(&RgbImage::new(100, 100)).unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].class_label(), "dog");
        assert_eq!(dets[1].class_label(), "cat");
        assert_eq!(dets[1].annotation().as_xyxy(), [5., 6., 7., 8.]);
    }

    #[test]
    fn normalized_output_satisfies_invariants() {
        let model = StubModel::new(
            vec![
                raw([50., 60., 10., 20.], 0, 0.7),   // swapped corners
                raw([-20., -5., 500., 90.], 0, 1.3), // outside frame, confidence > 1
                raw([1., 1., 2., 2.], 0, -0.2),
            ],
            &["cat"],
        );
        let mut adapter = DetectorAdapter::new(model);
        let dets = adapter.detect(&RgbImage::new(200, 100)).unwrap();
        assert_eq!(dets.len(), 3);
        for det in &dets {
            let [x1, y1, x2, y2] = det.annotation().as_xyxy();
            assert!(x2 >= x1 && y2 >= y1);
            assert!((0.0..=1.0).contains(&det.confidence()));
            assert!(x1 >= 0.0 && x2 <= 200.0 && y1 >= 0.0 && y2 <= 100.0);
        }
        assert_eq!(dets[0].annotation().as_xyxy(), [10., 20., 50., 60.]);
        assert_eq!(dets[1].annotation().as_xyxy(), [0., 0., 200., 90.]);
        assert_eq!(dets[1].confidence(), 1.0);
        assert_eq!(dets[2].confidence(), 0.0);
    }

    #[test]
    fn non_finite_entries_are_dropped() {
        let model = StubModel::new(
            vec![
                raw([f32::NAN, 0., 1., 1.], 0, 0.5),
                raw([0., 0., 1., 1.], 0, f32::NAN),
                raw([0., 0., f32::INFINITY, 1.], 0, 0.5),
                raw([0., 0., 1., 1.], 0, 0.5),
            ],
            &["cat"],
        );
        let mut adapter = DetectorAdapter::new(model);
        let dets = adapter.detect(&RgbImage::new(10, 10)).unwrap();
        assert_eq!(dets.len(), 1);
    }

    #[test]
    fn unknown_class_index_falls_back_to_number() {
        let model = StubModel::new(vec![raw([0., 0., 1., 1.], 7, 0.5)], &["cat"]);
        let mut adapter = DetectorAdapter::new(model);
        let dets = adapter.detect(&RgbImage::new(10, 10)).unwrap();
        assert_eq!(dets[0].class_label(), "7");
    }

    #[test]
    fn detector_failure_is_not_retried() {
        let mut model = StubModel::cat();
        model.fail = true;
        let calls = model.calls.clone();
        let mut adapter = DetectorAdapter::new(model);
        let result = adapter.detect(&RgbImage::new(10, 10));
        assert!(matches!(result, Err(ViewerError::DetectorInvocation(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn frame_is_not_mutated() {
        let frame = RgbImage::from_pixel(64, 64, image::Rgb([12, 34, 56]));
        let before = frame.clone();
        let mut adapter = DetectorAdapter::new(StubModel::cat());
        adapter.detect(&frame).unwrap();
        assert_eq!(frame, before);
    }
}
