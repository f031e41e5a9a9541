use crate::annotations::bounding_box::intersection_over_union;
use crate::error::ViewerError;
use crate::object_detection::object_detection_model::RawDetection;
use ndarray::{ArrayView2, Axis};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads a file with the class names into a vector so that the number ids
/// which come directly from the ORT inference session can be given meaning.
///
/// One name per line; blank lines are skipped.
pub fn read_classes_txt_file(filepath: &Path) -> io::Result<Vec<String>> {
    let mut classes = Vec::new();
    for line in BufReader::new(File::open(filepath)?).lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() {
            classes.push(name.to_string());
        }
    }
    Ok(classes)
}

/// Non maxmimum suppression is a way of removing duplicate detections.
///
/// Boxes only suppress boxes of the same class. The result is ordered by descending confidence.
pub fn non_maximum_suppression(
    mut detections: Vec<RawDetection>,
    iou_threshold: f32,
) -> Vec<RawDetection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        if detections_to_remove[current_index] {
            continue;
        }
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            if detections_to_remove[current_index + other_index + 1] {
                continue;
            }
            if current_det.class_index != other_det.class_index {
                continue;
            }
            let iou = intersection_over_union(&current_det.xyxy, &other_det.xyxy);
            if iou > iou_threshold {
                detections_to_remove[current_index + other_index + 1] = true;
            }
        }
    }
    detections
        .into_iter()
        .zip(detections_to_remove)
        .filter_map(|(det, removed)| (!removed).then_some(det))
        .collect()
}

/// Decodes the `[1, 4 + classes, anchors]` output of a YOLO11 detection head.
///
/// Each anchor carries `cx, cy, w, h` in model input pixels followed by one score per class.
/// Anchors whose best class score is below `confidence` are skipped; the rest are scaled back to
/// frame pixels with `scale_x` / `scale_y`.
pub fn decode_yolo_output(
    shape: &[usize],
    data: &[f32],
    confidence: f32,
    scale_x: f32,
    scale_y: f32,
) -> Result<Vec<RawDetection>, ViewerError> {
    let (rows, anchors) = match shape {
        [1, rows, anchors] if *rows > 4 => (*rows, *anchors),
        _ => {
            return Err(ViewerError::DetectorInvocation(format!(
                "unexpected output shape {:?}, expected [1, 4 + classes, anchors]",
                shape
            )));
        }
    };
    let output = ArrayView2::from_shape((rows, anchors), data)
        .map_err(|e| ViewerError::DetectorInvocation(e.to_string()))?;
    let output = output.t();
    let mut detections: Vec<RawDetection> = Vec::new();
    for row in output.axis_iter(Axis(0)) {
        let row: Vec<_> = row.iter().copied().collect();
        let Some((class_index, prob)) = row
            .iter()
            .skip(4) // skips bounding box coords.
            .copied()
            .enumerate()
            .reduce(|accum, item| if item.1 > accum.1 { item } else { accum })
        else {
            continue;
        };
        if prob < confidence {
            continue;
        }
        let x = row[0];
        let y = row[1];
        let w = row[2];
        let h = row[3];
        detections.push(RawDetection {
            xyxy: [
                (x - (w / 2.0)) * scale_x,
                (y - (h / 2.0)) * scale_y,
                (x + (w / 2.0)) * scale_x,
                (y + (h / 2.0)) * scale_y,
            ],
            class_index,
            confidence: prob,
        });
    }
    Ok(detections)
}
