use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::image_utils::image_conversion::prepare_model_input;
use crate::object_detection::object_detection_model::{ObjectDetectionModel, RawDetection};
use crate::object_detection::object_detection_utils::{
    decode_yolo_output, non_maximum_suppression, read_classes_txt_file,
};
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use image::RgbImage;
use ort::value::Tensor;
use std::path::Path;

/// A YOLO11 detection model exported to ONNX (`images` input, `output0` output).
pub struct Yolov11BoundingBox {
    ort_session: OrtInferenceSession,
    class_names: Vec<String>,
    input_width: usize,
    input_height: usize,
    confidence: f32,
    iou_threshold: f32,
    model_name: String,
}

impl Yolov11BoundingBox {
    pub fn new(
        model_path: &Path,
        class_names: Vec<String>,
        input_width: usize,
        input_height: usize,
        model_name: String,
    ) -> Result<Self, ViewerError> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(Yolov11BoundingBox {
            ort_session,
            class_names,
            input_width,
            input_height,
            confidence: 0.25,
            iou_threshold: 0.7,
            model_name,
        })
    }

    /// Loads the model and its class names as described by the configuration.
    pub fn from_config(config: &ViewerConfig) -> Result<Self, ViewerError> {
        let class_names = read_classes_txt_file(&config.classes_path).map_err(|e| {
            ViewerError::ModelLoad(format!(
                "Classes path does not exist, or cannot be read: {:?} ({})",
                config.classes_path, e
            ))
        })?;
        let model_name = config
            .model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo11".to_string());
        let model = Yolov11BoundingBox::new(
            &config.model_path,
            class_names,
            config.input_width,
            config.input_height,
            model_name,
        )?
        .with_thresholds(config.confidence_threshold, config.iou_threshold);
        log::info!(
            "loaded {} ({} classes, input {}x{})",
            model.model_name,
            model.class_names.len(),
            model.input_width,
            model.input_height
        );
        Ok(model)
    }

    pub fn with_thresholds(mut self, confidence: f32, iou_threshold: f32) -> Self {
        self.confidence = confidence;
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl ObjectDetectionModel for Yolov11BoundingBox {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>, ViewerError> {
        let input_width = self.input_width;
        let input_height = self.input_height;
        let scale_x = frame.width() as f32 / input_width as f32;
        let scale_y = frame.height() as f32 / input_height as f32;
        let confidence = self.confidence;

        let input = prepare_model_input(frame, input_width as u32, input_height as u32);
        let (data, _) = input.into_raw_vec_and_offset();
        let tensor = Tensor::from_array((
            [1usize, 3, input_height, input_width],
            data.into_boxed_slice(),
        ))
        .map_err(|e| ViewerError::DetectorInvocation(e.to_string()))?;

        let outputs = self
            .ort_session
            .session
            .run(ort::inputs!["images" => tensor])
            .map_err(|e| ViewerError::DetectorInvocation(e.to_string()))?;
        let (shape, data) = outputs["output0"]
            .try_extract_tensor::<f32>()
            .map_err(|e| ViewerError::DetectorInvocation(e.to_string()))?;
        let shape: Vec<usize> = shape.iter().map(|dim| *dim as usize).collect();

        let detections = decode_yolo_output(&shape, data, confidence, scale_x, scale_y)?;
        Ok(non_maximum_suppression(detections, self.iou_threshold))
    }

    fn class_label(&self, class_index: usize) -> Option<&str> {
        self.class_names.get(class_index).map(String::as_str)
    }
}
