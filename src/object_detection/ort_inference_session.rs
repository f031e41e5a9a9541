use crate::error::ViewerError;
use ort::session::Session;
use std::path::Path;

/// An onnxruntime inference session.
///
/// The object detection models in this project are wrappers around an ONNX inference session
/// that handles running the model on hardware.
pub struct OrtInferenceSession {
    pub session: Session,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self, ViewerError> {
        if !model_path.exists() {
            return Err(ViewerError::ModelLoad(format!(
                "Model path does not exist, or cannot be read: {:?}",
                model_path
            )));
        }
        let session = Session::builder()
            .map_err(|e| ViewerError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ViewerError::ModelLoad(format!("{:?}: {}", model_path, e)))?;
        Ok(Self { session })
    }
}
