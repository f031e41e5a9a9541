use crate::error::ViewerError;
use image::{ImageReader, RgbImage};
use std::path::Path;

/// Decodes a still image into an RGB frame.
///
/// The container format is guessed from the file contents rather than trusted from the
/// extension, so `.mpo` files (JPEG based) decode too. Formats the `image` crate cannot read
/// (e.g. HEIC, DNG) fail with `SourceOpen`.
pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage, ViewerError> {
    let reader = ImageReader::open(filepath)
        .map_err(|e| ViewerError::source_open(filepath, e))?
        .with_guessed_format()
        .map_err(|e| ViewerError::source_open(filepath, e))?;
    let image = reader
        .decode()
        .map_err(|e| ViewerError::source_open(filepath, e))?;
    Ok(image.into_rgb8())
}

/// Writes an annotated frame; the format follows the file extension.
pub fn write_rgb8(image: &RgbImage, filepath: &Path) -> Result<(), ViewerError> {
    image
        .save(filepath)
        .map_err(|e| ViewerError::Display(format!("cannot write {}: {}", filepath.display(), e)))
}
