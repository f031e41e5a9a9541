use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array, Array4};

/// Converts an rgb8 image into a (1, 3, height, width) array with channels scaled to [0, 1].
pub fn convert_rgb_image_to_owned_array(rgb_image: &RgbImage) -> Array4<f32> {
    let mut image_array = Array::zeros((
        1,
        3,
        rgb_image.height() as usize,
        rgb_image.width() as usize,
    ));
    for pixel in rgb_image.enumerate_pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b] = pixel.2.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}

/// Stretches a frame to the model's input size and converts it to an NCHW tensor.
///
/// The frame itself is left untouched; resizing works on a copy.
pub fn prepare_model_input(frame: &RgbImage, input_width: u32, input_height: u32) -> Array4<f32> {
    if frame.width() == input_width && frame.height() == input_height {
        return convert_rgb_image_to_owned_array(frame);
    }
    let resized = imageops::resize(frame, input_width, input_height, FilterType::Triangle);
    convert_rgb_image_to_owned_array(&resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn convert_rgb_image_to_owned_array_test() {
        // Non-square on purpose so a width/height mix-up shows.
        let mut rgb_img = RgbImage::new(3, 2);
        rgb_img.put_pixel(0, 1, Rgb([255, 0, 0]));
        rgb_img.put_pixel(1, 1, Rgb([0, 255, 0]));
        rgb_img.put_pixel(2, 1, Rgb([0, 0, 255]));

        let img = convert_rgb_image_to_owned_array(&rgb_img);
        // The dimensions encode (image, channel, row, column).
        assert_eq!(img.shape(), &[1, 3, 2, 3]);
        assert_eq!(
            (img[[0, 0, 0, 0]], img[[0, 1, 0, 0]], img[[0, 2, 0, 0]]),
            (0.0, 0.0, 0.0)
        );
        assert_eq!(
            (img[[0, 0, 1, 0]], img[[0, 1, 1, 0]], img[[0, 2, 1, 0]]),
            (1.0, 0.0, 0.0)
        );
        assert_eq!(
            (img[[0, 0, 1, 1]], img[[0, 1, 1, 1]], img[[0, 2, 1, 1]]),
            (0.0, 1.0, 0.0)
        );
        assert_eq!(
            (img[[0, 0, 1, 2]], img[[0, 1, 1, 2]], img[[0, 2, 1, 2]]),
            (0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn prepare_model_input_resizes_to_model_shape() {
        let frame = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        let input = prepare_model_input(&frame, 32, 16);
        assert_eq!(input.shape(), &[1, 3, 16, 32]);
        assert!(input.iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert_eq!(frame.dimensions(), (100, 50));
    }
}
