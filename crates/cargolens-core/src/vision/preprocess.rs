//! Image preprocessing for CLIP inference.
//!
//! clip-vit-base-patch32 expects:
//! - Shortest edge resized to 224, then a 224×224 center crop
//! - Per-channel normalization with the CLIP mean/std
//! - Channel order: RGB
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// CLIP normalization mean (R, G, B).
const NORM_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std (R, G, B).
const NORM_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an image for CLIP inference.
///
/// Resizes the shortest edge to `image_size`, center-crops to a square,
/// normalizes per channel, and returns an NCHW tensor for ONNX Runtime.
pub fn preprocess(image: &DynamicImage, image_size: u32) -> Array4<f32> {
    let (w, h) = (image.width(), image.height());
    let scale = image_size as f32 / w.min(h).max(1) as f32;
    let new_w = ((w as f32 * scale).round() as u32).max(image_size);
    let new_h = ((h as f32 * scale).round() as u32).max(image_size);

    let resized = image.resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3);
    let left = (new_w - image_size) / 2;
    let top = (new_h - image_size) / 2;
    let cropped = resized.crop_imm(left, top, image_size, image_size);
    let rgb = cropped.to_rgb8();

    let size = image_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));

    // Access raw RGB bytes and the tensor slice directly to avoid per-pixel
    // bounds-checking overhead from get_pixel() and 4D ndarray indexing.
    let raw = rgb.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, pixel) in raw.chunks_exact(3).enumerate() {
        let y = i / size;
        let x = i % size;
        for (c, &val) in pixel.iter().enumerate() {
            // NCHW layout: offset = c * size * size + y * size + x
            let idx = c * size * size + y * size + x;
            tensor_data[idx] = (val as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c];
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    #[test]
    fn test_preprocess_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = preprocess(&img, 224);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_preprocess_portrait_and_square_inputs() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(480, 640));
        assert_eq!(preprocess(&img, 224).shape(), &[1, 3, 224, 224]);

        let img = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        assert_eq!(preprocess(&img, 224).shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_preprocess_normalization_range() {
        // White image: (1.0 - mean) / std per channel, all positive
        let img =
            DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 300, image::Rgb([255, 255, 255])));
        let tensor = preprocess(&img, 224);
        let expected_r = (1.0 - NORM_MEAN[0]) / NORM_STD[0];
        assert!((tensor[[0, 0, 0, 0]] - expected_r).abs() < 0.02);

        // Black image: (0.0 - mean) / std per channel, all negative
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 300, image::Rgb([0, 0, 0])));
        let tensor = preprocess(&img, 224);
        assert!(tensor.iter().all(|&v| v < 0.0));
    }
}
