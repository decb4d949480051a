//! Raster decoding, intensity conversion and global-threshold binarization.

use crate::prelude::{TrafficError, TrafficResult};
use image::{GrayImage, Luma, RgbImage};
use ndarray::Array2;

/// Reference binarization threshold on the 0-255 intensity scale.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Decodes an encoded image buffer (PNG, JPEG, BMP) into an 8-bit RGB raster.
pub fn decode_image(bytes: &[u8]) -> TrafficResult<RgbImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| TrafficError::ImageRead(format!("failed to decode image: {}", e)))?;
    let rgb = decoded.to_rgb8();
    ensure_non_empty(&rgb)?;
    Ok(rgb)
}

pub fn ensure_non_empty(image: &RgbImage) -> TrafficResult<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(TrafficError::ImageRead(format!(
            "image has a zero dimension ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// BT.601 luma rounded to 8 bits.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let value = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    value.round().clamp(0.0, 255.0) as u8
}

/// Single-channel intensity indexed `[row, col]`.
pub fn to_intensity(image: &RgbImage) -> Array2<u8> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        let [r, g, b] = image.get_pixel(col as u32, row as u32).0;
        luma(r, g, b)
    })
}

/// 255 wherever intensity is strictly above the threshold, 0 elsewhere.
pub fn binarize(intensity: &Array2<u8>, threshold: u8) -> GrayImage {
    let (rows, cols) = intensity.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let value = intensity[[y as usize, x as usize]];
        Luma([if value > threshold { 255 } else { 0 }])
    })
}
