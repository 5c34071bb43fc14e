//! Raster preprocessing: photograph in, binary edge map out.
//!
//! The chain runs grayscale → Gaussian blur → morphological opening →
//! adaptive binarization → Canny, each stage replacing the previous buffer.
//! Adaptive (rather than global) thresholding is what makes the pipeline
//! survive the uneven lighting of a photographed page.

use image::{GrayImage, ImageBuffer, Luma};

use crate::error::ExtractError;

/// Configuration for the preprocessing chain.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur standard deviation. Sigma 2 spans the 9x9 kernel.
    pub blur_sigma: f32,
    /// Radius of the disc structuring element for opening; radius 2 is the
    /// 5x5 ellipse.
    pub open_radius: u8,
    /// Adaptive-threshold window edge length in pixels. Must be odd.
    pub threshold_block: u32,
    /// Constant subtracted from the local mean before comparison.
    pub threshold_offset: f64,
    /// Canny low threshold.
    pub canny_low: f32,
    /// Canny high threshold.
    pub canny_high: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            open_radius: 2,
            threshold_block: 11,
            threshold_offset: 2.0,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

/// Run the full preprocessing chain on a grayscale image.
///
/// Returns the binary edge map (255 = edge pixel). A degenerate input
/// (uniform brightness) yields an empty edge map, not an error; only a
/// zero-dimension image is rejected.
pub fn edge_map(gray: &GrayImage, config: &PreprocessConfig) -> Result<GrayImage, ExtractError> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractError::EmptyImage { width, height });
    }

    let blurred = blur_gray(gray, config.blur_sigma);
    let opened = open_gray(&blurred, config.open_radius);
    let binary = adaptive_threshold_inv(&opened, config.threshold_block, config.threshold_offset);
    let edges = imageproc::edges::canny(&binary, config.canny_low, config.canny_high);
    tracing::debug!(
        edge_pixels = edges.pixels().filter(|p| p[0] > 0).count(),
        "preprocessing complete"
    );
    Ok(edges)
}

/// Gaussian-blur a `GrayImage` via `imageproc`, working in [0, 1] floats.
fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut f = ImageBuffer::<Luma<f32>, Vec<f32>>::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.put_pixel(x, y, Luma([img.get_pixel(x, y)[0] as f32 / 255.0]));
        }
    }
    let blurred = imageproc::filter::gaussian_blur_f32(&f, sigma);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
            out.put_pixel(x, y, Luma([(v * 255.0).round() as u8]));
        }
    }
    out
}

/// Grayscale opening (erosion then dilation) with a quasi-elliptical disc
/// structuring element. Removes bright speckle smaller than the disc while
/// preserving stroke shape.
fn open_gray(img: &GrayImage, radius: u8) -> GrayImage {
    let offsets = disc_offsets(radius as i32);
    let eroded = morph_gray(img, &offsets, Morph::Erode);
    morph_gray(&eroded, &offsets, Morph::Dilate)
}

#[derive(Clone, Copy, PartialEq)]
enum Morph {
    Erode,
    Dilate,
}

/// Neighborhood min (erode) or max (dilate) over the structuring element.
/// Out-of-bounds neighbors are skipped, replicating the border.
fn morph_gray(img: &GrayImage, offsets: &[(i32, i32)], op: Morph) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let mut acc = match op {
                Morph::Erode => u8::MAX,
                Morph::Dilate => u8::MIN,
            };
            for &(dx, dy) in offsets {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                let v = img.get_pixel(nx as u32, ny as u32)[0];
                acc = match op {
                    Morph::Erode => acc.min(v),
                    Morph::Dilate => acc.max(v),
                };
            }
            out.put_pixel(x as u32, y as u32, Luma([acc]));
        }
    }
    out
}

/// Offsets of the disc structuring element; radius 2 matches the 5x5
/// elliptical kernel.
fn disc_offsets(radius: i32) -> Vec<(i32, i32)> {
    let limit = radius * radius + 1;
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= limit {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Inverted adaptive threshold: a pixel becomes foreground (255) when it is
/// darker than its local box mean minus `offset`, so drawn strokes end up
/// white on black regardless of page-level lighting gradients.
fn adaptive_threshold_inv(img: &GrayImage, block: u32, offset: f64) -> GrayImage {
    let (w, h) = img.dimensions();
    let radius = (block / 2) as i64;
    let integral = integral_image(img);
    let stride = w as usize + 1;

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let x0 = (x as i64 - radius).max(0) as usize;
            let y0 = (y as i64 - radius).max(0) as usize;
            let x1 = (x as i64 + radius).min(w as i64 - 1) as usize;
            let y1 = (y as i64 + radius).min(h as i64 - 1) as usize;

            let area = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
            let sum = integral[(y1 + 1) * stride + x1 + 1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1 + 1]
                - integral[(y1 + 1) * stride + x0];
            let mean = sum as f64 / area;

            let v = img.get_pixel(x, y)[0] as f64;
            let fg = if v < mean - offset { 255 } else { 0 };
            out.put_pixel(x, y, Luma([fg]));
        }
    }
    out
}

/// Summed-area table with one row/column of zero padding.
fn integral_image(img: &GrayImage) -> Vec<u64> {
    let (w, h) = img.dimensions();
    let stride = w as usize + 1;
    let mut integral = vec![0u64; stride * (h as usize + 1)];
    for y in 0..h as usize {
        let mut row_sum = 0u64;
        for x in 0..w as usize {
            row_sum += img.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
    integral
}
