//! Rasterizes the visible crop into a fixed-size JPEG.
//!
//! Pure pixel work: decoded image in, encoded bytes out. Nothing here knows
//! about pointers or the UI.

use std::io::Cursor;

use eframe::egui;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::geometry::{self, ImageSpec, Transform, ViewportSpec};

pub const DEFAULT_OUTPUT_WIDTH: u32 = 400;
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 400;
pub const DEFAULT_JPEG_QUALITY: u8 = 92;
pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportSettings {
    pub output_width: u32,
    /// Ignored when an aspect ratio is locked; height then follows the width.
    pub output_height: u32,
    pub aspect_ratio: Option<f32>,
    /// Fill for transparent source pixels; JPEG has no alpha.
    pub background: [u8; 3],
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            aspect_ratio: Some(1.0),
            background: DEFAULT_BACKGROUND,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExportSettings {
    /// Pixel size of the output surface.
    pub fn output_dimensions(&self) -> (u32, u32) {
        let width = self.output_width.max(1);
        let height = match self.aspect_ratio {
            Some(ratio) => (width as f32 / ratio).round() as u32,
            None => self.output_height,
        };
        (width, height.max(1))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Crop maps to an empty source region ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// The crop rectangle in image space, clamped to the bitmap.
pub fn source_rect(
    crop: egui::Rect,
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
) -> egui::Rect {
    let raw = geometry::screen_rect_to_source(crop, image, viewport, transform);
    raw.intersect(image.rect())
}

/// Rounds an image-space rectangle to whole pixels `(x, y, w, h)` inside
/// `width` x `height`.
///
/// Each edge is rounded on its own, so the sampled region can shift by up to
/// half a pixel per edge. A non-empty span narrower than a pixel still yields
/// one pixel; only an empty or inverted span yields zero.
pub fn pixel_region(source: egui::Rect, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let (x, w) = pixel_span(source.min.x, source.max.x, width);
    let (y, h) = pixel_span(source.min.y, source.max.y, height);
    (x, y, w, h)
}

fn pixel_span(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
    let start = (lo.round().max(0.0) as u32).min(limit);
    let non_empty = hi > lo;
    if limit == 0 || !non_empty {
        return (start, 0);
    }
    let start = start.min(limit - 1);
    let end = ((hi.round().max(0.0) as u32).min(limit)).max(start + 1);
    (start, end - start)
}

/// Draws `source` (image space) scaled to fill the output surface.
pub fn render_crop(
    image: &DynamicImage,
    source: egui::Rect,
    settings: &ExportSettings,
) -> Result<RgbImage, ExportError> {
    let (x, y, width, height) = pixel_region(source, image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ExportError::EmptySource { width, height });
    }

    let region = flatten(&image.crop_imm(x, y, width, height), settings.background);
    let (out_w, out_h) = settings.output_dimensions();
    if (out_w, out_h) == (width, height) {
        return Ok(region);
    }
    Ok(imageops::resize(&region, out_w, out_h, FilterType::Triangle))
}

/// Composites `image` over an opaque `background`.
fn flatten(image: &DynamicImage, background: [u8; 3]) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::from_pixel(rgba.width(), rgba.height(), Rgb(background));
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            let blended = src[c] as u32 * alpha + dst[c] as u32 * (255 - alpha);
            dst[c] = ((blended + 127) / 255) as u8;
        }
    }
    out
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut bytes: Vec<u8> = Vec::new();
    JpegEncoder::new_with_quality(&mut Cursor::new(&mut bytes), quality.clamp(1, 100))
        .encode_image(image)?;
    Ok(bytes)
}

/// Maps `crop` back to the bitmap, rasterizes and encodes it.
pub fn export_crop(
    image: &DynamicImage,
    spec: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
    crop: egui::Rect,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    let source = source_rect(crop, spec, viewport, transform);
    let rendered = render_crop(image, source, settings)?;
    let bytes = encode_jpeg(&rendered, settings.jpeg_quality)?;
    log::debug!(
        "exported source {:?} as {}x{} JPEG ({} bytes)",
        source,
        rendered.width(),
        rendered.height(),
        bytes.len()
    );
    Ok(bytes)
}
