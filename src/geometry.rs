//! Coordinate model shared by the editor.
//!
//! Three spaces are involved: *image space* (native bitmap pixels), *screen
//! space* (pixels inside the editor viewport, origin at its top-left) and
//! *output space* (the rasterized result). Everything here is pure.

use eframe::egui;

/// Pixel dimensions of the loaded bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSpec {
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageSpec {
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
        }
    }

    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.natural_width as f32, self.natural_height as f32)
    }

    /// Native width / height.
    pub fn aspect(&self) -> f32 {
        self.natural_width as f32 / self.natural_height as f32
    }

    /// The whole bitmap in image space.
    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, self.size())
    }
}

/// Size of the interactive container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSpec {
    pub width: f32,
    pub height: f32,
}

impl ViewportSpec {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.width, self.height)
    }

    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, self.size())
    }
}

/// Uniform zoom plus a screen-space offset from the centered position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub zoom: f32,
    pub pan: egui::Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }
}

impl Transform {
    pub fn new(zoom: f32, pan: egui::Vec2) -> Self {
        Self { zoom, pan }
    }

    pub fn with_pan(self, pan: egui::Vec2) -> Self {
        Self { pan, ..self }
    }

    pub fn with_zoom(self, zoom: f32) -> Self {
        Self { zoom, ..self }
    }
}

/// Where the scaled image lands inside the viewport.
pub fn image_screen_bounds(
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
) -> egui::Rect {
    let scaled = image.size() * transform.zoom;
    let min = ((viewport.size() - scaled) / 2.0 + transform.pan).to_pos2();
    egui::Rect::from_min_size(min, scaled)
}

/// Maps a viewport point back to native bitmap pixels.
pub fn screen_to_source(
    point: egui::Pos2,
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
) -> egui::Pos2 {
    let bounds = image_screen_bounds(image, viewport, transform);
    ((point - bounds.min) / transform.zoom).to_pos2()
}

pub fn source_to_screen(
    point: egui::Pos2,
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
) -> egui::Pos2 {
    let bounds = image_screen_bounds(image, viewport, transform);
    bounds.min + point.to_vec2() * transform.zoom
}

/// Maps a screen rectangle into image space. The result is not clamped.
pub fn screen_rect_to_source(
    rect: egui::Rect,
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
) -> egui::Rect {
    egui::Rect::from_min_max(
        screen_to_source(rect.min, image, viewport, transform),
        screen_to_source(rect.max, image, viewport, transform),
    )
}

/// `outer ⊇ inner` on all four edges, give or take `epsilon`.
pub fn contains_rect(outer: egui::Rect, inner: egui::Rect, epsilon: f32) -> bool {
    inner.min.x >= outer.min.x - epsilon
        && inner.min.y >= outer.min.y - epsilon
        && inner.max.x <= outer.max.x + epsilon
        && inner.max.y <= outer.max.y + epsilon
}

/// Translates `rect` the least amount needed to sit inside `bounds`.
///
/// An axis on which `rect` is larger than `bounds` is clipped instead.
pub fn fit_inside(rect: egui::Rect, bounds: egui::Rect) -> egui::Rect {
    let (min_x, max_x) = fit_axis(rect.min.x, rect.max.x, bounds.min.x, bounds.max.x);
    let (min_y, max_y) = fit_axis(rect.min.y, rect.max.y, bounds.min.y, bounds.max.y);
    egui::Rect::from_min_max(egui::pos2(min_x, min_y), egui::pos2(max_x, max_y))
}

fn fit_axis(min: f32, max: f32, lo: f32, hi: f32) -> (f32, f32) {
    let len = max - min;
    if len >= hi - lo {
        return (lo, hi);
    }
    if min < lo {
        (lo, lo + len)
    } else if max > hi {
        (hi - len, hi)
    } else {
        (min, max)
    }
}
