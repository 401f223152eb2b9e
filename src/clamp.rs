//! Keeps the crop frame covered by the image.
//!
//! Every function here takes a *proposed* value and returns the nearest one
//! for which `image_screen_bounds ⊇ crop` holds. When goals conflict the
//! containment invariant wins, then the aspect ratio, then following the
//! pointer exactly.

use eframe::egui;

use crate::geometry::{self, ImageSpec, Transform, ViewportSpec};
use crate::handle::{ResizeHandle, Side};

/// Default minimum crop edge, in screen px.
pub const DEFAULT_MIN_CROP_SIZE: f32 = 50.0;

/// Session-level limits on the crop frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropConstraints {
    /// Locked width / height, or `None` for free-form.
    pub aspect_ratio: Option<f32>,
    pub min_size: f32,
}

impl Default for CropConstraints {
    fn default() -> Self {
        Self {
            aspect_ratio: None,
            min_size: DEFAULT_MIN_CROP_SIZE,
        }
    }
}

impl CropConstraints {
    pub fn new(aspect_ratio: Option<f32>, min_size: f32) -> Self {
        Self {
            aspect_ratio,
            min_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("crop rectangle would collapse to {width}x{height}")]
    Degenerate { width: f32, height: f32 },
}

/// Pushes pan back so the image covers `crop` again. Zoom is left alone.
pub fn clamp_pan(
    image: &ImageSpec,
    viewport: &ViewportSpec,
    crop: egui::Rect,
    proposed: Transform,
) -> Transform {
    let bounds = geometry::image_screen_bounds(image, viewport, &proposed);
    let correction = egui::vec2(
        pan_correction(bounds.min.x, bounds.max.x, crop.min.x, crop.max.x),
        pan_correction(bounds.min.y, bounds.max.y, crop.min.y, crop.max.y),
    );
    proposed.with_pan(proposed.pan + correction)
}

fn pan_correction(img_lo: f32, img_hi: f32, crop_lo: f32, crop_hi: f32) -> f32 {
    if img_hi - img_lo < crop_hi - crop_lo {
        // Below minimum zoom nothing fits; centre the image on the crop.
        log::warn!(
            "image span {:.1} narrower than crop span {:.1}",
            img_hi - img_lo,
            crop_hi - crop_lo
        );
        return (crop_lo + crop_hi) / 2.0 - (img_lo + img_hi) / 2.0;
    }
    if img_lo > crop_lo {
        crop_lo - img_lo
    } else if img_hi < crop_hi {
        crop_hi - img_hi
    } else {
        0.0
    }
}

/// Move-crop clamp: translation only, so an axis-wise shift is enough.
pub fn clamp_crop_translation(
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
    proposed: egui::Rect,
) -> egui::Rect {
    let bounds = geometry::image_screen_bounds(image, viewport, transform);
    geometry::fit_inside(proposed, bounds)
}

/// Resize clamp for a rectangle whose `handle` edges were dragged.
///
/// The edges opposite the handle stay put unless the minimum size cannot be
/// met from there, in which case the frame slides inward.
pub fn clamp_crop_rect(
    image: &ImageSpec,
    viewport: &ViewportSpec,
    transform: &Transform,
    proposed: egui::Rect,
    handle: ResizeHandle,
    constraints: &CropConstraints,
) -> Result<egui::Rect, GeometryError> {
    let bounds = geometry::image_screen_bounds(image, viewport, transform);

    let clipped = egui::Rect::from_min_max(
        proposed.min.clamp(bounds.min, bounds.max),
        proposed.max.clamp(bounds.min, bounds.max),
    );
    let anchor = Anchor::new(handle, clipped);
    let mut size = egui::vec2(
        (clipped.max.x - clipped.min.x).max(0.0),
        (clipped.max.y - clipped.min.y).max(0.0),
    );

    if let Some(ratio) = constraints.aspect_ratio {
        size = match handle.horizontal() {
            Side::Neither => egui::vec2(size.y * ratio, size.y),
            _ => egui::vec2(size.x, size.x / ratio),
        };
        let room = anchor.room(bounds);
        let fit = (room.x / size.x).min(room.y / size.y);
        if fit < 1.0 {
            size *= fit;
        }
    }

    size = enforce_min_size(size, constraints);
    size = cap_size(size, bounds.size(), constraints.aspect_ratio);
    check_size(size)?;

    Ok(geometry::fit_inside(anchor.place(size), bounds))
}

/// Re-shapes `crop` to the constraint's aspect ratio around its centre.
///
/// The longer side is kept, then the frame is scaled down until it fits
/// inside `bounds`. Free-form constraints only apply the minimum size.
pub fn fit_aspect(
    crop: egui::Rect,
    bounds: egui::Rect,
    constraints: &CropConstraints,
) -> Result<egui::Rect, GeometryError> {
    let mut size = crop.size();
    if let Some(ratio) = constraints.aspect_ratio {
        let max_dim = size.x.max(size.y);
        size = if ratio >= 1.0 {
            egui::vec2(max_dim, max_dim / ratio)
        } else {
            egui::vec2(max_dim * ratio, max_dim)
        };
    }

    size = enforce_min_size(size, constraints);
    size = cap_size(size, bounds.size(), constraints.aspect_ratio);
    check_size(size)?;

    Ok(geometry::fit_inside(
        egui::Rect::from_center_size(crop.center(), size),
        bounds,
    ))
}

/// Smallest size satisfying `min_size` on both edges (aspect kept if locked).
fn enforce_min_size(size: egui::Vec2, constraints: &CropConstraints) -> egui::Vec2 {
    let min = constraints.min_size;
    match constraints.aspect_ratio {
        Some(ratio) => {
            let floor = if ratio >= 1.0 {
                egui::vec2(min * ratio, min)
            } else {
                egui::vec2(min, min / ratio)
            };
            if size.x < floor.x || size.y < floor.y {
                floor
            } else {
                size
            }
        }
        None => size.max(egui::vec2(min, min)),
    }
}

fn cap_size(size: egui::Vec2, limit: egui::Vec2, aspect_ratio: Option<f32>) -> egui::Vec2 {
    match aspect_ratio {
        Some(_) => {
            let fit = (limit.x / size.x).min(limit.y / size.y);
            if fit < 1.0 { size * fit } else { size }
        }
        None => size.min(limit),
    }
}

fn check_size(size: egui::Vec2) -> Result<(), GeometryError> {
    if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::Degenerate {
            width: size.x,
            height: size.y,
        })
    }
}

/// The fixed part of the frame on one axis during a resize.
#[derive(Clone, Copy, Debug)]
enum AxisAnchor {
    /// Left/top edge fixed; the frame grows toward larger coordinates.
    Low(f32),
    /// Right/bottom edge fixed.
    High(f32),
    /// Axis not driven by the handle; the frame grows around this centre.
    Center(f32),
}

impl AxisAnchor {
    fn new(side: Side, lo: f32, hi: f32) -> Self {
        match side {
            Side::Start => AxisAnchor::High(hi),
            Side::End => AxisAnchor::Low(lo),
            Side::Neither => AxisAnchor::Center((lo + hi) / 2.0),
        }
    }

    fn room(self, lo: f32, hi: f32) -> f32 {
        let room = match self {
            AxisAnchor::Low(v) => hi - v,
            AxisAnchor::High(v) => v - lo,
            AxisAnchor::Center(c) => 2.0 * (c - lo).min(hi - c),
        };
        room.max(0.0)
    }

    fn place(self, len: f32) -> (f32, f32) {
        match self {
            AxisAnchor::Low(v) => (v, v + len),
            AxisAnchor::High(v) => (v - len, v),
            AxisAnchor::Center(c) => (c - len / 2.0, c + len / 2.0),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Anchor {
    x: AxisAnchor,
    y: AxisAnchor,
}

impl Anchor {
    fn new(handle: ResizeHandle, rect: egui::Rect) -> Self {
        Self {
            x: AxisAnchor::new(handle.horizontal(), rect.min.x, rect.max.x),
            y: AxisAnchor::new(handle.vertical(), rect.min.y, rect.max.y),
        }
    }

    fn room(&self, bounds: egui::Rect) -> egui::Vec2 {
        egui::vec2(
            self.x.room(bounds.min.x, bounds.max.x),
            self.y.room(bounds.min.y, bounds.max.y),
        )
    }

    fn place(&self, size: egui::Vec2) -> egui::Rect {
        let (min_x, max_x) = self.x.place(size.x);
        let (min_y, max_y) = self.y.place(size.y);
        egui::Rect::from_min_max(egui::pos2(min_x, min_y), egui::pos2(max_x, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{contains_rect, image_screen_bounds};

    const EPS: f32 = 1e-3;

    fn setup() -> (ImageSpec, ViewportSpec, Transform, egui::Rect) {
        (
            ImageSpec::new(1000, 1000),
            ViewportSpec::new(500.0, 500.0),
            Transform::default(),
            egui::Rect::from_min_size(egui::pos2(150.0, 150.0), egui::vec2(200.0, 200.0)),
        )
    }

    fn assert_rect_eq(a: egui::Rect, b: egui::Rect) {
        assert!(
            (a.min - b.min).length() < EPS && (a.max - b.max).length() < EPS,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn pan_within_limits_is_untouched() {
        let (image, viewport, t, crop) = setup();
        let proposed = t.with_pan(egui::vec2(30.0, -40.0));
        assert_eq!(clamp_pan(&image, &viewport, crop, proposed), proposed);
    }

    #[test]
    fn pan_pushed_back_by_overflow() {
        let (image, viewport, t, crop) = setup();
        // image left would land at 250, past the crop's left edge at 150
        let clamped = clamp_pan(&image, &viewport, crop, t.with_pan(egui::vec2(500.0, 0.0)));
        let bounds = image_screen_bounds(&image, &viewport, &clamped);
        assert!((bounds.min.x - crop.min.x).abs() < EPS);
        assert_eq!(clamped.pan.y, 0.0);

        let clamped = clamp_pan(&image, &viewport, crop, t.with_pan(egui::vec2(0.0, -900.0)));
        let bounds = image_screen_bounds(&image, &viewport, &clamped);
        assert!((bounds.max.y - crop.max.y).abs() < EPS);
        assert!(contains_rect(bounds, crop, EPS));
    }

    #[test]
    fn pan_below_min_zoom_centres_image() {
        let (image, viewport, _, crop) = setup();
        let proposed = Transform::new(0.1, egui::vec2(90.0, 0.0));
        let clamped = clamp_pan(&image, &viewport, crop, proposed);
        let bounds = image_screen_bounds(&image, &viewport, &clamped);
        assert!((bounds.center() - crop.center()).length() < EPS);
    }

    #[test]
    fn translation_stays_inside() {
        let (image, viewport, t, crop) = setup();
        let proposed = crop.translate(egui::vec2(2000.0, -50.0));
        let moved = clamp_crop_translation(&image, &viewport, &t, proposed);
        assert_rect_eq(
            moved,
            egui::Rect::from_min_size(egui::pos2(550.0, 100.0), egui::vec2(200.0, 200.0)),
        );
    }

    #[test]
    fn corner_drag_past_image_stops_at_image_corner() {
        let (image, viewport, t, crop) = setup();
        let proposed = ResizeHandle::TopLeft.drag_edges(crop, egui::vec2(-9999.0, -9999.0));
        let out = clamp_crop_rect(
            &image,
            &viewport,
            &t,
            proposed,
            ResizeHandle::TopLeft,
            &CropConstraints::default(),
        )
        .unwrap();
        assert_rect_eq(
            out,
            egui::Rect::from_min_max(egui::pos2(-250.0, -250.0), crop.max),
        );
    }

    #[test]
    fn aspect_locked_every_handle() {
        let (image, viewport, t, crop) = setup();
        let constraints = CropConstraints::new(Some(1.5), 50.0);
        let bounds = image_screen_bounds(&image, &viewport, &t);
        let start = fit_aspect(crop, bounds, &constraints).unwrap();
        for handle in ResizeHandle::ALL {
            for delta in [
                egui::vec2(37.0, -12.0),
                egui::vec2(-80.0, 95.0),
                egui::vec2(900.0, 900.0),
                egui::vec2(-900.0, -900.0),
            ] {
                let out = clamp_crop_rect(
                    &image,
                    &viewport,
                    &t,
                    handle.drag_edges(start, delta),
                    handle,
                    &constraints,
                )
                .unwrap();
                assert!(
                    (out.width() / out.height() - 1.5).abs() < EPS,
                    "{handle:?} {delta:?} {out:?}"
                );
                assert!(contains_rect(bounds, out, EPS), "{handle:?} {delta:?} {out:?}");
                assert!(out.height() >= 50.0 - EPS);
            }
        }
    }

    #[test]
    fn corner_with_aspect_keeps_opposite_corner() {
        let (image, viewport, t, crop) = setup();
        let constraints = CropConstraints::new(Some(2.0), 50.0);
        let proposed = ResizeHandle::BottomRight.drag_edges(crop, egui::vec2(100.0, 0.0));
        let out = clamp_crop_rect(
            &image,
            &viewport,
            &t,
            proposed,
            ResizeHandle::BottomRight,
            &constraints,
        )
        .unwrap();
        assert_eq!(out.min, crop.min);
        assert!((out.width() - 300.0).abs() < EPS);
        assert!((out.height() - 150.0).abs() < EPS);
    }

    #[test]
    fn edge_with_aspect_shrinks_to_fit_around_centre() {
        let image = ImageSpec::new(400, 400);
        let viewport = ViewportSpec::new(400.0, 400.0);
        let t = Transform::default();
        let constraints = CropConstraints::new(Some(1.0), 20.0);
        // centred horizontally at x=100, so at most 200 wide
        let crop = egui::Rect::from_min_size(egui::pos2(50.0, 100.0), egui::vec2(100.0, 100.0));
        let proposed = ResizeHandle::Bottom.drag_edges(crop, egui::vec2(0.0, 250.0));
        let out = clamp_crop_rect(
            &image,
            &viewport,
            &t,
            proposed,
            ResizeHandle::Bottom,
            &constraints,
        )
        .unwrap();
        assert!((out.width() - 200.0).abs() < EPS);
        assert!((out.height() - 200.0).abs() < EPS);
        assert!((out.min.x - 0.0).abs() < EPS);
        assert!((out.min.y - 100.0).abs() < EPS);
    }

    #[test]
    fn min_size_grows_from_anchor() {
        let (image, viewport, t, crop) = setup();
        let proposed = ResizeHandle::Left.drag_edges(crop, egui::vec2(190.0, 0.0));
        let out = clamp_crop_rect(
            &image,
            &viewport,
            &t,
            proposed,
            ResizeHandle::Left,
            &CropConstraints::default(),
        )
        .unwrap();
        assert!((out.max.x - crop.max.x).abs() < EPS);
        assert!((out.width() - 50.0).abs() < EPS);
        assert_eq!(out.height(), crop.height());
    }

    #[test]
    fn dragging_past_opposite_edge_keeps_min_size() {
        let (image, viewport, t, crop) = setup();
        let proposed = ResizeHandle::Right.drag_edges(crop, egui::vec2(-400.0, 0.0));
        let out = clamp_crop_rect(
            &image,
            &viewport,
            &t,
            proposed,
            ResizeHandle::Right,
            &CropConstraints::default(),
        )
        .unwrap();
        assert!((out.min.x - crop.min.x).abs() < EPS);
        assert!((out.width() - 50.0).abs() < EPS);
    }

    #[test]
    fn collapsing_without_min_size_is_rejected() {
        let (image, viewport, t, crop) = setup();
        let proposed = ResizeHandle::Right.drag_edges(crop, egui::vec2(-200.0, 0.0));
        let err = clamp_crop_rect(
            &image,
            &viewport,
            &t,
            proposed,
            ResizeHandle::Right,
            &CropConstraints::new(None, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate { .. }));
    }

    #[test]
    fn clamping_is_idempotent() {
        let (image, viewport, t, crop) = setup();
        for constraints in [CropConstraints::default(), CropConstraints::new(Some(0.75), 50.0)] {
            for handle in ResizeHandle::ALL {
                let proposed = handle.drag_edges(crop, egui::vec2(-700.0, 420.0));
                let once =
                    clamp_crop_rect(&image, &viewport, &t, proposed, handle, &constraints).unwrap();
                let twice =
                    clamp_crop_rect(&image, &viewport, &t, once, handle, &constraints).unwrap();
                assert_rect_eq(once, twice);
            }
        }
    }

    #[test]
    fn fit_aspect_keeps_longer_side_and_centre() {
        let bounds = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1000.0, 1000.0));
        let crop = egui::Rect::from_min_size(egui::pos2(100.0, 100.0), egui::vec2(200.0, 100.0));
        let out = fit_aspect(crop, bounds, &CropConstraints::new(Some(0.5), 10.0)).unwrap();
        assert!((out.width() - 100.0).abs() < EPS);
        assert!((out.height() - 200.0).abs() < EPS);
        assert!((out.center() - crop.center()).length() < EPS);
    }

    #[test]
    fn fit_aspect_respects_bounds() {
        let bounds = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(300.0, 200.0));
        let crop = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(300.0, 200.0));
        let out = fit_aspect(crop, bounds, &CropConstraints::new(Some(16.0 / 9.0), 10.0)).unwrap();
        assert!(contains_rect(bounds, out, EPS));
        assert!((out.width() / out.height() - 16.0 / 9.0).abs() < EPS);
        assert!((out.width() - 300.0).abs() < EPS);
    }
}
