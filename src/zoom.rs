use eframe::egui;

use crate::clamp::{self, CropConstraints};
use crate::geometry::{ImageSpec, Transform, ViewportSpec};

/// Upper bound for the zoom slider.
pub const MAX_ZOOM: f32 = 3.0;
/// Head-room over the exact covering zoom so rounding never uncovers the crop.
pub const ZOOM_SLACK: f32 = 1.01;
/// Step used by the −/+ buttons.
pub const ZOOM_STEP: f32 = 0.1;
/// Initial zoom relative to [`min_zoom`].
pub const INITIAL_ZOOM_FACTOR: f32 = 1.5;

const INITIAL_CROP_FRACTION: f32 = 0.6;
const MAX_CROP_FRACTION: f32 = 0.7;

/// Smallest zoom at which the image still covers `crop`.
pub fn min_zoom(image: &ImageSpec, crop: egui::Rect) -> f32 {
    let size = image.size();
    (crop.width() / size.x).max(crop.height() / size.y) * ZOOM_SLACK
}

/// Upper zoom limit; never below [`min_zoom`] for tiny images.
pub fn max_zoom(image: &ImageSpec, crop: egui::Rect) -> f32 {
    MAX_ZOOM.max(min_zoom(image, crop))
}

/// Clamps `requested` into the allowed range and re-clamps pan at the new zoom.
pub fn apply_zoom(
    image: &ImageSpec,
    viewport: &ViewportSpec,
    crop: egui::Rect,
    current: &Transform,
    requested: f32,
) -> Transform {
    let zoom = requested
        .max(min_zoom(image, crop))
        .min(max_zoom(image, crop));
    clamp::clamp_pan(image, viewport, crop, current.with_zoom(zoom))
}

/// Default crop frame, centred in the viewport.
pub fn initial_crop_rect(viewport: &ViewportSpec, constraints: &CropConstraints) -> egui::Rect {
    let mut width = viewport.width.min(viewport.height) * INITIAL_CROP_FRACTION;
    let mut height = match constraints.aspect_ratio {
        Some(ratio) => width / ratio,
        None => width,
    };

    if height > viewport.height * MAX_CROP_FRACTION {
        height = viewport.height * MAX_CROP_FRACTION;
        width = match constraints.aspect_ratio {
            Some(ratio) => height * ratio,
            None => height,
        };
    }

    egui::Rect::from_center_size(viewport.rect().center(), egui::vec2(width, height))
}

/// Crop frame and transform for a freshly loaded image.
pub fn initial_layout(
    image: &ImageSpec,
    viewport: &ViewportSpec,
    constraints: &CropConstraints,
) -> (Transform, egui::Rect) {
    let crop = initial_crop_rect(viewport, constraints);
    let zoom = (min_zoom(image, crop) * INITIAL_ZOOM_FACTOR).min(max_zoom(image, crop));
    let transform = clamp::clamp_pan(
        image,
        viewport,
        crop,
        Transform::new(zoom, egui::Vec2::ZERO),
    );
    log::debug!(
        "initial layout: crop {:.0}x{:.0}, zoom {:.3}",
        crop.width(),
        crop.height(),
        transform.zoom
    );
    (transform, crop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{contains_rect, image_screen_bounds};

    fn setup() -> (ImageSpec, ViewportSpec, egui::Rect) {
        (
            ImageSpec::new(1000, 1000),
            ViewportSpec::new(500.0, 500.0),
            egui::Rect::from_min_size(egui::pos2(150.0, 150.0), egui::vec2(200.0, 200.0)),
        )
    }

    #[test]
    fn min_zoom_covers_crop() {
        for (w, h) in [(1000, 1000), (4000, 300), (300, 4000), (17, 23)] {
            let image = ImageSpec::new(w, h);
            let crop = egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(333.0, 121.0));
            let zoom = min_zoom(&image, crop);
            assert!(w as f32 * zoom >= crop.width());
            assert!(h as f32 * zoom >= crop.height());
        }
    }

    #[test]
    fn zoom_out_stops_at_minimum() {
        let (image, viewport, crop) = setup();
        let t = apply_zoom(&image, &viewport, crop, &Transform::default(), 0.05);
        assert_eq!(t.zoom, min_zoom(&image, crop));
        let bounds = image_screen_bounds(&image, &viewport, &t);
        assert!(contains_rect(bounds, crop, 1e-3));
    }

    #[test]
    fn zoom_in_capped() {
        let (image, viewport, crop) = setup();
        let t = apply_zoom(&image, &viewport, crop, &Transform::default(), 12.0);
        assert_eq!(t.zoom, MAX_ZOOM);
    }

    #[test]
    fn tiny_image_allows_zoom_beyond_max() {
        let image = ImageSpec::new(20, 20);
        let viewport = ViewportSpec::new(500.0, 500.0);
        let crop = egui::Rect::from_min_size(egui::pos2(150.0, 150.0), egui::vec2(200.0, 200.0));
        let t = apply_zoom(&image, &viewport, crop, &Transform::default(), 1.0);
        assert!(t.zoom >= 10.0);
        assert!(contains_rect(image_screen_bounds(&image, &viewport, &t), crop, 1e-3));
    }

    #[test]
    fn zoom_out_reclamps_pan() {
        let (image, viewport, crop) = setup();
        // image right edge sits exactly on the crop's right edge
        let panned = Transform::new(1.0, egui::vec2(-400.0, 0.0));
        let t = apply_zoom(&image, &viewport, crop, &panned, 0.5);
        let bounds = image_screen_bounds(&image, &viewport, &t);
        assert!(contains_rect(bounds, crop, 1e-3));
        assert!((bounds.max.x - crop.max.x).abs() < 1e-3);
    }

    #[test]
    fn initial_crop_square_uses_sixty_percent() {
        let viewport = ViewportSpec::new(800.0, 500.0);
        let crop = initial_crop_rect(&viewport, &CropConstraints::new(Some(1.0), 50.0));
        assert_eq!(crop.size(), egui::vec2(300.0, 300.0));
        assert_eq!(crop.center(), egui::pos2(400.0, 250.0));
    }

    #[test]
    fn initial_crop_tall_ratio_capped() {
        let viewport = ViewportSpec::new(500.0, 500.0);
        let crop = initial_crop_rect(&viewport, &CropConstraints::new(Some(0.5), 50.0));
        assert!((crop.height() - 350.0).abs() < 1e-3);
        assert!((crop.width() - 175.0).abs() < 1e-3);
    }

    #[test]
    fn initial_layout_is_valid() {
        let image = ImageSpec::new(3000, 200);
        let viewport = ViewportSpec::new(640.0, 480.0);
        let constraints = CropConstraints::new(Some(4.0 / 3.0), 50.0);
        let (t, crop) = initial_layout(&image, &viewport, &constraints);
        assert!((t.zoom - min_zoom(&image, crop) * INITIAL_ZOOM_FACTOR).abs() < 1e-4);
        assert!(contains_rect(image_screen_bounds(&image, &viewport, &t), crop, 1e-3));
    }
}
