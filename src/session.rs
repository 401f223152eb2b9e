//! One editing session: a loaded image, its viewport and the live crop state.
//!
//! `CropSession` is the only way to mutate the transform or the crop frame,
//! and every mutation goes through the clamps before it becomes visible.

use eframe::egui;
use image::DynamicImage;

use crate::clamp::{self, CropConstraints};
use crate::export::{self, ExportError, ExportSettings};
use crate::geometry::{self, ImageSpec, Transform, ViewportSpec};
use crate::handle::DragMode;
use crate::interaction::{Interaction, PointerCapture, RenderState};
use crate::source::LoadError;
use crate::zoom;

/// Tolerance for the containment check, in screen px.
pub const CONTAINMENT_EPSILON: f32 = 1e-2;

#[derive(Debug)]
pub struct CropSession {
    image: ImageSpec,
    viewport: ViewportSpec,
    constraints: CropConstraints,
    state: RenderState,
    interaction: Interaction,
}

impl CropSession {
    pub fn new(
        image: ImageSpec,
        viewport: ViewportSpec,
        constraints: CropConstraints,
    ) -> Result<Self, LoadError> {
        if image.natural_width == 0 || image.natural_height == 0 {
            return Err(LoadError::Empty {
                width: image.natural_width,
                height: image.natural_height,
            });
        }
        let (transform, crop) = zoom::initial_layout(&image, &viewport, &constraints);
        let session = Self {
            image,
            viewport,
            constraints,
            state: RenderState { transform, crop },
            interaction: Interaction::default(),
        };
        session.debug_check();
        Ok(session)
    }

    pub fn image_spec(&self) -> &ImageSpec {
        &self.image
    }

    pub fn viewport(&self) -> &ViewportSpec {
        &self.viewport
    }

    pub fn constraints(&self) -> &CropConstraints {
        &self.constraints
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn crop_rect(&self) -> egui::Rect {
        self.state.crop
    }

    pub fn image_bounds(&self) -> egui::Rect {
        geometry::image_screen_bounds(&self.image, &self.viewport, &self.state.transform)
    }

    pub fn min_zoom(&self) -> f32 {
        zoom::min_zoom(&self.image, self.state.crop)
    }

    pub fn max_zoom(&self) -> f32 {
        zoom::max_zoom(&self.image, self.state.crop)
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        self.interaction.drag_mode()
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    /// `true` when `imageScreenBounds ⊇ crop` holds right now.
    pub fn is_valid(&self) -> bool {
        geometry::contains_rect(self.image_bounds(), self.state.crop, CONTAINMENT_EPSILON)
    }

    pub fn pointer_down(
        &mut self,
        point: egui::Pos2,
        mode: DragMode,
        capture: &mut dyn PointerCapture,
    ) -> bool {
        self.interaction
            .pointer_down(point, mode, self.state, capture)
    }

    pub fn pointer_move(&mut self, point: egui::Pos2) {
        if let Some(next) = self.interaction.pointer_move(
            point,
            self.state,
            &self.image,
            &self.viewport,
            &self.constraints,
        ) {
            self.state = next;
            self.debug_check();
        }
    }

    pub fn pointer_up(&mut self, capture: &mut dyn PointerCapture) {
        self.interaction.pointer_up(capture);
    }

    pub fn pointer_cancel(&mut self, capture: &mut dyn PointerCapture) {
        self.interaction.pointer_cancel(capture);
    }

    /// Applies a slider zoom; returns the zoom actually used.
    pub fn set_zoom(&mut self, requested: f32) -> f32 {
        self.state.transform = zoom::apply_zoom(
            &self.image,
            &self.viewport,
            self.state.crop,
            &self.state.transform,
            requested,
        );
        log::debug!("zoom {requested:.3} -> {:.3}", self.state.transform.zoom);
        self.debug_check();
        self.state.transform.zoom
    }

    pub fn zoom_by(&mut self, delta: f32) -> f32 {
        self.set_zoom(self.state.transform.zoom + delta)
    }

    /// Locks (or frees) the aspect ratio and re-shapes the crop to match.
    ///
    /// Ends any live drag first so the snapshot can't reapply the old shape.
    pub fn set_aspect_ratio(
        &mut self,
        aspect_ratio: Option<f32>,
        capture: &mut dyn PointerCapture,
    ) {
        if self.interaction.is_dragging() {
            self.interaction.pointer_cancel(capture);
        }
        self.constraints.aspect_ratio = aspect_ratio;
        match clamp::fit_aspect(self.state.crop, self.image_bounds(), &self.constraints) {
            Ok(crop) => self.state.crop = crop,
            Err(err) => log::warn!("aspect change kept previous crop: {err}"),
        }
        if self.state.transform.zoom < self.min_zoom() {
            self.set_zoom(self.state.transform.zoom);
        }
        self.debug_check();
    }

    /// New container size; lays the crop out again from scratch.
    pub fn set_viewport(&mut self, viewport: ViewportSpec) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.reset();
    }

    /// Back to the initial layout for the current viewport and constraints.
    pub fn reset(&mut self) {
        let (transform, crop) =
            zoom::initial_layout(&self.image, &self.viewport, &self.constraints);
        self.state = RenderState { transform, crop };
        self.debug_check();
    }

    /// Crop rectangle in image pixels.
    pub fn source_rect(&self) -> egui::Rect {
        export::source_rect(
            self.state.crop,
            &self.image,
            &self.viewport,
            &self.state.transform,
        )
    }

    /// Rasterizes the crop of `image` into an encoded JPEG.
    pub fn export(
        &self,
        image: &DynamicImage,
        settings: &ExportSettings,
    ) -> Result<Vec<u8>, ExportError> {
        export::export_crop(
            image,
            &self.image,
            &self.viewport,
            &self.state.transform,
            self.state.crop,
            settings,
        )
    }

    fn debug_check(&self) {
        debug_assert!(
            self.is_valid(),
            "crop {:?} escaped image bounds {:?}",
            self.state.crop,
            self.image_bounds()
        );
    }
}
