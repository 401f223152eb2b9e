//! Single-pointer drag state machine.
//!
//! `Idle --down--> Dragging --move--> Dragging --up/cancel--> Idle`. Every move
//! is recomputed from the snapshot taken at pointer-down plus the total
//! pointer delta, and always passes through the clamps in [`crate::clamp`].

use eframe::egui;

use crate::clamp::{self, CropConstraints};
use crate::geometry::{ImageSpec, Transform, ViewportSpec};
use crate::handle::DragMode;

/// Platform hook for grabbing the pointer while a drag is live.
pub trait PointerCapture {
    fn capture(&mut self);
    fn release(&mut self);
}

/// What a renderer reads each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub transform: Transform,
    pub crop: egui::Rect,
}

/// Snapshot taken on pointer-down; lives until pointer-up or cancel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub mode: DragMode,
    pub pointer_start: egui::Pos2,
    pub transform_at_start: Transform,
    pub crop_at_start: egui::Rect,
}

impl DragSession {
    pub fn new(mode: DragMode, pointer_start: egui::Pos2, state: RenderState) -> Self {
        Self {
            mode,
            pointer_start,
            transform_at_start: state.transform,
            crop_at_start: state.crop,
        }
    }

    /// The clamped state for the pointer now being at `pointer`.
    pub fn drag_to(
        &self,
        pointer: egui::Pos2,
        current: RenderState,
        image: &ImageSpec,
        viewport: &ViewportSpec,
        constraints: &CropConstraints,
    ) -> RenderState {
        let delta = pointer - self.pointer_start;
        match self.mode {
            DragMode::Pan => {
                let proposed = current
                    .transform
                    .with_pan(self.transform_at_start.pan + delta);
                RenderState {
                    transform: clamp::clamp_pan(image, viewport, current.crop, proposed),
                    crop: current.crop,
                }
            }
            DragMode::MoveCrop => RenderState {
                transform: current.transform,
                crop: clamp::clamp_crop_translation(
                    image,
                    viewport,
                    &current.transform,
                    self.crop_at_start.translate(delta),
                ),
            },
            DragMode::Resize(handle) => {
                let proposed = handle.drag_edges(self.crop_at_start, delta);
                match clamp::clamp_crop_rect(
                    image,
                    viewport,
                    &current.transform,
                    proposed,
                    handle,
                    constraints,
                ) {
                    Ok(crop) => RenderState {
                        transform: current.transform,
                        crop,
                    },
                    Err(err) => {
                        log::warn!("resize {} rejected: {err}", handle.compass());
                        current
                    }
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        match &self.state {
            InteractionState::Dragging(drag) => Some(drag.mode),
            InteractionState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    /// Starts a drag. A second pointer-down while dragging is ignored.
    pub fn pointer_down(
        &mut self,
        point: egui::Pos2,
        mode: DragMode,
        current: RenderState,
        capture: &mut dyn PointerCapture,
    ) -> bool {
        if self.is_dragging() {
            log::debug!("ignoring pointer-down at {point:?}: drag already active");
            return false;
        }
        capture.capture();
        self.state = InteractionState::Dragging(DragSession::new(mode, point, current));
        log::debug!("drag start {mode:?} at {point:?}");
        true
    }

    /// `None` while idle, otherwise the next render state.
    pub fn pointer_move(
        &self,
        point: egui::Pos2,
        current: RenderState,
        image: &ImageSpec,
        viewport: &ViewportSpec,
        constraints: &CropConstraints,
    ) -> Option<RenderState> {
        match &self.state {
            InteractionState::Dragging(drag) => {
                Some(drag.drag_to(point, current, image, viewport, constraints))
            }
            InteractionState::Idle => None,
        }
    }

    pub fn pointer_up(&mut self, capture: &mut dyn PointerCapture) {
        self.finish(capture, "up");
    }

    pub fn pointer_cancel(&mut self, capture: &mut dyn PointerCapture) {
        self.finish(capture, "cancel");
    }

    fn finish(&mut self, capture: &mut dyn PointerCapture, how: &str) {
        capture.release();
        if let InteractionState::Dragging(drag) = std::mem::take(&mut self.state) {
            log::debug!("drag {how} after {:?}", drag.mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ResizeHandle;

    #[derive(Default)]
    struct CountingCapture {
        captures: usize,
        releases: usize,
    }

    impl PointerCapture for CountingCapture {
        fn capture(&mut self) {
            self.captures += 1;
        }

        fn release(&mut self) {
            self.releases += 1;
        }
    }

    fn start() -> (ImageSpec, ViewportSpec, RenderState) {
        (
            ImageSpec::new(1000, 1000),
            ViewportSpec::new(500.0, 500.0),
            RenderState {
                transform: Transform::default(),
                crop: egui::Rect::from_min_size(egui::pos2(150.0, 150.0), egui::vec2(200.0, 200.0)),
            },
        )
    }

    #[test]
    fn second_pointer_down_is_ignored() {
        let (_, _, state) = start();
        let mut capture = CountingCapture::default();
        let mut machine = Interaction::default();
        assert!(machine.pointer_down(egui::pos2(10.0, 10.0), DragMode::Pan, state, &mut capture));
        assert!(!machine.pointer_down(
            egui::pos2(200.0, 200.0),
            DragMode::MoveCrop,
            state,
            &mut capture
        ));
        assert_eq!(machine.drag_mode(), Some(DragMode::Pan));
        assert_eq!(capture.captures, 1);
    }

    #[test]
    fn cancel_releases_and_idles() {
        let (_, _, state) = start();
        let mut capture = CountingCapture::default();
        let mut machine = Interaction::default();
        machine.pointer_down(egui::pos2(10.0, 10.0), DragMode::Pan, state, &mut capture);
        machine.pointer_cancel(&mut capture);
        assert_eq!(capture.releases, 1);
        assert_eq!(*machine.state(), InteractionState::Idle);
    }

    #[test]
    fn move_while_idle_is_noop() {
        let (image, viewport, state) = start();
        let machine = Interaction::default();
        let next = machine.pointer_move(
            egui::pos2(99.0, 99.0),
            state,
            &image,
            &viewport,
            &CropConstraints::default(),
        );
        assert_eq!(next, None);
    }

    #[test]
    fn moves_are_relative_to_drag_start() {
        let (image, viewport, state) = start();
        let mut capture = CountingCapture::default();
        let mut machine = Interaction::default();
        let constraints = CropConstraints::default();
        machine.pointer_down(egui::pos2(200.0, 200.0), DragMode::MoveCrop, state, &mut capture);

        let first = machine
            .pointer_move(egui::pos2(210.0, 200.0), state, &image, &viewport, &constraints)
            .unwrap();
        let second = machine
            .pointer_move(egui::pos2(230.0, 190.0), first, &image, &viewport, &constraints)
            .unwrap();
        assert_eq!(second.crop.min, egui::pos2(180.0, 140.0));
        assert_eq!(second.transform, state.transform);
    }

    #[test]
    fn pan_drag_is_clamped() {
        let (image, viewport, state) = start();
        let mut capture = CountingCapture::default();
        let mut machine = Interaction::default();
        machine.pointer_down(egui::pos2(0.0, 0.0), DragMode::Pan, state, &mut capture);
        let next = machine
            .pointer_move(
                egui::pos2(1000.0, 0.0),
                state,
                &image,
                &viewport,
                &CropConstraints::default(),
            )
            .unwrap();
        // image left edge may not pass the crop's left edge at x=150
        assert_eq!(next.transform.pan, egui::vec2(400.0, 0.0));
        assert_eq!(next.crop, state.crop);
    }

    #[test]
    fn degenerate_resize_keeps_previous_crop() {
        let (image, viewport, state) = start();
        let mut capture = CountingCapture::default();
        let mut machine = Interaction::default();
        let constraints = CropConstraints::new(None, 0.0);
        machine.pointer_down(
            egui::pos2(350.0, 250.0),
            DragMode::Resize(ResizeHandle::Right),
            state,
            &mut capture,
        );
        let next = machine
            .pointer_move(egui::pos2(100.0, 250.0), state, &image, &viewport, &constraints)
            .unwrap();
        assert_eq!(next, state);
    }
}
