//! Desktop shell around [`CropSession`].

use std::path::Path;

use eframe::egui;

use crate::aspect::{self, AspectRatioMode};
use crate::clamp::CropConstraints;
use crate::config::CropperConfig;
use crate::geometry::ViewportSpec;
use crate::handle::{self, DragMode, HANDLE_TOLERANCE, ResizeHandle};
use crate::interaction::PointerCapture;
use crate::session::CropSession;
use crate::source::SourceImage;
use crate::zoom::ZOOM_STEP;

const IMAGE_FILTER: &[&str] = &["png", "jpg", "jpeg", "bmp"];
const SCROLL_ZOOM_SPEED: f32 = 0.002;

/// Tracks whether the editor owns the pointer; egui keeps the drag itself.
#[derive(Default)]
struct DragCapture {
    captured: bool,
}

impl PointerCapture for DragCapture {
    fn capture(&mut self) {
        self.captured = true;
    }

    fn release(&mut self) {
        self.captured = false;
    }
}

enum Status {
    Info(String),
    Error(String),
}

pub struct CropperApp {
    config: CropperConfig,
    source: Option<SourceImage>,
    texture: Option<egui::TextureHandle>,
    session: Option<CropSession>,
    aspect_ratio_mode: AspectRatioMode,
    custom_w: u32,
    custom_h: u32,
    is_portrait: bool,
    capture: DragCapture,
    status: Option<Status>,
}

impl CropperApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: CropperConfig) -> Self {
        let aspect_ratio_mode = AspectRatioMode::from_ratio(config.aspect_ratio);
        let (custom_w, custom_h) = match (aspect_ratio_mode, config.aspect_ratio) {
            (AspectRatioMode::Custom, Some(ratio)) => aspect::approximate_ratio(ratio),
            _ => (4, 3),
        };
        Self {
            is_portrait: aspect_ratio_mode.is_portrait(),
            aspect_ratio_mode,
            custom_w,
            custom_h,
            config,
            source: None,
            texture: None,
            session: None,
            capture: DragCapture::default(),
            status: None,
        }
    }

    fn current_ratio(&self) -> Option<f32> {
        let spec = self.source.as_ref().map(SourceImage::spec);
        self.aspect_ratio_mode
            .ratio(spec.as_ref(), (self.custom_w, self.custom_h))
    }

    fn load_path(&mut self, ctx: &egui::Context, path: &Path) {
        match SourceImage::open(path) {
            Ok(source) => {
                let size = [source.spec().natural_width as _, source.spec().natural_height as _];
                let image_buffer = source.image().to_rgba8();
                let pixels = image_buffer.as_flat_samples();
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
                self.texture =
                    Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
                self.source = Some(source);
                // Laid out on the next frame, once the viewport size is known.
                self.session = None;
                self.capture.release();
                self.status = None;
            }
            Err(err) => {
                log::error!("Failed to load {}: {err}", path.display());
                self.status = Some(Status::Error(err.to_string()));
            }
        }
    }

    fn discard(&mut self) {
        log::info!("Crop session discarded");
        self.source = None;
        self.texture = None;
        self.session = None;
        self.capture.release();
    }

    fn commit(&mut self) {
        let (Some(source), Some(session)) = (&self.source, &self.session) else {
            return;
        };
        let settings = self.config.export_settings(session.constraints().aspect_ratio);
        let bytes = match session.export(source.image(), &settings) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Export failed: {err}");
                self.status = Some(Status::Error(err.to_string()));
                return;
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name("cropped.jpg")
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, &bytes) {
            Ok(()) => {
                let (w, h) = settings.output_dimensions();
                log::info!("Saved {w}x{h} crop to {} ({} bytes)", path.display(), bytes.len());
                self.status = Some(Status::Info(format!("Saved {}", path.display())));
                self.discard();
            }
            Err(err) => {
                log::error!("Failed to save {}: {err}", path.display());
                self.status = Some(Status::Error(format!("Failed to save image: {err}")));
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open Image").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", IMAGE_FILTER)
                    .pick_file()
                {
                    self.load_path(ui.ctx(), &path);
                }
            }

            if self.session.is_some() {
                ui.separator();
                self.aspect_controls(ui);
                ui.separator();

                if ui.button("Reset").clicked() {
                    if let Some(session) = self.session.as_mut() {
                        session.reset();
                    }
                }
                if ui.button("Cancel").clicked() {
                    self.discard();
                }
                if ui.button("Use This Image").clicked() {
                    self.commit();
                }
            }

            match &self.status {
                Some(Status::Info(text)) => {
                    ui.label(text);
                }
                Some(Status::Error(text)) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, text);
                }
                None => {}
            }
        });
    }

    fn aspect_controls(&mut self, ui: &mut egui::Ui) {
        ui.label("Aspect Ratio:");
        let mut changed = false;
        egui::ComboBox::from_id_salt("params_aspect_ratio")
            .selected_text(format!("{}", self.aspect_ratio_mode))
            .show_ui(ui, |ui| {
                for mode in [
                    AspectRatioMode::Free,
                    AspectRatioMode::Original,
                    AspectRatioMode::Square,
                ] {
                    changed |= ui
                        .selectable_value(&mut self.aspect_ratio_mode, mode, mode.to_string())
                        .changed();
                }

                ui.separator();
                let presets = if self.is_portrait {
                    AspectRatioMode::PORTRAIT
                } else {
                    AspectRatioMode::LANDSCAPE
                };
                for mode in presets {
                    changed |= ui
                        .selectable_value(&mut self.aspect_ratio_mode, mode, mode.to_string())
                        .changed();
                }

                ui.separator();
                changed |= ui
                    .selectable_value(
                        &mut self.aspect_ratio_mode,
                        AspectRatioMode::Custom,
                        "Custom",
                    )
                    .changed();
            });

        if ui.button("🔄").clicked() {
            self.is_portrait = !self.is_portrait;
            if self.aspect_ratio_mode == AspectRatioMode::Custom {
                std::mem::swap(&mut self.custom_w, &mut self.custom_h);
            } else {
                self.aspect_ratio_mode = self.aspect_ratio_mode.counterpart();
            }
            changed = true;
        }

        if self.aspect_ratio_mode == AspectRatioMode::Custom {
            changed |= ui
                .add(
                    egui::DragValue::new(&mut self.custom_w)
                        .speed(0.1)
                        .range(1..=100),
                )
                .changed();
            ui.label(":");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut self.custom_h)
                        .speed(0.1)
                        .range(1..=100),
                )
                .changed();
        }

        if changed {
            let ratio = self.current_ratio();
            if let Some(session) = self.session.as_mut() {
                session.set_aspect_ratio(ratio, &mut self.capture);
            }
        }
    }

    fn zoom_bar(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let min = session.min_zoom();
        let max = session.max_zoom();
        let mut zoom = session.transform().zoom;

        ui.horizontal(|ui| {
            if ui.add_enabled(zoom > min, egui::Button::new("➖")).clicked() {
                zoom = session.zoom_by(-ZOOM_STEP);
            }
            if ui
                .add(egui::Slider::new(&mut zoom, min..=max).show_value(false))
                .changed()
            {
                zoom = session.set_zoom(zoom);
            }
            if ui.add_enabled(zoom < max, egui::Button::new("➕")).clicked() {
                zoom = session.zoom_by(ZOOM_STEP);
            }
            ui.label(format!("{:.0}%", zoom * 100.0));
        });
        ui.label("Drag the image to pan • drag the frame to move • drag a handle to resize");
    }

    fn editor(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = &self.texture else {
            ui.centered_and_justified(|ui| {
                ui.label("Open or drop an image to start cropping");
            });
            return;
        };

        let (viewport_rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());
        if viewport_rect.width() < 1.0 || viewport_rect.height() < 1.0 {
            return;
        }
        let viewport = ViewportSpec::new(viewport_rect.width(), viewport_rect.height());

        if self.session.is_none() {
            let ratio = self.current_ratio();
            let constraints = CropConstraints::new(ratio, self.config.min_crop_size);
            if let Some(source) = &self.source {
                match CropSession::new(source.spec(), viewport, constraints) {
                    Ok(session) => self.session = Some(session),
                    Err(err) => {
                        log::error!("Cannot edit image: {err}");
                        self.status = Some(Status::Error(err.to_string()));
                        return;
                    }
                }
            }
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.set_viewport(viewport);

        let origin = viewport_rect.min.to_vec2();
        let to_local = |p: egui::Pos2| p - origin;

        // Handle input
        if response.drag_started() {
            let press = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(pos) = press {
                let local = to_local(pos);
                let mode = handle::hit_test(local, session.crop_rect(), HANDLE_TOLERANCE);
                session.pointer_down(local, mode, &mut self.capture);
            }
        }

        if response.dragged() && session.is_dragging() {
            if let Some(pos) = response.interact_pointer_pos() {
                session.pointer_move(to_local(pos));
            }
        }

        if response.drag_stopped() {
            session.pointer_up(&mut self.capture);
        } else if session.is_dragging() && !ui.input(|i| i.pointer.any_down()) {
            // Focus loss and similar interruptions never report a drag stop.
            session.pointer_cancel(&mut self.capture);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                session.zoom_by(scroll * SCROLL_ZOOM_SPEED);
            }
            let hover_mode = session.drag_mode().or_else(|| {
                let pos = ui.input(|i| i.pointer.hover_pos())?;
                Some(handle::hit_test(
                    to_local(pos),
                    session.crop_rect(),
                    HANDLE_TOLERANCE,
                ))
            });
            if let Some(mode) = hover_mode {
                ui.ctx().set_cursor_icon(mode.cursor(self.capture.captured));
            }
        }

        paint(ui, viewport_rect, texture, session);
    }
}

fn paint(
    ui: &egui::Ui,
    viewport_rect: egui::Rect,
    texture: &egui::TextureHandle,
    session: &CropSession,
) {
    let painter = ui.painter_at(viewport_rect);
    let origin = viewport_rect.min.to_vec2();
    let image_rect = session.image_bounds().translate(origin);
    let crop = session.crop_rect().translate(origin);

    painter.rect_filled(viewport_rect, 0.0, egui::Color32::from_gray(16));

    // Draw image
    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    // Draw overlay (dimmed area outside crop)
    let overlay_color = egui::Color32::from_black_alpha(150);
    let full = viewport_rect;
    for rect in [
        egui::Rect::from_min_max(full.min, egui::pos2(full.max.x, crop.min.y)),
        egui::Rect::from_min_max(egui::pos2(full.min.x, crop.max.y), full.max),
        egui::Rect::from_min_max(
            egui::pos2(full.min.x, crop.min.y),
            egui::pos2(crop.min.x, crop.max.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(crop.max.x, crop.min.y),
            egui::pos2(full.max.x, crop.max.y),
        ),
    ] {
        painter.rect_filled(rect, 0.0, overlay_color);
    }

    // Rule-of-thirds grid
    let grid = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(110));
    for t in [1.0 / 3.0, 2.0 / 3.0] {
        let x = crop.min.x + crop.width() * t;
        let y = crop.min.y + crop.height() * t;
        painter.line_segment([egui::pos2(x, crop.min.y), egui::pos2(x, crop.max.y)], grid);
        painter.line_segment([egui::pos2(crop.min.x, y), egui::pos2(crop.max.x, y)], grid);
    }

    // Draw crop border
    painter.rect_stroke(crop, 0.0, egui::Stroke::new(2.0, egui::Color32::WHITE));

    // Draw handles
    let handle_radius = 6.0;
    let handle_stroke = egui::Stroke::new(1.5, egui::Color32::from_rgb(59, 130, 246));
    let handle_fill = egui::Color32::WHITE;
    for handle in ResizeHandle::ALL {
        painter.circle(handle.position(crop), handle_radius, handle_fill, handle_stroke);
    }

    // Size indicator
    painter.text(
        crop.center_bottom() + egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_TOP,
        format!("{:.0} × {:.0}", crop.width(), crop.height()),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );

    if session.drag_mode() == Some(DragMode::Pan) {
        let outline = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(60));
        painter.rect_stroke(image_rect, 0.0, outline);
    }
}

impl eframe::App for CropperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
            if let Some(path) = dropped_files.first().and_then(|file| file.path.clone()) {
                self.load_path(ctx, &path);
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        if self.session.is_some() {
            egui::TopBottomPanel::bottom("zoom").show(ctx, |ui| {
                self.zoom_bar(ui);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor(ui);
        });
    }
}
