//! Model lifecycle and stage rendering for `StudioApp`.
//!
//! The GLB asset loads on a background thread (spinner placeholder until
//! it resolves); every load rebuilds the plane registries because node
//! handles do not survive a reload. Card content is synced onto matched
//! planes whenever the store raises the dirty flag, and the stage is
//! re-rendered lazily: degraded resolution while orbiting, full
//! resolution at rest.

use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;
use glam::Mat4;

use visual_mpc::render::{self, auto_camera, render_model};
use visual_mpc::scene::gltf as model_loader;
use visual_mpc::scene::texture as content_texture;

use super::{LayoutKind, StudioApp};

pub const MODEL_PATH: &str = "assets/models/prototype_v4_03_01.glb";

impl StudioApp {
    /// Kick off the initial model load once.
    pub fn ensure_model_load(&mut self, ctx: &egui::Context) {
        if self.model.is_none()
            && self.model_rx.is_none()
            && !self.model_loading
            && self.model_error.is_none()
        {
            self.start_model_load(ctx);
        }
    }

    /// Start an async model (re)load.
    pub fn start_model_load(&mut self, ctx: &egui::Context) {
        self.model_loading = true;
        self.model_error = None;

        let (tx, rx) = mpsc::channel();
        self.model_rx = Some(rx);

        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = model_loader::load_model(Path::new(MODEL_PATH));
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll the async load channel and swap the model in when it arrives.
    pub fn check_model(&mut self) {
        if let Some(rx) = &self.model_rx {
            if let Ok(result) = rx.try_recv() {
                match result {
                    Ok(model) => {
                        // Registration is explicit per load: handles into the
                        // old scene are void now.
                        self.registry.clear();
                        self.registry.register_planes(&model);
                        self.registry.register_scaled_plane(&model);
                        self.cam = auto_camera(&model);
                        self.model = Some(model);
                        self.scene_texture = None;
                        self.cards_dirty.set(true);
                        self.cam_dirty = true;
                    }
                    Err(e) => {
                        log::warn!("model load failed: {}", e);
                        self.model_error = Some(e.to_string());
                    }
                }
                self.model_loading = false;
                self.model_rx = None;
            }
        }
    }

    /// Advance the play-mode spin. Studio spins the head faster than the
    /// theater spins the stage.
    pub fn advance_spin(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        if self.store.state().is_playing && self.model.is_some() {
            let rate = match self.layout {
                LayoutKind::Studio => 0.2,
                LayoutKind::Theater => 0.1,
            };
            self.spin += dt * rate;
            self.cam_dirty = true;
            ctx.request_repaint();
        }
    }

    /// Re-run the content-to-texture sync when cards or selection changed.
    /// Row planes take their card's content; the scaled plane mirrors the
    /// selected card.
    pub fn sync_plane_textures(&mut self) {
        if !self.cards_dirty.get() {
            return;
        }
        // Keep the flag raised until a model exists to sync against.
        let Some(model) = self.model.as_mut() else {
            return;
        };
        self.cards_dirty.set(false);

        for card in &self.store.state().cards {
            if let Some(entry) = self.registry.lookup(&card.id) {
                if let Some(node) = model.node_mut(entry.node) {
                    content_texture::sync_content(&mut node.materials, &card.content);
                }
            }
        }
        if let Some(entry) = self.registry.scaled_plane() {
            if let Some(card) = self.store.state().selected_card() {
                if let Some(node) = model.node_mut(entry.node) {
                    content_texture::sync_content(&mut node.materials, &card.content);
                }
            }
        }

        self.cam_dirty = true;
    }

    /// Draw the 3D stage. Returns the painted rect so callers can layer
    /// overlays on top.
    pub fn draw_viewport(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
    ) -> Option<egui::Rect> {
        if self.model_loading || (self.model.is_none() && self.model_error.is_none()) {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return None;
        }
        if let Some(err) = self.model_error.clone() {
            ui.centered_and_justified(|ui| {
                ui.colored_label(
                    egui::Color32::from_rgb(255, 80, 80),
                    format!("Model unavailable: {}", err),
                );
            });
            return None;
        }

        let response =
            ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());

        // Orbit
        if response.dragged() {
            let delta = response.drag_delta();
            self.cam.azimuth += delta.x * 0.008;
            self.cam.elevation = (self.cam.elevation - delta.y * 0.008)
                .clamp(0.05, std::f32::consts::FRAC_PI_2 - 0.05);
            self.cam_dirty = true;
            self.cam_dragging = true;
        } else if self.cam_dragging {
            // Drag ended: one full-resolution pass
            self.cam_dragging = false;
            self.cam_dirty = true;
        }

        // Dolly
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.cam.distance =
                    (self.cam.distance * (1.0 - scroll * 0.003)).clamp(0.2, 100.0);
                self.cam_dirty = true;
            }
        }

        self.render_stage_if_dirty(ctx);

        if let Some(tex) = &self.scene_texture {
            ui.painter().image(
                tex.id(),
                response.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            ui.painter().text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "Stage is empty",
                egui::FontId::proportional(14.0),
                egui::Color32::GRAY,
            );
        }

        ui.painter().text(
            response.rect.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            format!("Drag: rotate | Scroll: zoom | d={:.1}", self.cam.distance),
            egui::FontId::proportional(12.0),
            egui::Color32::from_rgba_unmultiplied(255, 255, 255, 180),
        );

        Some(response.rect)
    }

    /// Degraded while orbiting, medium while the play spin forces a
    /// render every frame, full at rest.
    pub fn stage_resolution(&self) -> (usize, usize) {
        if self.cam_dragging {
            (320, 240)
        } else if self.store.state().is_playing {
            (640, 480)
        } else {
            (960, 720)
        }
    }

    fn render_stage_if_dirty(&mut self, ctx: &egui::Context) {
        if !(self.cam_dirty || self.scene_texture.is_none()) {
            return;
        }
        let (w, h) = self.stage_resolution();
        let Some(model) = &self.model else {
            return;
        };

        let pixels = match self.layout {
            LayoutKind::Studio => render_model(model, w, h, &self.cam, self.spin),
            LayoutKind::Theater => {
                let platforms = super::theater::platform_scene(&self.store.state().cards);
                let mut instances =
                    render::instances_of(model, Mat4::from_rotation_y(self.spin));
                instances.extend(render::instances_of(&platforms, Mat4::IDENTITY));
                render::render_instances(&instances, w, h, &self.cam)
            }
        };

        if let Some(pixels) = pixels {
            let image = egui::ColorImage::from_rgba_unmultiplied([w, h], &pixels);
            self.scene_texture =
                Some(ctx.load_texture("stage_view", image, egui::TextureOptions::LINEAR));
        }
        self.cam_dirty = false;

        // Textures are on screen now; drop the re-upload marks.
        if let Some(model) = self.model.as_mut() {
            for node in &mut model.nodes {
                if let Some(material) = node.materials.first_mut() {
                    material.needs_update = false;
                }
            }
        }
    }
}
