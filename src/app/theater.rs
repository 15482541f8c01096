//! Theater layout for `StudioApp`.
//!
//! The presentation shell: a stage showing the model over a floor plane
//! with one gradient-coloured platform per card (five across, one rank
//! per row), card labels projected into screen space, and the 2D panel
//! below. The platforms sit outside the spinning group, so play mode
//! rotates the model while the row grid stays put.

use eframe::egui;
use glam::{Mat4, Vec3};

use visual_mpc::board as engine;
use visual_mpc::render::Camera;
use visual_mpc::scene::{Material, MaterialSlots, MeshData, SceneModel, SceneNode};
use visual_mpc::store::{ContentCard, ViewMode};

use super::StudioApp;

/// World position of card platform `i`: five per rank, ranks receding.
pub fn platform_position(index: usize) -> Vec3 {
    let column = (index % engine::CARDS_PER_ROW) as f32;
    let rank = (index / engine::CARDS_PER_ROW) as f32;
    Vec3::new((column - 2.0) * 2.0, 0.5, rank * -2.0)
}

/// Build the stage dressing: the floor and one platform per card.
pub fn platform_scene(cards: &[ContentCard]) -> SceneModel {
    let mut scene = SceneModel::default();

    let mut floor = SceneNode::new("stage_floor");
    floor.mesh = Some(MeshData::cuboid([20.0, 0.2, 15.0]));
    floor.transform = Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0));
    floor.materials = MaterialSlots::Single(Material {
        base_color: [0.1, 0.1, 0.1, 1.0],
        ..Default::default()
    });
    scene.push(floor);

    for (i, card) in cards.iter().enumerate() {
        let mut platform = SceneNode::new(format!("platform_{}", card.id));
        platform.mesh = Some(MeshData::cuboid([1.5, 0.1, 1.0]));
        platform.transform = Mat4::from_translation(platform_position(i));
        let [r, g, b] = card.gradient.top;
        platform.materials = MaterialSlots::Single(Material {
            base_color: [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0],
            ..Default::default()
        });
        scene.push(platform);
    }

    scene
}

impl StudioApp {
    pub fn draw_theater(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        match self.store.state().mode {
            ViewMode::TwoD => self.draw_panel(ui),
            ViewMode::ThreeD => self.draw_stage(ui, ctx),
            ViewMode::Hybrid => {
                let stage_h = ui.available_height() * 2.0 / 3.0;
                ui.allocate_ui(egui::vec2(ui.available_width(), stage_h), |ui| {
                    ui.set_min_height(stage_h);
                    self.draw_stage(ui, ctx);
                });
                ui.separator();
                self.draw_panel(ui);
            }
        }
    }

    fn draw_stage(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if let Some(rect) = self.draw_viewport(ui, ctx) {
            self.draw_stage_overlays(ui, rect);
        }
    }

    fn draw_stage_overlays(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        let camera = Camera::from_params(&self.cam);
        let state = self.store.state();

        // Card info floating above each platform
        for (i, card) in state.cards.iter().enumerate() {
            let anchor = platform_position(i) + Vec3::new(0.0, 0.3, 0.0);
            let Some([sx, sy]) = camera.project(anchor, rect.width(), rect.height())
            else {
                continue;
            };
            let at = rect.left_top() + egui::vec2(sx, sy);
            if !rect.contains(at) {
                continue;
            }

            let pill = egui::Rect::from_center_size(at, egui::vec2(112.0, 30.0));
            painter.rect_filled(pill, 4.0, egui::Color32::from_black_alpha(180));
            let title: String = card.title.chars().take(16).collect();
            painter.text(
                at - egui::vec2(0.0, 7.0),
                egui::Align2::CENTER_CENTER,
                title,
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
            painter.text(
                at + egui::vec2(0.0, 7.0),
                egui::Align2::CENTER_CENTER,
                card.card_type.label(),
                egui::FontId::proportional(9.0),
                egui::Color32::from_gray(170),
            );
        }

        // Mode badge, top left
        let badge = egui::Rect::from_min_size(
            rect.left_top() + egui::vec2(12.0, 12.0),
            egui::vec2(170.0, 40.0),
        );
        painter.rect_filled(badge, 6.0, egui::Color32::from_black_alpha(180));
        painter.text(
            badge.left_top() + egui::vec2(10.0, 6.0),
            egui::Align2::LEFT_TOP,
            "Theater Mode",
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
        painter.text(
            badge.left_top() + egui::vec2(10.0, 22.0),
            egui::Align2::LEFT_TOP,
            "Orthographic Row View",
            egui::FontId::proportional(10.0),
            egui::Color32::from_gray(170),
        );

        // Row / card counts, bottom right
        let counts = egui::Rect::from_min_size(
            rect.right_bottom() + egui::vec2(-150.0, -52.0),
            egui::vec2(138.0, 40.0),
        );
        painter.rect_filled(counts, 6.0, egui::Color32::from_black_alpha(180));
        painter.text(
            counts.left_top() + egui::vec2(10.0, 6.0),
            egui::Align2::LEFT_TOP,
            format!("Active Rows: {}", engine::row_count(state)),
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
        painter.text(
            counts.left_top() + egui::vec2(10.0, 22.0),
            egui::Align2::LEFT_TOP,
            format!("Total Cards: {}", state.cards.len()),
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
    }
}
