//! Toolbar rendering for `StudioApp`.
//!
//! Draws the view-mode toggle, the play/stop control, the layout switch
//! and the stats toggle. Invalid actions never error out — they are
//! simply not offered.

use eframe::egui;

use visual_mpc::store::ViewMode;

use super::{LayoutKind, StudioApp};

impl StudioApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);
            ui.strong("Visual MPC IDE");
            ui.separator();

            // Mode toggle. The theater shell names its modes after the
            // stage, the studio after the body/head split.
            let labels: [(ViewMode, &str); 3] = match self.layout {
                LayoutKind::Studio => [
                    (ViewMode::TwoD, "2D Body"),
                    (ViewMode::Hybrid, "Hybrid"),
                    (ViewMode::ThreeD, "3D Head"),
                ],
                LayoutKind::Theater => [
                    (ViewMode::TwoD, "2D Panel"),
                    (ViewMode::Hybrid, "Theater"),
                    (ViewMode::ThreeD, "3D Stage"),
                ],
            };
            let current = self.store.state().mode;
            for (mode, label) in labels {
                if ui.selectable_label(current == mode, label).clicked() && current != mode {
                    self.store.set_mode(mode);
                }
            }

            ui.separator();

            // Play / stop
            let playing = self.store.state().is_playing;
            let play_label = if playing { "\u{25A0} Stop" } else { "\u{25B6} Play" };
            if ui.button(play_label).clicked() {
                self.store.set_playing(!playing);
            }

            ui.separator();

            // Layout switch
            let prev_layout = self.layout;
            egui::ComboBox::from_id_salt("layout")
                .selected_text(match self.layout {
                    LayoutKind::Studio => "Studio",
                    LayoutKind::Theater => "Theater",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.layout, LayoutKind::Studio, "Studio");
                    ui.selectable_value(&mut self.layout, LayoutKind::Theater, "Theater");
                });
            // The stage composition differs per layout; force a re-render
            if self.layout != prev_layout {
                self.cam_dirty = true;
            }

            ui.toggle_value(&mut self.show_stats, "Stats");
        });
    }
}
