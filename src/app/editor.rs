//! Full-surface card editor for `StudioApp`.
//!
//! Takes over the studio surface when a card is opened: the left panel
//! lists every card (rotated so the open one leads), the right panel
//! edits title, type and content. Edits flow through the board's
//! content-update path live on change; Save re-applies the buffers,
//! Close drops the selection.

use eframe::egui;

use visual_mpc::board as engine;
use visual_mpc::store::{CardPatch, CardType};

use super::board::type_color;
use super::{EditorState, StudioApp};

impl StudioApp {
    pub fn draw_editor(&mut self, ui: &mut egui::Ui, _ctx: &egui::Context) {
        let Some(mut editor) = self.editor.clone() else {
            return;
        };
        let cards = self.store.state().cards.clone();

        let mut close = false;
        let mut select: Option<String> = None;
        let mut patch = CardPatch::default();
        let mut save = false;

        ui.horizontal_top(|ui| {
            // ── Left: card list ──
            ui.vertical(|ui| {
                ui.set_width(280.0);
                ui.horizontal(|ui| {
                    ui.heading("Input Cards");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("\u{2715}").clicked() {
                            close = true;
                        }
                    });
                });
                let row = cards
                    .iter()
                    .find(|c| c.id == editor.card_id)
                    .map(|c| c.row)
                    .unwrap_or(0);
                ui.weak(format!("Row {}", row + 1));
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt("editor_list")
                    .show(ui, |ui| {
                        let lead = cards
                            .iter()
                            .position(|c| c.id == editor.card_id)
                            .unwrap_or(0);
                        for card in cards.iter().cycle().skip(lead).take(cards.len()) {
                            let is_open = card.id == editor.card_id;
                            let label = egui::RichText::new(format!(
                                "{}  ({})",
                                card.title,
                                card.card_type.label()
                            ))
                            .color(if is_open {
                                egui::Color32::WHITE
                            } else {
                                egui::Color32::from_gray(180)
                            });
                            if ui.selectable_label(is_open, label).clicked() && !is_open {
                                select = Some(card.id.clone());
                            }
                            let preview: String = card.content.chars().take(44).collect();
                            ui.weak(preview);
                            ui.add_space(4.0);
                        }
                    });
            });

            ui.separator();

            // ── Right: editing surface ──
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let title = ui.add(
                        egui::TextEdit::singleline(&mut editor.title)
                            .hint_text("Card title")
                            .desired_width(240.0),
                    );
                    if title.changed() {
                        patch.title = Some(editor.title.clone());
                    }

                    let prev_type = editor.card_type;
                    egui::ComboBox::from_id_salt("card_type")
                        .selected_text(editor.card_type.label())
                        .show_ui(ui, |ui| {
                            for t in CardType::ALL {
                                ui.selectable_value(&mut editor.card_type, t, t.label());
                            }
                        });
                    if editor.card_type != prev_type {
                        patch.card_type = Some(editor.card_type);
                    }

                    ui.colored_label(type_color(editor.card_type), editor.card_type.label());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("\u{2715}").clicked() {
                            close = true;
                        }
                        if ui.button("Save").clicked() {
                            save = true;
                        }
                    });
                });
                ui.separator();

                match editor.card_type {
                    CardType::Text | CardType::Script => {
                        let mut edit = egui::TextEdit::multiline(&mut editor.content)
                            .desired_width(f32::INFINITY)
                            .desired_rows(16);
                        edit = if editor.card_type == CardType::Script {
                            edit.font(egui::TextStyle::Monospace)
                                .hint_text("Enter your script code...")
                        } else {
                            edit.hint_text("Enter your text content...")
                        };
                        let response = ui.add_sized(ui.available_size(), edit);
                        if response.changed() {
                            patch.content = Some(editor.content.clone());
                        }
                    }
                    CardType::Audio | CardType::Image | CardType::Video => {
                        // Media cards reference an asset by name; upload
                        // handling stays outside this app.
                        ui.add_space(24.0);
                        ui.vertical_centered(|ui| {
                            let icon = match editor.card_type {
                                CardType::Audio => "\u{266B}",
                                CardType::Image => "\u{1F5BC}",
                                _ => "\u{25B8}",
                            };
                            ui.label(
                                egui::RichText::new(icon)
                                    .size(48.0)
                                    .color(type_color(editor.card_type)),
                            );
                            if editor.content.is_empty()
                                || editor.content == "Enter content..."
                            {
                                ui.weak(format!("No {} selected", editor.card_type.label()));
                            } else {
                                ui.label(&editor.content);
                            }
                        });
                        ui.add_space(12.0);
                        let name = ui.add(
                            egui::TextEdit::singleline(&mut editor.content)
                                .hint_text("file name")
                                .desired_width(320.0),
                        );
                        if name.changed() {
                            patch.content = Some(editor.content.clone());
                        }
                    }
                }
            });
        });

        // Apply effects after the UI pass so the store borrow stays clean.
        let has_patch = patch.title.is_some()
            || patch.content.is_some()
            || patch.card_type.is_some();
        if has_patch {
            engine::update_card(&mut self.store, &editor.card_id, patch);
        }
        if save {
            let full = CardPatch {
                title: Some(editor.title.clone()),
                content: Some(editor.content.clone()),
                card_type: Some(editor.card_type),
                ..Default::default()
            };
            engine::update_card(&mut self.store, &editor.card_id, full);
        }

        if let Some(id) = select {
            self.store.select_card(Some(&id));
            if let Some(card) = self.store.state().card(&id) {
                editor = EditorState::for_card(card);
            }
        }

        if close {
            self.editor = None;
            self.store.select_card(None);
        } else {
            self.editor = Some(editor);
        }
    }
}
