//! Theater 2D panel for `StudioApp`.
//!
//! Row tabs across the top, then the selected row's cards with inline
//! editing. Selecting a card here also drives the scaled plane on the
//! stage above.

use eframe::egui;

use visual_mpc::board as engine;
use visual_mpc::store::CardPatch;

use super::board::type_color;
use super::{EditorState, StudioApp};

enum PanelAction {
    Select(String),
    StartEdit(String),
    SaveEdit,
    CancelEdit,
}

impl StudioApp {
    pub fn draw_panel(&mut self, ui: &mut egui::Ui) {
        let state = self.store.state();
        let rows = engine::row_count(state);
        let selected_id = state.selected_id.clone();
        let cards = state.cards.clone();

        self.panel_row = self.panel_row.min(rows - 1);
        ui.horizontal(|ui| {
            for row in 0..rows {
                if ui
                    .selectable_label(self.panel_row == row, format!("Row {}", row + 1))
                    .clicked()
                {
                    self.panel_row = row;
                }
            }
        });
        ui.separator();

        let start = self.panel_row * engine::CARDS_PER_ROW;
        let row_cards: Vec<_> = cards
            .iter()
            .skip(start)
            .take(engine::CARDS_PER_ROW)
            .cloned()
            .collect();

        let mut action: Option<PanelAction> = None;
        egui::ScrollArea::vertical()
            .id_salt("panel_scroll")
            .show(ui, |ui| {
                for card in &row_cards {
                    let is_selected = selected_id.as_deref() == Some(card.id.as_str());
                    let editing = self
                        .panel_edit
                        .as_ref()
                        .is_some_and(|e| e.card_id == card.id);

                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        if let Some(edit) = self.panel_edit.as_mut().filter(|_| editing) {
                            ui.add(
                                egui::TextEdit::singleline(&mut edit.title)
                                    .hint_text("Card title"),
                            );
                            ui.add(
                                egui::TextEdit::multiline(&mut edit.content)
                                    .hint_text("Card content")
                                    .desired_rows(3),
                            );
                            ui.horizontal(|ui| {
                                if ui.button("Save").clicked() {
                                    action = Some(PanelAction::SaveEdit);
                                }
                                if ui.button("Cancel").clicked() {
                                    action = Some(PanelAction::CancelEdit);
                                }
                            });
                        } else {
                            ui.horizontal(|ui| {
                                ui.colored_label(
                                    type_color(card.card_type),
                                    card.card_type.label(),
                                );
                                let title = egui::RichText::new(&card.title).strong();
                                let label = if is_selected {
                                    title.color(egui::Color32::from_rgb(100, 150, 255))
                                } else {
                                    title
                                };
                                if ui.selectable_label(is_selected, label).clicked() {
                                    action = Some(PanelAction::Select(card.id.clone()));
                                }
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("Edit").clicked() {
                                            action =
                                                Some(PanelAction::StartEdit(card.id.clone()));
                                        }
                                    },
                                );
                            });
                            let preview: String = card.content.chars().take(80).collect();
                            ui.weak(preview);
                        }
                    });
                    ui.add_space(4.0);
                }

                if row_cards.is_empty() {
                    ui.weak("No cards in this row.");
                }
            });

        match action {
            Some(PanelAction::Select(id)) => self.store.select_card(Some(&id)),
            Some(PanelAction::StartEdit(id)) => {
                self.panel_edit = self
                    .store
                    .state()
                    .card(&id)
                    .map(EditorState::for_card);
                self.store.select_card(Some(&id));
            }
            Some(PanelAction::SaveEdit) => {
                if let Some(edit) = self.panel_edit.take() {
                    let patch = CardPatch {
                        title: Some(edit.title),
                        content: Some(edit.content),
                        ..Default::default()
                    };
                    engine::update_card(&mut self.store, &edit.card_id, patch);
                }
            }
            Some(PanelAction::CancelEdit) => self.panel_edit = None,
            None => {}
        }
    }
}
