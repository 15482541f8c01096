//! Card grid rendering for `StudioApp`.
//!
//! Rows of five cards, drag-reorder via egui's drag-and-drop payloads,
//! and the row/card add-remove controls. Every structural button is bound
//! to its engine guard through `add_enabled`, so the engine's no-op
//! branches are never reachable from the UI.

use eframe::egui;

use visual_mpc::board as engine;
use visual_mpc::store::{CardType, ContentCard, Gradient};

use super::{EditorState, StudioApp};

pub enum BoardAction {
    Select(String),
    Open(String),
    Delete(String),
    Reorder { from: String, to: String },
}

pub fn type_color(card_type: CardType) -> egui::Color32 {
    match card_type {
        CardType::Script => egui::Color32::from_rgb(34, 197, 94),
        CardType::Text => egui::Color32::from_rgb(59, 130, 246),
        CardType::Audio => egui::Color32::from_rgb(168, 85, 247),
        CardType::Image => egui::Color32::from_rgb(249, 115, 22),
        CardType::Video => egui::Color32::from_rgb(239, 68, 68),
    }
}

/// Two-colour vertical fill, the fallback when a gradient swatch PNG is
/// not on disk.
pub fn vertical_gradient(
    painter: &egui::Painter,
    rect: egui::Rect,
    top: egui::Color32,
    bottom: egui::Color32,
) {
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(egui::Shape::mesh(mesh));
}

impl StudioApp {
    pub fn draw_board(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let state = self.store.state();
        let can_add_row = engine::can_add_row(state);
        let can_remove_row = engine::can_remove_row(state);
        let can_add_card = engine::can_add_card(state);
        let has_cards = !state.cards.is_empty();
        let cards = state.cards.clone();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_remove_row, egui::Button::new("\u{2212}"))
                .on_hover_text("Remove last row")
                .clicked()
            {
                engine::remove_row(&mut self.store);
            }
            if ui
                .add_enabled(can_add_row, egui::Button::new("+ Add New Row"))
                .clicked()
            {
                engine::add_row(&mut self.store);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(can_add_card, egui::Button::new("+"))
                    .on_hover_text("Add card")
                    .clicked()
                {
                    engine::add_card(&mut self.store);
                }
                if ui
                    .add_enabled(has_cards, egui::Button::new("\u{2212}"))
                    .on_hover_text("Remove last card")
                    .clicked()
                {
                    engine::remove_last_card(&mut self.store);
                }
            });
        });
        ui.add_space(6.0);

        let mut action: Option<BoardAction> = None;
        egui::ScrollArea::vertical()
            .id_salt("board_scroll")
            .show(ui, |ui| {
                let gap = ui.spacing().item_spacing.x;
                let card_w = ((ui.available_width()
                    - gap * (engine::CARDS_PER_ROW as f32 - 1.0))
                    / engine::CARDS_PER_ROW as f32)
                    .max(120.0);
                for row in cards.chunks(engine::CARDS_PER_ROW) {
                    ui.horizontal(|ui| {
                        for card in row {
                            self.draw_card(ui, ctx, card, card_w, &mut action);
                        }
                    });
                    ui.add_space(8.0);
                }
            });

        if let Some(action) = action {
            self.apply_board_action(action);
        }
    }

    fn draw_card(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        card: &ContentCard,
        width: f32,
        action: &mut Option<BoardAction>,
    ) {
        let size = egui::vec2(width, 140.0);
        let selected = self.store.state().selected_id.as_deref() == Some(card.id.as_str());
        let drag_id = egui::Id::new(("card", card.id.as_str()));

        let (zone, dropped) =
            ui.dnd_drop_zone::<String, _>(egui::Frame::none(), |ui| {
                let inner = ui.dnd_drag_source(drag_id, card.id.clone(), |ui| {
                    let (rect, response) =
                        ui.allocate_exact_size(size, egui::Sense::click());
                    if ui.is_rect_visible(rect) {
                        self.paint_card(ui, ctx, rect, card, selected, response.hovered());
                    }
                    response
                });
                inner.inner
            });
        let response = zone.inner;

        if response.double_clicked() {
            *action = Some(BoardAction::Open(card.id.clone()));
        } else if response.clicked() {
            *action = Some(BoardAction::Select(card.id.clone()));
        }

        // Delete affordance, top-left on hover
        if response.hovered() {
            let rect = response.rect;
            let del_rect = egui::Rect::from_min_size(
                rect.left_top() + egui::vec2(6.0, 6.0),
                egui::vec2(16.0, 16.0),
            );
            let del = ui.interact(del_rect, drag_id.with("del"), egui::Sense::click());
            ui.painter().text(
                del_rect.center(),
                egui::Align2::CENTER_CENTER,
                "\u{2715}",
                egui::FontId::proportional(12.0),
                if del.hovered() {
                    egui::Color32::from_rgb(255, 80, 80)
                } else {
                    egui::Color32::from_gray(160)
                },
            );
            if del.clicked() {
                *action = Some(BoardAction::Delete(card.id.clone()));
            }
        }

        if let Some(from) = dropped {
            if *from != card.id {
                *action = Some(BoardAction::Reorder {
                    from: (*from).clone(),
                    to: card.id.clone(),
                });
            }
        }
    }

    fn paint_card(
        &mut self,
        ui: &egui::Ui,
        ctx: &egui::Context,
        rect: egui::Rect,
        card: &ContentCard,
        selected: bool,
        hovered: bool,
    ) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, egui::Color32::from_gray(24));

        // Gradient backdrop at 40% over the dark card
        let fill = rect.shrink(1.0);
        if let Some(tex) = self.gradient_texture(ctx, &card.gradient) {
            painter.image(
                tex,
                fill,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::from_white_alpha(102),
            );
        } else {
            let [tr, tg, tb] = card.gradient.top;
            let [br, bg, bb] = card.gradient.bottom;
            vertical_gradient(
                &painter,
                fill,
                egui::Color32::from_rgba_unmultiplied(tr, tg, tb, 102),
                egui::Color32::from_rgba_unmultiplied(br, bg, bb, 102),
            );
        }

        painter.rect_stroke(rect, 8.0, egui::Stroke::new(1.0, egui::Color32::from_gray(64)));
        if selected {
            painter.rect_stroke(
                rect.shrink(1.0),
                8.0,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(59, 130, 246)),
            );
        }

        // Type badge, top right
        painter.text(
            rect.right_top() + egui::vec2(-8.0, 8.0),
            egui::Align2::RIGHT_TOP,
            card.card_type.label(),
            egui::FontId::proportional(11.0),
            type_color(card.card_type),
        );

        painter.text(
            rect.center() - egui::vec2(0.0, 12.0),
            egui::Align2::CENTER_CENTER,
            &card.title,
            egui::FontId::proportional(14.0),
            egui::Color32::WHITE,
        );
        let preview: String = card.content.chars().take(38).collect();
        painter.text(
            rect.center() + egui::vec2(0.0, 10.0),
            egui::Align2::CENTER_CENTER,
            preview,
            egui::FontId::proportional(11.0),
            egui::Color32::from_gray(200),
        );

        if hovered {
            painter.rect_filled(
                rect,
                8.0,
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, 8),
            );
        }
    }

    pub fn apply_board_action(&mut self, action: BoardAction) {
        match action {
            BoardAction::Select(id) => self.store.select_card(Some(&id)),
            BoardAction::Open(id) => {
                self.store.select_card(Some(&id));
                let editor = self.store.state().card(&id).map(EditorState::for_card);
                self.editor = editor;
            }
            BoardAction::Delete(id) => {
                engine::delete_card(&mut self.store, &id);
                if self.editor.as_ref().is_some_and(|e| e.card_id == id) {
                    self.editor = None;
                }
                if self.panel_edit.as_ref().is_some_and(|e| e.card_id == id) {
                    self.panel_edit = None;
                }
            }
            BoardAction::Reorder { from, to } => engine::reorder(&mut self.store, &from, &to),
        }
    }

    /// Swatch PNG as an egui texture, decoded once per gradient. `None`
    /// (missing or undecodable file) falls back to the colour fill.
    pub fn gradient_texture(
        &mut self,
        ctx: &egui::Context,
        gradient: &Gradient,
    ) -> Option<egui::TextureId> {
        let entry = self
            .gradient_textures
            .entry(gradient.name)
            .or_insert_with(|| match image::open(gradient.url) {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    let (w, h) = rgba.dimensions();
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [w as usize, h as usize],
                        rgba.as_raw(),
                    );
                    Some(ctx.load_texture(
                        gradient.name,
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ))
                }
                Err(e) => {
                    log::debug!("gradient swatch {} unavailable: {}", gradient.url, e);
                    None
                }
            });
        entry.as_ref().map(|t| t.id())
    }
}
