//! `StudioApp` — the top-level egui application state.
//!
//! This module declares the `StudioApp` struct and its `Default` impl.
//! All methods are split across the sibling sub-modules:
//!
//! - `toolbar`  — mode toggle, play control, layout switch
//! - `board`    — the 2D card grid with drag-reorder
//! - `editor`   — full-surface card editor
//! - `viewport` — async model load, texture sync, 3D stage rendering
//! - `theater`  — theater stage with per-card platforms
//! - `panel`    — the theater 2D panel with row tabs

pub mod board;
pub mod editor;
pub mod panel;
pub mod theater;
pub mod toolbar;
pub mod viewport;

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use visual_mpc::board as board_engine;
use visual_mpc::render::CameraParams;
use visual_mpc::scene::gltf::AssetError;
use visual_mpc::scene::registry::PlaneRegistry;
use visual_mpc::scene::SceneModel;
use visual_mpc::store::{CardType, ContentCard, Store, ViewMode};

/// Which shell is on screen: the studio board or the theater presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Studio,
    Theater,
}

/// Edit buffers for one card, used by the editor surface and the theater
/// panel's inline editing.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub card_id: String,
    pub title: String,
    pub content: String,
    pub card_type: CardType,
}

impl EditorState {
    pub fn for_card(card: &ContentCard) -> Self {
        Self {
            card_id: card.id.clone(),
            title: card.title.clone(),
            content: card.content.clone(),
            card_type: card.card_type,
        }
    }
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct StudioApp {
    pub store: Store,
    pub layout: LayoutKind,
    pub show_stats: bool,
    /// Open card editor (takes over the whole studio surface).
    pub editor: Option<EditorState>,
    /// Inline edit buffers for the theater panel.
    pub panel_edit: Option<EditorState>,
    pub panel_row: usize,
    // Model asset (async load)
    pub model: Option<SceneModel>,
    pub model_error: Option<String>,
    pub model_loading: bool,
    pub model_rx: Option<mpsc::Receiver<Result<SceneModel, AssetError>>>,
    pub registry: PlaneRegistry,
    // 3D stage
    pub cam: CameraParams,
    pub cam_dirty: bool,
    pub cam_dragging: bool,
    pub scene_texture: Option<egui::TextureHandle>,
    /// Yaw applied to the model while playing.
    pub spin: f32,
    pub last_frame: Instant,
    /// Raised by the store subscription whenever cards or selection change;
    /// drained by the plane-texture sync.
    pub cards_dirty: Rc<Cell<bool>>,
    // Gradient swatches (None = decode failed, keep the colour fallback)
    pub gradient_textures: HashMap<&'static str, Option<egui::TextureHandle>>,
}

impl Default for StudioApp {
    fn default() -> Self {
        let mut store = Store::new();
        board_engine::seed_cards(&mut store);

        let cards_dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&cards_dirty);
        store.subscribe(|s| s.cards.clone(), move |_| flag.set(true));
        let flag = Rc::clone(&cards_dirty);
        store.subscribe(
            |s| s.selected_id.clone(),
            move |id| {
                log::debug!("selected card: {:?}", id);
                // The scaled plane mirrors the selection, so its texture
                // needs a refresh too.
                flag.set(true);
            },
        );

        Self {
            store,
            layout: LayoutKind::Studio,
            show_stats: true,
            editor: None,
            panel_edit: None,
            panel_row: 0,
            model: None,
            model_error: None,
            model_loading: false,
            model_rx: None,
            registry: PlaneRegistry::new(),
            cam: CameraParams::default(),
            cam_dirty: true,
            cam_dragging: false,
            scene_texture: None,
            spin: 0.0,
            last_frame: Instant::now(),
            cards_dirty,
            gradient_textures: HashMap::new(),
        }
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_model_load(ctx);
        self.check_model();
        self.advance_spin(ctx);
        self.sync_plane_textures();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        if self.show_stats {
            egui::SidePanel::right("stats")
                .default_width(200.0)
                .show(ctx, |ui| {
                    self.draw_stats_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.layout {
            LayoutKind::Studio => self.draw_studio(ui, ctx),
            LayoutKind::Theater => self.draw_theater(ui, ctx),
        });
    }
}

impl StudioApp {
    fn draw_studio(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if self.editor.is_some() {
            self.draw_editor(ui, ctx);
            return;
        }

        match self.store.state().mode {
            ViewMode::ThreeD => {
                self.draw_viewport(ui, ctx);
            }
            ViewMode::TwoD => self.draw_board(ui, ctx),
            ViewMode::Hybrid => {
                let half = ui.available_height() * 0.5;
                ui.allocate_ui(egui::vec2(ui.available_width(), half), |ui| {
                    ui.set_min_height(half);
                    self.draw_viewport(ui, ctx);
                });
                ui.separator();
                self.draw_board(ui, ctx);
            }
        }
    }

    fn draw_stats_panel(&self, ui: &mut egui::Ui) {
        let state = self.store.state();

        ui.heading("Board");
        ui.separator();
        ui.label(format!("Cards: {}", state.cards.len()));
        ui.label(format!("Rows: {}", board_engine::row_count(state)));
        match &state.selected_id {
            Some(id) => ui.colored_label(
                egui::Color32::from_rgb(100, 150, 255),
                format!("Selected: {}", id),
            ),
            None => ui.label("Selected: none"),
        };

        ui.separator();
        ui.heading("Model");
        if let Some(model) = &self.model {
            ui.label(format!("Nodes: {}", model.nodes.len()));
            ui.label(format!("Meshes: {}", model.mesh_count()));
            ui.colored_label(
                egui::Color32::from_rgb(0, 180, 0),
                format!("Planes: {}", self.registry.len()),
            );
            match self.registry.scaled_plane() {
                Some(entry) => ui.label(format!("Z plane: {}", entry.metadata.name)),
                None => ui.label("Z plane: none"),
            };
        } else if self.model_loading {
            ui.label("Loading model...");
        } else if let Some(err) = &self.model_error {
            ui.colored_label(egui::Color32::from_rgb(255, 80, 80), err);
        }

        ui.separator();
        ui.heading("Stage");
        if self.scene_texture.is_some() {
            let (w, h) = self.stage_resolution();
            ui.colored_label(
                egui::Color32::from_rgb(0, 180, 0),
                format!("Rendered: {}x{}", w, h),
            );
        }
        ui.label(format!("Cam dist: {:.2}", self.cam.distance));
        if state.is_playing {
            ui.label(format!("Spin: {:.2} rad", self.spin));
        }
    }
}
