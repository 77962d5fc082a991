use std::path::{Path, PathBuf};

use anyhow::Result;
use eframe::egui::{
    self, Align2, Button, ComboBox, FontId, PointerButton, Pos2, Rect, Response, ScrollArea,
    Sense, TextEdit, Ui, Vec2,
};

use flamezoom::colors;
use flamezoom::config::FlameConfig;
use flamezoom::node_store::load_profile;
use flamezoom::ranking::RankedEntry;
use flamezoom::{Classification, FlameEngine};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "flamezoom",
        options,
        Box::new(|_cc| Ok(Box::<App>::default())),
    )
}

/// Minimum width of a rectangle to draw its label.
const LABEL_THRESHOLD: f32 = 30.0;

/// A user interaction, collected while drawing and applied afterwards.
enum Action {
    Zoom(usize),
    ZoomOut { index: usize, invert: bool },
    ZoomKey(Classification, String),
    ZoomOutKey {
        classification: Classification,
        key: String,
        invert: bool,
    },
    ZoomBlocked,
    ZoomOutBlocked { invert: bool },
}

struct App {
    engine: Option<FlameEngine>,
    config: FlameConfig,
    search_text: String,
    search_error: Option<String>,
    key_list: Classification,
    hovered_entry: Option<(Classification, String)>,
}

impl Default for App {
    fn default() -> Self {
        let mut res = Self {
            engine: None,
            config: FlameConfig::default(),
            search_text: String::new(),
            search_error: None,
            key_list: Classification::Function,
            hovered_entry: None,
        };

        // Optional second argument: a json config file.
        if let Some(config_path) = std::env::args().nth(2) {
            match FlameConfig::load(Path::new(&config_path)) {
                Ok(config) => res.config = config,
                Err(err) => log::warn!("Using default config: {err:#}"),
            }
        }

        // If a file path is provided as the first argument, try to load it.
        if let Some(first_arg) = std::env::args().nth(1) {
            log::info!("Trying to open file: {first_arg}");
            if let Err(err) = res.load_file(&PathBuf::from(first_arg)) {
                log::error!("Error loading file: {err:#}");
            }
        }

        res
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ctx.style_mut(|s| {
                s.interaction.tooltip_delay = 0.0;
                s.interaction.show_tooltips_only_when_still = false;
            });

            let mut actions = vec![];
            self.draw_top_bar(ui, &mut actions);
            ui.separator();

            ScrollArea::both().show(ui, |ui| {
                self.draw_flame_graph(ui, &mut actions);
            });

            self.apply_actions(actions);
        });
    }
}

impl App {
    fn load_file(&mut self, path: &Path) -> Result<()> {
        let store = load_profile(path)?;
        let mut engine = FlameEngine::new(store, self.config.clone());
        if let Err(err) = engine.set_search(&self.search_text) {
            self.search_error = Some(err.to_string());
        }
        self.engine = Some(engine);
        self.hovered_entry = None;
        Ok(())
    }

    fn draw_top_bar(&mut self, ui: &mut Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            if ui.button("Open file").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_file() {
                    log::info!("Loading file: {path:?}...");
                    match self.load_file(&path) {
                        Ok(()) => log::info!("Successfully loaded file."),
                        Err(e) => log::error!("Error loading file: {e:#}"),
                    }
                }
            }

            ComboBox::new("key list chooser", "")
                .selected_text(format!("Ranked: {}", self.key_list.name()))
                .show_ui(ui, |ui| {
                    for classification in [
                        Classification::Function,
                        Classification::Source,
                        Classification::Address,
                    ] {
                        ui.selectable_value(
                            &mut self.key_list,
                            classification,
                            classification.name(),
                        );
                    }
                });

            let blocked_button = ui.add_enabled(self.engine.is_some(), Button::new("Blocked"));
            if blocked_button.clicked_by(PointerButton::Primary) {
                actions.push(Action::ZoomBlocked);
            }
            if blocked_button.clicked_by(PointerButton::Middle) {
                let invert = ui.input(|i| i.modifiers.shift);
                actions.push(Action::ZoomOutBlocked { invert });
            }

            ui.label("Search:");
            let search_edit = ui.add(
                TextEdit::singleline(&mut self.search_text)
                    .hint_text("function regex")
                    .desired_width(250.0),
            );
            if search_edit.changed() {
                if let Some(engine) = &mut self.engine {
                    self.search_error = engine
                        .set_search(&self.search_text)
                        .err()
                        .map(|e| e.to_string());
                }
            }
            if let Some(error) = &self.search_error {
                ui.colored_label(colors::SEARCH_HIGHLIGHT, "invalid pattern")
                    .on_hover_text(error);
            }
        });
    }

    fn draw_flame_graph(&mut self, ui: &mut Ui, actions: &mut Vec<Action>) {
        let Some(engine) = &mut self.engine else {
            ui.label("Open a profile to start.");
            return;
        };

        let config = engine.config().clone();
        let max_depth = engine.store().max_depth();
        let flame_height = config.canvas_height(max_depth);
        let rows = engine.rankings().rows;
        let ranked_height = if rows > 0 {
            40.0 + rows as f32 * config.ranked_row_height
        } else {
            0.0
        };
        let full_width = config.canvas_width + 2.0 * config.margin;

        let (canvas, _) = ui.allocate_exact_size(
            Vec2::new(full_width, flame_height + ranked_height),
            Sense::hover(),
        );
        ui.painter().rect_filled(canvas, 0.0, colors::BACKGROUND);
        let origin = canvas.min;
        let hovered_key = self
            .hovered_entry
            .as_ref()
            .map(|(classification, key)| (*classification, key.as_str()));

        let mut hovered_node = None;
        for index in 0..engine.store().len() {
            let display = engine.display(index);
            if !display.visible {
                continue;
            }
            let rect = Rect::from_min_size(
                origin + Vec2::new(display.rect.x, display.rect.y),
                Vec2::new(display.rect.width, display.rect.height - 1.0),
            );
            let opacity = engine.hover_opacity(index, hovered_key);
            let color = engine.node_color(index).gamma_multiply(opacity);
            let label = if rect.width() > LABEL_THRESHOLD {
                engine.store().nodes()[index].label().unwrap_or_default()
            } else {
                ""
            };

            let response = ui.put(rect, Button::new(label).truncate().fill(color));
            if response.hovered() {
                hovered_node = Some(index);
            }
            collect_node_actions(ui, &response, index, actions);
            response.on_hover_text(engine.info_for(index).tooltip());
        }

        // Info lines of the hovered node, or of what is zoomed into.
        let info = match hovered_node {
            Some(index) => engine.info_for(index),
            None => engine.info_reset().clone(),
        };
        let mut text_pos = origin + Vec2::new(config.margin + 2.0, flame_height - 70.0);
        for line in [
            &info.function,
            &info.source,
            &info.address,
            &info.sum,
            &info.thread,
        ] {
            ui.painter().text(
                text_pos,
                Align2::LEFT_TOP,
                line,
                FontId::proportional(12.0),
                colors::BLACK,
            );
            text_pos.y += 15.0;
        }

        let keys = engine.rankings().list(self.key_list).to_vec();
        let threads = engine.rankings().threads.clone();
        let list_top = origin.y + flame_height + 31.0;
        let mut hovered_entry = None;
        for (row, entry) in keys.iter().enumerate() {
            let min = Pos2::new(
                origin.x + config.margin,
                list_top + row as f32 * config.ranked_row_height,
            );
            if let Some(hovered) = draw_entry(ui, engine, entry, min, &config, actions) {
                hovered_entry = Some(hovered);
            }
        }
        for (row, entry) in threads.iter().enumerate() {
            let min = Pos2::new(
                origin.x + config.margin + config.canvas_width - entry.bar_width,
                list_top + row as f32 * config.ranked_row_height,
            );
            if let Some(hovered) = draw_entry(ui, engine, entry, min, &config, actions) {
                hovered_entry = Some(hovered);
            }
        }
        self.hovered_entry = hovered_entry;
    }

    fn apply_actions(&mut self, actions: Vec<Action>) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        for action in actions {
            match action {
                Action::Zoom(index) => engine.zoom_node(index),
                Action::ZoomOut { index, invert } => engine.zoom_out_node(index, invert),
                Action::ZoomKey(classification, key) => engine.zoom_key(classification, &key),
                Action::ZoomOutKey {
                    classification,
                    key,
                    invert,
                } => engine.zoom_out_key(classification, &key, invert),
                Action::ZoomBlocked => engine.zoom_blocked(),
                Action::ZoomOutBlocked { invert } => engine.zoom_out_blocked(invert),
            }
        }
    }
}

/// Primary click zooms in, middle click zooms out, shift + middle click keeps only the clicked part.
fn collect_node_actions(ui: &Ui, response: &Response, index: usize, actions: &mut Vec<Action>) {
    if response.clicked_by(PointerButton::Primary) {
        actions.push(Action::Zoom(index));
    }
    if response.clicked_by(PointerButton::Middle) {
        let invert = ui.input(|i| i.modifiers.shift);
        actions.push(Action::ZoomOut { index, invert });
    }
}

/// Draws one ranked bar, returns its key if it is hovered.
fn draw_entry(
    ui: &mut Ui,
    engine: &mut FlameEngine,
    entry: &RankedEntry,
    min: Pos2,
    config: &FlameConfig,
    actions: &mut Vec<Action>,
) -> Option<(Classification, String)> {
    let rect = Rect::from_min_size(
        min,
        Vec2::new(entry.bar_width, config.ranked_row_height - 1.0),
    );
    let color = engine.entry_color(entry);
    let response = ui.put(rect, Button::new(&entry.label).truncate().fill(color));

    if response.clicked_by(PointerButton::Primary) {
        actions.push(Action::ZoomKey(entry.classification, entry.key.clone()));
    }
    if response.clicked_by(PointerButton::Middle) {
        let invert = ui.input(|i| i.modifiers.shift);
        actions.push(Action::ZoomOutKey {
            classification: entry.classification,
            key: entry.key.clone(),
            invert,
        });
    }

    let hovered = response.hovered();
    response.on_hover_text(&entry.tooltip);
    hovered.then(|| (entry.classification, entry.key.clone()))
}
