//! Main egui/eframe application state and UI orchestration.

use crate::config::AppConfig;
use crate::engine::{EditRequest, Engine};
use crate::transform::TransformSpec;
use egui::{Context, Key};

use egui_file_dialog::DialogState;
use std::path::{Path, PathBuf};

mod clipboard;
mod editing;
mod image_loader;
mod image_state;
mod ui;
mod ui_state;

use image_state::{ImageLoadRequest, ImageLoadResult, ImageState, PendingImageMeta, PendingImageTask};
use ui_state::{AdjustState, NativeDialog, SidePanelPosition, UiState};

const ZOOM_PRESETS: &[f32] = &[0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0];
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 8.0;

fn safe_usize_to_f32(value: usize) -> f32 {
    let clamped = value.min(u32::MAX as usize);
    let as_u32 = u32::try_from(clamped).unwrap_or(u32::MAX);
    #[allow(clippy::cast_precision_loss)]
    {
        as_u32 as f32
    }
}

/// Top-level application state for the Retouch UI.
pub struct RetouchApp {
    engine: Engine,
    config: AppConfig,
    image: ImageState,
    ui: UiState,
    adjust: AdjustState,
    active_dialog: Option<NativeDialog>,
    last_image_dir: Option<PathBuf>,
    last_export_dir: Option<PathBuf>,
}

impl Default for RetouchApp {
    fn default() -> Self {
        Self::with_config(AppConfig::load())
    }
}

impl RetouchApp {
    fn with_config(config: AppConfig) -> Self {
        let engine = Engine::new(&config);
        let adjust = AdjustState::new(engine.default_export_format());
        Self {
            engine,
            adjust,
            config,
            image: ImageState::default(),
            ui: UiState::default(),
            active_dialog: None,
            last_image_dir: None,
            last_export_dir: None,
        }
    }

    /// Create a new app and optionally queue an initial image load.
    pub fn new_with_initial_path(_ctx: &Context, initial_path: Option<&Path>) -> Self {
        let mut app = Self::default();
        if let Some(p) = initial_path {
            app.start_loading_image_from_path(p.to_owned());
        }
        app
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.ui.last_status = Some(msg.into());
    }

    const fn has_document(&self) -> bool {
        self.image.texture.is_some()
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.image.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn fit_image_to_viewport(&mut self) -> bool {
        let Some(viewport) = self.image.last_viewport_size else {
            return false;
        };
        let [w, h] = self.image.size;
        if w == 0 || h == 0 {
            return false;
        }
        let fit = (viewport.x.max(1.0) / safe_usize_to_f32(w))
            .min(viewport.y.max(1.0) / safe_usize_to_f32(h))
            * 0.98;
        self.set_zoom(fit.min(1.0));
        true
    }

    fn apply_pending_fit_on_load(&mut self) {
        if self.image.pending_fit_on_load && self.fit_image_to_viewport() {
            self.image.pending_fit_on_load = false;
        }
    }

    fn format_zoom(zoom: f32) -> String {
        if (zoom - 1.0).abs() < 0.005 {
            "100%".to_string()
        } else {
            format!("{:.0}%", zoom * 100.0)
        }
    }

    fn handle_hotkeys(&mut self, ctx: &Context) {
        // Ignored while typing in text fields.
        if ctx.wants_keyboard_input() {
            return;
        }
        let pressed = |key: Key, shift: bool| {
            ctx.input(|i| i.key_pressed(key) && i.modifiers.command && i.modifiers.shift == shift)
        };
        if pressed(Key::B, false) {
            self.ui.side_open = !self.ui.side_open;
        }
        if self.active_dialog.is_none() && pressed(Key::O, false) {
            self.open_image_dialog();
        }
        if self.active_dialog.is_none() && pressed(Key::V, false) {
            self.paste_image_from_clipboard();
        }
        if self.active_dialog.is_none() && self.has_document() && pressed(Key::S, false) {
            self.start_export_dialog();
        }
        if !self.has_document() {
            return;
        }
        if pressed(Key::Z, false) {
            self.request_edit(EditRequest::Undo);
        }
        if pressed(Key::Y, false) || pressed(Key::Z, true) {
            self.request_edit(EditRequest::Redo);
        }
        if pressed(Key::R, false) {
            self.request_edit(EditRequest::Apply(TransformSpec::rotate(90)));
        }
        if pressed(Key::R, true) {
            self.request_edit(EditRequest::Apply(TransformSpec::rotate(-90)));
        }
        if pressed(Key::I, false) {
            self.request_edit(EditRequest::Apply(TransformSpec::invert()));
        }
    }

    fn update_dialogs(&mut self, ctx: &Context) {
        let mut close_dialog = false;
        let mut picked_open: Option<PathBuf> = None;
        let mut picked_export = None;

        if let Some(dialog_state) = self.active_dialog.as_mut() {
            let (dialog, cancel_msg) = match dialog_state {
                NativeDialog::Open(dialog) => (dialog, "Open canceled."),
                NativeDialog::Export { dialog, .. } => (dialog, "Export canceled."),
            };
            dialog.update(ctx);
            if let Some(path) = dialog.take_picked() {
                match dialog_state {
                    NativeDialog::Open(_) => picked_open = Some(path),
                    NativeDialog::Export { format, .. } => picked_export = Some((path, *format)),
                }
                close_dialog = true;
            } else {
                match dialog.state() {
                    DialogState::Cancelled => {
                        self.ui.last_status = Some(cancel_msg.to_string());
                        close_dialog = true;
                    }
                    DialogState::Closed => close_dialog = true,
                    _ => {}
                }
            }
        }

        if close_dialog {
            self.active_dialog = None;
        }
        if let Some(path) = picked_open {
            self.start_loading_image_from_path(path);
        }
        if let Some((path, format)) = picked_export {
            self.export_to_path(&path, format);
        }
    }
}

impl eframe::App for RetouchApp {
    fn logic(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_image_loader();
        self.poll_edit_job(ctx);
        self.sync_texture(ctx);
        self.handle_hotkeys(ctx);
    }

    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        egui::Panel::top("top").show_inside(ui, |ui| self.ui_top(ui));
        let side = match self.ui.side_position {
            SidePanelPosition::Left => egui::Panel::left("side"),
            SidePanelPosition::Right => egui::Panel::right("side"),
        };
        side.resizable(true)
            .default_size(280.0)
            .show_animated_inside(ui, self.ui.side_open, |ui| self.ui_side(ui));
        egui::Panel::bottom("status").show_inside(ui, |ui| self.ui_status_bar(ui));
        egui::CentralPanel::default().show_inside(ui, |ui| self.ui_central_image(ui));

        let ctx = ui.ctx().clone();
        self.ui_image_info_window(&ctx);
        self.apply_pending_fit_on_load();
        self.update_dialogs(&ctx);
    }
}
