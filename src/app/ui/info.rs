use super::super::RetouchApp;
use crate::engine::SessionState;
use crate::raster::human_readable_bytes;
use egui::{Color32, RichText};

impl RetouchApp {
    pub(crate) fn ui_status_bar(&self, ui: &mut egui::Ui) {
        let state = match self.engine.state() {
            SessionState::Empty => "No image".to_string(),
            SessionState::Loaded => format!(
                "Step {}/{}",
                self.engine.position(),
                self.engine.history_entries().len()
            ),
            SessionState::Busy => "Working…".to_string(),
        };
        ui.horizontal(|ui| {
            ui.label(RichText::new(state).small().color(Color32::from_gray(180)));
            if let Some(msg) = &self.ui.last_status {
                ui.separator();
                ui.label(
                    RichText::new(msg.as_str())
                        .small()
                        .color(Color32::from_gray(200)),
                );
            }
        });
    }

    pub(crate) fn ui_image_info_window(&mut self, ctx: &egui::Context) {
        if !self.ui.info_window_open {
            return;
        }

        let mut open = self.ui.info_window_open;
        egui::Window::new("Image info")
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| self.ui_image_info_contents(ui));
        self.ui.info_window_open = open;
    }

    fn ui_image_info_contents(&self, ui: &mut egui::Ui) {
        let Some(session) = self.engine.session() else {
            ui.label("Load an image to inspect its metadata.");
            return;
        };
        let document = session.document();

        ui.heading("File");
        if let Some(meta) = document.meta() {
            for (label, value) in meta.details() {
                ui.label(format!("{label}: {value}"));
            }
        } else {
            ui.label("No captured file metadata for this image.");
        }

        ui.add_space(6.0);
        ui.heading("Image");
        let buffer = document.buffer();
        let (w, h) = document.dimensions();
        ui.label(format!("Dimensions: {w} × {h} px"));
        ui.label(format!("Layout: {}", buffer.layout().label()));
        let byte_len = buffer.byte_len() as u64;
        ui.label(format!(
            "Pixel memory: {} ({byte_len} bytes)",
            human_readable_bytes(byte_len),
        ));
        ui.label(format!("Current zoom: {}", Self::format_zoom(self.image.zoom)));

        ui.add_space(6.0);
        ui.heading("History");
        ui.label(format!(
            "Applied edits: {} of {}",
            session.history().position(),
            session.history().len()
        ));
        ui.label(format!("Recompute: {:?}", session.recompute_policy()));
        if session.checkpoint_count() > 0 {
            ui.label(format!(
                "Cached checkpoints: {} ({})",
                session.checkpoint_count(),
                human_readable_bytes(session.checkpoint_bytes())
            ));
        }
    }
}
