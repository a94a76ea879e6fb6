use super::super::{RetouchApp, safe_usize_to_f32};

impl RetouchApp {
    pub(crate) fn ui_central_image(&mut self, ui: &mut egui::Ui) {
        self.handle_dropped_files(ui);
        self.image.last_viewport_size = Some(ui.available_size());

        let Some(texture) = self.image.texture.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label("Open an image (Ctrl+O), paste one (Ctrl+V) or drop a file here.");
            });
            return;
        };
        let (tex_id, img_size) = (texture.id(), self.image.size);
        egui::ScrollArea::both().show(ui, |ui| {
            let base_size = egui::vec2(
                safe_usize_to_f32(img_size[0]),
                safe_usize_to_f32(img_size[1]),
            );
            let display_size = base_size * self.image.zoom;
            let response = ui.add(egui::Image::new((tex_id, display_size)));

            if response.hovered() {
                // Ctrl+scroll and pinch gestures both arrive as a zoom factor.
                let factor = ui.ctx().input(egui::InputState::zoom_delta);
                if (factor - 1.0).abs() > f32::EPSILON {
                    self.set_zoom(self.image.zoom * factor);
                }
            }
        });
    }

    fn handle_dropped_files(&mut self, ui: &egui::Ui) {
        let dropped_files = ui.input(|i| i.raw.dropped_files.clone());
        if dropped_files.is_empty() {
            return;
        }
        for f in &dropped_files {
            if let Some(path) = &f.path {
                log::debug!("Loading dropped file {}", path.display());
                self.start_loading_image_from_path(path.clone());
                return;
            }
            if let Some(bytes) = &f.bytes {
                log::debug!("Loading dropped bytes '{}'", f.name);
                self.start_loading_image_from_bytes(
                    (!f.name.is_empty()).then(|| f.name.clone()),
                    bytes.to_vec(),
                    f.last_modified,
                );
                return;
            }
        }
        self.set_status("Drop failed: no readable bytes/path");
    }
}
