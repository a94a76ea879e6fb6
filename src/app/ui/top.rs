use super::super::{RetouchApp, SidePanelPosition, ZOOM_PRESETS};
use super::icons;
use crate::engine::EditRequest;
use crate::transform::{RasterOp, TransformSpec};
use egui::containers::menu::MenuButton;

impl RetouchApp {
    pub(crate) fn ui_top(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // Use egui's built-in theme toggle so icon matches current mode.
            egui::widgets::global_theme_preference_switch(ui);
            ui.separator();

            let has_image = self.has_document();
            self.ui_file_menu(ui, has_image);
            ui.separator();

            self.ui_side_toggle(ui);
            ui.separator();

            let editable = has_image && !self.engine.is_busy();
            self.ui_history_buttons(ui, editable);
            ui.separator();
            self.ui_transform_buttons(ui, editable);
            ui.separator();

            self.ui_zoom_controls(ui, has_image);
            ui.separator();

            let info_resp = ui
                .add_enabled(
                    has_image,
                    egui::Button::new(format!("{} Image info", icons::ICON_INFO)),
                )
                .on_hover_text("Show file & image details");
            if info_resp.clicked() {
                self.ui.info_window_open = true;
            }

            if self.engine.is_busy() {
                ui.separator();
                ui.spinner();
            }
        });
    }

    fn ui_file_menu(&mut self, ui: &mut egui::Ui, has_image: bool) {
        ui.menu_button(format!("{} File", icons::ICON_MENU), |ui| {
            if ui
                .add(
                    egui::Button::new(format!("{} Open image…", icons::ICON_IMAGE))
                        .shortcut_text("Ctrl+O"),
                )
                .on_hover_text("Open an image (Ctrl+O). You can also drag & drop into the center.")
                .clicked()
            {
                self.open_image_dialog();
                ui.close();
            }

            if ui
                .add(egui::Button::new("Paste image").shortcut_text("Ctrl+V"))
                .on_hover_text("Paste image from clipboard (Ctrl+V)")
                .clicked()
            {
                self.paste_image_from_clipboard();
                ui.close();
            }

            ui.separator();

            if ui
                .add_enabled(
                    has_image,
                    egui::Button::new(format!("{} Export image…", icons::ICON_DOWNLOAD))
                        .shortcut_text("Ctrl+S"),
                )
                .on_hover_text("Download the edited image (Ctrl+S)")
                .clicked()
            {
                self.start_export_dialog();
                ui.close();
            }

            if ui
                .add_enabled(has_image, egui::Button::new("Close image"))
                .on_hover_text("Drop the image and its edit history")
                .clicked()
            {
                self.close_document();
                ui.close();
            }
        });
    }

    fn ui_side_toggle(&mut self, ui: &mut egui::Ui) {
        let side_label = if self.ui.side_open {
            "Hide side"
        } else {
            "Show side"
        };
        let button = egui::Button::new(format!("{} {side_label}", icons::ICON_SIDE_TOGGLE))
            .shortcut_text("Ctrl+B");
        let (response, _) = MenuButton::from_button(button).ui(ui, |ui| {
            let toggle_label = if self.ui.side_open {
                "Hide side panel"
            } else {
                "Show side panel"
            };
            if ui.button(toggle_label).clicked() {
                self.ui.side_open = !self.ui.side_open;
                ui.close();
            }
            ui.separator();
            ui.label("Side panel position");
            let left_selected = self.ui.side_position == SidePanelPosition::Left;
            if ui.selectable_label(left_selected, "Left").clicked() {
                self.ui.side_position = SidePanelPosition::Left;
                ui.close();
            }
            if ui.selectable_label(!left_selected, "Right").clicked() {
                self.ui.side_position = SidePanelPosition::Right;
                ui.close();
            }
        });
        response.on_hover_text("Toggle side panel (Ctrl+B) and set position");
    }

    fn ui_history_buttons(&mut self, ui: &mut egui::Ui, editable: bool) {
        let history = self.engine.session().map(|s| s.history());
        let undo_hint = history
            .and_then(|h| h.peek_undo())
            .map_or_else(|| "Nothing to undo".to_string(), |t| format!("Undo: {}", t.describe()));
        let redo_hint = history
            .and_then(|h| h.peek_redo())
            .map_or_else(|| "Nothing to redo".to_string(), |t| format!("Redo: {}", t.describe()));
        let undo = ui
            .add_enabled(
                editable && self.engine.can_undo(),
                egui::Button::new(format!("{} Undo", icons::ICON_UNDO)).shortcut_text("Ctrl+Z"),
            )
            .on_hover_text(format!("{undo_hint} (Ctrl+Z)"));
        if undo.clicked() {
            self.request_edit(EditRequest::Undo);
        }
        let redo = ui
            .add_enabled(
                editable && self.engine.can_redo(),
                egui::Button::new(format!("{} Redo", icons::ICON_REDO)).shortcut_text("Ctrl+Y"),
            )
            .on_hover_text(format!("{redo_hint} (Ctrl+Y or Ctrl+Shift+Z)"));
        if redo.clicked() {
            self.request_edit(EditRequest::Redo);
        }
    }

    fn ui_transform_buttons(&mut self, ui: &mut egui::Ui, editable: bool) {
        let buttons = [
            (
                format!("{} 90°", icons::ICON_ROTATE_CCW),
                "Rotate 90° counter-clockwise (Ctrl+Shift+R)",
                TransformSpec::rotate(-90),
            ),
            (
                format!("{} 90°", icons::ICON_ROTATE_CW),
                "Rotate 90° clockwise (Ctrl+R)",
                TransformSpec::rotate(90),
            ),
            (
                format!("{} Invert", icons::ICON_INVERT),
                "Invert colors (Ctrl+I)",
                TransformSpec::invert(),
            ),
        ];
        for (label, hover, spec) in buttons {
            if ui
                .add_enabled(editable, egui::Button::new(label))
                .on_hover_text(hover)
                .clicked()
            {
                self.request_edit(EditRequest::Apply(spec));
            }
        }
    }

    fn ui_zoom_controls(&mut self, ui: &mut egui::Ui, has_image: bool) {
        ui.label("Zoom:").on_hover_text("Choose a preset zoom level");
        let zoom_ir = egui::ComboBox::from_id_salt("zoom_combo")
            .selected_text(Self::format_zoom(self.image.zoom))
            .show_ui(ui, |ui| {
                for &preset in ZOOM_PRESETS {
                    let label = Self::format_zoom(preset);
                    let selected = (self.image.zoom - preset).abs() < 0.0001;
                    if ui.selectable_label(selected, label).clicked() {
                        self.set_zoom(preset);
                    }
                }
            });
        zoom_ir.response.on_hover_text("Zoom presets (percent)");
        if ui
            .add_enabled(has_image, egui::Button::new(format!("{} Fit", icons::ICON_FIT)))
            .on_hover_text("Fit the image into the viewport")
            .clicked()
        {
            self.fit_image_to_viewport();
        }
    }
}
