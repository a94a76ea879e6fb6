//! Side panel UI: palette adjustments and the edit history.

use super::super::RetouchApp;
use super::super::ui_state::RemapRow;
use super::icons;
use crate::engine::EditRequest;
use egui::color_picker::{Alpha, color_edit_button_srgba};
use egui::{Color32, RichText};

const MAX_REMAP_ROWS: usize = 16;

impl RetouchApp {
    pub(crate) fn ui_side(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            let editable = self.has_document() && !self.engine.is_busy();
            ui.add_enabled_ui(editable, |ui| {
                self.ui_curve_section(ui);
                ui.separator();
                self.ui_remap_section(ui);
            });
            ui.separator();
            self.ui_history_section(ui, editable);
            ui.separator();
            self.ui_export_section(ui);
        });
    }

    fn ui_export_section(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("{} Export", icons::ICON_DOWNLOAD));
        ui.horizontal(|ui| {
            self.ui_export_format_picker(ui);
            if ui
                .add_enabled(self.has_document(), egui::Button::new("Export…"))
                .clicked()
            {
                self.start_export_dialog();
            }
        });
    }

    fn ui_curve_section(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("{} Palette", icons::ICON_PALETTE));
        ui.label(RichText::new("Adjusts color channels; alpha is kept.").small());
        ui.add_space(4.0);
        ui.spacing_mut().slider_width = 150.0;

        let curve = &mut self.adjust.curve;
        for (gain, name) in curve.gains.iter_mut().zip(["red gain", "green gain", "blue gain"]) {
            ui.add(egui::Slider::new(gain, 0.0..=4.0).text(name));
        }
        ui.add(egui::Slider::new(&mut curve.brightness, -1.0..=1.0).text("brightness"));
        ui.add(egui::Slider::new(&mut curve.contrast, -1.0..=1.0).text("contrast"));
        ui.add(
            egui::Slider::new(&mut curve.gamma, 0.2..=5.0)
                .logarithmic(true)
                .text("gamma"),
        );
        ui.checkbox(&mut curve.invert, "invert");
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.adjust.threshold_enabled, "threshold");
            ui.add_enabled(
                self.adjust.threshold_enabled,
                egui::Slider::new(&mut self.adjust.threshold_level, 0.0..=1.0).text("level"),
            );
        });

        ui.horizontal(|ui| {
            if ui
                .button("Apply")
                .on_hover_text("Record these settings as one edit")
                .clicked()
            {
                let spec = self.adjust.curve_spec();
                self.request_edit(EditRequest::Apply(spec));
            }
            if ui.button("Reset").clicked() {
                self.adjust.reset_curve();
            }
        });
    }

    fn ui_remap_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Color remap");
        ui.label(RichText::new("Replaces matching colors; first row wins.").small());
        ui.add_space(4.0);

        let mut remove: Option<usize> = None;
        let can_remove = self.adjust.remap_rows.len() > 1;
        for (idx, row) in self.adjust.remap_rows.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                color_edit_button_srgba(ui, &mut row.from, Alpha::Opaque);
                ui.label("→");
                color_edit_button_srgba(ui, &mut row.to, Alpha::Opaque);
                if ui
                    .add_enabled(can_remove, egui::Button::new(icons::ICON_REMOVE).small())
                    .on_hover_text("Remove this row")
                    .clicked()
                {
                    remove = Some(idx);
                }
            });
        }
        if let Some(idx) = remove {
            self.adjust.remap_rows.remove(idx);
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    self.adjust.remap_rows.len() < MAX_REMAP_ROWS,
                    egui::Button::new(format!("{} Add row", icons::ICON_ADD)),
                )
                .clicked()
            {
                self.adjust.remap_rows.push(RemapRow {
                    from: Color32::BLACK,
                    to: Color32::WHITE,
                });
            }
            ui.add(egui::Slider::new(&mut self.adjust.remap_tolerance, 0..=128).text("tolerance"));
        });
        if ui.button("Apply remap").clicked() {
            let spec = self.adjust.remap_spec();
            self.request_edit(EditRequest::Apply(spec));
        }
    }

    fn ui_history_section(&mut self, ui: &mut egui::Ui, editable: bool) {
        ui.heading(format!("{} History", icons::ICON_HISTORY));
        if !self.has_document() {
            ui.label(RichText::new("Load an image to start editing.").small());
            return;
        }
        let current = self.engine.position();
        let mut target: Option<usize> = None;
        ui.add_enabled_ui(editable, |ui| {
            if ui.selectable_label(current == 0, "Original").clicked() {
                target = Some(0);
            }
            for entry in self.engine.history_entries() {
                let text = if entry.applied {
                    RichText::new(&entry.label)
                } else {
                    RichText::new(&entry.label).weak().italics()
                };
                if ui
                    .selectable_label(entry.position == current, text)
                    .on_hover_text("Revert to this step")
                    .clicked()
                {
                    target = Some(entry.position);
                }
            }
        });
        if let Some(position) = target.filter(|&p| p != current) {
            self.request_edit(EditRequest::RevertTo(position));
        }
    }
}
