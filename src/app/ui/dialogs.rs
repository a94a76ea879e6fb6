use super::super::{NativeDialog, RetouchApp};
use crate::export::ExportFormat;
use egui_file_dialog::FileDialog;
use std::path::Path;

impl RetouchApp {
    pub(crate) fn open_image_dialog(&mut self) {
        let mut dialog = Self::make_open_dialog(self.last_image_dir.as_deref());
        dialog.pick_file();
        self.active_dialog = Some(NativeDialog::Open(dialog));
    }

    pub(crate) fn start_export_dialog(&mut self) {
        if self.engine.current_buffer().is_err() {
            self.set_status("Load an image before exporting.");
            return;
        }
        let format = self.adjust.export_format;
        let default_name = self
            .engine
            .session()
            .and_then(|s| s.document().meta())
            .map_or_else(
                || format!("image-edited.{}", format.extension()),
                |m| m.export_file_name(format),
            );
        let mut dialog = Self::make_save_dialog(
            &format!("Export {}", format.label()),
            &default_name,
            format.extensions(),
            self.last_export_dir.as_deref(),
        );
        dialog.save_file();
        self.active_dialog = Some(NativeDialog::Export { dialog, format });
    }

    pub(crate) fn make_open_dialog(initial_dir: Option<&Path>) -> FileDialog {
        // Keep in sync with enabled `image` crate features.
        let mut dialog = FileDialog::new()
            .title("Open image")
            .add_file_filter_extensions(
                "All images",
                vec![
                    "png", "jpg", "jpeg", "gif", "bmp", "webp", "ico", "tga", "tiff", "tif", "pnm",
                    "pbm", "pgm", "ppm",
                ],
            )
            .add_file_filter_extensions("PNG", vec!["png"])
            .add_file_filter_extensions("JPEG/JPG", vec!["jpg", "jpeg"])
            .add_file_filter_extensions("BMP", vec!["bmp"])
            .add_file_filter_extensions("TIFF", vec!["tiff", "tif"])
            .add_file_filter_extensions("WebP", vec!["webp"])
            .default_file_filter("All images");
        if let Some(dir) = initial_dir {
            dialog = dialog.initial_directory(dir.to_path_buf());
        }
        dialog
    }

    pub(crate) fn make_save_dialog(
        title: &str,
        default_name: &str,
        extensions: &[&str],
        initial_dir: Option<&Path>,
    ) -> FileDialog {
        let mut dialog = FileDialog::new()
            .title(title)
            .default_file_name(default_name);
        let mut first_label: Option<String> = None;
        for ext in extensions {
            let label = format!("*.{ext}");
            if first_label.is_none() {
                first_label = Some(label.clone());
            }
            dialog = dialog.add_save_extension(&label, ext);
        }
        if let Some(label) = first_label.as_deref() {
            dialog = dialog.default_save_extension(label);
        }
        if let Some(dir) = initial_dir {
            dialog = dialog.initial_directory(dir.to_path_buf());
        }
        dialog
    }

    pub(crate) fn ui_export_format_picker(&mut self, ui: &mut egui::Ui) {
        egui::ComboBox::from_id_salt("export_format")
            .selected_text(self.adjust.export_format.label())
            .show_ui(ui, |ui| {
                for format in ExportFormat::ALL {
                    ui.selectable_value(&mut self.adjust.export_format, format, format.label());
                }
            })
            .response
            .on_hover_text("Format used by Export image");
    }
}
