use super::RetouchApp;
use crate::engine::{EditOutcome, EditRequest};
use crate::error::{EditError, EditResult};
use crate::export::ExportFormat;
use egui::{ColorImage, Context, TextureOptions};
use std::path::Path;
use std::time::Duration;

impl RetouchApp {
    /// Route an edit to the engine, off the UI thread for large images.
    pub(crate) fn request_edit(&mut self, request: EditRequest) {
        if self.engine.prefers_background() {
            match self.engine.submit(request) {
                Ok(()) => self.set_status("Working…"),
                Err(err) => self.report_edit_error(&err),
            }
        } else {
            let result = self.engine.execute(request);
            self.finish_edit(result);
        }
    }

    pub(crate) fn poll_edit_job(&mut self, ctx: &Context) {
        if !self.engine.is_busy() {
            return;
        }
        match self.engine.poll() {
            Some(result) => self.finish_edit(result),
            None => ctx.request_repaint_after(Duration::from_millis(16)),
        }
    }

    fn finish_edit(&mut self, result: EditResult<EditOutcome>) {
        match result {
            Ok(outcome) => {
                self.image.texture_dirty = true;
                self.set_status(outcome.message());
            }
            Err(err) => self.report_edit_error(&err),
        }
    }

    fn report_edit_error(&mut self, err: &EditError) {
        match err {
            EditError::EmptyHistory => self.set_status("Nothing to undo or redo."),
            EditError::EngineBusy => self.set_status("Still working on the previous edit."),
            EditError::WorkerDisconnected => {
                self.image.texture_dirty = true;
                self.set_status(format!("Edit failed: {err}"));
            }
            _ => self.set_status(format!("Edit failed: {err}")),
        }
    }

    /// Upload the engine's current buffer when it changed.
    pub(crate) fn sync_texture(&mut self, ctx: &Context) {
        if !self.image.texture_dirty {
            return;
        }
        self.image.texture_dirty = false;
        let Ok(buffer) = self.engine.current_buffer() else {
            self.image.texture = None;
            self.image.size = [0, 0];
            return;
        };
        let size = buffer.size();
        let pixels = ColorImage::from_rgba_unmultiplied(size, &buffer.to_rgba8());
        match self.image.texture.as_mut() {
            Some(texture) => texture.set(pixels, TextureOptions::LINEAR),
            None => {
                self.image.texture =
                    Some(ctx.load_texture("document", pixels, TextureOptions::LINEAR));
            }
        }
        self.image.size = size;
    }

    pub(crate) fn export_to_path(&mut self, path: &Path, format: ExportFormat) {
        self.remember_export_dir_from_path(path);
        match self.engine.export_to_path(path, format) {
            Ok(()) => self.set_status(format!("Exported {}", path.display())),
            Err(err) => {
                log::warn!("Export to {} failed: {err:#}", path.display());
                self.set_status(format!("Export failed: {err:#}"));
            }
        }
    }

    pub(crate) fn close_document(&mut self) {
        self.engine.reset();
        self.image.pending_task = None;
        self.image.texture_dirty = true;
        self.set_status("Image closed.");
    }
}
