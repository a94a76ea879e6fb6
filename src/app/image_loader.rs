use super::{ImageLoadRequest, ImageLoadResult, PendingImageMeta, PendingImageTask, RetouchApp};
use crate::raster::{ImageMeta, PixelBuffer, decode_buffer_from_bytes, decode_buffer_from_path};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

impl RetouchApp {
    pub(crate) fn start_loading_image_from_path(&mut self, path: PathBuf) {
        self.remember_image_dir_from_path(&path);
        let meta = PendingImageMeta::Path { path: path.clone() };
        self.start_image_load(ImageLoadRequest::Path(path), meta);
    }

    pub(crate) fn start_loading_image_from_bytes(
        &mut self,
        name: Option<String>,
        bytes: Vec<u8>,
        last_modified: Option<std::time::SystemTime>,
    ) {
        let meta = PendingImageMeta::DroppedBytes {
            name,
            byte_len: bytes.len(),
            last_modified,
        };
        self.start_image_load(ImageLoadRequest::Bytes(bytes), meta);
    }

    fn start_image_load(&mut self, request: ImageLoadRequest, meta: PendingImageMeta) {
        let description = meta.description();
        if self.engine.is_busy() {
            self.set_status(format!("Cannot load {description} while an edit is running."));
            return;
        }
        let limits = self.config.effective_image_limits();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match request {
                ImageLoadRequest::Path(path) => decode_buffer_from_path(&limits, &path),
                ImageLoadRequest::Bytes(bytes) => decode_buffer_from_bytes(&limits, bytes),
            };
            let msg = match result {
                Ok(buffer) => ImageLoadResult::Success(buffer),
                Err(err) => ImageLoadResult::Error(err.to_string()),
            };
            let _ = tx.send(msg);
        });
        self.image.pending_task = Some(PendingImageTask { rx, meta });
        self.set_status(format!("Loading {description}…"));
    }

    pub(crate) fn poll_image_loader(&mut self) {
        // A finished decode waits until the running edit commits.
        if self.engine.is_busy() {
            return;
        }
        let Some(task) = self.image.pending_task.take() else {
            return;
        };
        match task.rx.try_recv() {
            Ok(ImageLoadResult::Success(buffer)) => {
                let meta = task.meta.into_image_meta();
                self.finish_loaded_buffer(buffer, meta);
            }
            Ok(ImageLoadResult::Error(err)) => {
                let label = task.meta.description();
                log::warn!("Failed to load {label}: {err}");
                self.set_status(format!("Failed to load {label}: {err}"));
            }
            Err(TryRecvError::Empty) => {
                self.image.pending_task = Some(task);
            }
            Err(TryRecvError::Disconnected) => {
                let label = task.meta.description();
                self.set_status(format!("Loading {label} failed: worker disconnected."));
            }
        }
    }

    pub(crate) fn finish_loaded_buffer(&mut self, buffer: PixelBuffer, meta: ImageMeta) {
        let name = meta.display_name();
        match self.engine.load_image(buffer, Some(meta)) {
            Ok(()) => {
                self.image.texture_dirty = true;
                self.image.pending_fit_on_load = true;
                self.set_status(format!("Loaded {name}"));
            }
            Err(err) => self.set_status(format!("Failed to load {name}: {err}")),
        }
    }

    pub(crate) fn remember_image_dir_from_path(&mut self, path: &Path) {
        let dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        self.last_image_dir = Some(dir);
    }

    pub(crate) fn remember_export_dir_from_path(&mut self, path: &Path) {
        let dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        self.last_export_dir = Some(dir);
    }
}
