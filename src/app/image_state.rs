use crate::raster::{ImageMeta, PixelBuffer};
use egui::{TextureHandle, Vec2};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::SystemTime;

pub enum ImageLoadRequest {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

pub struct PendingImageTask {
    pub(super) rx: Receiver<ImageLoadResult>,
    pub(super) meta: PendingImageMeta,
}

pub enum ImageLoadResult {
    Success(PixelBuffer),
    Error(String),
}

#[derive(Clone)]
pub enum PendingImageMeta {
    Path {
        path: PathBuf,
    },
    DroppedBytes {
        name: Option<String>,
        byte_len: usize,
        last_modified: Option<SystemTime>,
    },
}

impl PendingImageMeta {
    pub(super) fn description(&self) -> String {
        match self {
            Self::Path { path } => path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or_else(|| path.display().to_string(), str::to_string),
            Self::DroppedBytes { name, .. } => name
                .as_deref()
                .map_or_else(|| "dropped bytes".to_string(), str::to_string),
        }
    }

    pub(super) fn into_image_meta(self) -> ImageMeta {
        match self {
            Self::Path { path } => ImageMeta::from_path(&path),
            Self::DroppedBytes {
                name,
                byte_len,
                last_modified,
            } => ImageMeta::from_dropped_bytes(name.as_deref(), byte_len, last_modified),
        }
    }
}

/// Display side of the document: the uploaded texture and view settings.
pub struct ImageState {
    pub(super) texture: Option<TextureHandle>,
    pub(super) size: [usize; 2],
    /// The engine buffer changed since the last upload.
    pub(super) texture_dirty: bool,
    pub(super) zoom: f32,
    pub(super) last_viewport_size: Option<Vec2>,
    pub(super) pending_fit_on_load: bool,
    pub(super) pending_task: Option<PendingImageTask>,
}

impl Default for ImageState {
    fn default() -> Self {
        Self {
            texture: None,
            size: [0, 0],
            texture_dirty: false,
            zoom: 1.0,
            last_viewport_size: None,
            pending_fit_on_load: false,
            pending_task: None,
        }
    }
}
