use anyhow::Context as _;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::Deserialize;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{EditError, EditResult};
use crate::raster::{PixelBuffer, PixelLayout, check_dimensions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Bmp,
    #[serde(alias = "tif")]
    Tiff,
    WebP,
}

impl ExportFormat {
    pub const ALL: [Self; 5] = [Self::Png, Self::Jpeg, Self::Bmp, Self::Tiff, Self::WebP];

    /// Parse a format tag such as `"png"` or `"JPG"`.
    pub fn from_tag(tag: &str) -> EditResult<Self> {
        let normalized = tag.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&normalized.as_str()))
            .ok_or_else(|| EditError::UnsupportedFormat(tag.to_string()))
    }

    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> EditResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| EditError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_tag(ext)
    }

    pub const fn extension(self) -> &'static str {
        self.extensions()[0]
    }

    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Bmp => &["bmp"],
            Self::Tiff => &["tiff", "tif"],
            Self::WebP => &["webp"],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
            Self::WebP => "WebP (lossless)",
        }
    }

    pub const fn keeps_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl FromStr for ExportFormat {
    type Err = EditError;

    fn from_str(s: &str) -> EditResult<Self> {
        Self::from_tag(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Encode a buffer into the container selected by `format`.
pub fn encode(
    buffer: &PixelBuffer,
    format: ExportFormat,
    options: &ExportOptions,
) -> EditResult<Vec<u8>> {
    encode_raw(
        buffer.width(),
        buffer.height(),
        buffer.layout(),
        buffer.data(),
        format,
        options,
    )
}

/// Encode raw pixels; dimensions are checked before any encoder runs.
pub fn encode_raw(
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: &[u8],
    format: ExportFormat,
    options: &ExportOptions,
) -> EditResult<Vec<u8>> {
    check_dimensions(width, height, layout, data.len())?;
    let color = match layout {
        PixelLayout::Rgb8 => ExtendedColorType::Rgb8,
        PixelLayout::Rgba8 => ExtendedColorType::Rgba8,
    };
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes).write_image(data, width, height, color)?,
        ExportFormat::Jpeg => {
            let quality = options.jpeg_quality.clamp(1, 100);
            let rgb = drop_alpha(layout, data);
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ExportFormat::Bmp => BmpEncoder::new(&mut bytes).write_image(data, width, height, color)?,
        ExportFormat::Tiff => {
            TiffEncoder::new(Cursor::new(&mut bytes)).write_image(data, width, height, color)?;
        }
        ExportFormat::WebP => {
            WebPEncoder::new_lossless(&mut bytes).write_image(data, width, height, color)?;
        }
    }
    Ok(bytes)
}

fn drop_alpha(layout: PixelLayout, data: &[u8]) -> Vec<u8> {
    match layout {
        PixelLayout::Rgb8 => data.to_vec(),
        PixelLayout::Rgba8 => data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
    }
}

/// Encode and write to `path` with an atomic temp-file swap.
pub fn export_to_path(
    path: &Path,
    buffer: &PixelBuffer,
    format: ExportFormat,
    options: &ExportOptions,
) -> anyhow::Result<()> {
    let bytes = encode(buffer, format, options)
        .with_context(|| format!("Failed to encode {}", format.label()))?;
    write_export(path, &bytes)
}

fn build_temp_path(target: &Path) -> PathBuf {
    let parent = target
        .parent()
        .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf);
    let base = target.file_name().map_or_else(
        || "retouch_export".to_string(),
        |s| s.to_string_lossy().into_owned(),
    );
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut candidate = parent.join(format!(".{base}.{nanos}.tmp"));
    let mut counter = 0u32;
    while candidate.exists() {
        counter = counter.wrapping_add(1);
        candidate = parent.join(format!(".{base}.{nanos}.{counter}.tmp"));
    }
    candidate
}

fn replace_file(tmp_path: &Path, target: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(tmp_path, target) {
            Ok(()) => Ok(()),
            Err(err) => {
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) && target.exists()
                {
                    let _ = fs::remove_file(target);
                    fs::rename(tmp_path, target)
                } else {
                    Err(err)
                }
            }
        }
    }
    #[cfg(not(windows))]
    {
        fs::rename(tmp_path, target)
    }
}

/// Write encoded bytes through a temp file in the same directory, then rename.
pub fn write_export(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    let tmp_path = build_temp_path(path);
    {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| format!("Failed to create temp file {}", tmp_path.display()))?;
        file.write_all(data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;
    }
    let rename_result = replace_file(&tmp_path, path)
        .with_context(|| format!("Failed to replace {} with temp file", path.display()));
    if rename_result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    rename_result
}
