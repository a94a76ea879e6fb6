use crate::export::ExportFormat;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where a loaded image came from.
#[derive(Debug, Clone)]
enum ImageSource {
    File(PathBuf),
    Dropped { name: Option<String> },
    Pasted,
}

impl ImageSource {
    const fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "File on disk",
            Self::Dropped { .. } => "Dropped file",
            Self::Pasted => "Clipboard",
        }
    }
}

/// Provenance of the image a session was opened from.
///
/// Captured once at load time; edits never change it. The info window reads
/// it through [`ImageMeta::details`] and the export dialog through
/// [`ImageMeta::export_file_name`].
#[derive(Debug, Clone)]
pub struct ImageMeta {
    source: ImageSource,
    /// Encoded size of the original file, not the decoded pixel memory.
    file_size: Option<u64>,
    modified: Option<SystemTime>,
    /// Container format guessed from the file name.
    encoding: Option<ImageFormat>,
}

impl ImageMeta {
    /// Metadata for a file opened from disk; size and mtime come from the filesystem.
    pub fn from_path(path: &Path) -> Self {
        let fs_meta = std::fs::metadata(path).ok();
        Self {
            source: ImageSource::File(path.to_owned()),
            file_size: fs_meta.as_ref().map(std::fs::Metadata::len),
            modified: fs_meta.and_then(|m| m.modified().ok()),
            encoding: ImageFormat::from_path(path).ok(),
        }
    }

    /// Metadata for bytes dropped onto the window. Empty names count as missing.
    pub fn from_dropped_bytes(
        name: Option<&str>,
        byte_len: usize,
        modified: Option<SystemTime>,
    ) -> Self {
        let name = name.filter(|s| !s.is_empty()).map(ToOwned::to_owned);
        let encoding = name
            .as_deref()
            .and_then(|n| ImageFormat::from_path(n).ok());
        Self {
            source: ImageSource::Dropped { name },
            file_size: u64::try_from(byte_len).ok(),
            modified,
            encoding,
        }
    }

    /// Metadata for pixels pasted from the clipboard (`byte_len` is the raw RGBA size).
    pub const fn from_clipboard(byte_len: Option<u64>) -> Self {
        Self {
            source: ImageSource::Pasted,
            file_size: byte_len,
            modified: None,
            encoding: None,
        }
    }

    /// Name shown in the status line and the info window.
    pub fn display_name(&self) -> String {
        match &self.source {
            ImageSource::File(path) => path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or_else(|| path.display().to_string(), ToOwned::to_owned),
            ImageSource::Dropped { name } => name
                .clone()
                .unwrap_or_else(|| "Unnamed drop".to_string()),
            ImageSource::Pasted => "Pasted image".to_string(),
        }
    }

    /// Default file name for exporting an edited copy, e.g. `photo-edited.png`.
    pub fn export_file_name(&self, format: ExportFormat) -> String {
        let stem = match &self.source {
            ImageSource::File(path) => path.file_stem().and_then(|s| s.to_str()),
            ImageSource::Dropped { name } => name
                .as_deref()
                .and_then(|n| Path::new(n).file_stem())
                .and_then(|s| s.to_str()),
            ImageSource::Pasted => Some("pasted"),
        };
        let stem = stem.filter(|s| !s.is_empty()).unwrap_or("image");
        format!("{stem}-edited.{}", format.extension())
    }

    /// Label/value rows for the image info window.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Source", self.source.label().to_string()),
            ("Name", self.display_name()),
        ];
        if let ImageSource::File(path) = &self.source {
            rows.push(("Path", path.display().to_string()));
        }
        if let Some(encoding) = self.encoding {
            let tag = encoding.extensions_str().first().copied().unwrap_or("?");
            rows.push(("Encoding", tag.to_uppercase()));
        }
        let size = self.file_size.map_or_else(
            || "Unknown".to_string(),
            |bytes| format!("{} ({bytes} bytes)", human_readable_bytes(bytes)),
        );
        rows.push(("Size", size));
        let modified = self
            .modified
            .map_or_else(|| "Unknown".to_string(), format_system_time);
        rows.push(("Modified", modified));
        rows
    }
}

/// Format a byte count with binary units (KiB, MiB, ...).
pub fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit_idx = 0;
    while value >= 1024.0 && unit_idx < UNITS.len() - 1 {
        value /= 1024.0;
        unit_idx += 1;
    }
    if unit_idx == 0 {
        format!("{bytes} {}", UNITS[unit_idx])
    } else {
        format!("{value:.2} {}", UNITS[unit_idx])
    }
}

fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = DateTime::from(time);
    datetime.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(rows: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        rows.iter()
            .find(|(label, _)| *label == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn byte_units_scale() {
        assert_eq!(human_readable_bytes(512), "512 B");
        assert_eq!(human_readable_bytes(2048), "2.00 KiB");
        assert_eq!(human_readable_bytes(3 * 1024 * 1024), "3.00 MiB");
    }

    #[test]
    fn export_name_follows_source_and_format() {
        let dropped = ImageMeta::from_dropped_bytes(Some("holiday.jpg"), 10, None);
        assert_eq!(
            dropped.export_file_name(ExportFormat::Png),
            "holiday-edited.png"
        );
        assert_eq!(
            ImageMeta::from_clipboard(None).export_file_name(ExportFormat::WebP),
            "pasted-edited.webp"
        );
        let unnamed = ImageMeta::from_dropped_bytes(Some(""), 10, None);
        assert_eq!(unnamed.display_name(), "Unnamed drop");
        assert_eq!(
            unnamed.export_file_name(ExportFormat::Jpeg),
            "image-edited.jpg"
        );
    }

    #[test]
    fn details_report_encoding_and_unknowns() {
        let dropped = ImageMeta::from_dropped_bytes(Some("scan.TIF"), 2048, None);
        let rows = dropped.details();
        assert_eq!(row(&rows, "Source"), Some("Dropped file"));
        assert_eq!(row(&rows, "Encoding"), Some("TIFF"));
        assert_eq!(row(&rows, "Size"), Some("2.00 KiB (2048 bytes)"));
        assert_eq!(row(&rows, "Modified"), Some("Unknown"));
        assert_eq!(row(&rows, "Path"), None);

        let pasted = ImageMeta::from_clipboard(None).details();
        assert_eq!(row(&pasted, "Encoding"), None);
        assert_eq!(row(&pasted, "Size"), Some("Unknown"));
    }

    #[test]
    fn epoch_formats_as_utc() {
        assert_eq!(
            format_system_time(SystemTime::UNIX_EPOCH),
            "1970-01-01 00:00:00 UTC"
        );
    }
}
