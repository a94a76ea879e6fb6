use super::RetouchApp;
use crate::config::ImageLimits;
use crate::raster::{ImageMeta, PixelLayout, human_readable_bytes};
use arboard::{Clipboard, Error as ClipboardError};

struct ClipboardCapture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

struct ValidatedClipboardSize {
    width: u32,
    height: u32,
    expected_len: usize,
}

impl RetouchApp {
    pub(crate) fn paste_image_from_clipboard(&mut self) {
        if self.engine.is_busy() {
            self.set_status("Paste ignored: an edit is still running.");
            return;
        }
        self.image.pending_task = None;
        let captured = match capture_clipboard_image(&self.config.effective_image_limits()) {
            Ok(captured) => captured,
            Err(err) => {
                self.set_status(err);
                return;
            }
        };
        let meta = ImageMeta::from_clipboard(u64::try_from(captured.rgba.len()).ok());
        let name = meta.display_name();
        match self.engine.load_raw(
            captured.width,
            captured.height,
            PixelLayout::Rgba8,
            captured.rgba,
            Some(meta),
        ) {
            Ok(()) => {
                self.image.texture_dirty = true;
                self.image.pending_fit_on_load = true;
                self.set_status(format!("Loaded {name}"));
            }
            Err(err) => self.set_status(format!("Paste failed: {err}")),
        }
    }
}

fn capture_clipboard_image(limits: &ImageLimits) -> Result<ClipboardCapture, String> {
    let mut clipboard = Clipboard::new().map_err(format_clipboard_error)?;
    let data = clipboard.get_image().map_err(format_clipboard_error)?;
    let size = validate_clipboard_image(limits, data.width, data.height)?;
    let mut bytes = data.bytes.into_owned();
    if bytes.len() < size.expected_len {
        return Err("Paste failed: clipboard image data is truncated.".to_string());
    }
    bytes.truncate(size.expected_len);
    Ok(ClipboardCapture {
        width: size.width,
        height: size.height,
        rgba: bytes,
    })
}

fn validate_clipboard_image(
    limits: &ImageLimits,
    width: usize,
    height: usize,
) -> Result<ValidatedClipboardSize, String> {
    if width == 0 || height == 0 {
        return Err("Paste failed: clipboard image is empty.".to_string());
    }
    let width_u32 = u32::try_from(width).unwrap_or(u32::MAX);
    let height_u32 = u32::try_from(height).unwrap_or(u32::MAX);
    if width_u32 > limits.image_dim || height_u32 > limits.image_dim {
        return Err(format!(
            "Paste failed: clipboard image {width}x{height} exceeds the per-side limit ({} px).",
            limits.image_dim
        ));
    }

    let total_pixels = u64::from(width_u32) * u64::from(height_u32);
    if total_pixels > limits.total_pixels {
        return Err(format!(
            "Paste failed: clipboard image too large: {width}x{height} (~{} MP) exceeds limit (~{} MP).",
            total_pixels / 1_000_000,
            limits.total_pixels / 1_000_000
        ));
    }

    let rgba_bytes = total_pixels.checked_mul(4).ok_or_else(|| {
        "Paste failed: clipboard image is too large to fit in memory.".to_string()
    })?;
    if rgba_bytes > limits.alloc_bytes {
        return Err(format!(
            "Paste failed: clipboard image needs about {} of RGBA data, over the configured limit ({}).",
            human_readable_bytes(rgba_bytes),
            human_readable_bytes(limits.alloc_bytes)
        ));
    }

    let expected_len = usize::try_from(rgba_bytes).map_err(|_| {
        "Paste failed: clipboard image does not fit in available memory.".to_string()
    })?;

    Ok(ValidatedClipboardSize {
        width: width_u32,
        height: height_u32,
        expected_len,
    })
}

fn format_clipboard_error(err: ClipboardError) -> String {
    match err {
        ClipboardError::ContentNotAvailable => {
            "Paste failed: clipboard does not contain an image.".to_string()
        }
        ClipboardError::ClipboardNotSupported => {
            "Paste failed: clipboard access is not supported in this environment.".to_string()
        }
        ClipboardError::ClipboardOccupied => {
            "Paste failed: clipboard is busy; try again in a moment.".to_string()
        }
        ClipboardError::ConversionFailure => {
            "Paste failed: clipboard image could not be converted.".to_string()
        }
        ClipboardError::Unknown { description } => {
            format!("Paste failed: {description}")
        }
        _ => {
            format!("Paste failed: {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clipboard_image_is_rejected() {
        let err = validate_clipboard_image(&ImageLimits::default(), 0, 10).err();
        assert_eq!(err.as_deref(), Some("Paste failed: clipboard image is empty."));
    }

    #[test]
    fn per_side_limit_applies() {
        let limits = ImageLimits {
            image_dim: 100,
            ..ImageLimits::default()
        };
        let err = validate_clipboard_image(&limits, 101, 10).err().expect("rejected");
        assert!(err.contains("per-side limit"));
    }

    #[test]
    fn valid_size_reports_rgba_length() {
        let size = validate_clipboard_image(&ImageLimits::default(), 3, 2).expect("valid");
        assert_eq!((size.width, size.height, size.expected_len), (3, 2, 24));
    }
}
