use anyhow::Context as _;
use image::{DynamicImage, GenericImageView, ImageReader, Limits};
use std::io::{BufRead, Cursor, Read, Seek};
use std::path::Path;

use super::buffer::{PixelBuffer, PixelLayout};
use crate::config::ImageLimits;
use crate::error::{EditError, EditResult};

fn decode_reader<R>(limits: &ImageLimits, mut reader: ImageReader<R>) -> anyhow::Result<PixelBuffer>
where
    R: Read + Seek + BufRead,
{
    let il = limits.sanitized();
    let mut decode_limits = Limits::default();
    decode_limits.max_image_width = Some(il.image_dim);
    decode_limits.max_image_height = Some(il.image_dim);
    decode_limits.max_alloc = Some(il.alloc_bytes);
    reader.limits(decode_limits);
    let img = reader.decode().context("Failed to decode image data")?;

    let (w, h) = img.dimensions();
    let total_pixels = u64::from(w) * u64::from(h);
    if total_pixels > il.total_pixels {
        anyhow::bail!(
            "Image too large: {}x{} (~{} MP) exceeds limit (~{} MP)",
            w,
            h,
            total_pixels / 1_000_000,
            il.total_pixels / 1_000_000
        );
    }

    let buffer = into_pixel_buffer(img)?;
    Ok(buffer)
}

/// Keep opaque images as RGB; everything else becomes RGBA8.
fn into_pixel_buffer(img: DynamicImage) -> EditResult<PixelBuffer> {
    let (w, h) = img.dimensions();
    if img.color().has_alpha() {
        PixelBuffer::new(w, h, PixelLayout::Rgba8, img.into_rgba8().into_raw())
    } else {
        PixelBuffer::new(w, h, PixelLayout::Rgb8, img.into_rgb8().into_raw())
    }
}

fn to_decode_error(err: &anyhow::Error) -> EditError {
    EditError::Decode(format!("{err:#}"))
}

/// Load and decode an image from a filesystem path using configured limits.
pub fn decode_buffer_from_path(limits: &ImageLimits, path: &Path) -> EditResult<PixelBuffer> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .and_then(|reader| {
            reader
                .with_guessed_format()
                .context("Failed to detect image format")
        })
        .and_then(|reader| decode_reader(limits, reader))
        .map_err(|err| to_decode_error(&err))
}

/// Load and decode an image from raw bytes using configured limits.
pub fn decode_buffer_from_bytes(limits: &ImageLimits, bytes: Vec<u8>) -> EditResult<PixelBuffer> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to detect image format")
        .and_then(|reader| decode_reader(limits, reader))
        .map_err(|err| to_decode_error(&err))
}
