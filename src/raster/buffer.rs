use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// Minimum pixel count before parallelizing per-pixel work.
const PARALLEL_PIXEL_THRESHOLD: usize = 262_144; // 512x512

/// Channel arrangement of a [`PixelBuffer`]; 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelLayout {
    Rgb8,
    Rgba8,
}

impl PixelLayout {
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba8)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rgb8 => "RGB 8-bit",
            Self::Rgba8 => "RGBA 8-bit",
        }
    }
}

/// Immutable row-major raster.
///
/// Pixel bytes live behind an `Arc`, so cloning a buffer is cheap and a
/// buffer can be read from the UI thread while a worker derives the next one.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Validate dimensions against the data length and wrap the bytes.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> EditResult<Self> {
        check_dimensions(width, height, layout, data.len())?;
        Ok(Self {
            width,
            height,
            layout,
            data: data.into(),
        })
    }

    /// Internal constructor for derived buffers whose size is correct by construction.
    pub(crate) fn from_parts(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            expected_len(width, height, layout),
            Some(data.len()),
            "derived buffer has the wrong length"
        );
        Self {
            width,
            height,
            layout,
            data: data.into(),
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / self.layout.channels()
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Channel values of the pixel at `(x, y)`.
    pub fn sample(&self, x: u32, y: u32) -> EditResult<&[u8]> {
        if x >= self.width || y >= self.height {
            return Err(EditError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let channels = self.layout.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        Ok(&self.data[start..start + channels])
    }

    /// Whether both buffers share the same storage (no copy happened).
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// RGBA8 copy of the pixels, as expected by texture uploads.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.layout {
            PixelLayout::Rgba8 => self.data.to_vec(),
            PixelLayout::Rgb8 => self
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
                .collect(),
        }
    }

    /// New buffer with every pixel passed through `f`, keeping size and layout.
    pub(crate) fn map_pixels(&self, f: impl Fn(&mut [u8]) + Sync + Send) -> Self {
        let channels = self.layout.channels();
        let mut out = self.data.to_vec();
        if self.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
            out.par_chunks_mut(channels).for_each(f);
        } else {
            out.chunks_mut(channels).for_each(f);
        }
        Self::from_parts(self.width, self.height, self.layout, out)
    }

    /// New `new_width`-wide buffer where destination pixel `(dx, dy)` copies
    /// the source pixel at index `source_index(dx, dy)`.
    pub(crate) fn remap_pixels(
        &self,
        new_width: u32,
        new_height: u32,
        source_index: impl Fn(usize, usize) -> usize + Sync + Send,
    ) -> Self {
        let channels = self.layout.channels();
        let row = new_width as usize;
        let src = &self.data;
        let mut out = vec![0u8; self.data.len()];
        let fill = |(idx, px): (usize, &mut [u8])| {
            let start = source_index(idx % row, idx / row) * channels;
            px.copy_from_slice(&src[start..start + channels]);
        };
        if self.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
            out.par_chunks_mut(channels).enumerate().for_each(fill);
        } else {
            out.chunks_mut(channels).enumerate().for_each(fill);
        }
        Self::from_parts(new_width, new_height, self.layout, out)
    }
}

fn expected_len(width: u32, height: u32, layout: PixelLayout) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(layout.channels())
}

/// Reject zero-sized rasters and byte counts that do not match `width × height × channels`.
pub fn check_dimensions(width: u32, height: u32, layout: PixelLayout, len: usize) -> EditResult<()> {
    let matches = width > 0 && height > 0 && expected_len(width, height, layout) == Some(len);
    if matches {
        Ok(())
    } else {
        Err(EditError::InvalidDimensions { width, height, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height)
            .flat_map(|i| [u8::try_from(i).unwrap_or(u8::MAX), 0, 0])
            .collect();
        PixelBuffer::new(width, height, PixelLayout::Rgb8, data).expect("valid buffer")
    }

    #[test]
    fn rejects_zero_sized_buffers() {
        let err = PixelBuffer::new(0, 3, PixelLayout::Rgba8, Vec::new()).unwrap_err();
        assert!(matches!(err, EditError::InvalidDimensions { width: 0, .. }));
        let err = PixelBuffer::new(3, 0, PixelLayout::Rgb8, Vec::new()).unwrap_err();
        assert!(matches!(err, EditError::InvalidDimensions { height: 0, .. }));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = PixelBuffer::new(2, 2, PixelLayout::Rgba8, vec![0; 15]).unwrap_err();
        assert!(matches!(err, EditError::InvalidDimensions { len: 15, .. }));
        assert!(PixelBuffer::new(2, 2, PixelLayout::Rgba8, vec![0; 16]).is_ok());
    }

    #[test]
    fn sample_reads_row_major() {
        let buf = ids(3, 2);
        assert_eq!(buf.sample(0, 0).expect("in bounds"), &[0, 0, 0]);
        assert_eq!(buf.sample(2, 0).expect("in bounds"), &[2, 0, 0]);
        assert_eq!(buf.sample(1, 1).expect("in bounds"), &[4, 0, 0]);
    }

    #[test]
    fn sample_outside_bounds_fails() {
        let buf = ids(3, 2);
        assert!(matches!(
            buf.sample(3, 0),
            Err(EditError::OutOfBounds { x: 3, y: 0, .. })
        ));
        assert!(matches!(buf.sample(0, 2), Err(EditError::OutOfBounds { .. })));
    }

    #[test]
    fn clones_share_storage() {
        let buf = ids(2, 2);
        let copy = buf.clone();
        assert!(buf.shares_storage(&copy));
        let mapped = buf.map_pixels(|_| {});
        assert_eq!(mapped, buf);
        assert!(!mapped.shares_storage(&buf));
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let buf = PixelBuffer::new(1, 2, PixelLayout::Rgb8, vec![1, 2, 3, 4, 5, 6]).expect("valid");
        assert_eq!(buf.to_rgba8(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn large_buffers_map_in_parallel_identically() {
        let side = 600;
        let data: Vec<u8> = (0..side * side * 4).map(|i| (i % 251) as u8).collect();
        let buf = PixelBuffer::new(side, side, PixelLayout::Rgba8, data.clone()).expect("valid");
        let inverted = buf.map_pixels(|px| {
            for c in &mut px[..3] {
                *c = u8::MAX - *c;
            }
        });
        let expected: Vec<u8> = data
            .chunks_exact(4)
            .flat_map(|px| [255 - px[0], 255 - px[1], 255 - px[2], px[3]])
            .collect();
        assert_eq!(inverted.data(), expected.as_slice());
    }
}
