use crate::raster::{ImageMeta, PixelBuffer};

/// The image being edited.
///
/// `source` is the pixel state before the oldest undoable edit, `buffer` is
/// what the user currently sees.
#[derive(Debug, Clone)]
pub struct Document {
    source: PixelBuffer,
    buffer: PixelBuffer,
    meta: Option<ImageMeta>,
}

impl Document {
    pub(super) fn new(source: PixelBuffer, meta: Option<ImageMeta>) -> Self {
        Self {
            buffer: source.clone(),
            source,
            meta,
        }
    }

    pub const fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub const fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub const fn meta(&self) -> Option<&ImageMeta> {
        self.meta.as_ref()
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.buffer.width(), self.buffer.height())
    }

    pub(super) fn swap_buffer(&mut self, buffer: PixelBuffer) -> PixelBuffer {
        std::mem::replace(&mut self.buffer, buffer)
    }

    /// Replace the source after the oldest history entry was folded into it.
    pub(super) fn rebase(&mut self, source: PixelBuffer) {
        self.source = source;
    }
}
