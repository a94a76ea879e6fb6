mod buffer;
mod load;
mod meta;

pub use buffer::{PixelBuffer, PixelLayout, check_dimensions};
pub use load::{decode_buffer_from_bytes, decode_buffer_from_path};
pub use meta::{ImageMeta, human_readable_bytes};
