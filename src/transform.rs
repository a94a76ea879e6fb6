//! Edit operations that can be replayed deterministically over a [`PixelBuffer`].

mod palette;
mod rotate;

pub use palette::{ColorMapping, ColorRemap, CurveParams, PaletteAdjust, RemapParams, ToneCurve};
pub use rotate::Rotation;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};
use crate::raster::PixelBuffer;

/// A pure raster operation. `apply` is total over valid buffers: every
/// parameter check happens when the operation is constructed.
pub trait RasterOp {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer;

    /// Short label for the history panel.
    fn describe(&self) -> String;
}

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Rotate(Rotation),
    PaletteAdjust(PaletteAdjust),
}

impl RasterOp for Transform {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        match self {
            Self::Rotate(rotation) => rotation.apply(input),
            Self::PaletteAdjust(adjust) => adjust.apply(input),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Rotate(rotation) => rotation.describe(),
            Self::PaletteAdjust(adjust) => adjust.describe(),
        }
    }
}

/// Unvalidated edit request coming from the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformSpec {
    Rotate { degrees: i32 },
    Curves(CurveParams),
    Remap(RemapParams),
}

impl TransformSpec {
    pub const fn rotate(degrees: i32) -> Self {
        Self::Rotate { degrees }
    }

    pub fn invert() -> Self {
        Self::Curves(CurveParams {
            invert: true,
            ..CurveParams::default()
        })
    }
}

impl TryFrom<TransformSpec> for Transform {
    type Error = EditError;

    fn try_from(spec: TransformSpec) -> EditResult<Self> {
        Ok(match spec {
            TransformSpec::Rotate { degrees } => Self::Rotate(Rotation::from_degrees(degrees)?),
            TransformSpec::Curves(params) => {
                Self::PaletteAdjust(PaletteAdjust::Curves(ToneCurve::new(params)?))
            }
            TransformSpec::Remap(params) => {
                Self::PaletteAdjust(PaletteAdjust::Remap(ColorRemap::new(params)?))
            }
        })
    }
}

/// Fold `transforms` over `source`, oldest first.
pub fn replay<'a>(
    source: &PixelBuffer,
    transforms: impl IntoIterator<Item = &'a Transform>,
) -> PixelBuffer {
    transforms
        .into_iter()
        .fold(source.clone(), |buffer, transform| transform.apply(&buffer))
}
