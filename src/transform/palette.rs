use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;

use super::RasterOp;
use crate::error::{EditError, EditResult};
use crate::raster::PixelBuffer;

const MAX_REMAP_ENTRIES: usize = 256;

/// Raw tone-curve settings as entered in the UI; validated by [`ToneCurve::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveParams {
    /// Per-channel multipliers for red, green and blue.
    pub gains: [f32; 3],
    pub brightness: f32,
    pub contrast: f32,
    pub gamma: f32,
    pub invert: bool,
    /// Luma cut-off in `0..=1`; pixels become black or white.
    pub threshold: Option<f32>,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            gains: [1.0; 3],
            brightness: 0.0,
            contrast: 0.0,
            gamma: 1.0,
            invert: false,
            threshold: None,
        }
    }
}

impl CurveParams {
    pub fn is_identity(&self) -> bool {
        self.gains.iter().all(|g| (g - 1.0).abs() <= f32::EPSILON)
            && self.brightness.abs() <= f32::EPSILON
            && self.contrast.abs() <= f32::EPSILON
            && (self.gamma - 1.0).abs() <= f32::EPSILON
            && !self.invert
            && self.threshold.is_none()
    }

    fn validate(&self) -> EditResult<()> {
        check_range("brightness", self.brightness, -1.0, 1.0)?;
        check_range("contrast", self.contrast, -1.0, 1.0)?;
        check_range("gamma", self.gamma, 0.2, 5.0)?;
        for (gain, channel) in self.gains.iter().zip(["red", "green", "blue"]) {
            check_range(&format!("{channel} gain"), *gain, 0.0, 4.0)?;
        }
        if let Some(threshold) = self.threshold {
            check_range("threshold", threshold, 0.0, 1.0)?;
        }
        if self.is_identity() {
            return Err(EditError::invalid("curve does not change any pixel"));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> EditResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EditError::invalid(format!(
            "{name} must be within {min}..={max}, got {value}"
        )))
    }
}

/// Validated per-channel tone curve: gains, brightness, contrast, gamma,
/// inversion and an optional threshold, applied in that order. Alpha is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveParams", into = "CurveParams")]
pub struct ToneCurve {
    params: CurveParams,
}

impl ToneCurve {
    pub fn new(params: CurveParams) -> EditResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn invert() -> Self {
        Self {
            params: CurveParams {
                invert: true,
                ..CurveParams::default()
            },
        }
    }

    fn channel_luts(&self) -> [[u8; 256]; 3] {
        let p = &self.params;
        let contrast_factor = 1.0 + p.contrast;
        let inv_gamma = 1.0 / p.gamma;
        let mut luts = [[0u8; 256]; 3];
        for (lut, gain) in luts.iter_mut().zip(p.gains) {
            for (value, slot) in (0u8..=u8::MAX).zip(lut.iter_mut()) {
                let mut f = f32::from(value) / 255.0;
                f = (f * gain).clamp(0.0, 1.0);
                f = (f + p.brightness).clamp(0.0, 1.0);
                f = (f - 0.5).mul_add(contrast_factor, 0.5).clamp(0.0, 1.0);
                if (inv_gamma - 1.0).abs() > f32::EPSILON {
                    f = f.powf(inv_gamma).clamp(0.0, 1.0);
                }
                if p.invert {
                    f = 1.0 - f;
                }
                *slot = float_to_u8(f);
            }
        }
        luts
    }
}

impl TryFrom<CurveParams> for ToneCurve {
    type Error = EditError;

    fn try_from(params: CurveParams) -> EditResult<Self> {
        Self::new(params)
    }
}

impl From<ToneCurve> for CurveParams {
    fn from(curve: ToneCurve) -> Self {
        curve.params
    }
}

impl RasterOp for ToneCurve {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let luts = self.channel_luts();
        let threshold = self.params.threshold;
        input.map_pixels(|px| {
            for (c, lut) in px.iter_mut().zip(&luts) {
                *c = lut[usize::from(*c)];
            }
            if let Some(level) = threshold {
                let luma = 0.0722f32.mul_add(
                    f32::from(px[2]),
                    0.2126f32.mul_add(f32::from(px[0]), 0.7152 * f32::from(px[1])),
                ) / 255.0;
                let v = if luma >= level { u8::MAX } else { 0 };
                px[..3].fill(v);
            }
        })
    }

    fn describe(&self) -> String {
        let p = &self.params;
        if *p == Self::invert().params {
            return "Invert colors".to_string();
        }
        let mut parts = Vec::new();
        if p.gains.iter().any(|g| (g - 1.0).abs() > f32::EPSILON) {
            parts.push(format!(
                "gains {:.2}/{:.2}/{:.2}",
                p.gains[0], p.gains[1], p.gains[2]
            ));
        }
        if p.brightness.abs() > f32::EPSILON {
            parts.push(format!("brightness {:+.2}", p.brightness));
        }
        if p.contrast.abs() > f32::EPSILON {
            parts.push(format!("contrast {:+.2}", p.contrast));
        }
        if (p.gamma - 1.0).abs() > f32::EPSILON {
            parts.push(format!("gamma {:.2}", p.gamma));
        }
        if p.invert {
            parts.push("inverted".to_string());
        }
        if let Some(level) = p.threshold {
            parts.push(format!("threshold {level:.2}"));
        }
        let mut label = "Adjust colors".to_string();
        if !parts.is_empty() {
            let _ = write!(label, " ({})", parts.join(", "));
        }
        label
    }
}

fn float_to_u8(value: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorMapping {
    pub from: [u8; 3],
    pub to: [u8; 3],
}

/// Raw remap table; validated by [`ColorRemap::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapParams {
    pub entries: Vec<ColorMapping>,
    /// Largest per-channel difference still counted as a match.
    pub tolerance: u8,
}

/// Replaces colors matching a table entry; the first matching entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RemapParams", into = "RemapParams")]
pub struct ColorRemap {
    params: RemapParams,
}

impl ColorRemap {
    pub fn new(params: RemapParams) -> EditResult<Self> {
        if params.entries.is_empty() {
            return Err(EditError::invalid("color remap needs at least one entry"));
        }
        if params.entries.len() > MAX_REMAP_ENTRIES {
            return Err(EditError::invalid(format!(
                "color remap supports at most {MAX_REMAP_ENTRIES} entries, got {}",
                params.entries.len()
            )));
        }
        let mut seen = HashSet::with_capacity(params.entries.len());
        for entry in &params.entries {
            if !seen.insert(entry.from) {
                let [r, g, b] = entry.from;
                return Err(EditError::invalid(format!(
                    "color #{r:02x}{g:02x}{b:02x} is mapped twice"
                )));
            }
        }
        Ok(Self { params })
    }
}

impl TryFrom<RemapParams> for ColorRemap {
    type Error = EditError;

    fn try_from(params: RemapParams) -> EditResult<Self> {
        Self::new(params)
    }
}

impl From<ColorRemap> for RemapParams {
    fn from(remap: ColorRemap) -> Self {
        remap.params
    }
}

impl RasterOp for ColorRemap {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let entries = &self.params.entries;
        let tolerance = self.params.tolerance;
        input.map_pixels(|px| {
            let hit = entries.iter().find(|entry| {
                entry
                    .from
                    .iter()
                    .zip(px.iter())
                    .all(|(a, b)| a.abs_diff(*b) <= tolerance)
            });
            if let Some(entry) = hit {
                px[..3].copy_from_slice(&entry.to);
            }
        })
    }

    fn describe(&self) -> String {
        match self.params.entries.len() {
            1 => "Remap 1 color".to_string(),
            n => format!("Remap {n} colors"),
        }
    }
}

/// Color-level edits that keep the image geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaletteAdjust {
    Curves(ToneCurve),
    Remap(ColorRemap),
}

impl PaletteAdjust {
    pub fn invert() -> Self {
        Self::Curves(ToneCurve::invert())
    }
}

impl RasterOp for PaletteAdjust {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        match self {
            Self::Curves(curve) => curve.apply(input),
            Self::Remap(remap) => remap.apply(input),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Curves(curve) => curve.describe(),
            Self::Remap(remap) => remap.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelLayout;

    fn rgba(pixels: &[[u8; 4]]) -> PixelBuffer {
        let width = u32::try_from(pixels.len()).expect("small test image");
        PixelBuffer::new(width, 1, PixelLayout::Rgba8, pixels.concat()).expect("valid")
    }

    #[test]
    fn invert_flips_color_and_keeps_alpha() {
        let img = rgba(&[[0, 100, 255, 7], [10, 20, 30, 255]]);
        let out = PaletteAdjust::invert().apply(&img);
        assert_eq!(out.data(), &[255, 155, 0, 7, 245, 235, 225, 255]);
        assert_eq!(PaletteAdjust::invert().apply(&out), img);
    }

    #[test]
    fn curves_clamp_at_channel_limits() {
        let curve = ToneCurve::new(CurveParams {
            brightness: 1.0,
            ..CurveParams::default()
        })
        .expect("valid");
        let out = curve.apply(&rgba(&[[0, 128, 255, 9]]));
        assert_eq!(out.data(), &[255, 255, 255, 9]);

        let darken = ToneCurve::new(CurveParams {
            gains: [0.0, 1.0, 4.0],
            ..CurveParams::default()
        })
        .expect("valid");
        let out = darken.apply(&rgba(&[[200, 50, 100, 255]]));
        assert_eq!(out.data(), &[0, 50, 255, 255]);
    }

    #[test]
    fn threshold_produces_black_and_white() {
        let curve = ToneCurve::new(CurveParams {
            threshold: Some(0.5),
            ..CurveParams::default()
        })
        .expect("valid");
        let out = curve.apply(&rgba(&[[250, 250, 250, 1], [10, 10, 10, 2]]));
        assert_eq!(out.data(), &[255, 255, 255, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn curve_validation_rejects_bad_values() {
        let cases = [
            CurveParams {
                gamma: 0.0,
                ..CurveParams::default()
            },
            CurveParams {
                brightness: f32::NAN,
                ..CurveParams::default()
            },
            CurveParams {
                contrast: 1.5,
                ..CurveParams::default()
            },
            CurveParams {
                gains: [1.0, -0.5, 1.0],
                ..CurveParams::default()
            },
            CurveParams {
                threshold: Some(2.0),
                ..CurveParams::default()
            },
            CurveParams::default(),
        ];
        for params in cases {
            assert!(
                matches!(ToneCurve::new(params), Err(EditError::InvalidParameters(_))),
                "{params:?} should be rejected"
            );
        }
    }

    #[test]
    fn remap_uses_first_match_within_tolerance() {
        let remap = ColorRemap::new(RemapParams {
            entries: vec![
                ColorMapping {
                    from: [255, 0, 0],
                    to: [0, 0, 255],
                },
                ColorMapping {
                    from: [250, 5, 5],
                    to: [0, 255, 0],
                },
            ],
            tolerance: 8,
        })
        .expect("valid");
        let img = rgba(&[[252, 3, 1, 40], [0, 0, 0, 255], [240, 0, 0, 255]]);
        let out = remap.apply(&img);
        assert_eq!(
            out.data(),
            &[0, 0, 255, 40, 0, 0, 0, 255, 240, 0, 0, 255]
        );
        assert_eq!(remap.describe(), "Remap 2 colors");
    }

    #[test]
    fn remap_validation() {
        let empty = ColorRemap::new(RemapParams {
            entries: Vec::new(),
            tolerance: 0,
        });
        assert!(matches!(empty, Err(EditError::InvalidParameters(_))));

        let entry = ColorMapping {
            from: [1, 2, 3],
            to: [4, 5, 6],
        };
        let duplicate = ColorRemap::new(RemapParams {
            entries: vec![entry, entry],
            tolerance: 0,
        });
        assert!(matches!(duplicate, Err(EditError::InvalidParameters(_))));
    }

    #[test]
    fn labels_describe_the_adjustment() {
        assert_eq!(PaletteAdjust::invert().describe(), "Invert colors");
        let curve = ToneCurve::new(CurveParams {
            brightness: 0.25,
            gamma: 1.5,
            ..CurveParams::default()
        })
        .expect("valid");
        assert_eq!(
            curve.describe(),
            "Adjust colors (brightness +0.25, gamma 1.50)"
        );
    }
}
