use serde::{Deserialize, Serialize};

use super::RasterOp;
use crate::error::{EditError, EditResult};
use crate::raster::PixelBuffer;

/// Exact rotation by a whole number of quarter turns, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rotation {
    quarter_turns: u8,
}

impl Rotation {
    pub const CLOCKWISE: Self = Self { quarter_turns: 1 };
    pub const HALF_TURN: Self = Self { quarter_turns: 2 };
    pub const COUNTER_CLOCKWISE: Self = Self { quarter_turns: 3 };

    /// Accepts any multiple of 90 (negative means counter-clockwise).
    pub fn from_degrees(degrees: i32) -> EditResult<Self> {
        if degrees % 90 != 0 {
            return Err(EditError::invalid(format!(
                "rotation must be a multiple of 90°, got {degrees}°"
            )));
        }
        let quarters = (degrees / 90).rem_euclid(4);
        Ok(Self {
            quarter_turns: u8::try_from(quarters).unwrap_or_default(),
        })
    }

    /// Normalized clockwise angle in `0..360`.
    pub const fn degrees(self) -> i32 {
        self.quarter_turns as i32 * 90
    }
}

impl TryFrom<i32> for Rotation {
    type Error = EditError;

    fn try_from(degrees: i32) -> EditResult<Self> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl RasterOp for Rotation {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let w = input.width() as usize;
        let h = input.height() as usize;
        match self.quarter_turns {
            0 => input.clone(),
            1 => input.remap_pixels(input.height(), input.width(), move |dx, dy| {
                (h - 1 - dx) * w + dy
            }),
            2 => input.remap_pixels(input.width(), input.height(), move |dx, dy| {
                (h - 1 - dy) * w + (w - 1 - dx)
            }),
            _ => input.remap_pixels(input.height(), input.width(), move |dx, dy| {
                dx * w + (w - 1 - dy)
            }),
        }
    }

    fn describe(&self) -> String {
        match self.quarter_turns {
            0 => "Rotate 0°".to_string(),
            1 => "Rotate 90° clockwise".to_string(),
            2 => "Rotate 180°".to_string(),
            _ => "Rotate 90° counter-clockwise".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelLayout;

    fn ids_from(buffer: &PixelBuffer) -> Vec<u8> {
        buffer.data().chunks_exact(3).map(|px| px[0]).collect()
    }

    fn test_image() -> PixelBuffer {
        let data = (1..=6).flat_map(|id| [id, 0, 0]).collect();
        PixelBuffer::new(3, 2, PixelLayout::Rgb8, data).expect("valid")
    }

    #[test]
    fn rotate_cw_maps_pixels() {
        let out = Rotation::CLOCKWISE.apply(&test_image());
        assert_eq!((out.width(), out.height()), (2, 3));
        assert_eq!(ids_from(&out), vec![4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn rotate_ccw_maps_pixels() {
        let out = Rotation::COUNTER_CLOCKWISE.apply(&test_image());
        assert_eq!((out.width(), out.height()), (2, 3));
        assert_eq!(ids_from(&out), vec![3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn half_turn_reverses_pixels() {
        let out = Rotation::HALF_TURN.apply(&test_image());
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(ids_from(&out), vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn degrees_normalize_to_quarter_turns() {
        assert_eq!(Rotation::from_degrees(-90).expect("valid"), Rotation::COUNTER_CLOCKWISE);
        assert_eq!(Rotation::from_degrees(270).expect("valid"), Rotation::COUNTER_CLOCKWISE);
        assert_eq!(Rotation::from_degrees(450).expect("valid"), Rotation::CLOCKWISE);
        assert_eq!(Rotation::from_degrees(-180).expect("valid"), Rotation::HALF_TURN);
        assert_eq!(Rotation::from_degrees(720).expect("valid").degrees(), 0);
    }

    #[test]
    fn non_quarter_angles_are_rejected() {
        for degrees in [45, 1, -30, 100] {
            assert!(matches!(
                Rotation::from_degrees(degrees),
                Err(EditError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn opposite_rotation_round_trips() {
        let img = test_image();
        for rotation in [Rotation::CLOCKWISE, Rotation::HALF_TURN, Rotation::COUNTER_CLOCKWISE] {
            let opposite = Rotation::from_degrees(-rotation.degrees()).expect("valid");
            let back = opposite.apply(&rotation.apply(&img));
            assert_eq!(back, img);
        }
    }
}
