//! EXIF orientation codes and the transforms that normalize them.
//!
//! Each code maps to a fixed sequence of [`OrientationStep`]s applied in
//! order. The mapping lives in a static table so every row can be audited
//! and tested on its own. Rotation angles are counter-clockwise degrees.
//!
//! See: https://exiftool.org/TagNames/EXIF.html

use std::io::Cursor;

use exif::{In, Reader, Tag};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThumbnailError};

/// EXIF orientation values (0-8).
///
/// Code 0 is not part of the EXIF standard, but some camera software writes
/// it; it is treated like 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Orientation not recorded.
    Unknown = 0,
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

/// A single normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationStep {
    /// Vertical mirror (top and bottom swap).
    Flip,
    /// Horizontal mirror (left and right swap).
    Flop,
    /// Rotation by the given counter-clockwise angle in degrees.
    Rotate(u16),
}

use OrientationStep::{Flip, Flop, Rotate};

/// Indexed by orientation code.
const STEPS: [&[OrientationStep]; 9] = [
    &[],
    &[],
    &[Flop],
    &[Rotate(180)],
    &[Flip],
    &[Rotate(270), Flop],
    &[Rotate(270)],
    &[Rotate(90), Flop],
    &[Rotate(90)],
];

impl Orientation {
    /// The raw EXIF code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Steps that bring an image stored with this orientation upright.
    pub fn steps(self) -> &'static [OrientationStep] {
        STEPS[self.code() as usize]
    }

    /// Whether the image is already upright.
    pub fn is_identity(self) -> bool {
        self.steps().is_empty()
    }

    /// Returns true if this orientation swaps width and height dimensions.
    ///
    /// Rotations of 90° and 270° (and their flip variants Transpose/Transverse)
    /// swap the image dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// Read the primary-image orientation tag from EXIF data in `bytes`.
    ///
    /// Returns `None` if there is no EXIF block, no orientation tag, or the
    /// stored value is outside 0-8.
    pub fn from_exif(bytes: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new().read_from_container(&mut cursor).ok()?;
        let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
        let value = field.value.get_uint(0)?;
        Orientation::try_from(value).ok()
    }
}

impl TryFrom<u32> for Orientation {
    type Error = ThumbnailError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Orientation::Unknown),
            1 => Ok(Orientation::Normal),
            2 => Ok(Orientation::FlipHorizontal),
            3 => Ok(Orientation::Rotate180),
            4 => Ok(Orientation::FlipVertical),
            5 => Ok(Orientation::Transpose),
            6 => Ok(Orientation::Rotate90CW),
            7 => Ok(Orientation::Transverse),
            8 => Ok(Orientation::Rotate270CW),
            other => Err(ThumbnailError::geometry(format!(
                "unsupported orientation {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_code() {
        assert_eq!(Orientation::try_from(0).unwrap(), Orientation::Unknown);
        assert_eq!(Orientation::try_from(1).unwrap(), Orientation::Normal);
        assert_eq!(Orientation::try_from(6).unwrap(), Orientation::Rotate90CW);
        assert_eq!(Orientation::try_from(8).unwrap(), Orientation::Rotate270CW);
    }

    #[test]
    fn test_orientation_out_of_range() {
        for code in [9, 10, 255, u32::MAX] {
            assert!(matches!(
                Orientation::try_from(code),
                Err(ThumbnailError::InvalidGeometry(_))
            ));
        }
    }

    #[test]
    fn test_code_round_trip() {
        for code in 0..=8u32 {
            assert_eq!(Orientation::try_from(code).unwrap().code() as u32, code);
        }
    }

    #[test]
    fn test_identity_codes() {
        assert!(Orientation::Unknown.is_identity());
        assert!(Orientation::Normal.is_identity());
        assert!(!Orientation::FlipHorizontal.is_identity());
    }

    #[test]
    fn test_step_table() {
        assert_eq!(Orientation::FlipHorizontal.steps(), &[Flop]);
        assert_eq!(Orientation::Rotate180.steps(), &[Rotate(180)]);
        assert_eq!(Orientation::FlipVertical.steps(), &[Flip]);
        assert_eq!(Orientation::Transpose.steps(), &[Rotate(270), Flop]);
        assert_eq!(Orientation::Rotate90CW.steps(), &[Rotate(270)]);
        assert_eq!(Orientation::Transverse.steps(), &[Rotate(90), Flop]);
        assert_eq!(Orientation::Rotate270CW.steps(), &[Rotate(90)]);
    }

    #[test]
    fn test_swaps_match_quarter_turns() {
        for code in 0..=8u32 {
            let orientation = Orientation::try_from(code).unwrap();
            let quarter_turn = orientation
                .steps()
                .iter()
                .any(|step| matches!(step, Rotate(90) | Rotate(270)));
            assert_eq!(orientation.swaps_dimensions(), quarter_turn, "code {code}");
        }
    }

    #[test]
    fn test_from_exif_without_exif() {
        assert_eq!(Orientation::from_exif(&[0x00, 0x01, 0x02]), None);
        assert_eq!(Orientation::from_exif(&[]), None);
    }

    #[test]
    fn test_from_exif_jpeg() {
        // SOI, APP1 "Exif" with a big-endian TIFF IFD holding Orientation = 6, EOI
        let jpeg: &[u8] = &[
            0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x22, b'E', b'x', b'i', b'f', 0x00, 0x00, b'M', b'M',
            0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, 0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xD9,
        ];
        assert_eq!(Orientation::from_exif(jpeg), Some(Orientation::Rotate90CW));
    }
}
