//! The closed set of raster formats the thumbnail engine accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThumbnailError};

/// Image container format.
///
/// Conversion to and from `image::ImageFormat` happens only at the engine
/// boundary; everything above it works with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Indexed color with an optional transparent palette slot.
    Gif,
    /// Opaque, lossy.
    Jpeg,
    /// Truecolor with a per-pixel alpha channel.
    Png,
}

impl ImageFormat {
    /// MIME type, e.g. `image/png`.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Gif => "image/gif",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Conventional file extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Gif => "gif",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    /// Map the `image` crate's detected format into the supported set.
    pub fn from_image_format(format: image::ImageFormat) -> Result<Self> {
        match format {
            image::ImageFormat::Gif => Ok(ImageFormat::Gif),
            image::ImageFormat::Jpeg => Ok(ImageFormat::Jpeg),
            image::ImageFormat::Png => Ok(ImageFormat::Png),
            other => Err(ThumbnailError::UnsupportedFormat(format!("{other:?}"))),
        }
    }

    /// Convert to the `image` crate's format for encoding.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ThumbnailError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gif" | "image/gif" => Ok(ImageFormat::Gif),
            "jpg" | "jpeg" | "image/jpeg" => Ok(ImageFormat::Jpeg),
            "png" | "image/png" => Ok(ImageFormat::Png),
            other => Err(ThumbnailError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Gif => "gif",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageFormat::Gif.mime_type(), "image/gif");
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!(" png ".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("image/gif".parse::<ImageFormat>().unwrap(), ImageFormat::Gif);
        assert!(matches!(
            "webp".parse::<ImageFormat>(),
            Err(ThumbnailError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_image_crate_round_trip() {
        for format in [ImageFormat::Gif, ImageFormat::Jpeg, ImageFormat::Png] {
            let converted = ImageFormat::from_image_format(format.to_image_format()).unwrap();
            assert_eq!(converted, format);
        }
        assert!(ImageFormat::from_image_format(image::ImageFormat::Bmp).is_err());
    }
}
