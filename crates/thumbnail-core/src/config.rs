//! Construction options for [`Image`](crate::Image).
//!
//! Options are plain data with serde support so callers can embed them in
//! their own configuration files. [`Options::from_toml_str`] parses a TOML
//! table and rejects unknown keys and mistyped values.
//!
//! ```toml
//! rounding = "ceil"
//! format = "png"
//! filter = "lanczos3"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThumbnailError};
use crate::format::ImageFormat;

/// Rounding direction for every non-integral pixel computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingPolicy {
    /// Round fractional pixels down.
    #[default]
    Floor,
    /// Round fractional pixels up.
    Ceil,
}

impl RoundingPolicy {
    /// Divide `numerator / denominator`, rounding the remainder per policy.
    ///
    /// `denominator` must be non-zero.
    #[inline]
    pub fn div(self, numerator: u64, denominator: u64) -> u64 {
        match self {
            RoundingPolicy::Floor => numerator / denominator,
            RoundingPolicy::Ceil => numerator.div_ceil(denominator),
        }
    }
}

/// Filter type for resample operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Options fixed at construction time and carried through a transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Rounding for percentage scale, center-crop midpoint and proportional remainder.
    pub rounding: RoundingPolicy,
    /// Overrides the detected format (used as the default output type).
    pub format: Option<ImageFormat>,
    /// Resample kernel used by the default engine.
    pub filter: FilterType,
}

impl Options {
    /// Create options with default values (floor rounding, bilinear filter).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the rounding policy.
    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    /// Builder-style setter for the output format override.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Builder-style setter for the resample filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Parse options from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::Configuration`] for unknown keys, values of
    /// the wrong type, or unknown enum names.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ThumbnailError::Configuration(e.message().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_div() {
        assert_eq!(RoundingPolicy::Floor.div(525, 2), 262);
        assert_eq!(RoundingPolicy::Ceil.div(525, 2), 263);
        // Exact quotients are unaffected by the policy
        assert_eq!(RoundingPolicy::Floor.div(600, 2), 300);
        assert_eq!(RoundingPolicy::Ceil.div(600, 2), 300);
    }

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_default_options() {
        let options = Options::new();
        assert_eq!(options.rounding, RoundingPolicy::Floor);
        assert_eq!(options.format, None);
        assert_eq!(options.filter, FilterType::Bilinear);
    }

    #[test]
    fn test_parse_toml() {
        let options = Options::from_toml_str(
            r#"
            rounding = "ceil"
            format = "png"
            filter = "lanczos3"
            "#,
        )
        .unwrap();

        assert_eq!(options.rounding, RoundingPolicy::Ceil);
        assert_eq!(options.format, Some(ImageFormat::Png));
        assert_eq!(options.filter, FilterType::Lanczos3);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let options = Options::from_toml_str("").unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result = Options::from_toml_str("quality = 90");
        match result {
            Err(ThumbnailError::Configuration(message)) => {
                assert!(message.contains("quality"), "message was {message}")
            }
            other => panic!("Expected Configuration error, got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        assert!(matches!(
            Options::from_toml_str("rounding = true"),
            Err(ThumbnailError::Configuration(_))
        ));
        assert!(matches!(
            Options::from_toml_str("format = \"bmp\""),
            Err(ThumbnailError::Configuration(_))
        ));
    }
}
