//! Output dimensions for bounded and percentage resizes.
//!
//! All arithmetic is done on integers: the scale factors `max / src` are
//! compared by cross-multiplication and the proportional side is computed as
//! an exact quotient whose remainder is rounded by [`RoundingPolicy`].

use crate::config::RoundingPolicy;
use crate::error::{Result, ThumbnailError};

/// Compute dimensions that fit within `max_width x max_height` while
/// preserving aspect ratio.
///
/// A missing bound takes the value of the other one (square bound). If the
/// source already fits, `(src_width, src_height)` is returned unchanged and
/// no scaling is applied, so callers can detect the no-op by comparing.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidGeometry`] if both bounds are missing,
/// if a bound is zero, or if a source dimension is zero.
///
/// # Example
///
/// ```
/// use thumbnail_core::geometry::bounded_resize;
/// use thumbnail_core::RoundingPolicy;
///
/// let (w, h) = bounded_resize(700, 525, Some(350), None, RoundingPolicy::Floor).unwrap();
/// assert_eq!((w, h), (350, 262));
/// ```
pub fn bounded_resize(
    src_width: u32,
    src_height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
    rounding: RoundingPolicy,
) -> Result<(u32, u32)> {
    let (max_width, max_height) = match (max_width, max_height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w),
        (None, Some(h)) => (h, h),
        (None, None) => {
            return Err(ThumbnailError::geometry(
                "resize needs a maximum width or height",
            ))
        }
    };
    if max_width == 0 || max_height == 0 {
        return Err(ThumbnailError::geometry(format!(
            "resize bound {max_width}x{max_height} must be positive"
        )));
    }
    ensure_source(src_width, src_height)?;

    if src_width <= max_width && src_height <= max_height {
        return Ok((src_width, src_height));
    }

    let (sw, sh) = (src_width as u64, src_height as u64);
    let (mw, mh) = (max_width as u64, max_height as u64);

    // mw / sw < mh / sh  <=>  mw * sh < mh * sw
    if mw * sh < mh * sw {
        // Width is the binding constraint
        let height = rounding.div(sh * mw, sw).max(1);
        Ok((max_width, clamp_u32(height)))
    } else {
        // Height is the binding constraint
        let width = rounding.div(sw * mh, sh).max(1);
        Ok((clamp_u32(width), max_height))
    }
}

/// Scale both dimensions by `percent / 100`.
///
/// Percentages above 100 enlarge the image. Each side is at least 1 pixel.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidGeometry`] for a zero percentage or a
/// zero source dimension.
pub fn percent_resize(
    src_width: u32,
    src_height: u32,
    percent: u32,
    rounding: RoundingPolicy,
) -> Result<(u32, u32)> {
    if percent == 0 {
        return Err(ThumbnailError::geometry("resize percentage must be positive"));
    }
    ensure_source(src_width, src_height)?;

    let scale = |side: u32| clamp_u32(rounding.div(side as u64 * percent as u64, 100).max(1));
    Ok((scale(src_width), scale(src_height)))
}

fn ensure_source(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ThumbnailError::geometry(format!(
            "source dimensions {width}x{height} must be positive"
        )));
    }
    Ok(())
}

#[inline]
fn clamp_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_resize_rounding() {
        let floor = bounded_resize(700, 525, Some(350), Some(350), RoundingPolicy::Floor).unwrap();
        assert_eq!(floor, (350, 262));

        let ceil = bounded_resize(700, 525, Some(350), Some(350), RoundingPolicy::Ceil).unwrap();
        assert_eq!(ceil, (350, 263));
    }

    #[test]
    fn test_bounded_resize_exact_ratio() {
        let (w, h) = bounded_resize(800, 600, Some(400), Some(300), RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (400, 300));
    }

    #[test]
    fn test_bounded_resize_width_only() {
        // Missing height bound is treated as a square bound
        let (w, h) = bounded_resize(800, 600, Some(400), None, RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (400, 300));
    }

    #[test]
    fn test_bounded_resize_height_only() {
        let (w, h) = bounded_resize(600, 800, None, Some(400), RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (300, 400));
    }

    #[test]
    fn test_bounded_resize_portrait() {
        let (w, h) = bounded_resize(4000, 6000, Some(2560), None, RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (1706, 2560));

        let (w, h) = bounded_resize(4000, 6000, Some(2560), None, RoundingPolicy::Ceil).unwrap();
        assert_eq!((w, h), (1707, 2560));
    }

    #[test]
    fn test_bounded_resize_fits_is_unchanged() {
        let (w, h) = bounded_resize(100, 50, Some(256), None, RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (100, 50));
    }

    #[test]
    fn test_bounded_resize_equal_scales_binds_height() {
        // 200x100 into 100x50: both scales are 1/2
        let (w, h) = bounded_resize(200, 100, Some(100), Some(50), RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (100, 50));
    }

    #[test]
    fn test_bounded_resize_degenerate_aspect() {
        // A 1000x1 strip squeezed to width 10 still keeps one row
        let (w, h) = bounded_resize(1000, 1, Some(10), Some(10), RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (10, 1));

        let (w, h) = bounded_resize(1, 1000, Some(10), Some(10), RoundingPolicy::Floor).unwrap();
        assert_eq!((w, h), (1, 10));
    }

    #[test]
    fn test_bounded_resize_invalid_bounds() {
        assert!(matches!(
            bounded_resize(800, 600, None, None, RoundingPolicy::Floor),
            Err(ThumbnailError::InvalidGeometry(_))
        ));
        assert!(matches!(
            bounded_resize(800, 600, Some(0), Some(100), RoundingPolicy::Floor),
            Err(ThumbnailError::InvalidGeometry(_))
        ));
        assert!(matches!(
            bounded_resize(0, 600, Some(100), None, RoundingPolicy::Floor),
            Err(ThumbnailError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_percent_resize() {
        assert_eq!(percent_resize(800, 600, 50, RoundingPolicy::Floor).unwrap(), (400, 300));
        assert_eq!(percent_resize(800, 600, 200, RoundingPolicy::Floor).unwrap(), (1600, 1200));
        assert_eq!(percent_resize(800, 600, 30, RoundingPolicy::Floor).unwrap(), (240, 180));
    }

    #[test]
    fn test_percent_resize_rounding() {
        assert_eq!(percent_resize(5, 5, 50, RoundingPolicy::Floor).unwrap(), (2, 2));
        assert_eq!(percent_resize(5, 5, 50, RoundingPolicy::Ceil).unwrap(), (3, 3));
    }

    #[test]
    fn test_percent_resize_minimum_one() {
        assert_eq!(percent_resize(10, 3, 1, RoundingPolicy::Floor).unwrap(), (1, 1));
    }

    #[test]
    fn test_percent_resize_zero_rejected() {
        assert!(matches!(
            percent_resize(800, 600, 0, RoundingPolicy::Floor),
            Err(ThumbnailError::InvalidGeometry(_))
        ));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
