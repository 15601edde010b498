//! Source-window resolution for clip and center-square crops.
//!
//! Windows are expressed in source pixel coordinates and are always clamped
//! so that they lie entirely inside the source image.

use serde::{Deserialize, Serialize};

use super::dimensions::bounded_resize;
use crate::config::RoundingPolicy;
use crate::error::{Result, ThumbnailError};

/// A rectangle in source pixel coordinates.
///
/// Invariant: `x + width <= source width` and `y + height <= source height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    /// The whole `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Check that the rectangle lies inside a `width x height` source.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// A center-square crop: the source window to sample plus the destination size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterWindow {
    /// Region of the source to sample from.
    pub source: Rectangle,
    /// Destination width.
    pub width: u32,
    /// Destination height.
    pub height: u32,
}

/// Clamp a requested clip region to the source.
///
/// Oversized extents shrink to the source size, then the origin is pulled
/// back so the window fits, and finally negative origins become 0. The
/// returned extent is the clamped request, never the original one.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidGeometry`] for a zero-sized request or a
/// zero-sized source.
pub fn clip_window(
    src_width: u32,
    src_height: u32,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
) -> Result<Rectangle> {
    if width == 0 || height == 0 {
        return Err(ThumbnailError::geometry(format!(
            "clip size {width}x{height} must be positive"
        )));
    }
    if src_width == 0 || src_height == 0 {
        return Err(ThumbnailError::geometry(format!(
            "source dimensions {src_width}x{src_height} must be positive"
        )));
    }

    let width = width.min(src_width);
    let height = height.min(src_height);

    let x = clamp_origin(x, width, src_width);
    let y = clamp_origin(y, height, src_height);

    Ok(Rectangle {
        x,
        y,
        width,
        height,
    })
}

fn clamp_origin(origin: i64, extent: u32, limit: u32) -> u32 {
    // extent <= limit, so the upper bound is never negative
    origin.clamp(0, (limit - extent) as i64) as u32
}

/// Compute a centered square source window and a `size x size` destination.
///
/// The long side is trimmed symmetrically; an odd excess is split according
/// to `rounding`. Square sources larger than `size` are sampled whole.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidGeometry`] for a zero `size` or a zero
/// source dimension.
pub fn center_square_window(
    src_width: u32,
    src_height: u32,
    size: u32,
    rounding: RoundingPolicy,
) -> Result<CenterWindow> {
    if size == 0 {
        return Err(ThumbnailError::geometry("center crop size must be positive"));
    }
    if src_width == 0 || src_height == 0 {
        return Err(ThumbnailError::geometry(format!(
            "source dimensions {src_width}x{src_height} must be positive"
        )));
    }

    let mut source = Rectangle::full(src_width, src_height);
    let (mut width, mut height) = (size, size);

    if src_width > src_height {
        let excess = src_width - src_height;
        source.x = rounding.div(excess as u64, 2) as u32;
        source.width = if src_height > size {
            src_width - excess
        } else {
            src_height
        };
    } else if src_height > src_width {
        let excess = src_height - src_width;
        source.y = rounding.div(excess as u64, 2) as u32;
        source.height = if src_width > size {
            src_height - excess
        } else {
            src_width
        };
    } else if src_width > size {
        (width, height) = bounded_resize(src_width, src_height, Some(size), Some(size), rounding)?;
    }

    Ok(CenterWindow {
        source,
        width,
        height,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Clip windows always lie inside the source.
        #[test]
        fn prop_clip_contained(
            (src_w, src_h) in (1u32..=2_000, 1u32..=2_000),
            (x, y) in (any::<i64>(), any::<i64>()),
            (w, h) in (1u32..=3_000, 1u32..=3_000),
        ) {
            let rect = clip_window(src_w, src_h, x, y, w, h).unwrap();
            prop_assert!(rect.fits_within(src_w, src_h), "{:?} escapes {}x{}", rect, src_w, src_h);
            prop_assert!(rect.width >= 1 && rect.height >= 1);
        }

        /// Property: Clip extent equals the request clamped to the source.
        #[test]
        fn prop_clip_extent_is_clamped_request(
            (src_w, src_h) in (1u32..=2_000, 1u32..=2_000),
            (x, y) in (-3_000i64..=3_000, -3_000i64..=3_000),
            (w, h) in (1u32..=3_000, 1u32..=3_000),
        ) {
            let rect = clip_window(src_w, src_h, x, y, w, h).unwrap();
            prop_assert_eq!(rect.width, w.min(src_w));
            prop_assert_eq!(rect.height, h.min(src_h));
        }

        /// Property: Center windows are square, contained, and target size x size.
        #[test]
        fn prop_center_window_square(
            (src_w, src_h) in (1u32..=2_000, 1u32..=2_000),
            size in 1u32..=500,
            ceil in any::<bool>(),
        ) {
            prop_assume!(src_w != src_h);
            let rounding = if ceil { RoundingPolicy::Ceil } else { RoundingPolicy::Floor };
            let window = center_square_window(src_w, src_h, size, rounding).unwrap();

            prop_assert_eq!(window.source.width, window.source.height);
            prop_assert_eq!(window.source.width, src_w.min(src_h));
            prop_assert!(window.source.fits_within(src_w, src_h));
            prop_assert_eq!((window.width, window.height), (size, size));
        }
    }
}
