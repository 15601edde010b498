//! Rotation of RGBA rasters about their center.
//!
//! Quarter turns are exact pixel permutations. Any other angle uses inverse
//! mapping: for each output pixel we find the source position it came from
//! and interpolate there, falling back to the background color where the
//! position lies outside the source.
//!
//! For a counter-clockwise rotation by θ in a y-down raster, the inverse
//! transform is:
//! ```text
//! src_x = dx * cos(θ) - dy * sin(θ) + src_cx
//! src_y = dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//! where `(dx, dy)` is the output pixel center relative to the output center.

use image::{imageops, Rgba, RgbaImage};

use crate::config::FilterType;

/// Angles closer than this to a quarter turn take the exact path.
const ANGLE_EPSILON: f64 = 0.001;

/// Compute the dimensions of the bounding box for a rotated image.
///
/// # Arguments
///
/// * `width` - Original image width
/// * `height` - Original image height
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise)
///
/// # Returns
///
/// Tuple of (new_width, new_height) for the rotated bounding box.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Number of counter-clockwise quarter turns, if `angle_degrees` is one.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < ANGLE_EPSILON {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

/// Rotate `image` counter-clockwise by `angle_degrees`.
///
/// The output canvas is expanded to fit the whole rotated image; uncovered
/// area is filled with `background`.
pub(super) fn rotate(
    image: &RgbaImage,
    angle_degrees: f64,
    background: Rgba<u8>,
    filter: FilterType,
) -> RgbaImage {
    match quarter_turns(angle_degrees) {
        Some(0) => image.clone(),
        // imageops turns clockwise
        Some(1) => imageops::rotate270(image),
        Some(2) => imageops::rotate180(image),
        Some(_) => imageops::rotate90(image),
        None => rotate_arbitrary(image, angle_degrees, background, filter),
    }
}

fn rotate_arbitrary(
    image: &RgbaImage,
    angle_degrees: f64,
    background: Rgba<u8>,
    filter: FilterType,
) -> RgbaImage {
    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width(), image.height(), angle_degrees);

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    RgbaImage::from_fn(dst_w, dst_h, |dst_x, dst_y| {
        let dx = dst_x as f64 + 0.5 - dst_cx;
        let dy = dst_y as f64 + 0.5 - dst_cy;

        // Source position in pixel-index space (centers at integers)
        let src_x = dx * cos - dy * sin + src_cx - 0.5;
        let src_y = dx * sin + dy * cos + src_cy - 0.5;

        if src_x < -0.5 || src_x > src_w - 0.5 || src_y < -0.5 || src_y > src_h - 0.5 {
            return background;
        }

        match filter {
            FilterType::Nearest => sample_nearest(image, src_x, src_y),
            FilterType::Bilinear => sample_bilinear(image, src_x, src_y),
            FilterType::Lanczos3 => sample_lanczos3(image, src_x, src_y),
        }
    })
}

/// Fetch a pixel with coordinates clamped to the image.
#[inline]
fn pixel_f64(image: &RgbaImage, x: i64, y: i64) -> [f64; 4] {
    let x = x.clamp(0, image.width() as i64 - 1) as u32;
    let y = y.clamp(0, image.height() as i64 - 1) as u32;
    image.get_pixel(x, y).0.map(f64::from)
}

#[inline]
fn to_pixel(values: [f64; 4]) -> Rgba<u8> {
    Rgba(values.map(|v| v.clamp(0.0, 255.0).round() as u8))
}

fn sample_nearest(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    to_pixel(pixel_f64(image, x.round() as i64, y.round() as i64))
}

/// Bilinear interpolation over the 4 nearest pixels, clamped at the edges.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = pixel_f64(image, x0, y0);
    let p10 = pixel_f64(image, x0 + 1, y0);
    let p01 = pixel_f64(image, x0, y0 + 1);
    let p11 = pixel_f64(image, x0 + 1, y0 + 1);

    let mut result = [0.0; 4];
    for i in 0..4 {
        result[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    to_pixel(result)
}

/// Lanczos3 interpolation over a 6x6 neighborhood. Falls back to bilinear
/// near the edges where the kernel would leave the image.
fn sample_lanczos3(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = (image.width() as i64, image.height() as i64);
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = pixel_f64(image, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        to_pixel(sum.map(|v| v / weight_sum))
    } else {
        sample_bilinear(image, x, y)
    }
}

/// Lanczos kernel: `sinc(x) * sinc(x / a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Four quarter turns restore the original pixels.
        #[test]
        fn prop_four_quarter_turns_identity(w in 1u32..=12, h in 1u32..=12, seed in any::<u8>()) {
            let img = RgbaImage::from_fn(w, h, |x, y| {
                Rgba([seed.wrapping_add(x as u8), y as u8, 7, 255])
            });
            let mut out = img.clone();
            for _ in 0..4 {
                out = rotate(&out, 90.0, Rgba([0, 0, 0, 0]), FilterType::Bilinear);
            }
            prop_assert_eq!(out, img);
        }

        /// Property: Rotated bounds always contain the source area.
        #[test]
        fn prop_bounds_cover_source(w in 1u32..=500, h in 1u32..=500, angle in -720.0f64..720.0) {
            let (rw, rh) = compute_rotated_bounds(w, h, angle);
            prop_assert!(rw >= 1 && rh >= 1);
            // The box area is never smaller than the rectangle it contains (allowing rounding)
            prop_assert!((rw as u64 + 1) * (rh as u64 + 1) >= w as u64 * h as u64);
        }
    }
}
