//! [`ImageEngine`]: the `image`-crate backed raster engine.
//!
//! Pixels are always held as RGBA8. Palette-based transparency (GIF) is kept
//! alongside the pixels as a palette plus a transparent slot, whose color
//! acts as a key when the buffer is written out.

use image::{imageops, DynamicImage, Rgba, RgbaImage};

use super::{codec, rotate, Axis, Decoded, RasterEngine, Resample};
use crate::config::FilterType;
use crate::error::{Result, ThumbnailError};
use crate::format::ImageFormat;

/// Opaque black, the initial content of a fresh canvas.
const CANVAS_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// An owned RGBA pixel buffer with palette and alpha bookkeeping.
///
/// Cloning copies the pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: RgbaImage,
    palette: Option<Vec<[u8; 3]>>,
    transparent: Option<u8>,
    alpha_blending: bool,
    save_alpha: bool,
}

impl Raster {
    /// Wrap truecolor pixels. Blending is on and alpha is not saved, like a
    /// freshly allocated canvas.
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            palette: None,
            transparent: None,
            alpha_blending: true,
            save_alpha: false,
        }
    }

    /// Wrap a decoded image. Alpha is saved when the source carries an alpha channel.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let save_alpha = image.color().has_alpha();
        let mut raster = Self::new(image.into_rgba8());
        raster.save_alpha = save_alpha;
        raster
    }

    /// Attach a palette and its transparent slot.
    pub fn with_palette(mut self, palette: Option<Vec<[u8; 3]>>, transparent: Option<u8>) -> Self {
        self.palette = palette;
        self.transparent = transparent;
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw RGBA pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    pub fn palette(&self) -> Option<&[[u8; 3]]> {
        self.palette.as_deref()
    }

    pub fn transparent_index(&self) -> Option<u8> {
        self.transparent
    }

    /// Color of the transparent palette slot, when both exist.
    pub fn transparent_color(&self) -> Option<[u8; 3]> {
        let index = self.transparent?;
        self.palette.as_ref()?.get(index as usize).copied()
    }

    pub fn alpha_blending(&self) -> bool {
        self.alpha_blending
    }

    pub fn saves_alpha(&self) -> bool {
        self.save_alpha
    }

    /// Pixels as they are written out.
    ///
    /// Without alpha-save every pixel becomes opaque. Pixels matching the
    /// transparent key (or already fully transparent in a keyed buffer) are
    /// written fully transparent.
    pub fn output_pixels(&self) -> RgbaImage {
        let key = self.transparent_color();
        let mut out = self.pixels.clone();
        for pixel in out.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            match key {
                Some(key) if [r, g, b] == key || a == 0 => *pixel = Rgba([key[0], key[1], key[2], 0]),
                _ if !self.save_alpha => pixel.0[3] = 255,
                _ => {}
            }
        }
        out
    }
}

/// Raster engine backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageEngine {
    filter: FilterType,
}

impl ImageEngine {
    /// Create an engine that resamples with `filter`.
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

/// Resolve one axis of a resample source span into (start, length, mirrored).
fn source_span(origin: u32, extent: i64, limit: u32) -> Result<(u32, u32, bool)> {
    let (start, length, mirrored) = if extent < 0 {
        (origin as i64 + extent, -extent, true)
    } else {
        (origin as i64, extent, false)
    };
    if length == 0 || start < 0 || start + length > limit as i64 {
        return Err(ThumbnailError::engine(format!(
            "resample source span {start}+{length} outside 0..{limit}"
        )));
    }
    Ok((start as u32, length as u32, mirrored))
}

impl RasterEngine for ImageEngine {
    type Buffer = Raster;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<Raster>> {
        codec::decode(bytes)
    }

    fn dimensions(&self, buffer: &Raster) -> (u32, u32) {
        buffer.pixels.dimensions()
    }

    fn allocate_canvas(&self, width: u32, height: u32) -> Result<Raster> {
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n > 0 && n <= isize::MAX as usize);
        if bytes.is_none() {
            return Err(ThumbnailError::engine(format!(
                "cannot allocate a {width}x{height} canvas"
            )));
        }
        Ok(Raster::new(RgbaImage::from_pixel(
            width,
            height,
            CANVAS_BACKGROUND,
        )))
    }

    fn resample(&self, dst: &mut Raster, src: &Raster, op: &Resample) -> Result<()> {
        let (src_x, src_w, mirror_h) = source_span(op.src_x, op.src_width, src.width())?;
        let (src_y, src_h, mirror_v) = source_span(op.src_y, op.src_height, src.height())?;

        if op.dst_width == 0
            || op.dst_height == 0
            || op.dst_x as u64 + op.dst_width as u64 > dst.width() as u64
            || op.dst_y as u64 + op.dst_height as u64 > dst.height() as u64
        {
            return Err(ThumbnailError::engine(format!(
                "resample destination {}x{} at ({}, {}) outside {}x{} canvas",
                op.dst_width,
                op.dst_height,
                op.dst_x,
                op.dst_y,
                dst.width(),
                dst.height()
            )));
        }

        let mut region = imageops::crop_imm(&src.pixels, src_x, src_y, src_w, src_h).to_image();
        if mirror_h {
            imageops::flip_horizontal_in_place(&mut region);
        }
        if mirror_v {
            imageops::flip_vertical_in_place(&mut region);
        }

        let scaled = if (src_w, src_h) == (op.dst_width, op.dst_height) {
            region
        } else {
            imageops::resize(
                &region,
                op.dst_width,
                op.dst_height,
                self.filter.to_image_filter(),
            )
        };

        if dst.alpha_blending {
            imageops::overlay(&mut dst.pixels, &scaled, op.dst_x as i64, op.dst_y as i64);
        } else {
            imageops::replace(&mut dst.pixels, &scaled, op.dst_x as i64, op.dst_y as i64);
        }
        Ok(())
    }

    fn rotate(
        &self,
        buffer: &Raster,
        angle: f64,
        background: Rgba<u8>,
        ignore_transparent: bool,
    ) -> Result<Raster> {
        if !angle.is_finite() {
            return Err(ThumbnailError::engine(format!(
                "cannot rotate by {angle} degrees"
            )));
        }
        let mut pixels = rotate::rotate(&buffer.pixels, angle, background, self.filter);

        let (transparent, save_alpha) = if ignore_transparent {
            for pixel in pixels.pixels_mut() {
                pixel.0[3] = 255;
            }
            (None, false)
        } else {
            (buffer.transparent, buffer.save_alpha)
        };
        Ok(Raster {
            pixels,
            palette: buffer.palette.clone(),
            transparent,
            alpha_blending: buffer.alpha_blending,
            save_alpha,
        })
    }

    fn reflect(&self, buffer: &mut Raster, axis: Axis) -> bool {
        match axis {
            Axis::Vertical => imageops::flip_vertical_in_place(&mut buffer.pixels),
            Axis::Horizontal => imageops::flip_horizontal_in_place(&mut buffer.pixels),
        }
        true
    }

    fn transparent_index(&self, buffer: &Raster) -> Option<u8> {
        buffer.transparent
    }

    fn palette_color(&self, buffer: &Raster, index: u8) -> Option<Rgba<u8>> {
        let [r, g, b] = *buffer.palette.as_ref()?.get(index as usize)?;
        Some(Rgba([r, g, b, 255]))
    }

    fn fill(&self, buffer: &mut Raster, color: Rgba<u8>) {
        let blend = buffer.alpha_blending && color.0[3] < 255;
        for pixel in buffer.pixels.pixels_mut() {
            if blend {
                image::Pixel::blend(pixel, &color);
            } else {
                *pixel = color;
            }
        }
    }

    fn copy_palette(&self, dst: &mut Raster, src: &Raster) {
        if let Some(palette) = &src.palette {
            dst.palette = Some(palette.clone());
        }
    }

    fn set_transparent(&self, buffer: &mut Raster, index: u8) {
        buffer.transparent = Some(index);
    }

    fn set_alpha_blending(&self, buffer: &mut Raster, enabled: bool) {
        buffer.alpha_blending = enabled;
    }

    fn set_save_alpha(&self, buffer: &mut Raster, enabled: bool) {
        buffer.save_alpha = enabled;
    }

    fn encode(&self, buffer: &Raster, format: ImageFormat, quality: Option<u8>) -> Result<Vec<u8>> {
        codec::encode(buffer, format, quality)
    }
}
