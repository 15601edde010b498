//! Decoding and encoding between encoded bytes and [`Raster`]s.
//!
//! Pixels go through the `image` crate. GIF palettes and the transparent
//! slot are not exposed by `image`, so they are read separately with the
//! `gif` decoder in indexed mode.

use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};

use super::{Decoded, Raster};
use crate::error::{Result, ThumbnailError};
use crate::format::ImageFormat;

/// JPEG quality used when the caller does not pass one.
const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Decode GIF, JPEG or PNG bytes into a [`Raster`].
///
/// # Errors
///
/// Returns `ThumbnailError::Decode` if the bytes are not a recognizable or
/// intact image, and `ThumbnailError::UnsupportedFormat` if they are a
/// recognizable image of any other format.
pub(super) fn decode(bytes: &[u8]) -> Result<Decoded<Raster>> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

    let detected = reader
        .format()
        .ok_or_else(|| ThumbnailError::Decode("unrecognized image data".to_string()))?;
    let format = ImageFormat::from_image_format(detected)?;

    let img = reader
        .decode()
        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

    let (width, height) = (img.width(), img.height());
    let mut raster = Raster::from_dynamic(img);

    if format == ImageFormat::Gif {
        let (palette, transparent) = read_gif_palette(bytes)?;
        raster = raster.with_palette(palette, transparent);
    }

    Ok(Decoded {
        width,
        height,
        format,
        buffer: raster,
    })
}

/// Read the active palette and transparent index of the first GIF frame.
///
/// A local frame palette wins over the global one.
fn read_gif_palette(bytes: &[u8]) -> Result<(Option<Vec<[u8; 3]>>, Option<u8>)> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);

    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;
    let global = decoder.global_palette().map(palette_triples);

    let frame = decoder
        .read_next_frame()
        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

    Ok(match frame {
        Some(frame) => {
            let palette = frame.palette.as_deref().map(palette_triples).or(global);
            // Decoders ignore a transparent index past the end of the palette
            let transparent = frame.transparent.filter(|&index| {
                palette
                    .as_ref()
                    .is_some_and(|colors| (index as usize) < colors.len())
            });
            (palette, transparent)
        }
        None => (global, None),
    })
}

fn palette_triples(raw: &[u8]) -> Vec<[u8; 3]> {
    raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

/// Encode a raster.
///
/// `quality` applies to JPEG only and is clamped to 1-100.
///
/// # Errors
///
/// Returns `ThumbnailError::EngineFailure` if the underlying encoder fails.
pub(super) fn encode(raster: &Raster, format: ImageFormat, quality: Option<u8>) -> Result<Vec<u8>> {
    let pixels = raster.output_pixels();
    let (width, height) = pixels.dimensions();
    let mut buffer = Cursor::new(Vec::new());

    let written = match format {
        ImageFormat::Jpeg => {
            let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
            let rgb = DynamicImage::ImageRgba8(pixels).into_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        ImageFormat::Png => PngEncoder::new(&mut buffer).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut buffer);
            encoder.encode(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
        }
    };
    written.map_err(|e| ThumbnailError::engine(format!("{format} encoding failed: {e}")))?;

    Ok(buffer.into_inner())
}
