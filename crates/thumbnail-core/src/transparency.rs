//! Transparency preservation for freshly allocated canvases.
//!
//! A new canvas starts opaque black. Before any pixels are resampled onto it,
//! the canvas is prepared so that transparency in the source survives:
//!
//! - GIF with a transparent palette slot: the canvas is flooded with that
//!   slot's color and the slot is marked transparent on the canvas.
//! - PNG: blending is turned off, the canvas is cleared to fully
//!   transparent and alpha is kept on output.
//! - Everything else is left as allocated.

use image::Rgba;
use tracing::debug;

use crate::engine::RasterEngine;
use crate::error::{Result, ThumbnailError};
use crate::format::ImageFormat;

/// Fully transparent black.
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How a destination canvas is prepared before resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyPlan {
    /// Leave the canvas as allocated.
    None,
    /// Flood with the color of this palette slot and mark it transparent.
    PaletteKey(u8),
    /// Disable blending, clear to this color and save alpha.
    AlphaFill(Rgba<u8>),
}

impl TransparencyPlan {
    /// Choose the plan for a source of `format` backed by `source`.
    ///
    /// A transparent slot past the end of the palette is ignored, as GIF
    /// decoders do.
    pub fn select<E: RasterEngine>(engine: &E, format: ImageFormat, source: &E::Buffer) -> Self {
        match format {
            ImageFormat::Gif => match engine.transparent_index(source) {
                Some(index) if engine.palette_color(source, index).is_some() => {
                    TransparencyPlan::PaletteKey(index)
                }
                Some(index) => {
                    debug!(index, "Transparent slot outside the palette, not keying");
                    TransparencyPlan::None
                }
                None => TransparencyPlan::None,
            },
            ImageFormat::Png => TransparencyPlan::AlphaFill(CLEAR),
            ImageFormat::Jpeg => TransparencyPlan::None,
        }
    }

    /// Apply the plan to `canvas`, copying palette state from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::EngineFailure`] when the keyed palette slot
    /// has no color in the source.
    pub fn prepare<E: RasterEngine>(
        self,
        engine: &E,
        canvas: &mut E::Buffer,
        source: &E::Buffer,
    ) -> Result<()> {
        match self {
            TransparencyPlan::None => {}
            TransparencyPlan::PaletteKey(index) => {
                let color = engine.palette_color(source, index).ok_or_else(|| {
                    ThumbnailError::engine(format!("transparent palette slot {index} has no color"))
                })?;
                debug!(index, ?color, "Keying canvas on transparent palette slot");
                engine.copy_palette(canvas, source);
                engine.fill(canvas, color);
                engine.set_transparent(canvas, index);
            }
            TransparencyPlan::AlphaFill(color) => {
                engine.set_alpha_blending(canvas, false);
                engine.fill(canvas, color);
                engine.copy_palette(canvas, source);
                engine.set_save_alpha(canvas, true);
            }
        }
        Ok(())
    }
}
