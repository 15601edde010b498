//! The raster engine seam.
//!
//! The geometry core never touches pixels. It computes parameters and hands
//! them to a [`RasterEngine`], which owns decoding, canvas allocation,
//! resampling, rotation, palette bookkeeping and encoding.
//!
//! Buffers are plain owned values: releasing one is dropping it, and cloning
//! one must produce an independent deep copy.
//!
//! [`ImageEngine`] is the default implementation, built on the `image` crate.

mod codec;
mod raster;
mod rotate;

pub use raster::{ImageEngine, Raster};
pub use rotate::compute_rotated_bounds;

use image::Rgba;

use crate::error::Result;
use crate::format::ImageFormat;

/// Reflection axis for in-place mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Mirror about the horizontal midline (top and bottom swap).
    Vertical,
    /// Mirror about the vertical midline (left and right swap).
    Horizontal,
}

/// A scaled copy from a source rectangle into a destination rectangle.
///
/// A negative source extent samples in the reverse direction: the region
/// spans `src_x + src_width .. src_x` and is mirrored while copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resample {
    pub dst_x: u32,
    pub dst_y: u32,
    pub src_x: u32,
    pub src_y: u32,
    pub dst_width: u32,
    pub dst_height: u32,
    pub src_width: i64,
    pub src_height: i64,
}

/// Output of [`RasterEngine::decode`].
#[derive(Debug, Clone)]
pub struct Decoded<B> {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub buffer: B,
}

/// Operations the transform orchestrator needs from a raster library.
pub trait RasterEngine: Clone {
    /// Owned pixel buffer. `Clone` must deep-copy.
    type Buffer: Clone;

    /// Decode GIF, JPEG or PNG bytes.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded<Self::Buffer>>;

    /// Width and height of a buffer.
    fn dimensions(&self, buffer: &Self::Buffer) -> (u32, u32);

    /// Allocate a fresh `width x height` canvas.
    fn allocate_canvas(&self, width: u32, height: u32) -> Result<Self::Buffer>;

    /// Copy `op`'s source rectangle of `src` into `dst`, scaling as needed.
    fn resample(&self, dst: &mut Self::Buffer, src: &Self::Buffer, op: &Resample) -> Result<()>;

    /// Rotate counter-clockwise by `angle` degrees about the center, filling
    /// uncovered area with `background`.
    fn rotate(
        &self,
        buffer: &Self::Buffer,
        angle: f64,
        background: Rgba<u8>,
        ignore_transparent: bool,
    ) -> Result<Self::Buffer>;

    /// Mirror `buffer` in place. Returns `false` when the engine cannot
    /// reflect directly, in which case callers fall back to a reversed
    /// [`Resample`].
    fn reflect(&self, _buffer: &mut Self::Buffer, _axis: Axis) -> bool {
        false
    }

    /// The designated transparent palette slot, if any.
    fn transparent_index(&self, buffer: &Self::Buffer) -> Option<u8>;

    /// The color stored in palette slot `index`.
    fn palette_color(&self, buffer: &Self::Buffer, index: u8) -> Option<Rgba<u8>>;

    /// Fill the whole buffer with `color`.
    fn fill(&self, buffer: &mut Self::Buffer, color: Rgba<u8>);

    /// Copy the palette (if any) of `src` onto `dst`.
    fn copy_palette(&self, dst: &mut Self::Buffer, src: &Self::Buffer);

    /// Designate palette slot `index` of `buffer` as transparent.
    fn set_transparent(&self, buffer: &mut Self::Buffer, index: u8);

    /// Toggle compositing of incoming pixels onto existing ones.
    fn set_alpha_blending(&self, buffer: &mut Self::Buffer, enabled: bool);

    /// Toggle preservation of per-pixel alpha on output.
    fn set_save_alpha(&self, buffer: &mut Self::Buffer, enabled: bool);

    /// Encode a buffer. `quality` only applies to JPEG.
    fn encode(
        &self,
        buffer: &Self::Buffer,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<Vec<u8>>;
}
