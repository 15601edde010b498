//! [`Image`]: the thumbnail transform orchestrator.
//!
//! An `Image` owns one engine buffer plus the metadata needed to plan
//! transforms on it. Every transform borrows the image, computes geometry
//! up front, prepares a canvas for the source format's transparency, and
//! returns a new `Image`. The input is never modified, so it stays usable
//! when an operation fails.
//!
//! Operations that turn out to be no-ops (a resize to bounds the image
//! already fits, orientation codes 0 and 1) return `Cow::Borrowed(self)`
//! and allocate nothing.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::Rgba;
use tracing::{debug, warn};

use crate::config::{Options, RoundingPolicy};
use crate::engine::{Axis, ImageEngine, Raster, RasterEngine, Resample};
use crate::error::{Result, ThumbnailError};
use crate::format::ImageFormat;
use crate::geometry::{
    bounded_resize, center_square_window, clip_window, percent_resize, Rectangle,
};
use crate::orientation::{Orientation, OrientationStep};
use crate::transparency::TransparencyPlan;

/// Background used for orientation rotations. Quarter turns never expose it.
const ORIENT_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A decoded raster image and its transform settings.
///
/// Cloning deep-copies the buffer. Dropping releases it.
#[derive(Clone)]
pub struct Image<E: RasterEngine = ImageEngine> {
    width: u32,
    height: u32,
    format: ImageFormat,
    rounding: RoundingPolicy,
    buffer: E::Buffer,
    engine: E,
    path: Option<PathBuf>,
    data: Option<Vec<u8>>,
}

impl Image<ImageEngine> {
    /// Read and decode the file at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns `ThumbnailError::Io` if the file cannot be read, and
    /// `Decode` / `UnsupportedFormat` if its content is not a GIF, JPEG or PNG.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with(ImageEngine::default(), path, Options::default())
    }

    /// Decode in-memory bytes with default options.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_bytes_with(ImageEngine::default(), bytes, Options::default())
    }

    /// Wrap an existing raster with default options.
    pub fn from_buffer(buffer: Raster, format: ImageFormat) -> Result<Self> {
        Self::from_buffer_with(ImageEngine::default(), buffer, format, Options::default())
    }
}

impl<E: RasterEngine> Image<E> {
    /// Read and decode the file at `path` through `engine`.
    ///
    /// The path is retained and reported by [`Image::path`].
    pub fn from_path_with(engine: E, path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut image = Self::decode_with(engine, &bytes, options)?;
        debug!(path = %path.display(), "Loaded image from file");
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Decode in-memory bytes through `engine`.
    ///
    /// The bytes are retained and reported by [`Image::data`].
    pub fn from_bytes_with(engine: E, bytes: impl Into<Vec<u8>>, options: Options) -> Result<Self> {
        let bytes = bytes.into();
        let mut image = Self::decode_with(engine, &bytes, options)?;
        image.data = Some(bytes);
        Ok(image)
    }

    /// Wrap a buffer already owned by the caller.
    ///
    /// `options.format`, when set, takes precedence over `format`.
    ///
    /// # Errors
    ///
    /// Returns `ThumbnailError::InvalidGeometry` for an empty buffer.
    pub fn from_buffer_with(
        engine: E,
        buffer: E::Buffer,
        format: ImageFormat,
        options: Options,
    ) -> Result<Self> {
        let (width, height) = engine.dimensions(&buffer);
        if width == 0 || height == 0 {
            return Err(ThumbnailError::geometry(format!(
                "buffer dimensions {width}x{height} must be positive"
            )));
        }
        Ok(Self {
            width,
            height,
            format: options.format.unwrap_or(format),
            rounding: options.rounding,
            buffer,
            engine,
            path: None,
            data: None,
        })
    }

    fn decode_with(engine: E, bytes: &[u8], options: Options) -> Result<Self> {
        let decoded = engine.decode(bytes)?;
        debug!(
            width = decoded.width,
            height = decoded.height,
            format = %decoded.format,
            "Decoded image"
        );
        Self::from_buffer_with(engine, decoded.buffer, decoded.format, options)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The format transforms plan for and output defaults to.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Source path, for images loaded with [`Image::from_path`].
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Source bytes, for images loaded with [`Image::from_bytes`].
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn buffer(&self) -> &E::Buffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> E::Buffer {
        self.buffer
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// MIME type of [`Image::format`].
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Shrink to fit within `max_width x max_height`, keeping the aspect ratio.
    ///
    /// A missing bound takes the value of the other one. Images that already
    /// fit are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `ThumbnailError::InvalidGeometry` when both bounds are missing
    /// or one is zero, and `EngineFailure` if the engine fails.
    pub fn resize(
        &self,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> Result<Cow<'_, Self>> {
        let (width, height) =
            bounded_resize(self.width, self.height, max_width, max_height, self.rounding)?;
        if (width, height) == (self.width, self.height) {
            debug!(width, height, "Image already fits, skipping resize");
            return Ok(Cow::Borrowed(self));
        }
        debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            "Resizing"
        );
        self.resample_full(width, height).map(Cow::Owned)
    }

    /// Scale both sides by `percent` (100 = same size, always resampled).
    pub fn resize_by_percent(&self, percent: u32) -> Result<Self> {
        let (width, height) = percent_resize(self.width, self.height, percent, self.rounding)?;
        debug!(percent, width, height, "Resizing by percent");
        self.resample_full(width, height)
    }

    /// Crop the centered square of the short side and scale it to `size x size`.
    pub fn resize_from_center(&self, size: u32) -> Result<Self> {
        let window = center_square_window(self.width, self.height, size, self.rounding)?;
        debug!(?window, "Resizing from center");
        self.resample_into(Resample {
            dst_x: 0,
            dst_y: 0,
            src_x: window.source.x,
            src_y: window.source.y,
            dst_width: window.width,
            dst_height: window.height,
            src_width: window.source.width as i64,
            src_height: window.source.height as i64,
        })
    }

    /// Cut out a `width x height` region at `(x, y)`, clamped to the image.
    pub fn clip(&self, x: i64, y: i64, width: u32, height: u32) -> Result<Self> {
        let rect = clip_window(self.width, self.height, x, y, width, height)?;
        debug!(?rect, "Clipping");
        self.resample_into(copy_op(rect))
    }

    /// Mirror top to bottom.
    pub fn flip(&self) -> Result<Self> {
        self.reflect(Axis::Vertical)
    }

    /// Mirror left to right.
    pub fn flop(&self) -> Result<Self> {
        self.reflect(Axis::Horizontal)
    }

    /// Rotate counter-clockwise by `angle` degrees, filling uncovered area
    /// with `background`. The result may be larger than the source.
    pub fn rotate(&self, angle: f64, background: Rgba<u8>, ignore_transparent: bool) -> Result<Self> {
        let rotated = self
            .engine
            .rotate(&self.buffer, angle, background, ignore_transparent)
            .inspect_err(|e| warn!(angle, error = %e, "Rotation failed"))?;
        let image = self.derive(rotated)?;
        debug!(angle, width = image.width, height = image.height, "Rotated");
        Ok(image)
    }

    /// Bring an image stored with EXIF orientation `code` upright.
    ///
    /// # Errors
    ///
    /// Returns `ThumbnailError::InvalidGeometry` for codes outside 0-8.
    pub fn rotate_by_orientation(&self, code: u32) -> Result<Cow<'_, Self>> {
        self.orient(Orientation::try_from(code)?)
    }

    /// Apply the orientation recorded in the source's EXIF data, if any.
    ///
    /// Only images built from a path or bytes carry EXIF data; others are
    /// returned as-is.
    pub fn auto_orient(&self) -> Result<Cow<'_, Self>> {
        let orientation = match (&self.data, &self.path) {
            (Some(data), _) => Orientation::from_exif(data),
            (None, Some(path)) => Orientation::from_exif(&std::fs::read(path)?),
            (None, None) => None,
        };
        match orientation {
            Some(orientation) => {
                debug!(code = orientation.code(), "Applying EXIF orientation");
                self.orient(orientation)
            }
            None => Ok(Cow::Borrowed(self)),
        }
    }

    fn orient(&self, orientation: Orientation) -> Result<Cow<'_, Self>> {
        let mut current: Option<Self> = None;
        for step in orientation.steps() {
            let source = current.as_ref().unwrap_or(self);
            let next = match *step {
                OrientationStep::Flip => source.flip()?,
                OrientationStep::Flop => source.flop()?,
                OrientationStep::Rotate(angle) => {
                    source.rotate(f64::from(angle), ORIENT_BACKGROUND, false)?
                }
            };
            current = Some(next);
        }
        Ok(current.map_or(Cow::Borrowed(self), Cow::Owned))
    }

    /// Encode to `format` (defaults to [`Image::format`]). `quality` only
    /// applies to JPEG.
    pub fn encode(&self, format: Option<ImageFormat>, quality: Option<u8>) -> Result<Vec<u8>> {
        let format = format.unwrap_or(self.format);
        self.engine
            .encode(&self.buffer, format, quality)
            .inspect_err(|e| warn!(%format, error = %e, "Encoding failed"))
    }

    /// Encoded bytes as standard base64.
    pub fn to_base64(&self, format: Option<ImageFormat>) -> Result<String> {
        Ok(STANDARD.encode(self.encode(format, None)?))
    }

    /// A `data:` URI. Defaults to PNG so transparency always survives.
    pub fn data_uri(&self, format: Option<ImageFormat>) -> Result<String> {
        let format = format.unwrap_or(ImageFormat::Png);
        Ok(format!(
            "data:{};base64,{}",
            format.mime_type(),
            self.to_base64(Some(format))?
        ))
    }

    /// Encode and write to `path`.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        format: Option<ImageFormat>,
        quality: Option<u8>,
    ) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode(format, quality)?;
        std::fs::write(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved image");
        Ok(())
    }

    fn reflect(&self, axis: Axis) -> Result<Self> {
        let mut buffer = self.buffer.clone();
        if self.engine.reflect(&mut buffer, axis) {
            return self.derive(buffer);
        }
        drop(buffer);

        debug!(?axis, "Engine cannot reflect, resampling with reversed extent");
        let mut op = copy_op(Rectangle::full(self.width, self.height));
        match axis {
            Axis::Vertical => {
                op.src_y = self.height;
                op.src_height = -op.src_height;
            }
            Axis::Horizontal => {
                op.src_x = self.width;
                op.src_width = -op.src_width;
            }
        }
        self.resample_into(op)
    }

    fn resample_full(&self, width: u32, height: u32) -> Result<Self> {
        let mut op = copy_op(Rectangle::full(self.width, self.height));
        op.dst_width = width;
        op.dst_height = height;
        self.resample_into(op)
    }

    /// Allocate a canvas of the op's destination size, prepare it for the
    /// source transparency and resample into it.
    fn resample_into(&self, op: Resample) -> Result<Self> {
        if op.dst_width == 0 || op.dst_height == 0 {
            return Err(ThumbnailError::geometry(format!(
                "destination {}x{} must be positive",
                op.dst_width, op.dst_height
            )));
        }

        let mut canvas = self
            .engine
            .allocate_canvas(op.dst_width, op.dst_height)
            .inspect_err(|e| warn!(error = %e, "Canvas allocation failed"))?;

        let plan = TransparencyPlan::select(&self.engine, self.format, &self.buffer);
        plan.prepare(&self.engine, &mut canvas, &self.buffer)?;

        self.engine
            .resample(&mut canvas, &self.buffer, &op)
            .inspect_err(|e| warn!(?op, error = %e, "Resample failed"))?;

        self.derive(canvas)
    }

    /// Wrap a buffer produced from this image, carrying settings forward.
    fn derive(&self, buffer: E::Buffer) -> Result<Self> {
        let (width, height) = self.engine.dimensions(&buffer);
        if width == 0 || height == 0 {
            return Err(ThumbnailError::engine(format!(
                "engine produced an empty {width}x{height} buffer"
            )));
        }
        Ok(Self {
            width,
            height,
            format: self.format,
            rounding: self.rounding,
            buffer,
            engine: self.engine.clone(),
            path: None,
            data: None,
        })
    }
}

/// A 1:1 copy of `rect` to the canvas origin.
fn copy_op(rect: Rectangle) -> Resample {
    Resample {
        dst_x: 0,
        dst_y: 0,
        src_x: rect.x,
        src_y: rect.y,
        dst_width: rect.width,
        dst_height: rect.height,
        src_width: rect.width as i64,
        src_height: rect.height as i64,
    }
}

impl<E: RasterEngine> fmt::Debug for Image<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("rounding", &self.rounding)
            .field("path", &self.path)
            .field("data_len", &self.data.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use image::RgbaImage;
    use proptest::prelude::*;

    fn test_image(width: u32, height: u32) -> Image {
        let raster = Raster::new(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, 0, 255])
        }));
        Image::from_buffer(raster, ImageFormat::Png).unwrap()
    }

    proptest! {
        /// Property: Clip results always have the clamped request size.
        #[test]
        fn prop_clip_size(
            (w, h) in (1u32..=40, 1u32..=40),
            (x, y) in (-50i64..=50, -50i64..=50),
            (cw, ch) in (1u32..=60, 1u32..=60),
        ) {
            let out = test_image(w, h).clip(x, y, cw, ch).unwrap();
            prop_assert_eq!((out.width(), out.height()), (cw.min(w), ch.min(h)));
        }

        /// Property: Every orientation produces upright dimensions.
        #[test]
        fn prop_orientation_dimensions((w, h) in (1u32..=16, 1u32..=16), code in 0u32..=8) {
            let img = test_image(w, h);
            let out = img.rotate_by_orientation(code).unwrap();
            let orientation = Orientation::try_from(code).unwrap();
            let expected = if orientation.swaps_dimensions() { (h, w) } else { (w, h) };
            prop_assert_eq!((out.width(), out.height()), expected);
        }

        /// Property: Flipping twice restores the pixels.
        #[test]
        fn prop_double_flip_identity((w, h) in (1u32..=16, 1u32..=16)) {
            let img = test_image(w, h);
            let flipped_twice = img.flip().unwrap().flip().unwrap();
            prop_assert_eq!(flipped_twice.buffer(), img.buffer());
            let flopped_twice = img.flop().unwrap().flop().unwrap();
            prop_assert_eq!(flopped_twice.buffer(), img.buffer());
        }
    }
}
