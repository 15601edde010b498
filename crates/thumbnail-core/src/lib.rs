//! Thumbnail Core - thumbnail geometry and transform orchestration
//!
//! This crate decides target dimensions, crop windows, rotation steps and
//! transparent-canvas setup for raster thumbnails, and drives a raster
//! engine to carry them out. Transparency is preserved per format: palette
//! keyed GIF, alpha-channel PNG, opaque JPEG.
//!
//! ```ignore
//! use thumbnail_core::Image;
//!
//! let image = Image::from_path("photo.jpg")?;
//! let thumb = image.auto_orient()?.resize(Some(320), Some(240))?;
//! thumb.save("thumb.jpg", None, Some(85))?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod geometry;
pub mod image;
pub mod orientation;
pub mod transparency;

pub use crate::config::{FilterType, Options, RoundingPolicy};
pub use crate::engine::{
    compute_rotated_bounds, Axis, Decoded, ImageEngine, Raster, RasterEngine, Resample,
};
pub use crate::error::{Result, ThumbnailError};
pub use crate::format::ImageFormat;
pub use crate::geometry::{
    bounded_resize, center_square_window, clip_window, percent_resize, CenterWindow, Rectangle,
};
pub use crate::image::Image;
pub use crate::orientation::{Orientation, OrientationStep};
pub use crate::transparency::TransparencyPlan;
