//! Pure thumbnail geometry: target dimensions and source windows.
//!
//! Nothing here touches pixels. Each function validates its inputs eagerly
//! and fails with [`ThumbnailError::InvalidGeometry`](crate::ThumbnailError)
//! before any canvas could be allocated.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the source image
//! - Windows are in source pixels and always lie inside the source

mod dimensions;
mod window;

pub use dimensions::{bounded_resize, percent_resize};
pub use window::{center_square_window, clip_window, CenterWindow, Rectangle};
