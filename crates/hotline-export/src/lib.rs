//! hotline-export: Drawing surfaces for hotline output (sans-IO).
//!
//! Implements [`hotline_core::Surface`] for an SVG document builder and
//! for an in-memory raster pixmap. Both return strings or bytes; writing
//! them anywhere is the caller's business.

pub mod raster;
pub mod svg;

pub use raster::PixmapSurface;
pub use svg::{SvgMetadata, SvgSurface, build_path_data};

/// Errors from creating or encoding a surface.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A pixmap cannot have a zero (or absurdly large) side.
    #[error("invalid surface size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}
