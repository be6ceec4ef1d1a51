//! Resolves Unicode code points to the raw glyph outline bytes stored in
//! a TrueType font's `glyf` table.

use buffer::FontBufError;
use tables::TableEncodingError;
use thiserror::Error;

pub mod assets;
pub mod buffer;
pub mod check;
pub mod digest;
pub mod font;
pub mod tables;

pub use font::{Font, Glyph};

#[derive(Debug, Error)]
pub enum TtGlyphError {
    #[error(transparent)]
    TableEncodingError(#[from] TableEncodingError),

    #[error(transparent)]
    FontBufError(#[from] FontBufError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to read the unicode resource: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to read the digest table: {0}")]
    Json(#[from] serde_json::Error),
}
