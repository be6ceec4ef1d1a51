use crate::buffer::FontBuf;

use super::{TableEncodingError, TableRecord};

/// The leading fields of the [maxp table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html),
/// shared by the 0.5 and 1.0 versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maxp {
    pub version: u32,

    /// The number of glyphs in the font
    pub num_glyphs: u16,
}

impl Maxp {
    pub const SIZE: usize = 6;

    pub fn from_buffer(
        buf: &FontBuf<'_>,
        record: &TableRecord,
    ) -> Result<Self, TableEncodingError> {
        let table = FontBuf::new(buf.slice(record.offset(), Self::SIZE)?);

        Ok(Self {
            version: table.read_u32(0)?,
            num_glyphs: table.read_u16(4)?,
        })
    }
}
