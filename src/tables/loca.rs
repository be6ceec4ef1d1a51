//! Locating glyph outlines inside `glyf` through the `loca` table.
//!
//! Offsets handed out here are relative to the start of the `glyf` table.

use crate::buffer::FontBuf;

use super::{TableEncodingError, TableRecord, head::IndexToLocFormat};

/// Where a single glyph lives inside the `glyf` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphIndexEntry {
    pub glyph_index: u32,
    /// Relative to the start of `glyf`
    pub byte_offset: u32,
    pub byte_length: u32,
}

/// Resolves glyph indices to byte ranges using the `loca` table, whose
/// entry width is selected by the `head` table's `indexToLocFormat`.
#[derive(Debug, Clone, Copy)]
pub struct GlyphLocator<'a> {
    buf: FontBuf<'a>,
    loca_offset: usize,
    format: IndexToLocFormat,
    num_glyphs: u16,
    /// The end of the last glyph
    glyf_length: u32,
}

impl<'a> GlyphLocator<'a> {
    pub fn new(
        buf: FontBuf<'a>,
        loca: &TableRecord,
        format: IndexToLocFormat,
        num_glyphs: u16,
        glyf_length: u32,
    ) -> Self {
        Self {
            buf,
            loca_offset: loca.offset(),
            format,
            num_glyphs,
            glyf_length,
        }
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    fn check_index(&self, index: u32) -> Result<(), TableEncodingError> {
        if index >= u32::from(self.num_glyphs) {
            return Err(TableEncodingError::GlyphIndexOutOfRange {
                index,
                count: self.num_glyphs,
            });
        }

        Ok(())
    }

    /// Start of glyph `index`, relative to the `glyf` table
    pub fn offset_for_index(&self, index: u32) -> Result<u32, TableEncodingError> {
        self.check_index(index)?;
        let index = index as usize;

        Ok(match self.format {
            IndexToLocFormat::Long => self.buf.read_u32(self.loca_offset + index * 4)?,
            // The short format stores the real offset divided by two
            IndexToLocFormat::Short => {
                u32::from(self.buf.read_u16(self.loca_offset + index * 2)?) * 2
            }
        })
    }

    /// The last glyph ends where the `glyf` table ends, every other glyph
    /// ends where the next one starts.
    pub fn length_for_index(&self, index: u32) -> Result<u32, TableEncodingError> {
        let start = self.offset_for_index(index)?;
        let end = if index + 1 == u32::from(self.num_glyphs) {
            self.glyf_length
        } else {
            self.offset_for_index(index + 1)?
        };

        end.checked_sub(start)
            .ok_or(TableEncodingError::NegativeGlyphLength { index, start, end })
    }

    pub fn entry(&self, index: u32) -> Result<GlyphIndexEntry, TableEncodingError> {
        Ok(GlyphIndexEntry {
            glyph_index: index,
            byte_offset: self.offset_for_index(index)?,
            byte_length: self.length_for_index(index)?,
        })
    }

    pub fn entries(
        &self,
    ) -> impl Iterator<Item = Result<GlyphIndexEntry, TableEncodingError>> + '_ {
        (0..u32::from(self.num_glyphs)).map(|index| self.entry(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tag;

    fn loca_record(offset: u32, length: u32) -> TableRecord {
        TableRecord {
            tag: Tag::LOCA,
            checksum: 0,
            offset,
            length,
        }
    }

    #[test]
    fn short_offsets_are_doubled() {
        // loca = [0, 4, 10] stored halved
        let data = [0, 0, 0, 2, 0, 5];
        let locator = GlyphLocator::new(
            FontBuf::new(&data),
            &loca_record(0, 6),
            IndexToLocFormat::Short,
            2,
            10,
        );

        assert_eq!(locator.offset_for_index(0), Ok(0));
        assert_eq!(locator.offset_for_index(1), Ok(4));
        assert_eq!(locator.length_for_index(0), Ok(4));
        // the last glyph runs to the end of glyf
        assert_eq!(locator.length_for_index(1), Ok(6));
    }

    #[test]
    fn long_offsets_are_raw() {
        let mut data = vec![0xEE; 3];
        for offset in [0u32, 12, 12, 40] {
            data.extend_from_slice(&offset.to_be_bytes());
        }
        let locator = GlyphLocator::new(
            FontBuf::new(&data),
            &loca_record(3, 16),
            IndexToLocFormat::Long,
            3,
            40,
        );

        let entries = locator.entries().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(
            entries,
            vec![
                GlyphIndexEntry {
                    glyph_index: 0,
                    byte_offset: 0,
                    byte_length: 12,
                },
                GlyphIndexEntry {
                    glyph_index: 1,
                    byte_offset: 12,
                    byte_length: 0,
                },
                GlyphIndexEntry {
                    glyph_index: 2,
                    byte_offset: 12,
                    byte_length: 28,
                },
            ]
        );
    }

    #[test]
    fn indices_past_the_glyph_count_fail() {
        let data = [0, 0, 0, 2, 0, 5];
        let locator = GlyphLocator::new(
            FontBuf::new(&data),
            &loca_record(0, 6),
            IndexToLocFormat::Short,
            2,
            10,
        );

        assert_eq!(
            locator.offset_for_index(2),
            Err(TableEncodingError::GlyphIndexOutOfRange { index: 2, count: 2 })
        );
        assert!(locator.length_for_index(2).is_err());
        assert!(locator.entry(u32::MAX).is_err());
    }

    #[test]
    fn decreasing_offsets_fail() {
        let data = [0, 4, 0, 2];
        let locator = GlyphLocator::new(
            FontBuf::new(&data),
            &loca_record(0, 4),
            IndexToLocFormat::Short,
            2,
            10,
        );

        assert_eq!(
            locator.length_for_index(0),
            Err(TableEncodingError::NegativeGlyphLength {
                index: 0,
                start: 8,
                end: 4
            })
        );
        assert_eq!(locator.length_for_index(1), Ok(6));
    }

    #[test]
    fn truncated_loca_fails() {
        let data = [0, 0, 0];
        let locator = GlyphLocator::new(
            FontBuf::new(&data),
            &loca_record(0, 6),
            IndexToLocFormat::Short,
            2,
            10,
        );

        assert_eq!(locator.offset_for_index(0), Ok(0));
        assert!(locator.offset_for_index(1).is_err());
        assert!(locator.length_for_index(0).is_err());
    }
}
