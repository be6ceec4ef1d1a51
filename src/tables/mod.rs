use std::{
    collections::{BTreeMap, btree_map::Iter},
    fmt,
};

use log::{debug, warn};
use thiserror::Error;

use crate::buffer::{FontBuf, FontBufError};

pub mod cmap;
pub mod head;
pub mod loca;
pub mod maxp;

/// A four byte table identifier such as `head` or `glyf`.
/// For more information, see the [Apple Documentation Table 2](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const HEAD: Tag = Tag(*b"head");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");
}

impl From<[u8; 4]> for Tag {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", char::from(byte))?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// Represents the error messages which may occur when trying
/// to parse tables from raw binary buffers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableEncodingError {
    #[error(transparent)]
    Buffer(#[from] FontBufError),

    #[error("The font has no '{0}' table")]
    MissingTable(Tag),

    #[error("Glyph index {index} is outside of the font's {count} glyphs")]
    GlyphIndexOutOfRange {
        index: u32,
        count: u16,
    },

    #[error("Glyph {index} ends at {end} before it starts at {start}")]
    NegativeGlyphLength {
        index: u32,
        start: u32,
        end: u32,
    },
}

/// Represents the offset subtable directory and it's metadata
/// providing us with a important info such as the number of tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    pub scalar_type: u32,
    pub num_tables: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl OffsetTable {
    /// The offset sub table is always 12 bytes at the very start of the file
    pub const SIZE: usize = 12;

    pub fn from_buffer(buf: &FontBuf<'_>) -> Result<Self, TableEncodingError> {
        // one bounds check for the whole record, nothing is trusted from a partial header
        let header = FontBuf::new(buf.slice(0, Self::SIZE)?);

        Ok(Self {
            scalar_type: header.read_u32(0)?,
            num_tables: header.read_u16(4)?,
            search_range: header.read_u16(6)?,
            entry_selector: header.read_u16(8)?,
            range_shift: header.read_u16(10)?,
        })
    }

    /// Returns the number of tables exists in the font file
    pub fn num_tables(&self) -> u16 {
        self.num_tables
    }
}

/// One entry of the table directory. Offsets are absolute file offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    /// Read but never validated
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    pub const SIZE: usize = 16;

    /// Reads a 16 byte record at `at`
    ///
    /// * Bytes 0-3: Tag of the table
    /// * Bytes 4-7: Checksum of the table
    /// * Bytes 8-11: Offset of the table from the beginning of the file
    /// * Bytes 12-15: Length of the table in bytes
    pub fn from_buffer(buf: &FontBuf<'_>, at: usize) -> Result<Self, TableEncodingError> {
        let raw = FontBuf::new(buf.slice(at, Self::SIZE)?);

        Ok(Self {
            tag: Tag(raw.read_tag(0)?),
            checksum: raw.read_u32(4)?,
            offset: raw.read_u32(8)?,
            length: raw.read_u32(12)?,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    pub fn length(&self) -> usize {
        self.length as usize
    }
}

/// The offset table together with every table record it announces,
/// keyed by tag.
#[derive(Debug, Clone)]
pub struct TableDirectory {
    pub offset: OffsetTable,
    records: BTreeMap<Tag, TableRecord>,
}

impl TableDirectory {
    /// Reads the offset table and the `num_tables` records following it.
    ///
    /// A record which runs past the end of the buffer ends the directory,
    /// since every following record would be truncated as well.
    pub fn from_buffer(buf: &FontBuf<'_>) -> Result<Self, TableEncodingError> {
        let offset = OffsetTable::from_buffer(buf)?;
        let mut records = BTreeMap::new();

        for i in 0..usize::from(offset.num_tables()) {
            let at = OffsetTable::SIZE + i * TableRecord::SIZE;
            let record = match TableRecord::from_buffer(buf, at) {
                Ok(record) => record,
                Err(err) => {
                    warn!(
                        "table directory truncated after {i} of {} records: {err}",
                        offset.num_tables()
                    );
                    break;
                }
            };

            if let Some(previous) = records.insert(record.tag, record) {
                debug!("duplicate '{}' table record replaces {:?}", record.tag, previous);
            }
        }

        Ok(Self { offset, records })
    }

    pub fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.get(&tag)
    }

    /// Like [`TableDirectory::get`] but reports which table is missing
    pub fn require(&self, tag: Tag) -> Result<&TableRecord, TableEncodingError> {
        self.get(tag).ok_or(TableEncodingError::MissingTable(tag))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Tag, TableRecord> {
        self.records.iter()
    }
}

impl<'t> IntoIterator for &'t TableDirectory {
    type Item = (&'t Tag, &'t TableRecord);

    type IntoIter = Iter<'t, Tag, TableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_bytes(records: &[(&[u8; 4], u32, u32, u32)], declared: u16) -> Vec<u8> {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&declared.to_be_bytes());
        data.extend_from_slice(&[0, 0x40, 0, 2, 0, 0]);
        for (tag, checksum, offset, length) in records {
            data.extend_from_slice(*tag);
            data.extend_from_slice(&checksum.to_be_bytes());
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&length.to_be_bytes());
        }
        data
    }

    #[test]
    fn parses_offset_table_and_records() {
        let data = directory_bytes(
            &[(b"head", 0xDEAD_BEEF, 44, 54), (b"OS/2", 1, 100, 96)],
            2,
        );
        let directory = TableDirectory::from_buffer(&FontBuf::new(&data)).unwrap();

        assert_eq!(directory.offset.scalar_type, 0x0001_0000);
        assert_eq!(directory.offset.num_tables(), 2);
        assert_eq!(directory.offset.search_range, 0x40);
        assert_eq!(directory.offset.entry_selector, 2);
        assert_eq!(directory.len(), 2);

        let head = directory.get(Tag::HEAD).unwrap();
        assert_eq!(head.checksum, 0xDEAD_BEEF);
        assert_eq!(head.offset(), 44);
        assert_eq!(head.length(), 54);
        assert!(directory.get(Tag(*b"OS/2")).is_some());
        assert_eq!(
            directory.require(Tag::GLYF),
            Err(TableEncodingError::MissingTable(Tag::GLYF))
        );
    }

    #[test]
    fn truncated_header_is_an_error() {
        let data = [0u8; 11];
        assert!(TableDirectory::from_buffer(&FontBuf::new(&data)).is_err());
    }

    #[test]
    fn truncated_records_end_the_directory() {
        let mut data = directory_bytes(&[(b"head", 0, 44, 54), (b"maxp", 0, 98, 6)], 3);
        // half of a third record
        data.extend_from_slice(b"loca\x00\x00");
        let directory = TableDirectory::from_buffer(&FontBuf::new(&data)).unwrap();

        assert_eq!(directory.len(), 2);
        assert!(directory.get(Tag::LOCA).is_none());
    }

    #[test]
    fn later_duplicates_win() {
        let data = directory_bytes(&[(b"glyf", 0, 10, 1), (b"glyf", 0, 20, 2)], 2);
        let directory = TableDirectory::from_buffer(&FontBuf::new(&data)).unwrap();

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(Tag::GLYF).unwrap().offset, 20);
    }

    #[test]
    fn tags_display_as_ascii() {
        assert_eq!(Tag::CMAP.to_string(), "cmap");
        assert_eq!(Tag(*b"OS/2").to_string(), "OS/2");
        assert_eq!(Tag([0, b'a', b'b', b'c']).to_string(), "\\x00abc");
    }
}
