use log::{debug, warn};

use crate::buffer::FontBuf;

use super::{TableEncodingError, TableRecord};

/// A representation of the [cmap table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html)
/// supporting only format 4 lookups, every other format is kept as an
/// opaque subtable which never maps anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmap {
    /// The version of the cmap table
    /// it's almost guarenteed to be set to zero
    pub version: u16,

    /// The number of encoding subtables declared by the header
    pub num_subtables: u16,

    /// The subtables that could be read, in directory order
    subtables: Vec<CmapSubtable>,
}

/// The encoding record pointing at a subtable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingRecord {
    /// The platform identifier
    pub platform_id: u16,

    /// The platform specific encoding identifier
    pub platform_specific_id: u16,

    /// The offset of the mapping table, from the start of the cmap table
    pub offset: u32,
}

impl EncodingRecord {
    pub const SIZE: usize = 8;

    fn from_buffer(buf: &FontBuf<'_>, at: usize) -> Result<Self, TableEncodingError> {
        let raw = FontBuf::new(buf.slice(at, Self::SIZE)?);

        Ok(Self {
            platform_id: raw.read_u16(0)?,
            platform_specific_id: raw.read_u16(2)?,
            offset: raw.read_u32(4)?,
        })
    }

    /// Lower is preferred when resolving a code point.
    ///
    /// Full repertoire Unicode encodings come first, then Unicode BMP,
    /// then the remaining Unicode encodings, then any other platform and
    /// finally the Windows Symbol encoding.
    pub fn priority(&self) -> u8 {
        match (self.platform_id, self.platform_specific_id) {
            (3, 10) | (0, 4) | (0, 6) => 0,
            (3, 1) | (0, 3) => 1,
            (0, _) => 2,
            (3, 0) => 4,
            _ => 3,
        }
    }
}

/// One of the mapping subtables of a `cmap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmapSubtable {
    Format4(Format4),
    Unknown(UnknownSubtable),
}

impl CmapSubtable {
    pub fn encoding(&self) -> &EncodingRecord {
        match self {
            CmapSubtable::Format4(table) => &table.encoding,
            CmapSubtable::Unknown(table) => &table.encoding,
        }
    }

    /// Maps a code point to a glyph index, `None` means no glyph
    pub fn resolve(&self, codepoint: u32) -> Option<u16> {
        match self {
            CmapSubtable::Format4(table) => table.resolve(codepoint),
            CmapSubtable::Unknown(_) => None,
        }
    }
}

/// A subtable in a format we don't read. Its `format` and `length` are
/// `None` when they lie outside the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSubtable {
    pub encoding: EncodingRecord,
    pub format: Option<u16>,
    pub length: Option<u16>,
}

/// Segment mapping to delta values, the binary search format
/// covering the Unicode BMP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format4 {
    pub encoding: EncodingRecord,
    pub length: u16,
    pub language: u16,
    pub seg_count_x2: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
    pub end_codes: Vec<u16>,
    pub reserved_pad: u16,
    pub start_codes: Vec<u16>,
    /// Added modulo 65536, so stored unsigned
    pub id_deltas: Vec<u16>,
    pub id_range_offsets: Vec<u16>,
    pub glyph_id_array: Vec<u16>,
}

impl Format4 {
    /// format, length, language, segCountX2, searchRange, entrySelector, rangeShift
    const HEADER_SIZE: usize = 14;

    /// Reads a format 4 subtable starting at `at` (its format field).
    ///
    /// Every scalar and every element of the four segment arrays must be
    /// present, otherwise the subtable is rejected as a whole.
    fn from_buffer(
        buf: &FontBuf<'_>,
        at: usize,
        encoding: EncodingRecord,
    ) -> Result<Self, TableEncodingError> {
        let header = FontBuf::new(buf.slice(at, Self::HEADER_SIZE)?);
        let length = header.read_u16(2)?;
        let seg_count_x2 = header.read_u16(6)?;
        let seg_count = usize::from(seg_count_x2 / 2);
        let array_size = usize::from(seg_count_x2);

        let end_codes_at = at + Self::HEADER_SIZE;
        let reserved_pad_at = end_codes_at + array_size;
        let start_codes_at = reserved_pad_at + 2;
        let id_deltas_at = start_codes_at + array_size;
        let id_range_offsets_at = id_deltas_at + array_size;
        let glyph_id_array_at = id_range_offsets_at + array_size;

        let end_codes = buf.read_u16_array(end_codes_at, seg_count)?;
        let reserved_pad = buf.read_u16(reserved_pad_at)?;
        let start_codes = buf.read_u16_array(start_codes_at, seg_count)?;
        let id_deltas = buf.read_u16_array(id_deltas_at, seg_count)?;
        let id_range_offsets = buf.read_u16_array(id_range_offsets_at, seg_count)?;

        // the glyph id array fills whatever the declared length leaves over
        let consumed = glyph_id_array_at - at;
        let glyph_id_count = usize::from(length).saturating_sub(consumed) / 2;
        let glyph_id_array = buf
            .read_u16_array(glyph_id_array_at, glyph_id_count)
            .unwrap_or_else(|err| {
                warn!("ignoring unreadable cmap format 4 glyph id array: {err}");
                Vec::new()
            });

        Ok(Self {
            encoding,
            length,
            language: header.read_u16(4)?,
            seg_count_x2,
            search_range: header.read_u16(8)?,
            entry_selector: header.read_u16(10)?,
            range_shift: header.read_u16(12)?,
            end_codes,
            reserved_pad,
            start_codes,
            id_deltas,
            id_range_offsets,
            glyph_id_array,
        })
    }

    pub fn seg_count(&self) -> usize {
        self.end_codes.len()
    }

    /// Finds the first segment (in stored order) containing `codepoint`.
    /// Segments are expected to be sorted by end code already.
    fn segment_for(&self, codepoint: u32) -> Option<usize> {
        self.start_codes
            .iter()
            .zip(&self.end_codes)
            .position(|(&start, &end)| u32::from(start) <= codepoint && codepoint <= u32::from(end))
    }

    pub fn resolve(&self, codepoint: u32) -> Option<u16> {
        let segment = self.segment_for(codepoint)?;
        let id_delta = self.id_deltas[segment];
        let id_range_offset = self.id_range_offsets[segment];

        if id_range_offset == 0 {
            return Some(((u32::from(id_delta) + codepoint) % 65536) as u16);
        }

        // idRangeOffset is a byte offset from its own slot; walk it as words
        // over idRangeOffset[] followed by glyphIdArray[]
        let start = u32::from(self.start_codes[segment]);
        let index = segment + usize::from(id_range_offset / 2) + (codepoint - start) as usize;
        let glyph_id = match index.checked_sub(self.seg_count()) {
            Some(array_index) => *self.glyph_id_array.get(array_index)?,
            None => self.id_range_offsets[index],
        };

        if glyph_id == 0 {
            return None;
        }

        Some(glyph_id.wrapping_add(id_delta))
    }
}

impl Cmap {
    /// Reads the cmap header, its encoding records and the subtables they
    /// point to. Encoding records or format 4 subtables that cannot be
    /// read completely are left out.
    pub fn from_buffer(
        buf: &FontBuf<'_>,
        record: &TableRecord,
    ) -> Result<Self, TableEncodingError> {
        let cmap_offset = record.offset();
        let header = FontBuf::new(buf.slice(cmap_offset, 4)?);
        let version = header.read_u16(0)?;
        let num_subtables = header.read_u16(2)?;

        let mut subtables = Vec::with_capacity(usize::from(num_subtables));
        for i in 0..usize::from(num_subtables) {
            let at = cmap_offset + 4 + i * EncodingRecord::SIZE;
            match Self::subtable_from_buffer(buf, cmap_offset, at) {
                Ok(subtable) => subtables.push(subtable),
                Err(err) => debug!("skipping cmap subtable {i}: {err}"),
            }
        }

        Ok(Self {
            version,
            num_subtables,
            subtables,
        })
    }

    fn subtable_from_buffer(
        buf: &FontBuf<'_>,
        cmap_offset: usize,
        at: usize,
    ) -> Result<CmapSubtable, TableEncodingError> {
        let encoding = EncodingRecord::from_buffer(buf, at)?;
        let subtable_at = cmap_offset + encoding.offset as usize;
        let format = buf.read_u16(subtable_at).ok();

        Ok(match format {
            Some(4) => CmapSubtable::Format4(Format4::from_buffer(buf, subtable_at, encoding)?),
            _ => CmapSubtable::Unknown(UnknownSubtable {
                encoding,
                format,
                length: buf.read_u16(subtable_at + 2).ok(),
            }),
        })
    }

    /// Subtables in directory order
    pub fn subtables(&self) -> &[CmapSubtable] {
        &self.subtables
    }

    /// Subtables in the order they are consulted when resolving a code
    /// point, see [`EncodingRecord::priority`]. Ties keep directory order.
    pub fn resolution_order(&self) -> Vec<&CmapSubtable> {
        let mut ordered = self.subtables.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|subtable| subtable.encoding().priority());
        ordered
    }

    /// The glyph index from the first subtable, in resolution order,
    /// that maps `codepoint`
    pub fn glyph_index(&self, codepoint: u32) -> Option<u16> {
        self.resolution_order()
            .into_iter()
            .find_map(|subtable| subtable.resolve(codepoint))
    }
}
