use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::warn;

use crate::buffer::FontBuf;

use super::{TableEncodingError, TableRecord};

/// Represents the flags field of the 'head' table in a TrueType font file.
/// Each field corresponds to a specific bit in the 16-bit flags value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadFlags {
    /// Bit 0: The Y value of 0 specifies the baseline.
    pub y_value_zero_is_baseline: bool,
    /// Bit 1: x position of left most black bit is LSB.
    pub x_pos_leftmost_black_bit_lsb: bool,
    /// Bit 2: Scaled point size and actual point size will differ.
    pub scaled_point_size_differs: bool,
    /// Bit 3: Use integer scaling instead of fractional.
    pub use_integer_scaling: bool,
    /// Bit 4: Used by the Microsoft implementation of the TrueType scaler.
    pub microsoft_scaler_flag: bool,
    /// Bit 5: Glyphs are drawn for vertical layout, x = 0 is the vertical baseline.
    pub vertical_layout: bool,
    /// Bit 7: The font requires layout for correct linguistic rendering (e.g. Arabic fonts).
    pub requires_linguistic_layout: bool,
    /// Bit 8: AAT font with metamorphosis effects happening by default.
    pub aat_default_metamorphosis: bool,
    /// Bit 9: The font contains strong right-to-left glyphs.
    pub strong_rtl_glyphs: bool,
    /// Bit 10: The font contains Indic-style rearrangement effects.
    pub indic_rearrangement: bool,
    /// Bits 11-13: Defined by Adobe.
    pub adobe_defined: u8,
    /// Bit 14: Glyphs are generic symbols for code point ranges, such as for a last resort font.
    pub generic_symbol_font: bool,
    /// The word as it was stored
    pub bits: u16,
}

impl HeadFlags {
    pub fn from_bits(bits: u16) -> Self {
        let bit = |n: u16| bits & (1 << n) != 0;

        HeadFlags {
            y_value_zero_is_baseline: bit(0),
            x_pos_leftmost_black_bit_lsb: bit(1),
            scaled_point_size_differs: bit(2),
            use_integer_scaling: bit(3),
            microsoft_scaler_flag: bit(4),
            vertical_layout: bit(5),
            requires_linguistic_layout: bit(7),
            aat_default_metamorphosis: bit(8),
            strong_rtl_glyphs: bit(9),
            indic_rearrangement: bit(10),
            adobe_defined: ((bits & 0b0011_1000_0000_0000) >> 11) as u8,
            generic_symbol_font: bit(14),
            bits,
        }
    }
}

/// Width of the entries in the `loca` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexToLocFormat {
    /// `u16` entries storing half of the real offset
    Short,
    /// `u32` entries storing the real offset
    Long,
}

/// Seconds since 1904-01-01T00:00:00Z, the TrueType epoch.
///
/// Stored on disk as two big-endian `u32` halves, both unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LongDateTime(pub u64);

impl LongDateTime {
    /// Seconds between 1904-01-01 and 1970-01-01
    pub const UNIX_EPOCH_DELTA: u64 = 2_082_844_800;

    pub fn from_halves(high: u32, low: u32) -> Self {
        Self((u64::from(high) << 32) | u64::from(low))
    }

    pub fn seconds_since_1904(&self) -> u64 {
        self.0
    }

    /// Seconds relative to 1970-01-01, negative for older dates
    pub fn to_unix_timestamp(&self) -> i128 {
        i128::from(self.0) - i128::from(Self::UNIX_EPOCH_DELTA)
    }

    /// `None` when the platform clock cannot represent the date
    pub fn to_system_time(&self) -> Option<SystemTime> {
        if self.0 >= Self::UNIX_EPOCH_DELTA {
            UNIX_EPOCH.checked_add(Duration::from_secs(self.0 - Self::UNIX_EPOCH_DELTA))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(Self::UNIX_EPOCH_DELTA - self.0))
        }
    }
}

/// A representation of the [head table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    /// The version of the head table
    /// it's almost guarenteed to be set to version 0x00010000
    pub version: u32,

    /// Font revision set by the font author/manufacturer
    pub font_revision: u32,

    /// Check sum adjustment, read but never verified
    pub checksum_adjustment: u32,

    /// Magic number, obselete, always set to 0x5F0F3CF5
    pub magic_number: u32,

    /// The flags which guides the font rendering and processing
    pub flags: HeadFlags,

    /// Units per em (ranges from 64 to 16384)
    pub units_per_em: u16,

    /// Date the font was created
    pub created: LongDateTime,

    /// Date the font was last modified
    pub modified: LongDateTime,

    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,

    pub mac_style: u16,

    /// Smallest readable size in pixel
    pub lowest_rec_ppem: u16,

    pub font_direction_hint: i16,

    /// Index to loc format, 0 for short offsets and 1 for long
    pub index_to_loc_format: i16,

    /// Glyph data format (0 is for the current format)
    pub glyph_data_format: i16,
}

impl Head {
    /// Number of bytes occupied by the fixed fields
    pub const SIZE: usize = 54;

    /// Reads the `head` table located by `record`.
    ///
    /// The table is all-or-nothing: if any of its 54 bytes lie outside
    /// the buffer the whole table is rejected.
    pub fn from_buffer(
        buf: &FontBuf<'_>,
        record: &TableRecord,
    ) -> Result<Self, TableEncodingError> {
        let table = FontBuf::new(buf.slice(record.offset(), Self::SIZE)?);

        Ok(Self {
            version: table.read_u32(0)?,
            font_revision: table.read_u32(4)?,
            checksum_adjustment: table.read_u32(8)?,
            magic_number: table.read_u32(12)?,
            flags: HeadFlags::from_bits(table.read_u16(16)?),
            units_per_em: table.read_u16(18)?,
            created: LongDateTime::from_halves(table.read_u32(20)?, table.read_u32(24)?),
            modified: LongDateTime::from_halves(table.read_u32(28)?, table.read_u32(32)?),
            x_min: table.read_i16(36)?,
            y_min: table.read_i16(38)?,
            x_max: table.read_i16(40)?,
            y_max: table.read_i16(42)?,
            mac_style: table.read_u16(44)?,
            lowest_rec_ppem: table.read_u16(46)?,
            font_direction_hint: table.read_i16(48)?,
            index_to_loc_format: table.read_i16(50)?,
            glyph_data_format: table.read_i16(52)?,
        })
    }

    /// Anything other than 1 selects the short format
    pub fn index_to_loc_format(&self) -> IndexToLocFormat {
        match self.index_to_loc_format {
            1 => IndexToLocFormat::Long,
            0 => IndexToLocFormat::Short,
            other => {
                warn!("unknown indexToLocFormat {other}, assuming short offsets");
                IndexToLocFormat::Short
            }
        }
    }
}
