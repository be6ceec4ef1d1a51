//! Builders for small synthetic TrueType files.

#![allow(dead_code)]

/// Lays out a table directory followed by the table bodies, each padded
/// to four bytes. Record lengths are the unpadded body lengths.
#[derive(Default)]
pub struct FontBuilder {
    tables: Vec<([u8; 4], Vec<u8>)>,
}

impl FontBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, tag: &[u8; 4], body: Vec<u8>) -> Self {
        self.tables.push((*tag, body));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let mut data = Vec::new();
        data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        data.extend_from_slice(&num_tables.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

        let mut offset = 12 + 16 * self.tables.len();
        for (tag, body) in &self.tables {
            data.extend_from_slice(tag);
            data.extend_from_slice(&0u32.to_be_bytes());
            data.extend_from_slice(&(offset as u32).to_be_bytes());
            data.extend_from_slice(&(body.len() as u32).to_be_bytes());
            offset += padded(body.len());
        }

        for (_, body) in &self.tables {
            data.extend_from_slice(body);
            data.resize(padded(data.len()), 0);
        }
        data
    }
}

fn padded(len: usize) -> usize {
    (len + 3) & !3
}

pub fn head(index_to_loc_format: i16) -> Vec<u8> {
    let mut data = vec![0u8; 54];
    data[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    data[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    data[18..20].copy_from_slice(&1000u16.to_be_bytes());
    data[50..52].copy_from_slice(&index_to_loc_format.to_be_bytes());
    data
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut data = 0x0000_5000u32.to_be_bytes().to_vec();
    data.extend_from_slice(&num_glyphs.to_be_bytes());
    data
}

/// Real offsets, stored halved
pub fn loca_short(offsets: &[u32]) -> Vec<u8> {
    offsets
        .iter()
        .flat_map(|offset| ((offset / 2) as u16).to_be_bytes())
        .collect()
}

pub fn loca_long(offsets: &[u32]) -> Vec<u8> {
    offsets.iter().flat_map(|offset| offset.to_be_bytes()).collect()
}

/// A format 4 segment. When `glyph_ids` is set the segment maps through
/// the glyph id array and `id_range_offset` is computed.
pub struct Segment {
    pub start: u16,
    pub end: u16,
    pub id_delta: u16,
    pub glyph_ids: Option<Vec<u16>>,
}

impl Segment {
    pub fn delta(start: u16, end: u16, id_delta: u16) -> Self {
        Self {
            start,
            end,
            id_delta,
            glyph_ids: None,
        }
    }

    pub fn mapped(start: u16, end: u16, glyph_ids: Vec<u16>) -> Self {
        Self {
            start,
            end,
            id_delta: 0,
            glyph_ids: Some(glyph_ids),
        }
    }

    /// The terminating 0xFFFF segment every real font carries
    pub fn terminator() -> Self {
        Self::delta(0xFFFF, 0xFFFF, 1)
    }
}

pub fn format4(segments: &[Segment]) -> Vec<u8> {
    let seg_count = segments.len();
    let mut range_offsets = Vec::with_capacity(seg_count);
    let mut glyph_id_array = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        match &segment.glyph_ids {
            Some(ids) => {
                range_offsets.push((2 * (seg_count - i + glyph_id_array.len())) as u16);
                glyph_id_array.extend_from_slice(ids);
            }
            None => range_offsets.push(0),
        }
    }

    let length = (16 + 8 * seg_count + 2 * glyph_id_array.len()) as u16;
    let seg_count_x2 = (seg_count * 2) as u16;
    let mut data = Vec::new();
    for value in [4, length, 0, seg_count_x2, 0, 0, 0] {
        data.extend_from_slice(&value.to_be_bytes());
    }
    push_u16s(&mut data, segments.iter().map(|s| s.end));
    push_u16s(&mut data, [0]);
    push_u16s(&mut data, segments.iter().map(|s| s.start));
    push_u16s(&mut data, segments.iter().map(|s| s.id_delta));
    push_u16s(&mut data, range_offsets);
    push_u16s(&mut data, glyph_id_array);
    data
}

fn push_u16s(data: &mut Vec<u8>, values: impl IntoIterator<Item = u16>) {
    for value in values {
        data.extend_from_slice(&value.to_be_bytes());
    }
}

/// A cmap holding the given (platform, encoding, subtable) entries in order
pub fn cmap(subtables: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&(subtables.len() as u16).to_be_bytes());

    let mut offset = (4 + 8 * subtables.len()) as u32;
    for (platform_id, encoding_id, body) in subtables {
        data.extend_from_slice(&platform_id.to_be_bytes());
        data.extend_from_slice(&encoding_id.to_be_bytes());
        data.extend_from_slice(&offset.to_be_bytes());
        offset += body.len() as u32;
    }
    for (_, _, body) in subtables {
        data.extend_from_slice(body);
    }
    data
}

/// One glyph per entry of `lengths`, glyph `i` being `lengths[i]` bytes
/// of the value `i + 1`. Returns the glyf body and its loca offsets.
pub fn glyf(lengths: &[u32]) -> (Vec<u8>, Vec<u32>) {
    let mut data = Vec::new();
    let mut offsets = vec![0];
    for (i, &length) in lengths.iter().enumerate() {
        data.extend(std::iter::repeat_n((i + 1) as u8, length as usize));
        offsets.push(data.len() as u32);
    }
    (data, offsets)
}
