//! Content digests of glyph outlines and the hex helpers around them.

use std::fmt::Write;

use md5::{Digest, Md5};

/// A fixed-output hash over a glyph's outline bytes, rendered as text.
/// Only ever used to compare glyph contents.
pub trait GlyphDigest {
    fn digest(&self, bytes: &[u8]) -> String;
}

/// MD5 as 32 lowercase hex digits, the format of existing digest tables
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Digest;

impl GlyphDigest for Md5Digest {
    fn digest(&self, bytes: &[u8]) -> String {
        encode_hex(&<Md5 as Digest>::digest(bytes))
    }
}

/// CRC-32 (IEEE) as 8 lowercase hex digits
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Digest;

impl GlyphDigest for Crc32Digest {
    fn digest(&self, bytes: &[u8]) -> String {
        format!("{:08x}", crc32fast::hash(bytes))
    }
}

impl<F> GlyphDigest for F
where
    F: Fn(&[u8]) -> String,
{
    fn digest(&self, bytes: &[u8]) -> String {
        self(bytes)
    }
}

pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        // writing to a String can't fail
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Parses a code point written in hex such as `e9aa`, `0041` or `0x1F600`
pub fn parse_codepoint_hex(text: &str) -> Option<u32> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(0);
    }

    u32::from_str_radix(significant, 16).ok()
}
