//! Inputs supplied next to the font: an Android-style string resource
//! naming every character of interest, and a JSON table of the expected
//! glyph digests.

use log::debug;
use quick_xml::{Reader, events::Event};
use serde::{Deserialize, Serialize};

use crate::TtGlyphError;

/// A named character taken from the string resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontUnicode {
    pub name: String,
    pub unicode: u32,
}

/// The digest of the glyph a named character resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDigest {
    pub name: String,
    pub digest: String,
}

/// Reads every `<string name="...">C</string>` whose text is exactly one
/// Basic Multilingual Plane character. Entries holding anything else are
/// skipped.
///
/// ```
/// let xml = r#"<resources>
///     <string name="icon_home">&#xe9aa;</string>
///     <string name="app_name">Icons</string>
/// </resources>"#;
///
/// let unicodes = ttglyph::assets::read_font_unicodes(xml).unwrap();
/// assert_eq!(unicodes.len(), 1);
/// assert_eq!(unicodes[0].name, "icon_home");
/// assert_eq!(unicodes[0].unicode, 0xE9AA);
/// ```
pub fn read_font_unicodes(xml: &str) -> Result<Vec<FontUnicode>, TtGlyphError> {
    let mut reader = Reader::from_str(xml);
    let mut unicodes = Vec::new();
    // name and accumulated text of the <string> being read
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"string" => {
                let name = get_attr(&e, "name").unwrap_or_default();
                current = Some((name, String::new()));
            }
            Event::Text(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) if e.name().as_ref() == b"string" => {
                if let Some((name, text)) = current.take() {
                    // one UTF-16 unit, so supplementary-plane characters are skipped
                    match text.chars().next() {
                        Some(c) if text.encode_utf16().count() == 1 => {
                            unicodes.push(FontUnicode {
                                name,
                                unicode: u32::from(c),
                            })
                        }
                        _ => debug!("skipping string '{name}', not a single BMP character"),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(unicodes)
}

fn get_attr(e: &quick_xml::events::BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return attr.unescape_value().ok().map(|value| value.into_owned());
        }
    }
    None
}

pub fn read_font_digests(json: &str) -> Result<Vec<FontDigest>, TtGlyphError> {
    Ok(serde_json::from_str(json)?)
}

/// Pretty printed, in the same shape [`read_font_digests`] accepts
pub fn write_font_digests(digests: &[FontDigest]) -> Result<String, TtGlyphError> {
    Ok(serde_json::to_string_pretty(digests)?)
}
