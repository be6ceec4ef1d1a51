//! Checks run over a font and its configured characters: building the
//! digest table, finding redundant entries and comparing against the
//! expected digests.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use crate::{
    assets::{FontDigest, FontUnicode},
    digest::GlyphDigest,
    font::{Font, Glyph},
};

/// Digests of every configured character, and the characters without a glyph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestTable {
    pub digests: Vec<FontDigest>,
    pub missing: Vec<FontUnicode>,
}

impl DigestTable {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn digest_table(
    font: &Font<'_>,
    unicodes: &[FontUnicode],
    digest: &impl GlyphDigest,
) -> DigestTable {
    let mut table = DigestTable::default();

    for unicode in unicodes {
        match font.glyph_by_unicode(unicode.unicode) {
            Some(glyph) => table.digests.push(FontDigest {
                name: unicode.name.clone(),
                digest: digest.digest(glyph.outline),
            }),
            None => table.missing.push(unicode.clone()),
        }
    }

    table
}

/// Code points configured under more than one name, with those names in
/// configuration order
pub fn duplicate_codepoints(unicodes: &[FontUnicode]) -> BTreeMap<u32, Vec<String>> {
    let mut names: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for unicode in unicodes {
        names.entry(unicode.unicode).or_default().push(unicode.name.clone());
    }

    names.retain(|_, names| names.len() > 1);
    names
}

/// Groups of glyph indices sharing byte-identical outlines, each group
/// sorted and the groups ordered by their first index.
///
/// Identical outlines are legal in a font; this only reports them.
pub fn duplicate_glyphs(glyphs: &[Glyph<'_>]) -> Vec<Vec<u32>> {
    let mut groups: HashMap<&[u8], Vec<u32>> = HashMap::new();
    for glyph in glyphs {
        groups.entry(glyph.outline).or_default().push(glyph.index);
    }

    let mut duplicates = groups
        .into_values()
        .filter(|indices| indices.len() > 1)
        .map(|mut indices| {
            indices.sort_unstable();
            indices
        })
        .collect::<Vec<_>>();
    duplicates.sort();
    duplicates
}

/// Whether the font has exactly one glyph per distinct configured code point
pub fn glyph_count_matches(font: &Font<'_>, unicodes: &[FontUnicode]) -> bool {
    let distinct = unicodes.iter().map(|u| u.unicode).collect::<HashSet<_>>();
    font.glyph_count().map(usize::from) == Some(distinct.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestMismatch {
    /// Nothing expected under this name
    MissingExpected {
        name: String,
        unicode: u32,
    },
    /// The code point doesn't resolve to a glyph
    MissingGlyph {
        name: String,
        unicode: u32,
    },
    Differs {
        name: String,
        unicode: u32,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for DigestMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestMismatch::MissingExpected { name, unicode } => {
                write!(f, "{name} ({unicode:x}): no expected digest")
            }
            DigestMismatch::MissingGlyph { name, unicode } => {
                write!(f, "{name} ({unicode:x}): no glyph in the font")
            }
            DigestMismatch::Differs {
                name,
                unicode,
                expected,
                actual,
            } => write!(f, "{name} ({unicode:x}): expected {expected}, got {actual}"),
        }
    }
}

/// Compares the glyph of every configured character against the expected
/// digest of the same name
pub fn verify_digests(
    font: &Font<'_>,
    unicodes: &[FontUnicode],
    expected: &[FontDigest],
    digest: &impl GlyphDigest,
) -> Vec<DigestMismatch> {
    let expected = expected
        .iter()
        .map(|entry| (entry.name.as_str(), entry.digest.as_str()))
        .collect::<HashMap<_, _>>();
    let mut mismatches = Vec::new();

    for unicode in unicodes {
        let (name, codepoint) = (unicode.name.clone(), unicode.unicode);
        let wanted = expected.get(unicode.name.as_str());
        let actual = font
            .glyph_by_unicode(codepoint)
            .map(|glyph| digest.digest(glyph.outline));

        if wanted.is_none() {
            mismatches.push(DigestMismatch::MissingExpected {
                name: name.clone(),
                unicode: codepoint,
            });
        }

        match (wanted, actual) {
            (_, None) => mismatches.push(DigestMismatch::MissingGlyph {
                name,
                unicode: codepoint,
            }),
            (Some(wanted), Some(actual)) if !wanted.eq_ignore_ascii_case(&actual) => {
                mismatches.push(DigestMismatch::Differs {
                    name,
                    unicode: codepoint,
                    expected: wanted.to_string(),
                    actual,
                })
            }
            _ => {}
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unicode(name: &str, unicode: u32) -> FontUnicode {
        FontUnicode {
            name: name.into(),
            unicode,
        }
    }

    #[test]
    fn finds_codepoints_configured_twice() {
        let unicodes = [
            unicode("a", 0x41),
            unicode("b", 0x42),
            unicode("a_again", 0x41),
            unicode("a_thrice", 0x41),
        ];

        let duplicates = duplicate_codepoints(&unicodes);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[&0x41], vec!["a", "a_again", "a_thrice"]);
    }

    #[test]
    fn groups_identical_outlines() {
        let glyphs = [
            Glyph {
                index: 0,
                outline: &[1, 2],
            },
            Glyph {
                index: 1,
                outline: &[3],
            },
            Glyph {
                index: 2,
                outline: &[1, 2],
            },
            Glyph {
                index: 3,
                outline: &[],
            },
            Glyph {
                index: 4,
                outline: &[],
            },
            Glyph {
                index: 5,
                outline: &[1, 2],
            },
        ];

        assert_eq!(duplicate_glyphs(&glyphs), vec![vec![0, 2, 5], vec![3, 4]]);
        assert!(duplicate_glyphs(&glyphs[..2]).is_empty());
    }
}
