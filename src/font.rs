use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::OnceLock,
};

use log::{debug, warn};

use crate::{
    TtGlyphError,
    buffer::FontBuf,
    tables::{
        TableDirectory, TableEncodingError, TableRecord, Tag,
        cmap::Cmap,
        head::Head,
        loca::{GlyphIndexEntry, GlyphLocator},
        maxp::Maxp,
    },
};

/// The outline bytes of one glyph, borrowed from the font buffer.
///
/// Two glyphs are equal when their outline bytes are equal, whatever
/// their index.
#[derive(Clone, Copy)]
pub struct Glyph<'a> {
    pub index: u32,
    pub outline: &'a [u8],
}

impl PartialEq for Glyph<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.outline == other.outline
    }
}

impl Eq for Glyph<'_> {}

impl Hash for Glyph<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.outline.hash(state);
    }
}

impl fmt::Debug for Glyph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("index", &self.index)
            .field("len", &self.outline.len())
            .finish()
    }
}

/// An immutable view over a whole TrueType file.
///
/// Construction does no parsing; tables are read on first access and
/// cached for the lifetime of the buffer. A table that cannot be read is
/// cached as absent, and every lookup depending on it yields `None`.
/// The caches are synchronized, so one `Font` can be shared between threads.
pub struct Font<'a> {
    buf: FontBuf<'a>,
    tables: OnceLock<Option<TableDirectory>>,
    head: OnceLock<Option<Head>>,
    maxp: OnceLock<Option<Maxp>>,
    cmap: OnceLock<Option<Cmap>>,
    glyphs: OnceLock<Vec<Glyph<'a>>>,
}

impl<'a> Font<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            buf: FontBuf::new(bytes),
            tables: OnceLock::new(),
            head: OnceLock::new(),
            maxp: OnceLock::new(),
            cmap: OnceLock::new(),
            glyphs: OnceLock::new(),
        }
    }

    /// The table directory, `None` when the 12 byte header is unreadable
    pub fn tables(&self) -> Option<&TableDirectory> {
        self.tables
            .get_or_init(|| {
                TableDirectory::from_buffer(&self.buf)
                    .inspect_err(|err| debug!("unreadable table directory: {err}"))
                    .ok()
            })
            .as_ref()
    }

    pub fn table(&self, tag: Tag) -> Option<&TableRecord> {
        self.tables()?.get(tag)
    }

    fn require(&self, tag: Tag) -> Result<&TableRecord, TableEncodingError> {
        self.table(tag).ok_or(TableEncodingError::MissingTable(tag))
    }

    fn cached<'s, T>(
        &'s self,
        cell: &'s OnceLock<Option<T>>,
        tag: Tag,
        parse: impl FnOnce(&FontBuf<'a>, &TableRecord) -> Result<T, TableEncodingError>,
    ) -> Option<&'s T> {
        cell.get_or_init(|| {
            self.require(tag)
                .and_then(|record| parse(&self.buf, record))
                .inspect_err(|err| debug!("no usable '{tag}' table: {err}"))
                .ok()
        })
        .as_ref()
    }

    pub fn head(&self) -> Option<&Head> {
        self.cached(&self.head, Tag::HEAD, Head::from_buffer)
    }

    pub fn maxp(&self) -> Option<&Maxp> {
        self.cached(&self.maxp, Tag::MAXP, Maxp::from_buffer)
    }

    pub fn cmap(&self) -> Option<&Cmap> {
        self.cached(&self.cmap, Tag::CMAP, Cmap::from_buffer)
    }

    /// Number of glyphs according to `maxp`
    pub fn glyph_count(&self) -> Option<u16> {
        self.maxp().map(|maxp| maxp.num_glyphs)
    }

    /// Needs `head`, `maxp`, `loca` and `glyf`
    pub fn locator(&self) -> Result<GlyphLocator<'a>, TtGlyphError> {
        let head = self.head().ok_or(TableEncodingError::MissingTable(Tag::HEAD))?;
        let num_glyphs = self
            .glyph_count()
            .ok_or(TableEncodingError::MissingTable(Tag::MAXP))?;
        let loca = self.require(Tag::LOCA)?;
        let glyf = self.require(Tag::GLYF)?;

        Ok(GlyphLocator::new(
            self.buf,
            loca,
            head.index_to_loc_format(),
            num_glyphs,
            glyf.length,
        ))
    }

    /// Offset and length of every glyph, skipping those that can't be located
    pub fn glyph_index_entries(&self) -> Vec<GlyphIndexEntry> {
        let Ok(locator) = self.locator() else {
            return Vec::new();
        };

        locator
            .entries()
            .filter_map(|entry| {
                entry
                    .inspect_err(|err| debug!("skipping glyph entry: {err}"))
                    .ok()
            })
            .collect()
    }

    pub fn try_glyph_by_index(&self, index: u32) -> Result<Glyph<'a>, TtGlyphError> {
        let locator = self.locator()?;
        let glyf = self.require(Tag::GLYF)?;
        let start = locator.offset_for_index(index)?;
        let length = locator.length_for_index(index)?;
        let outline = self
            .buf
            .slice(glyf.offset() + start as usize, length as usize)?;

        Ok(Glyph { index, outline })
    }

    pub fn glyph_by_index(&self, index: u32) -> Option<Glyph<'a>> {
        self.try_glyph_by_index(index)
            .inspect_err(|err| debug!("no glyph at index {index}: {err}"))
            .ok()
    }

    /// Every glyph that can be read, in index order
    pub fn glyphs(&self) -> &[Glyph<'a>] {
        self.glyphs.get_or_init(|| {
            let count = self.glyph_count().unwrap_or(0);
            let glyphs = (0..u32::from(count))
                .filter_map(|index| self.glyph_by_index(index))
                .collect::<Vec<_>>();

            if glyphs.len() != usize::from(count) {
                warn!("only {} of {count} glyphs could be read", glyphs.len());
            }
            glyphs
        })
    }

    pub fn glyph_index_for_unicode(&self, codepoint: u32) -> Option<u16> {
        self.cmap()?.glyph_index(codepoint)
    }

    /// The glyph of the first subtable, in resolution order, which maps
    /// `codepoint` to a readable glyph
    pub fn glyph_by_unicode(&self, codepoint: u32) -> Option<Glyph<'a>> {
        self.cmap()?
            .resolution_order()
            .into_iter()
            .filter_map(|subtable| subtable.resolve(codepoint))
            .find_map(|index| self.glyph_by_index(u32::from(index)))
    }
}

impl fmt::Debug for Font<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font").field("buf", &self.buf).finish_non_exhaustive()
    }
}
