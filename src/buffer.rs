use std::fmt;

use thiserror::Error;

macro_rules! impl_read {
    ($fn_name:ident, $typ:ty) => {
        pub fn $fn_name(&self, offset: usize) -> Result<$typ, FontBufError> {
            let bytes = self.slice(offset, size_of::<$typ>())?;
            let mut raw = [0u8; size_of::<$typ>()];
            raw.copy_from_slice(bytes);

            Ok(<$typ>::from_be_bytes(raw))
        }
    };
}

/// Represents the possible errors that can occur when reading from a `FontBuf`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontBufError {
    /// The requested range does not fit inside the buffer.
    #[error("Reading {width} bytes at offset {offset} overruns a buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
}

/// A borrowed, immutable view over a font file which provides
/// bounds-checked big-endian reads at absolute offsets.
///
/// Nothing is ever copied out of the underlying bytes except the
/// fixed-width values being decoded; slices handed out by
/// [`FontBuf::slice`] borrow from the original buffer.
#[derive(Clone, Copy)]
pub struct FontBuf<'a> {
    inner: &'a [u8],
}

impl<'a> FontBuf<'a> {
    /// Wraps an already fully loaded font file
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { inner: bytes }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Borrows `len` bytes starting at `offset`
    ///
    /// # Examples
    ///
    /// ```
    /// use ttglyph::buffer::FontBuf;
    ///
    /// let data = [0, 0, 0, 10, 0, 0, 0, 20];
    /// let buf = FontBuf::new(&data);
    ///
    /// assert_eq!(buf.slice(4, 4).unwrap(), &[0, 0, 0, 20]);
    /// assert!(buf.slice(6, 4).is_err());
    /// ```
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], FontBufError> {
        offset
            .checked_add(len)
            .and_then(|end| self.inner.get(offset..end))
            .ok_or(FontBufError::OutOfBounds {
                offset,
                width: len,
                len: self.inner.len(),
            })
    }

    impl_read!(read_u8, u8);
    impl_read!(read_u16, u16);
    impl_read!(read_i16, i16);
    impl_read!(read_u32, u32);
    impl_read!(read_i32, i32);

    /// Reads a 4 byte table tag
    pub fn read_tag(&self, offset: usize) -> Result<[u8; 4], FontBufError> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.slice(offset, 4)?);

        Ok(tag)
    }

    /// Reads `count` consecutive big-endian `u16` values.
    /// Either every element is read or none is.
    pub fn read_u16_array(&self, offset: usize, count: usize) -> Result<Vec<u16>, FontBufError> {
        let width = count.checked_mul(2).ok_or(FontBufError::OutOfBounds {
            offset,
            width: usize::MAX,
            len: self.inner.len(),
        })?;

        Ok(self
            .slice(offset, width)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect())
    }
}

impl fmt::Debug for FontBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBuf").field("len", &self.inner.len()).finish()
    }
}
