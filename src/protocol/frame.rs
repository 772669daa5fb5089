//! Field framing over a byte buffer.
//!
//! A payload is a sequence of fields, each one a size header followed by
//! its content. Decoding never copies: fields are slices of the input.
//!
//! # Example
//!
//! ```
//! use armonik_worker::protocol::{write_field, FieldReader};
//!
//! let mut buf = Vec::new();
//! write_field(&mut buf, b"hello").unwrap();
//! write_field(&mut buf, b"").unwrap();
//!
//! let mut reader = FieldReader::new(&buf);
//! assert_eq!(reader.next_field().unwrap(), b"hello");
//! assert_eq!(reader.next_field().unwrap(), b"");
//! assert!(reader.is_exhausted());
//! ```

use super::wire_format::{decode_size_header, encode_size_header, SIZE_WIDTH};
use crate::error::{Result, WorkerError};

/// Read one field starting at `cursor`.
///
/// Returns the field content and the cursor positioned just after it
/// (`cursor + 8 + n`).
///
/// # Errors
///
/// `MalformedFrame` if the header is short or not hexadecimal, or if the
/// declared length runs past the end of `buf`.
pub fn read_field(buf: &[u8], cursor: usize) -> Result<(&[u8], usize)> {
    let remaining = buf.get(cursor..).ok_or_else(|| {
        WorkerError::MalformedFrame(format!(
            "cursor {} is past the end of a {} byte buffer",
            cursor,
            buf.len()
        ))
    })?;

    let size = decode_size_header(remaining)
        .map_err(|e| match e {
            WorkerError::MalformedFrame(msg) => {
                WorkerError::MalformedFrame(format!("{} (field at offset {})", msg, cursor))
            }
            other => other,
        })? as usize;

    let available = remaining.len() - SIZE_WIDTH;
    if size > available {
        return Err(WorkerError::MalformedFrame(format!(
            "field at offset {} declares {} bytes, only {} remain",
            cursor, size, available
        )));
    }

    let start = cursor + SIZE_WIDTH;
    let end = start + size;
    Ok((&buf[start..end], end))
}

/// Append one field (size header + content) to `out`.
///
/// # Errors
///
/// `MalformedFrame` if the content is longer than a size header can express.
pub fn write_field(out: &mut Vec<u8>, field: &[u8]) -> Result<()> {
    let size = u32::try_from(field.len()).map_err(|_| {
        WorkerError::MalformedFrame(format!(
            "field of {} bytes exceeds the 8 hex digit size header",
            field.len()
        ))
    })?;

    out.reserve(SIZE_WIDTH + field.len());
    out.extend_from_slice(&encode_size_header(size));
    out.extend_from_slice(field);
    Ok(())
}

/// Sequential field reader: a buffer plus a cursor.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    cursor: usize,
}

impl<'a> FieldReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, cursor: 0 }
    }

    /// Read the next field and advance past it.
    ///
    /// On error the cursor is left where it was.
    pub fn next_field(&mut self) -> Result<&'a [u8]> {
        let (field, next) = read_field(self.buf, self.cursor)?;
        self.cursor = next;
        Ok(field)
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// True exactly when the cursor sits at the end of the buffer.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_single_field() {
        let buf = b"00000004test";
        let (field, next) = read_field(buf, 0).unwrap();
        assert_eq!(field, b"test");
        assert_eq!(next, 12);
    }

    #[test]
    fn test_read_field_at_offset() {
        let buf = b"00000004test00000003abc";
        let (field, next) = read_field(buf, 12).unwrap();
        assert_eq!(field, b"abc");
        assert_eq!(next, buf.len());
    }

    #[test]
    fn test_read_empty_field() {
        let (field, next) = read_field(b"00000000", 0).unwrap();
        assert!(field.is_empty());
        assert_eq!(next, SIZE_WIDTH);
    }

    #[test]
    fn test_read_binary_content() {
        let mut buf = b"00000004".to_vec();
        buf.extend_from_slice(&[0x00, 0xFF, 0xC3, 0x28]);
        let (field, _) = read_field(&buf, 0).unwrap();
        assert_eq!(field, &[0x00, 0xFF, 0xC3, 0x28]);
    }

    #[test]
    fn test_read_declared_size_exceeds_remaining() {
        // 0xFF declared, only 10 bytes follow the header.
        let buf = b"000000FF0123456789";
        let err = read_field(buf, 0).unwrap_err();
        assert!(matches!(err, WorkerError::MalformedFrame(_)));
        assert!(err.to_string().contains("declares 255 bytes, only 10 remain"));
    }

    #[test]
    fn test_read_off_by_one_truncation() {
        let buf = b"00000004tes";
        assert!(matches!(
            read_field(buf, 0),
            Err(WorkerError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_read_short_header() {
        let err = read_field(b"0000", 0).unwrap_err();
        assert!(err.to_string().contains("field at offset 0"));
    }

    #[test]
    fn test_read_cursor_past_end() {
        assert!(matches!(
            read_field(b"00000000", 9),
            Err(WorkerError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_reader_sequence() {
        let buf = b"00000001a00000002bc00000000";
        let mut reader = FieldReader::new(buf);

        assert_eq!(reader.next_field().unwrap(), b"a");
        assert_eq!(reader.position(), 9);
        assert_eq!(reader.next_field().unwrap(), b"bc");
        assert!(!reader.is_exhausted());
        assert_eq!(reader.next_field().unwrap(), b"");
        assert!(reader.is_exhausted());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_cursor_unchanged_on_error() {
        let buf = b"00000001a000000FFxyz";
        let mut reader = FieldReader::new(buf);
        reader.next_field().unwrap();
        let before = reader.position();
        assert!(reader.next_field().is_err());
        assert_eq!(reader.position(), before);
    }

    #[test]
    fn test_write_field() {
        let mut out = Vec::new();
        write_field(&mut out, b"test").unwrap();
        write_field(&mut out, b"abc").unwrap();
        assert_eq!(out, b"00000004test00000003abc");
    }

    #[test]
    fn test_write_then_read() {
        let content: Vec<u8> = (0..=255).collect();
        let mut out = Vec::new();
        write_field(&mut out, &content).unwrap();
        assert_eq!(&out[..SIZE_WIDTH], b"00000100");

        let (field, next) = read_field(&out, 0).unwrap();
        assert_eq!(field, &content[..]);
        assert_eq!(next, out.len());
    }
}
