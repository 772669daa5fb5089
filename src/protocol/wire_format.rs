//! Size header encoding and decoding.
//!
//! Every field of a task payload is preceded by an 8-character size header:
//! ```text
//! ┌──────────────────────────┬────────────────┐
//! │ Size header              │ Field content  │
//! │ 8 ASCII hex digits       │ N bytes        │
//! │ zero padded, MSD first   │                │
//! └──────────────────────────┴────────────────┘
//! ```
//!
//! Headers are case-insensitive on decode and written in lowercase.

use crate::error::{Result, WorkerError};

/// Size header width in bytes (fixed, exactly 8).
pub const SIZE_WIDTH: usize = 8;

/// Largest length a size header can express (`16^8 - 1`).
pub const MAX_FIELD_SIZE: u32 = u32::MAX;

/// Default maximum payload size accepted by the processor (1 GB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1_073_741_824;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Value of a single ASCII hex digit.
#[inline]
fn hex_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte - b'0')),
        b'a'..=b'f' => Some(u32::from(byte - b'a' + 10)),
        b'A'..=b'F' => Some(u32::from(byte - b'A' + 10)),
        _ => None,
    }
}

/// Decode a size header from the first `SIZE_WIDTH` bytes of `buf`.
///
/// Only the eight header bytes are inspected; anything after them is ignored.
///
/// # Example
///
/// ```
/// use armonik_worker::protocol::decode_size_header;
///
/// assert_eq!(decode_size_header(b"0000001F").unwrap(), 31);
/// assert_eq!(decode_size_header(b"0000001f").unwrap(), 31);
/// assert!(decode_size_header(b"0000001").is_err());
/// ```
pub fn decode_size_header(buf: &[u8]) -> Result<u32> {
    if buf.len() < SIZE_WIDTH {
        return Err(WorkerError::MalformedFrame(format!(
            "size header needs {} bytes, only {} remain",
            SIZE_WIDTH,
            buf.len()
        )));
    }

    let mut value: u32 = 0;
    for (offset, &byte) in buf[..SIZE_WIDTH].iter().enumerate() {
        let digit = hex_value(byte).ok_or_else(|| {
            WorkerError::MalformedFrame(format!(
                "invalid hex digit 0x{:02x} at header offset {}",
                byte, offset
            ))
        })?;
        // 8 digits of 4 bits never overflow a u32.
        value = (value << 4) | digit;
    }

    Ok(value)
}

/// Encode a field length as an 8-character lowercase hex header.
///
/// # Example
///
/// ```
/// use armonik_worker::protocol::encode_size_header;
///
/// assert_eq!(&encode_size_header(255), b"000000ff");
/// ```
pub fn encode_size_header(size: u32) -> [u8; SIZE_WIDTH] {
    let mut buf = [0u8; SIZE_WIDTH];
    encode_size_header_into(&mut buf, size);
    buf
}

/// Encode a field length into an existing buffer.
///
/// # Panics
///
/// Panics if buffer is smaller than `SIZE_WIDTH` (8 bytes).
pub fn encode_size_header_into(buf: &mut [u8], size: u32) {
    debug_assert!(buf.len() >= SIZE_WIDTH);
    for (i, slot) in buf[..SIZE_WIDTH].iter_mut().enumerate() {
        let shift = 4 * (SIZE_WIDTH - 1 - i);
        *slot = HEX_DIGITS[((size >> shift) & 0xF) as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic_values() {
        assert_eq!(decode_size_header(b"00000000").unwrap(), 0);
        assert_eq!(decode_size_header(b"00000004").unwrap(), 4);
        assert_eq!(decode_size_header(b"000000FF").unwrap(), 255);
        assert_eq!(decode_size_header(b"00010000").unwrap(), 0x10000);
    }

    #[test]
    fn test_decode_max_value() {
        assert_eq!(decode_size_header(b"ffffffff").unwrap(), MAX_FIELD_SIZE);
        assert_eq!(decode_size_header(b"FFFFFFFF").unwrap(), MAX_FIELD_SIZE);
    }

    #[test]
    fn test_decode_case_insensitive() {
        assert_eq!(
            decode_size_header(b"00aBcDeF").unwrap(),
            decode_size_header(b"00ABCDEF").unwrap()
        );
    }

    #[test]
    fn test_decode_digit_order_most_significant_first() {
        assert_eq!(decode_size_header(b"10000000").unwrap(), 0x1000_0000);
        assert_eq!(decode_size_header(b"00000001").unwrap(), 1);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode_size_header(b"00000003abc").unwrap(), 3);
    }

    #[test]
    fn test_decode_too_short() {
        let err = decode_size_header(b"0000001").unwrap_err();
        assert!(matches!(err, WorkerError::MalformedFrame(_)));
        assert!(err.to_string().contains("only 7 remain"));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        for header in [
            &b"0000000g"[..],
            b"+0000001",
            b" 0000001",
            b"0x000001",
            b"-0000001",
            b"0000 001",
        ] {
            let err = decode_size_header(header).unwrap_err();
            assert!(
                matches!(err, WorkerError::MalformedFrame(_)),
                "header {:?} should be rejected",
                header
            );
        }
    }

    #[test]
    fn test_decode_rejects_multibyte_utf8() {
        // "é" is two bytes; the header is judged byte by byte.
        let header = "000000é0".as_bytes();
        assert!(decode_size_header(header).is_err());
    }

    #[test]
    fn test_encode_zero_padded_lowercase() {
        assert_eq!(&encode_size_header(0), b"00000000");
        assert_eq!(&encode_size_header(4), b"00000004");
        assert_eq!(&encode_size_header(0xABCDEF), b"00abcdef");
        assert_eq!(&encode_size_header(u32::MAX), b"ffffffff");
    }

    #[test]
    fn test_encode_into() {
        let mut buf = [b'x'; 10];
        encode_size_header_into(&mut buf, 42);
        assert_eq!(&buf[..SIZE_WIDTH], b"0000002a");
        assert_eq!(&buf[SIZE_WIDTH..], b"xx");
    }

    #[test]
    fn test_encode_decode_agree() {
        for size in [0u32, 1, 15, 16, 255, 4096, 0x7FFF_FFFF, u32::MAX] {
            assert_eq!(decode_size_header(&encode_size_header(size)).unwrap(), size);
        }
    }
}
