//! Protocol module - task payload format, field framing, and requests.
//!
//! This module implements the binary task payload:
//! - 8-character hex size header encoding/decoding
//! - Field reader over a byte buffer
//! - Request struct with decode/encode

mod frame;
mod request;
mod wire_format;

pub use frame::{read_field, write_field, FieldReader};
pub use request::Request;
pub use wire_format::{
    decode_size_header, encode_size_header, encode_size_header_into, DEFAULT_MAX_PAYLOAD_SIZE,
    MAX_FIELD_SIZE, SIZE_WIDTH,
};
