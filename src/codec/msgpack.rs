//! MsgPack codec for typed method arguments and results.
//!
//! Structs are written as maps (`to_vec_named`) so field order does not have
//! to match between the submitter and the worker.
//!
//! # Example
//!
//! ```
//! use armonik_worker::codec::MsgPackCodec;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct AddInts {
//!     a: i32,
//!     b: i32,
//! }
//!
//! let args = AddInts { a: 2, b: 3 };
//! let encoded = MsgPackCodec::encode(&args).unwrap();
//! let decoded: AddInts = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, args);
//! ```

use crate::error::Result;

/// MessagePack codec for structured data.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (structs as maps).
    ///
    /// # Errors
    ///
    /// Returns `MsgPackEncode` if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns `MsgPackDecode` if the bytes cannot be deserialized to `T`.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
