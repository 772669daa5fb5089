//! Task request: the decoded call description.
//!
//! Layout of a serialized request:
//! ```text
//! <size><method_name> <size><arguments> { <size><dependency id> }*
//! ```
//!
//! # Example
//!
//! ```
//! use armonik_worker::protocol::Request;
//!
//! let request = Request::decode(b"00000004test00000003abc00000002d1").unwrap();
//! assert_eq!(request.method_name(), "test");
//! assert_eq!(request.arguments(), b"abc");
//! assert_eq!(request.data_dependencies(), ["d1"]);
//! ```

use bytes::Bytes;

use super::frame::{write_field, FieldReader};
use super::wire_format::SIZE_WIDTH;
use crate::error::{Result, WorkerError};

/// A decoded task request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method_name: String,
    arguments: Bytes,
    data_dependencies: Vec<String>,
}

impl Request {
    /// Create a request from its parts.
    pub fn new(
        method_name: impl Into<String>,
        arguments: impl Into<Bytes>,
        data_dependencies: Vec<String>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            arguments: arguments.into(),
            data_dependencies,
        }
    }

    /// Decode a request from a task payload.
    ///
    /// Fields are read in fixed order: method name, arguments, then data
    /// dependencies until the buffer is exhausted.
    ///
    /// # Errors
    ///
    /// - `MalformedFrame` on any framing violation, including a buffer
    ///   shorter than the two mandatory fields.
    /// - `InvalidEncoding` if the method name or a dependency id is not UTF-8.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Self::decode_with(payload, Bytes::copy_from_slice)
    }

    /// Decode a request from a shared payload without copying the arguments.
    ///
    /// The returned `arguments` is a slice of `payload`.
    pub fn decode_bytes(payload: &Bytes) -> Result<Self> {
        Self::decode_with(payload, |field| payload.slice_ref(field))
    }

    fn decode_with<'a, F>(payload: &'a [u8], to_bytes: F) -> Result<Self>
    where
        F: FnOnce(&'a [u8]) -> Bytes,
    {
        let mut reader = FieldReader::new(payload);

        let method_name = decode_text(reader.next_field()?, "method name")?;
        let arguments = to_bytes(reader.next_field()?);

        // Each iteration consumes at least SIZE_WIDTH bytes or fails.
        let mut data_dependencies = Vec::with_capacity(reader.remaining() / SIZE_WIDTH);
        while !reader.is_exhausted() {
            let id = decode_text(reader.next_field()?, "data dependency")?;
            data_dependencies.push(id);
        }

        Ok(Self {
            method_name,
            arguments,
            data_dependencies,
        })
    }

    /// Serialize this request into the task payload format.
    ///
    /// Size headers are written in lowercase hex.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        write_field(&mut out, self.method_name.as_bytes())?;
        write_field(&mut out, &self.arguments)?;
        for dd in &self.data_dependencies {
            write_field(&mut out, dd.as_bytes())?;
        }
        Ok(out)
    }

    /// Length of the encoded payload in bytes.
    pub fn encoded_len(&self) -> usize {
        let fields = 2 + self.data_dependencies.len();
        fields * SIZE_WIDTH
            + self.method_name.len()
            + self.arguments.len()
            + self
                .data_dependencies
                .iter()
                .map(String::len)
                .sum::<usize>()
    }

    /// Name of the method to invoke.
    #[inline]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Opaque method arguments.
    #[inline]
    pub fn arguments(&self) -> &[u8] {
        &self.arguments
    }

    /// Arguments as `Bytes` (cheap clone).
    #[inline]
    pub fn arguments_bytes(&self) -> Bytes {
        self.arguments.clone()
    }

    /// Identifiers of the data blobs this task depends on.
    #[inline]
    pub fn data_dependencies(&self) -> &[String] {
        &self.data_dependencies
    }

    /// Split into `(method_name, arguments, data_dependencies)`.
    pub fn into_parts(self) -> (String, Bytes, Vec<String>) {
        (self.method_name, self.arguments, self.data_dependencies)
    }
}

fn decode_text(field: &[u8], what: &str) -> Result<String> {
    std::str::from_utf8(field)
        .map(str::to_owned)
        .map_err(|e| WorkerError::InvalidEncoding(format!("{} is not valid UTF-8: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_method_and_arguments_only() {
        let request = Request::decode(b"00000004test00000003abc").unwrap();

        assert_eq!(request.method_name(), "test");
        assert_eq!(request.arguments(), b"abc");
        assert!(request.data_dependencies().is_empty());
    }

    #[test]
    fn test_decode_with_one_dependency() {
        let request = Request::decode(b"00000004test00000003abc00000002d1").unwrap();
        assert_eq!(request.data_dependencies(), ["d1".to_string()]);
    }

    #[test]
    fn test_decode_multiple_dependencies_in_order() {
        let request =
            Request::decode(b"00000001m0000000000000002d100000002d200000000").unwrap();

        assert_eq!(request.method_name(), "m");
        assert!(request.arguments().is_empty());
        assert_eq!(request.data_dependencies(), ["d1", "d2", ""]);
    }

    #[test]
    fn test_decode_uppercase_headers() {
        let mut payload = b"0000000Aadd_floats00000000".to_vec();
        assert_eq!(
            Request::decode(&payload).unwrap().method_name(),
            "add_floats"
        );
        payload[7] = b'a';
        assert_eq!(
            Request::decode(&payload).unwrap().method_name(),
            "add_floats"
        );
    }

    #[test]
    fn test_decode_binary_arguments_untouched() {
        let mut payload = b"00000003add00000004".to_vec();
        payload.extend_from_slice(&[0xFF, 0x00, 0xFE, 0x80]);

        let request = Request::decode(&payload).unwrap();
        assert_eq!(request.arguments(), &[0xFF, 0x00, 0xFE, 0x80]);
    }

    #[test]
    fn test_decode_multibyte_method_name() {
        let name = "méthode";
        let mut payload = Vec::new();
        write_field(&mut payload, name.as_bytes()).unwrap();
        write_field(&mut payload, b"").unwrap();

        // Header counts bytes, not characters.
        assert_eq!(&payload[..SIZE_WIDTH], b"00000008");
        assert_eq!(Request::decode(&payload).unwrap().method_name(), name);
    }

    #[test]
    fn test_decode_empty_buffer() {
        assert!(matches!(
            Request::decode(b""),
            Err(WorkerError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_missing_arguments_field() {
        assert!(matches!(
            Request::decode(b"00000004test"),
            Err(WorkerError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_declared_size_overshoots() {
        let err = Request::decode(b"000000FF0123456789").unwrap_err();
        assert!(matches!(err, WorkerError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_trailing_garbage_shorter_than_header() {
        let err = Request::decode(b"00000004test00000003abc0000").unwrap_err();
        assert!(matches!(err, WorkerError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_truncated_dependency() {
        let err = Request::decode(b"00000004test00000003abc00000005d1").unwrap_err();
        assert!(matches!(err, WorkerError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_invalid_utf8_method_name() {
        let mut payload = b"00000002".to_vec();
        payload.extend_from_slice(&[0xC3, 0x28]);
        payload.extend_from_slice(b"00000000");

        let err = Request::decode(&payload).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidEncoding(_)));
        assert!(err.to_string().contains("method name"));
    }

    #[test]
    fn test_decode_invalid_utf8_dependency() {
        let mut payload = b"00000004test00000000".to_vec();
        payload.extend_from_slice(b"00000001");
        payload.push(0xFF);

        let err = Request::decode(&payload).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidEncoding(_)));
        assert!(err.to_string().contains("data dependency"));
    }

    #[test]
    fn test_first_error_wins() {
        // Bad UTF-8 in the method name comes before the truncated arguments.
        let mut payload = b"00000001".to_vec();
        payload.push(0xFF);
        payload.extend_from_slice(b"00000009abc");

        assert!(matches!(
            Request::decode(&payload),
            Err(WorkerError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_encode_layout() {
        let request = Request::new("test", &b"abc"[..], vec!["d1".into()]);
        let encoded = request.encode().unwrap();

        assert_eq!(encoded, b"00000004test00000003abc00000002d1");
        assert_eq!(encoded.len(), request.encoded_len());
    }

    #[test]
    fn test_encode_decode() {
        let request = Request::new(
            "add_ints",
            vec![1u8, 0, 0, 0, 2, 0, 0, 0],
            vec!["a".into(), "bb".into()],
        );
        let decoded = Request::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_decode_bytes_zero_copy() {
        let payload = Bytes::from_static(b"00000004test00000003abc");
        let request = Request::decode_bytes(&payload).unwrap();

        assert_eq!(request.arguments(), b"abc");
        assert_eq!(request.arguments().as_ptr(), payload[20..].as_ptr());
    }

    #[test]
    fn test_into_parts() {
        let request = Request::new("echo", Bytes::from_static(b"x"), vec![]);
        let (name, args, deps) = request.into_parts();
        assert_eq!(name, "echo");
        assert_eq!(&args[..], b"x");
        assert!(deps.is_empty());
    }
}
