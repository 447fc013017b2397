//! Value Encoding Dispatch
//!
//! Converts arbitrary typed values to and from the opaque byte sequences
//! the tier stores hold. Three encode classes exist:
//!
//! - raw bytes are stored identically (the facade takes [`bytes::Bytes`]
//!   directly and never routes them through a serializer),
//! - strings use a direct UTF-8 transform in both directions; a
//!   string-typed read never invokes the generic decoder, whatever encoded
//!   the bytes,
//! - everything else goes through the self-describing serde_json document
//!   format, which handles opaque unions ([`serde_json::Value`]) and fails
//!   with a decode error when the bytes do not match the requested shape.
//!
//! Callers in the facade contain both failure directions: a failed encode
//! degrades to an empty payload, a failed decode to an absent read.

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Encode a value through the generic structured serializer.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| Error::Encode(e.to_string()))
}

/// Decode bytes into a caller-specified shape.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))
}

/// Encode a string as its UTF-8 bytes, bypassing the generic serializer.
pub fn encode_str(value: &str) -> Bytes {
    Bytes::copy_from_slice(value.as_bytes())
}

/// Decode bytes as UTF-8, bypassing the generic decoder.
pub fn decode_str(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::Decode(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        id: u32,
        name: String,
    }

    #[test]
    fn test_struct_round_trip() {
        let value = Payload {
            id: 7,
            name: "seven".to_string(),
        };
        let bytes = encode(&value).unwrap();
        let back: Payload = decode(&bytes).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_opaque_union_round_trip() {
        // Unknown payloads survive as self-describing documents
        let value = serde_json::json!({"kind": "blob", "nested": [1, 2, 3]});
        let bytes = encode(&value).unwrap();
        let back: serde_json::Value = decode(&bytes).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let bytes = encode(&[1u8, 2, 3]).unwrap();
        let result: Result<Payload> = decode(&bytes);
        assert_matches!(result, Err(Error::Decode(_)));
    }

    #[test]
    fn test_string_path_is_byte_identical() {
        let bytes = encode_str("héllo");
        assert_eq!(bytes.as_ref(), "héllo".as_bytes());
        assert_eq!(decode_str(&bytes).unwrap(), "héllo");
    }

    #[test]
    fn test_string_decode_never_uses_generic_decoder() {
        // A generically encoded string is JSON-quoted; the UTF-8 path must
        // hand those quotes back instead of stripping them.
        let bytes = encode("value").unwrap();
        assert_eq!(decode_str(&bytes).unwrap(), "\"value\"");
    }

    #[test]
    fn test_decode_str_rejects_invalid_utf8() {
        let result = decode_str(&[0xff, 0xfe]);
        assert_matches!(result, Err(Error::Decode(_)));
    }

    #[test]
    fn test_null_encodes() {
        let bytes = encode(&Option::<Payload>::None).unwrap();
        assert_eq!(bytes.as_ref(), b"null");
    }
}
