//! BCS encoding of entry-function arguments.
//!
//! Entry-function arguments travel as a list of individually BCS-encoded
//! byte vectors. Each wire type has a fixed encoding:
//!
//! | Wire type | Bytes |
//! |---|---|
//! | `string` | ULEB128 length, then UTF-8 |
//! | `u64` | 8 bytes, little-endian |
//! | `bool` | `0x00` or `0x01` |

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::{MoveValue, WireType};

/// Errors raised while turning caller arguments into wire bytes.
#[derive(Debug, Error, PartialEq)]
pub enum EncodingError {
    #[error("value {value} cannot be represented as {wire_type}")]
    OutOfRange { wire_type: WireType, value: String },

    #[error("argument declared as {wire_type} carries an incompatible value: {value}")]
    TypeMismatch { wire_type: WireType, value: String },

    #[error("{0:?} is not a valid Move identifier")]
    InvalidIdentifier(String),

    #[error("BCS serialization failed: {0}")]
    Bcs(String),
}

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex")
});

/// Check that `name` is a valid Move identifier (module or function name).
pub fn validate_identifier(name: &str) -> Result<(), EncodingError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(EncodingError::InvalidIdentifier(name.to_string()))
    }
}

/// BCS-encode a single argument.
pub fn encode_arg(value: &MoveValue) -> Result<Vec<u8>, EncodingError> {
    let bytes = match value {
        MoveValue::String(s) => bcs::to_bytes(s),
        MoveValue::U64(n) => bcs::to_bytes(n),
        MoveValue::Bool(b) => bcs::to_bytes(b),
    };
    bytes.map_err(|e| EncodingError::Bcs(e.to_string()))
}

/// BCS-encode every argument, preserving order.
pub fn encode_args(values: &[MoveValue]) -> Result<Vec<Vec<u8>>, EncodingError> {
    values.iter().map(encode_arg).collect()
}

/// Decode a single argument of a known wire type. Used by ledger fakes and
/// diagnostics to read back what was signed.
pub fn decode_arg(wire_type: WireType, bytes: &[u8]) -> Result<MoveValue, EncodingError> {
    let decoded = match wire_type {
        WireType::String => bcs::from_bytes::<String>(bytes).map(MoveValue::String),
        WireType::U64 => bcs::from_bytes::<u64>(bytes).map(MoveValue::U64),
        WireType::Bool => bcs::from_bytes::<bool>(bytes).map(MoveValue::Bool),
    };
    decoded.map_err(|e| EncodingError::Bcs(e.to_string()))
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u64_is_little_endian() {
        assert_eq!(
            encode_arg(&MoveValue::U64(1000)).unwrap(),
            vec![0xe8, 0x03, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn string_is_length_prefixed() {
        assert_eq!(
            encode_arg(&MoveValue::String("flood".into())).unwrap(),
            vec![5, b'f', b'l', b'o', b'o', b'd']
        );
    }

    #[test]
    fn bool_is_one_byte() {
        assert_eq!(encode_arg(&MoveValue::Bool(true)).unwrap(), vec![1]);
        assert_eq!(encode_arg(&MoveValue::Bool(false)).unwrap(), vec![0]);
    }

    #[test]
    fn decode_reads_back_string() {
        let bytes = encode_arg(&MoveValue::String("Auto".into())).unwrap();
        assert_eq!(
            decode_arg(WireType::String, &bytes).unwrap(),
            MoveValue::String("Auto".into())
        );
    }

    #[test]
    fn decode_rejects_short_u64() {
        assert!(decode_arg(WireType::U64, &[1, 2, 3]).is_err());
    }

    #[test]
    fn identifiers() {
        assert!(validate_identifier("create_pool").is_ok());
        assert!(validate_identifier("MicroInsurance").is_ok());
        assert!(validate_identifier("_x1").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1pool").is_err());
        assert!(validate_identifier("create-pool").is_err());
    }
}
