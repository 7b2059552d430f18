//! Core data types for SecurePool entry-function calls.
//!
//! A call to the on-chain insurance module is an [`EntryFunctionCall`]: the
//! module it targets, the function name, and an ordered list of
//! [`MoveValue`] arguments. Callers describe arguments as [`TypedArg`]s, a
//! wire type plus a loosely typed value, and the builder turns them into
//! `MoveValue`s once it has checked that each value fits its declared type.

use std::fmt;

use securepool_agent_core::AccountAddress;
use serde::{Deserialize, Serialize};

use crate::encoding::EncodingError;

/// The serialization tag of an entry-function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    /// UTF-8 string, BCS-encoded as ULEB128 length + bytes.
    String,
    /// Unsigned 64-bit integer, 8 bytes little-endian.
    U64,
    /// Boolean, one byte.
    Bool,
}

/// Formats the wire type as its Move type name (e.g. `"u64"`).
impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::String => write!(f, "string"),
            WireType::U64 => write!(f, "u64"),
            WireType::Bool => write!(f, "bool"),
        }
    }
}

/// An argument value as it arrives from the caller, before range checks.
///
/// Integers are carried as `i128` so that negative and oversized inputs
/// survive until the encoder can reject them with a precise error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i128),
    Bool(bool),
}

/// A caller-supplied argument: the wire type the remote function expects,
/// and the value to encode as that type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedArg {
    pub wire_type: WireType,
    pub value: ArgValue,
}

impl TypedArg {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            wire_type: WireType::String,
            value: ArgValue::Str(value.into()),
        }
    }

    pub fn u64(value: impl Into<i128>) -> Self {
        Self {
            wire_type: WireType::U64,
            value: ArgValue::Int(value.into()),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            wire_type: WireType::Bool,
            value: ArgValue::Bool(value),
        }
    }

    /// Check the value against the declared wire type and produce the
    /// strictly typed [`MoveValue`].
    pub fn to_move_value(&self) -> Result<MoveValue, EncodingError> {
        match (self.wire_type, &self.value) {
            (WireType::String, ArgValue::Str(s)) => Ok(MoveValue::String(s.clone())),
            (WireType::Bool, ArgValue::Bool(b)) => Ok(MoveValue::Bool(*b)),
            (WireType::U64, ArgValue::Int(n)) => u64::try_from(*n)
                .map(MoveValue::U64)
                .map_err(|_| EncodingError::OutOfRange {
                    wire_type: WireType::U64,
                    value: n.to_string(),
                }),
            (wire_type, value) => Err(EncodingError::TypeMismatch {
                wire_type,
                value: format!("{value:?}"),
            }),
        }
    }
}

/// A strictly typed entry-function argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveValue {
    String(String),
    U64(u64),
    Bool(bool),
}

impl MoveValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            MoveValue::String(_) => WireType::String,
            MoveValue::U64(_) => WireType::U64,
            MoveValue::Bool(_) => WireType::Bool,
        }
    }
}

impl fmt::Display for MoveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveValue::String(s) => write!(f, "{s:?}"),
            MoveValue::U64(n) => write!(f, "{n}u64"),
            MoveValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A published module: `<address>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: String,
}

impl ModuleId {
    pub fn new(address: AccountAddress, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address, self.name)
    }
}

/// A built, unsigned call to an entry function.
///
/// Immutable once constructed; fields are only readable. Type arguments are
/// always empty because none of the insurance functions are generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFunctionCall {
    pub(crate) module: ModuleId,
    pub(crate) function: String,
    pub(crate) args: Vec<MoveValue>,
}

impl EntryFunctionCall {
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[MoveValue] {
        &self.args
    }

    /// The wire types of the arguments, in order.
    pub fn signature(&self) -> Vec<WireType> {
        self.args.iter().map(MoveValue::wire_type).collect()
    }
}

impl fmt::Display for EntryFunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.module, self.function)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_arg_u64_in_range() {
        assert_eq!(TypedArg::u64(50).to_move_value(), Ok(MoveValue::U64(50)));
        assert_eq!(
            TypedArg::u64(u64::MAX as i128).to_move_value(),
            Ok(MoveValue::U64(u64::MAX))
        );
    }

    #[test]
    fn typed_arg_u64_out_of_range() {
        let too_big = TypedArg::u64(u64::MAX as i128 + 1).to_move_value();
        assert!(matches!(
            too_big,
            Err(EncodingError::OutOfRange {
                wire_type: WireType::U64,
                ..
            })
        ));
        assert!(TypedArg::u64(-1).to_move_value().is_err());
    }

    #[test]
    fn typed_arg_mismatch() {
        let arg = TypedArg {
            wire_type: WireType::Bool,
            value: ArgValue::Str("yes".into()),
        };
        assert!(matches!(
            arg.to_move_value(),
            Err(EncodingError::TypeMismatch {
                wire_type: WireType::Bool,
                ..
            })
        ));
    }

    #[test]
    fn wire_type_display() {
        assert_eq!(WireType::String.to_string(), "string");
        assert_eq!(WireType::U64.to_string(), "u64");
        assert_eq!(WireType::Bool.to_string(), "bool");
    }

    #[test]
    fn module_id_display() {
        let m = ModuleId::new(AccountAddress::parse("0x1").unwrap(), "MicroInsurance");
        assert!(m.to_string().ends_with("01::MicroInsurance"));
    }
}
