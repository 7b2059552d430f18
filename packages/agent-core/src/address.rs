//! Account addresses — 32-byte identifiers rendered as `0x…` hex.
//!
//! An [`AccountAddress`] names both the sender of a transaction and the
//! account that publishes the insurance module. For a single-key Ed25519
//! account the address is derived from the public key:
//!
//! ```text
//! address = sha3_256( public_key_bytes ++ [0x00] )
//! └──────┘            └──────────────┘   └────┘
//!  32 bytes             32 bytes        Ed25519 scheme id
//! ```
//!
//! # Text form
//!
//! The canonical text form is `0x` followed by 64 lowercase hex digits.
//! [`AccountAddress::parse`] also accepts the short form used for special
//! addresses (`0x1`), left-padding with zeroes.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

/// Authentication scheme byte appended to an Ed25519 public key before hashing.
const ED25519_SCHEME: u8 = 0x00;

/// Errors that can occur when parsing an account address string.
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("account address must start with '0x': '{0}'")]
    MissingPrefix(String),

    #[error("account address has no hex digits: '{0}'")]
    Empty(String),

    #[error("account address is longer than 32 bytes: '{0}'")]
    TooLong(String),

    #[error("account address is not valid hex: '{0}'")]
    InvalidHex(String),
}

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    /// Number of bytes in an address.
    pub const LENGTH: usize = 32;

    /// Construct from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the address of a single-key Ed25519 account.
    pub fn from_ed25519_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(public_key);
        hasher.update([ED25519_SCHEME]);
        Self(hasher.finalize().into())
    }

    /// Parse a `0x`-prefixed hex address, long or short form.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

        if digits.is_empty() {
            return Err(AddressError::Empty(s.to_string()));
        }
        if digits.len() > Self::LENGTH * 2 {
            return Err(AddressError::TooLong(s.to_string()));
        }

        // Short forms like `0x1` are left-padded to the full 64 digits.
        let padded = format!("{digits:0>64}");
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|_| AddressError::InvalidHex(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The canonical `0x` + 64 hex digit form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_hex())
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Hex string in human-readable formats (JSON), 32 raw bytes otherwise (BCS).
impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::parse(&s).map_err(de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
