//! Account resource — `GET /accounts/{address}`.

use serde::{Deserialize, Serialize};

/// The response body for `GET /accounts/{address}`.
///
/// `sequence_number` is the value the *next* transaction from this account
/// must carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountData {
    #[serde(with = "crate::u64_string")]
    pub sequence_number: u64,

    /// `0x`-prefixed hex of the account's current authentication key.
    pub authentication_key: String,
}
