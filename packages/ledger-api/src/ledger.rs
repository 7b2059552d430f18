//! Ledger information — `GET /`.

use serde::{Deserialize, Serialize};

/// The response body for `GET /`.
///
/// ```json
/// { "chain_id": 2, "epoch": "9823", "ledger_version": "6512340713", "ledger_timestamp": "1739887200000000" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerInfo {
    /// Network identifier. Signed transactions must carry the same value.
    pub chain_id: u8,

    /// Latest committed version, as a decimal string.
    #[serde(with = "crate::u64_string")]
    pub ledger_version: u64,

    /// Microseconds since the Unix epoch, as a decimal string.
    #[serde(with = "crate::u64_string")]
    pub ledger_timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_encoded_numbers() {
        let json = r#"{"chain_id":2,"epoch":"1","ledger_version":"42","ledger_timestamp":"1000","node_role":"full_node"}"#;
        let info: LedgerInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.chain_id, 2);
        assert_eq!(info.ledger_version, 42);
    }
}
