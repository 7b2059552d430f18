//! Transaction submission and lookup types.

use serde::{Deserialize, Serialize};

/// The `202 Accepted` body for `POST /transactions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingTransaction {
    /// `0x`-prefixed transaction hash; the handle used for all later lookups.
    pub hash: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

/// The response body for `GET /transactions/by_hash/{hash}`.
///
/// The ledger returns one of several shapes distinguished by `type`. A
/// `pending_transaction` has no outcome yet; every other type has been
/// committed and carries `success` and `vm_status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionInfo {
    #[serde(rename = "type")]
    pub kind: String,

    pub hash: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_status: Option<String>,
}

impl TransactionInfo {
    pub const PENDING: &'static str = "pending_transaction";
    pub const USER: &'static str = "user_transaction";

    /// Classify into the three states a caller cares about.
    pub fn status(&self) -> TransactionStatus {
        if self.kind == Self::PENDING {
            return TransactionStatus::Pending;
        }
        match self.success {
            Some(true) => TransactionStatus::Committed {
                version: self.version.clone(),
            },
            Some(false) => TransactionStatus::Aborted {
                vm_status: self
                    .vm_status
                    .clone()
                    .unwrap_or_else(|| "unknown VM status".into()),
            },
            // Committed shape without an outcome field: nothing to decide yet.
            None => TransactionStatus::Pending,
        }
    }
}

/// Where a submitted transaction stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepted but not yet executed (or not yet visible to this node).
    Pending,
    /// Executed and committed successfully.
    Committed { version: Option<String> },
    /// Executed and committed, but the Move code aborted.
    Aborted { vm_status: String },
}

/// The faucet's `/mint` response: hashes of the funding transactions.
pub type FaucetResponse = Vec<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_shape() {
        let json = r#"{"type":"pending_transaction","hash":"0xab","sender":"0x1","sequence_number":"0"}"#;
        let t: TransactionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(t.status(), TransactionStatus::Pending);
    }

    #[test]
    fn committed_success() {
        let json = r#"{"type":"user_transaction","hash":"0xab","version":"12","success":true,"vm_status":"Executed successfully"}"#;
        let t: TransactionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(
            t.status(),
            TransactionStatus::Committed {
                version: Some("12".into())
            }
        );
    }

    #[test]
    fn committed_abort() {
        let json = r#"{"type":"user_transaction","hash":"0xab","version":"12","success":false,"vm_status":"Move abort in 0x1c6d::MicroInsurance: E_POOL_NOT_FOUND(0x1)"}"#;
        let t: TransactionInfo = serde_json::from_str(json).unwrap();
        match t.status() {
            TransactionStatus::Aborted { vm_status } => {
                assert!(vm_status.contains("E_POOL_NOT_FOUND"))
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }
}
