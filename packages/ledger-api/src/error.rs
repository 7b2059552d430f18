//! Standard error response body.

use serde::{Deserialize, Serialize};

/// The JSON body returned for all ledger error responses.
///
/// ```json
/// { "message": "Account not found by Address(0x…)", "error_code": "account_not_found", "vm_error_code": null }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub message: String,

    /// Machine-readable error code; see [`codes`].
    pub error_code: String,

    /// Move VM status code when the error came from transaction validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_error_code: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: error_code.into(),
            vm_error_code: None,
        }
    }
}

/// Error codes the client distinguishes.
pub mod codes {
    pub const ACCOUNT_NOT_FOUND: &str = "account_not_found";
    pub const TRANSACTION_NOT_FOUND: &str = "transaction_not_found";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const VM_ERROR: &str = "vm_error";
    pub const MEMPOOL_IS_FULL: &str = "mempool_is_full";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_error_code_optional() {
        let json = r#"{"message":"bad","error_code":"vm_error"}"#;
        let e: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(e, ErrorResponse::new(codes::VM_ERROR, "bad"));
    }
}
