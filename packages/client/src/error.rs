//! Error types for every stage of the pipeline, and their classification.
//!
//! Each layer fails with its own error type. Only the action layer turns
//! them into the caller-facing [`ActionOutcome`](crate::ActionOutcome), and it
//! does so through [`ActionError::kind`] and [`ActionError::reason`] so that
//! the distinction between *rejected* and *outcome unknown* survives all the
//! way to the user.

use std::time::Duration;

use securepool::{EncodingError, SigningError, ValidationError};
use securepool_agent_core::IdentityError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// LedgerError
// ---------------------------------------------------------------------------

/// Errors from a single request to the ledger.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    /// The request did not complete (connect, timeout, reset).
    #[error("HTTP error: {0}")]
    Transport(String),

    /// The ledger answered with a non-2xx status.
    #[error("ledger returned status {status} ({error_code}): {message}")]
    Api {
        status: u16,
        error_code: String,
        message: String,
        vm_error_code: Option<u64>,
    },

    /// The ledger answered 2xx but the body was not what was expected.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl LedgerError {
    /// Whether the ledger definitely answered with a client-side (4xx) refusal.
    pub fn is_client_error(&self) -> bool {
        matches!(self, LedgerError::Api { status, .. } if (400..500).contains(status))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LedgerError::Decode(e.to_string())
        } else {
            LedgerError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SubmitError
// ---------------------------------------------------------------------------

/// Errors from [`TransactionSubmitter::submit`](crate::TransactionSubmitter::submit).
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("argument encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    /// Preparing the transaction failed; nothing was sent.
    #[error("could not prepare the transaction, nothing was sent: {0}")]
    NotSent(LedgerError),

    /// The ledger refused the signed transaction outright.
    #[error("ledger rejected the transaction: {message}")]
    Rejected {
        error_code: String,
        message: String,
    },

    /// The transaction was committed but its Move code aborted.
    #[error("transaction {hash} aborted on-chain: {vm_status}")]
    Aborted { hash: String, vm_status: String },

    /// The transaction was sent but the ledger gave no confirmed result.
    #[error("no confirmed result from the ledger after sending{}: {source}", hash_suffix(.hash))]
    Network {
        hash: Option<String>,
        source: LedgerError,
    },

    /// The transaction did not reach a terminal state in time.
    #[error("transaction {hash} was not finalized within {timeout:?}")]
    Timeout { hash: String, timeout: Duration },
}

fn hash_suffix(hash: &Option<String>) -> String {
    hash.as_ref()
        .map(|h| format!(" transaction {h}"))
        .unwrap_or_default()
}

impl SubmitError {
    /// Classify for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::Encoding(_) | SubmitError::Signing(_) => ErrorKind::Encoding,
            SubmitError::NotSent(e) if e.is_client_error() => ErrorKind::RemoteRejection,
            SubmitError::NotSent(_) => ErrorKind::Network,
            SubmitError::Rejected { .. } | SubmitError::Aborted { .. } => {
                ErrorKind::RemoteRejection
            }
            SubmitError::Network { .. } => ErrorKind::Network,
            SubmitError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// `true` when the transaction may or may not have been applied.
    ///
    /// A failure before sending is never an unknown outcome: nothing left
    /// this process.
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(
            self,
            SubmitError::Network { .. } | SubmitError::Timeout { .. }
        )
    }

    /// The transaction hash, when the ledger assigned one before the failure.
    pub fn hash(&self) -> Option<&str> {
        match self {
            SubmitError::Aborted { hash, .. } | SubmitError::Timeout { hash, .. } => Some(hash),
            SubmitError::Network { hash, .. } => hash.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionError
// ---------------------------------------------------------------------------

/// Local checks that failed before anything was built or sent.
#[derive(Debug, Error, PartialEq)]
pub enum PreconditionError {
    #[error("no account in this session; create an account first")]
    NoIdentity,

    #[error("no faucet is configured")]
    NoFaucet,

    #[error("blocking actions cannot run inside an async runtime")]
    InsideRuntime,

    #[error("client could not be set up: {0}")]
    Setup(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Everything an insurance action can fail with.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("could not create account: {0}")]
    Identity(#[from] IdentityError),

    #[error("invalid argument: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The faucet refused or could not be reached. The identity is unaffected.
    #[error("account funding failed: {0}")]
    Faucet(LedgerError),
}

impl From<ValidationError> for ActionError {
    fn from(e: ValidationError) -> Self {
        ActionError::Precondition(PreconditionError::Invalid(e))
    }
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Precondition(_) => ErrorKind::Precondition,
            ActionError::Identity(_) => ErrorKind::Identity,
            ActionError::Encoding(_) => ErrorKind::Encoding,
            ActionError::Submit(e) => e.kind(),
            ActionError::Faucet(e) if e.is_client_error() => ErrorKind::RemoteRejection,
            ActionError::Faucet(_) => ErrorKind::Network,
        }
    }

    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, ActionError::Submit(e) if e.is_unknown_outcome())
    }

    /// A message suitable for showing to the user as-is.
    pub fn reason(&self) -> String {
        match self {
            ActionError::Submit(e) if e.is_unknown_outcome() => format!(
                "Outcome unknown: {e}. The transaction may still be applied; \
                 check its status before trying again."
            ),
            ActionError::Submit(e @ SubmitError::NotSent(_)) => format!("Not submitted: {e}"),
            ActionError::Submit(e @ (SubmitError::Rejected { .. } | SubmitError::Aborted { .. })) => {
                format!("Rejected: {e}")
            }
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// The failure classes a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing local input; fix it and try again.
    Precondition,
    /// The session identity could not be created.
    Identity,
    /// A value did not fit its wire type.
    Encoding,
    /// The ledger refused or aborted the transaction. Confirmed failure.
    RemoteRejection,
    /// Transport failure. After sending, the outcome is unknown.
    Network,
    /// No terminal status in time. The outcome is unknown.
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Precondition => "precondition",
            ErrorKind::Identity => "identity",
            ErrorKind::Encoding => "encoding",
            ErrorKind::RemoteRejection => "remote rejection",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> LedgerError {
        LedgerError::Transport("connection reset".into())
    }

    #[test]
    fn network_after_send_is_unknown_outcome() {
        let e = SubmitError::Network {
            hash: Some("0xab".into()),
            source: transport(),
        };
        assert!(e.is_unknown_outcome());
        assert_eq!(e.kind(), ErrorKind::Network);
        assert_eq!(e.hash(), Some("0xab"));
    }

    #[test]
    fn not_sent_is_not_unknown_outcome() {
        let e = SubmitError::NotSent(transport());
        assert!(!e.is_unknown_outcome());
        assert_eq!(e.kind(), ErrorKind::Network);
    }

    #[test]
    fn not_sent_with_4xx_is_rejection() {
        let e = SubmitError::NotSent(LedgerError::Api {
            status: 400,
            error_code: "invalid_input".into(),
            message: "bad address".into(),
            vm_error_code: None,
        });
        assert_eq!(e.kind(), ErrorKind::RemoteRejection);
    }

    #[test]
    fn rejection_reason_is_not_uncertain() {
        let e = ActionError::from(SubmitError::Rejected {
            error_code: "vm_error".into(),
            message: "INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE".into(),
        });
        assert_eq!(e.kind(), ErrorKind::RemoteRejection);
        assert!(!e.is_unknown_outcome());
        let reason = e.reason();
        assert!(reason.starts_with("Rejected"));
        assert!(reason.contains("INSUFFICIENT_BALANCE"));
    }

    #[test]
    fn timeout_reason_mentions_uncertainty() {
        let e = ActionError::from(SubmitError::Timeout {
            hash: "0xcd".into(),
            timeout: Duration::from_secs(30),
        });
        assert_eq!(e.kind(), ErrorKind::Timeout);
        let reason = e.reason();
        assert!(reason.starts_with("Outcome unknown"));
        assert!(reason.contains("0xcd"));
    }

    #[test]
    fn sub_second_timeout_is_shown_exactly() {
        let e = SubmitError::Timeout {
            hash: "0xcd".into(),
            timeout: Duration::from_millis(200),
        };
        assert!(e.to_string().ends_with("within 200ms"), "{e}");
    }

    #[test]
    fn server_error_after_send_has_no_confirmed_result() {
        let e = SubmitError::Network {
            hash: None,
            source: LedgerError::Api {
                status: 503,
                error_code: "internal_error".into(),
                message: "overloaded".into(),
                vm_error_code: None,
            },
        };
        let msg = e.to_string();
        assert!(msg.starts_with("no confirmed result from the ledger after sending"), "{msg}");
        assert!(msg.contains("overloaded"), "{msg}");
    }

    #[test]
    fn validation_maps_to_precondition() {
        let e = ActionError::from(ValidationError::Empty { field: "name" });
        assert_eq!(e.kind(), ErrorKind::Precondition);
        assert_eq!(e.reason(), "name must not be empty");
    }

    #[test]
    fn faucet_failure_is_not_unknown_outcome() {
        let e = ActionError::Faucet(transport());
        assert_eq!(e.kind(), ErrorKind::Network);
        assert!(!e.is_unknown_outcome());
        assert!(e.reason().starts_with("account funding failed"));
    }
}
