//! Request and response types for the ledger REST API.
//!
//! Only the endpoints the SecurePool client touches are covered. Unknown
//! fields in responses are ignored, so these types keep working as the
//! ledger adds fields.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/` | → [`LedgerInfo`] |
//! | GET | `/accounts/{address}` | → [`AccountData`] |
//! | POST | `/transactions` | BCS body → [`PendingTransaction`] |
//! | GET | `/transactions/by_hash/{hash}` | → [`TransactionInfo`] |
//! | POST | faucet `/mint?amount=&address=` | → [`FaucetResponse`] |
//!
//! Any non-2xx response carries an [`ErrorResponse`] body.

pub mod account;
pub mod error;
pub mod ledger;
pub mod transaction;
mod u64_string;

pub use account::AccountData;
pub use error::ErrorResponse;
pub use ledger::LedgerInfo;
pub use transaction::{FaucetResponse, PendingTransaction, TransactionInfo, TransactionStatus};

/// Content type of a BCS-encoded signed transaction body.
pub const SIGNED_TRANSACTION_CONTENT_TYPE: &str = "application/x.aptos.signed_transaction+bcs";
