//! SecurePool client: the submission pipeline and the caller-facing actions.
//!
//! # Layers
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | [`ClientConfig`] from `SPOOL_*` environment variables |
//! | [`ledger`] | [`LedgerClient`] trait and the REST implementation |
//! | [`faucet`] | Test-network account funding |
//! | [`submitter`] | [`TransactionSubmitter`]: sign, transmit, await finality |
//! | [`actions`] | [`InsuranceActions`]: the five operations, returning [`ActionOutcome`] |
//! | [`blocking`] | [`BlockingActions`]: one-at-a-time synchronous adapter |
//! | [`error`] | Per-layer errors and the [`ErrorKind`] classification |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use securepool_agent_core::Session;
//! use securepool_client::{BlockingActions, ClientConfig, InsuranceActions};
//!
//! let config = ClientConfig::from_env()?;
//! let actions = InsuranceActions::from_config(Arc::new(Session::new()), &config)?;
//! let actions = BlockingActions::new(actions)?;
//!
//! actions.create_identity();
//! let outcome = actions.create_pool("Auto", 100, 1000);
//! if !outcome.success {
//!     eprintln!("{}", outcome.reason.unwrap_or_default());
//! }
//! ```

pub mod actions;
pub mod blocking;
pub mod config;
pub mod error;
pub mod faucet;
pub mod ledger;
pub mod submitter;

#[cfg(test)]
mod testing;

pub use actions::{ActionOutcome, InsuranceActions};
pub use blocking::BlockingActions;
pub use config::{ClientConfig, ConfigError};
pub use error::{ActionError, ErrorKind, LedgerError, PreconditionError, SubmitError};
pub use faucet::Faucet;
pub use ledger::{LedgerClient, RestLedgerClient};
pub use submitter::{SubmitOptions, TransactionSubmitter};
