//! Transaction construction for the SecurePool micro-insurance protocol.
//!
//! This crate turns "call `submit_claim` with these arguments" into signed
//! bytes a ledger will accept. It performs no I/O; fetching sequence numbers
//! and submitting belong to `securepool-client`.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | [`WireType`], [`TypedArg`], [`MoveValue`], [`ModuleId`], [`EntryFunctionCall`] |
//! | [`builder`] | [`TransactionBuilder`]: function name + typed args → call |
//! | [`encoding`] | BCS argument encoding and identifier checks |
//! | [`transaction`] | [`RawTransaction`] and [`SignedTransaction`] wire structures |
//! | [`signing`] | Ed25519 signing, verification, and transaction hashing |
//! | [`validation`] | Caller input checks shared by every insurance action |
//! | [`protocol`] | The insurance module's function names and signatures |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use securepool::{protocol, TransactionBuilder, TypedArg};
//!
//! let builder = TransactionBuilder::new(protocol::default_module())?;
//! let call = builder.build(
//!     protocol::SUBMIT_CLAIM,
//!     &[TypedArg::u64(3), TypedArg::u64(50), TypedArg::string("flood")],
//! )?;
//! ```

pub mod builder;
pub mod encoding;
pub mod protocol;
pub mod signing;
pub mod transaction;
pub mod types;
pub mod validation;

pub use builder::TransactionBuilder;
pub use encoding::EncodingError;
pub use signing::{sign_transaction, transaction_hash, verify_signed_transaction, SigningError, VerifyError};
pub use transaction::{RawTransaction, SignedTransaction, TransactionOptions};
pub use types::{ArgValue, EntryFunctionCall, ModuleId, MoveValue, TypedArg, WireType};
pub use validation::ValidationError;
