//! Pure-logic session identity for SecurePool.
//!
//! This crate has **no I/O**: no networking, no filesystem, no async
//! runtime. It owns the one piece of mutable client state, the session's
//! signing identity, and the address format used to name accounts.
//!
//! | Module | Purpose |
//! |---|---|
//! | [`address`] | [`AccountAddress`] parsing, display, and derivation |
//! | [`identity`] | [`Identity`]: Ed25519 key + derived address |
//! | [`session`] | [`Session`]: single-writer holder of the active identity |

pub mod address;
pub mod identity;
pub mod session;

pub use address::{AccountAddress, AddressError};
pub use identity::{Identity, IdentityError};
pub use session::Session;
