//! Wire-format transaction structures.
//!
//! These mirror the ledger's BCS layout field for field; the order of struct
//! fields and enum variants is part of the format and must not change.
//!
//! ```text
//! SignedTransaction
//! ├── RawTransaction
//! │   ├── sender: AccountAddress            (32 bytes)
//! │   ├── sequence_number: u64
//! │   ├── payload: TransactionPayload       (variant 2 = EntryFunction)
//! │   ├── max_gas_amount: u64
//! │   ├── gas_unit_price: u64
//! │   ├── expiration_timestamp_secs: u64
//! │   └── chain_id: u8
//! └── TransactionAuthenticator              (variant 0 = Ed25519)
//! ```

use chrono::Utc;
use securepool_agent_core::AccountAddress;
use serde::{Deserialize, Serialize};

use crate::encoding::{decode_arg, encode_args, EncodingError};
use crate::types::{EntryFunctionCall, ModuleId, MoveValue, WireType};

/// Placeholder for payload and type-argument shapes this client never
/// produces. It has no values, so decoding one always fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unsupported {}

/// The BCS form of an entry-function call: arguments are pre-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunction {
    pub module: ModuleId,
    pub function: String,
    pub ty_args: Vec<Unsupported>,
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// Encode a built call.
    pub fn from_call(call: &EntryFunctionCall) -> Result<Self, EncodingError> {
        Ok(Self {
            module: call.module().clone(),
            function: call.function().to_string(),
            ty_args: Vec::new(),
            args: encode_args(call.args())?,
        })
    }

    /// Decode the arguments given the function's expected signature.
    pub fn decode_args(&self, signature: &[WireType]) -> Result<Vec<MoveValue>, EncodingError> {
        if signature.len() != self.args.len() {
            return Err(EncodingError::TypeMismatch {
                wire_type: signature.first().copied().unwrap_or(WireType::Bool),
                value: format!(
                    "expected {} arguments, found {}",
                    signature.len(),
                    self.args.len()
                ),
            });
        }
        signature
            .iter()
            .zip(&self.args)
            .map(|(ty, bytes)| decode_arg(*ty, bytes))
            .collect()
    }
}

/// What a transaction does. Only entry-function calls are produced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    Script(Unsupported),
    ModuleBundle(Unsupported),
    EntryFunction(EntryFunction),
}

/// Gas and expiry settings applied to every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    /// Seconds from signing time until the ledger must discard the transaction.
    pub expiration_secs: u64,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: 200_000,
            gas_unit_price: 100,
            expiration_secs: 600,
        }
    }
}

/// An unsigned transaction bound to a sender and sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

impl RawTransaction {
    /// Wrap `call` for `sender` at `sequence_number`, expiring
    /// `options.expiration_secs` from now.
    pub fn entry_function(
        sender: AccountAddress,
        sequence_number: u64,
        call: &EntryFunctionCall,
        options: &TransactionOptions,
        chain_id: u8,
    ) -> Result<Self, EncodingError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        Ok(Self {
            sender,
            sequence_number,
            payload: TransactionPayload::EntryFunction(EntryFunction::from_call(call)?),
            max_gas_amount: options.max_gas_amount,
            gas_unit_price: options.gas_unit_price,
            expiration_timestamp_secs: now.saturating_add(options.expiration_secs),
            chain_id,
        })
    }

    /// The entry function this transaction calls.
    pub fn entry_function_payload(&self) -> Option<&EntryFunction> {
        if let TransactionPayload::EntryFunction(f) = &self.payload {
            Some(f)
        } else {
            None
        }
    }
}

/// Proof that the sender authorised a [`RawTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAuthenticator {
    Ed25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
}

/// A raw transaction plus its authenticator, ready to submit once.
///
/// Not `Clone`: transmitting consumes it, so the same signed payload cannot
/// be sent twice by accident.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    /// The BCS body posted to the ledger.
    pub fn to_bcs_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        bcs::to_bytes(self).map_err(|e| EncodingError::Bcs(e.to_string()))
    }

    /// Parse a BCS body, e.g. on the receiving side of a submission.
    pub fn from_bcs_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        bcs::from_bytes(bytes).map_err(|e| EncodingError::Bcs(e.to_string()))
    }

    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
