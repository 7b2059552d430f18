//! Ed25519 signing and verification of transactions.
//!
//! The signed message is a domain-separated hash prefix followed by the BCS
//! bytes of the raw transaction:
//!
//! ```text
//! sha3_256("APTOS::RawTransaction") ++ bcs(raw_txn)
//! ```
//!
//! The transaction hash reported by the ledger is computed the same way over
//! the signed transaction, wrapped as the `UserTransaction` variant (index 0)
//! of the ledger's transaction enum.

use ed25519_dalek::Verifier;
use securepool_agent_core::{AccountAddress, Identity};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

use crate::transaction::{RawTransaction, SignedTransaction, TransactionAuthenticator};

const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";
const TRANSACTION_SALT: &[u8] = b"APTOS::Transaction";
const USER_TRANSACTION_VARIANT: u8 = 0;

/// Errors returned by [`sign_transaction`] and [`transaction_hash`].
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("sender {sender} does not match the signing identity {identity}")]
    SenderMismatch {
        sender: AccountAddress,
        identity: AccountAddress,
    },
    #[error("canonical serialization failed: {0}")]
    Serialization(String),
}

/// Errors returned by [`verify_signed_transaction`].
#[derive(Debug, Error, PartialEq)]
pub enum VerifyError {
    #[error("public key is malformed: {0}")]
    InvalidPublicKey(String),
    #[error("public key does not derive the sender address {0}")]
    SenderMismatch(AccountAddress),
    #[error("signature must be exactly 64 bytes")]
    InvalidSignatureLength,
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("canonical serialization failed: {0}")]
    Serialization(String),
}

/// The exact bytes an identity signs for `raw`.
pub fn signing_message(raw: &RawTransaction) -> Result<Vec<u8>, String> {
    let body = bcs::to_bytes(raw).map_err(|e| format!("BCS encoding failed: {e}"))?;
    let mut message = Sha3_256::digest(RAW_TRANSACTION_SALT).to_vec();
    message.extend_from_slice(&body);
    Ok(message)
}

/// Sign `raw` with `identity`.
///
/// # Errors
///
/// Returns [`SigningError::SenderMismatch`] if `raw.sender` is not the
/// identity's address, and [`SigningError::Serialization`] if BCS encoding
/// fails.
pub fn sign_transaction(
    raw: RawTransaction,
    identity: &Identity,
) -> Result<SignedTransaction, SigningError> {
    if raw.sender != identity.address() {
        return Err(SigningError::SenderMismatch {
            sender: raw.sender,
            identity: identity.address(),
        });
    }

    let message = signing_message(&raw).map_err(SigningError::Serialization)?;
    let signature = identity.sign(&message);

    Ok(SignedTransaction {
        raw_txn: raw,
        authenticator: TransactionAuthenticator::Ed25519 {
            public_key: identity.public_key().to_vec(),
            signature: signature.to_vec(),
        },
    })
}

/// Check that `txn` is signed by the key its sender address derives from.
///
/// No network calls; this is what a ledger does before accepting a
/// submission.
pub fn verify_signed_transaction(txn: &SignedTransaction) -> Result<(), VerifyError> {
    let TransactionAuthenticator::Ed25519 {
        public_key,
        signature,
    } = &txn.authenticator;

    let key_bytes: [u8; 32] = public_key
        .as_slice()
        .try_into()
        .map_err(|_| VerifyError::InvalidPublicKey("key must be 32 bytes".into()))?;

    if AccountAddress::from_ed25519_public_key(&key_bytes) != txn.raw_txn.sender {
        return Err(VerifyError::SenderMismatch(txn.raw_txn.sender));
    }

    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;

    let sig_array: [u8; 64] = signature
        .as_slice()
        .try_into()
        .map_err(|_| VerifyError::InvalidSignatureLength)?;
    let signature = ed25519_dalek::Signature::from_bytes(&sig_array);

    let message = signing_message(&txn.raw_txn).map_err(VerifyError::Serialization)?;
    verifying_key
        .verify(&message, &signature)
        .map_err(|_| VerifyError::VerificationFailed)
}

/// The ledger-assigned hash of a signed transaction, as `0x`-prefixed hex.
pub fn transaction_hash(txn: &SignedTransaction) -> Result<String, SigningError> {
    let body = bcs::to_bytes(txn).map_err(|e| SigningError::Serialization(e.to_string()))?;
    let mut hasher = Sha3_256::new();
    hasher.update(Sha3_256::digest(TRANSACTION_SALT));
    hasher.update([USER_TRANSACTION_VARIANT]);
    hasher.update(&body);
    Ok(format!("0x{}", hex::encode(hasher.finalize())))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransactionBuilder;
    use crate::transaction::TransactionOptions;
    use crate::types::{ModuleId, TypedArg};

    fn raw_for(identity: &Identity, sequence_number: u64) -> RawTransaction {
        let call = TransactionBuilder::new(ModuleId::new(
            AccountAddress::parse("0xabc").unwrap(),
            "MicroInsurance",
        ))
        .unwrap()
        .build("join_pool", &[TypedArg::u64(4)])
        .unwrap();
        RawTransaction::entry_function(
            identity.address(),
            sequence_number,
            &call,
            &TransactionOptions::default(),
            2,
        )
        .unwrap()
    }

    #[test]
    fn sign_then_verify_succeeds() {
        let id = Identity::generate().unwrap();
        let signed = sign_transaction(raw_for(&id, 0), &id).expect("signing should succeed");
        verify_signed_transaction(&signed).expect("verification should succeed");
    }

    #[test]
    fn signing_for_another_sender_fails() {
        let id = Identity::generate().unwrap();
        let other = Identity::generate().unwrap();
        let result = sign_transaction(raw_for(&other, 0), &id);
        assert!(matches!(result, Err(SigningError::SenderMismatch { .. })));
    }

    #[test]
    fn tamper_sequence_number_then_verify_fails() {
        let id = Identity::generate().unwrap();
        let mut signed = sign_transaction(raw_for(&id, 0), &id).unwrap();
        signed.raw_txn.sequence_number = 1;
        assert_eq!(
            verify_signed_transaction(&signed),
            Err(VerifyError::VerificationFailed)
        );
    }

    #[test]
    fn swapped_public_key_fails_sender_check() {
        let id = Identity::generate().unwrap();
        let other = Identity::generate().unwrap();
        let mut signed = sign_transaction(raw_for(&id, 0), &id).unwrap();
        let TransactionAuthenticator::Ed25519 { public_key, .. } = &mut signed.authenticator;
        *public_key = other.public_key().to_vec();
        assert!(matches!(
            verify_signed_transaction(&signed),
            Err(VerifyError::SenderMismatch(_))
        ));
    }

    #[test]
    fn survives_bcs_transport() {
        let id = Identity::generate().unwrap();
        let signed = sign_transaction(raw_for(&id, 3), &id).unwrap();
        let bytes = signed.to_bcs_bytes().unwrap();
        let received = SignedTransaction::from_bcs_bytes(&bytes).unwrap();
        assert_eq!(received, signed);
        verify_signed_transaction(&received).unwrap();
    }

    #[test]
    fn hash_differs_per_sequence_number() {
        let id = Identity::from_seed(&[9u8; 32]);
        let a = sign_transaction(raw_for(&id, 0), &id).unwrap();
        let b = sign_transaction(raw_for(&id, 1), &id).unwrap();
        let ha = transaction_hash(&a).unwrap();
        assert!(ha.starts_with("0x") && ha.len() == 66);
        assert_ne!(ha, transaction_hash(&b).unwrap());
    }
}
