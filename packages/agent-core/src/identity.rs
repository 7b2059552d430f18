//! Session identity — an Ed25519 keypair and its derived account address.
//!
//! An [`Identity`] is generated locally from OS randomness and is never
//! persisted: it lives only as long as the [`Session`] that holds it. There is
//! deliberately no `seed()` accessor and the [`Debug`] impl prints only the
//! address, so key material cannot leak through logs.
//!
//! [`Session`]: crate::session::Session

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::address::AccountAddress;

/// Errors returned by [`Identity::generate`].
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

/// A signing identity: Ed25519 key plus the account address derived from it.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl Identity {
    /// Generate a fresh identity using OS randomness.
    ///
    /// Fails only if the OS entropy source fails. No partially built value
    /// is ever returned.
    pub fn generate() -> Result<Self, IdentityError> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| IdentityError::Entropy(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Build an identity from a known 32-byte seed. Intended for tests and
    /// fixtures; sessions always use [`generate`](Self::generate).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address =
            AccountAddress::from_ed25519_public_key(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// The account address, e.g. `0x9f1c…`.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// The raw 32-byte Ed25519 public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign `message`, returning the raw 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    #[test]
    fn generated_identities_differ() {
        let a = Identity::generate().unwrap();
        let b = Identity::generate().unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn address_stable_from_seed() {
        let a = Identity::from_seed(&[42u8; 32]);
        let b = Identity::from_seed(&[42u8; 32]);
        assert_eq!(a.address(), b.address());
        assert_eq!(
            a.address(),
            AccountAddress::from_ed25519_public_key(&a.public_key())
        );
    }

    #[test]
    fn signature_verifies_with_public_key() {
        let id = Identity::generate().unwrap();
        let sig = id.sign(b"securepool");
        let vk = VerifyingKey::from_bytes(&id.public_key()).unwrap();
        vk.verify(b"securepool", &Signature::from_bytes(&sig))
            .expect("signature should verify");
    }

    #[test]
    fn debug_hides_key_material() {
        let id = Identity::from_seed(&[1u8; 32]);
        let dbg = format!("{id:?}");
        assert!(dbg.contains(&id.address().to_hex()));
        assert!(!dbg.contains("signing_key"));
    }
}
