//! Session state — the single active [`Identity`] for one user session.
//!
//! A [`Session`] is created when the caller starts up and dropped when the
//! caller exits; the identity it holds goes with it. It is passed explicitly
//! (usually as `Arc<Session>`) to everything that needs to sign, rather than
//! living in a global.
//!
//! # Access discipline
//!
//! ```text
//! writer:  create_identity()   — full replace under the write lock
//! readers: identity()          — clone of the current Arc, never a torn value
//! ```
//!
//! Key generation happens *before* the write lock is taken, so a failed
//! generation leaves the previous identity (or none) in place.

use std::sync::{Arc, RwLock};

use crate::identity::{Identity, IdentityError};

/// Holds at most one active [`Identity`].
#[derive(Debug, Default)]
pub struct Session {
    active: RwLock<Option<Arc<Identity>>>,
}

impl Session {
    /// A session with no identity yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh identity and make it the session's only identity,
    /// replacing any previous one.
    pub fn create_identity(&self) -> Result<Arc<Identity>, IdentityError> {
        let identity = Arc::new(Identity::generate()?);
        self.install(Arc::clone(&identity));
        Ok(identity)
    }

    /// Replace the active identity with `identity`.
    pub fn install(&self, identity: Arc<Identity>) {
        let mut guard = self.active.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(identity);
    }

    /// The active identity, if one has been created.
    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_identity() {
        let s = Session::new();
        assert!(s.identity().is_none());
    }

    #[test]
    fn create_then_read_is_stable() {
        let s = Session::new();
        let created = s.create_identity().unwrap();
        let first = s.identity().unwrap().address();
        let second = s.identity().unwrap().address();
        assert_eq!(first, created.address());
        assert_eq!(first, second);
    }

    #[test]
    fn create_replaces_previous_identity() {
        let s = Session::new();
        let old = s.create_identity().unwrap().address();
        let new = s.create_identity().unwrap().address();
        assert_ne!(old, new);
        assert_eq!(s.identity().unwrap().address(), new);
    }

    #[test]
    fn install_replaces_wholesale() {
        let s = Session::new();
        s.install(Arc::new(Identity::from_seed(&[3u8; 32])));
        assert_eq!(
            s.identity().unwrap().address(),
            Identity::from_seed(&[3u8; 32]).address()
        );
    }
}
