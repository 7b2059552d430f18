//! The caller-facing insurance actions.
//!
//! [`InsuranceActions`] is the only place where pipeline errors become an
//! [`ActionOutcome`]. Every action runs the same gate sequence:
//!
//! ```text
//! identity present?  ──no──▶ Precondition (no request made)
//!        │
//! inputs valid?      ──no──▶ Precondition (no request made)
//!        │
//! build call         ──err─▶ Encoding
//!        │
//! submit + finality  ──err─▶ RemoteRejection | Network | Timeout
//!        │
//!     success (tx hash)
//! ```
//!
//! Nothing is retried and no pool or claim state is kept locally; the ledger
//! is the only source of truth.

use std::sync::Arc;

use reqwest::Client;
use securepool::validation::{require_positive, require_text};
use securepool::{protocol, EncodingError, EntryFunctionCall, TransactionBuilder, TypedArg, WireType};
use securepool_agent_core::{Identity, Session};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::{ActionError, ErrorKind, PreconditionError};
use crate::faucet::Faucet;
use crate::ledger::{LedgerClient, RestLedgerClient};
use crate::submitter::{SubmitOptions, TransactionSubmitter};

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// Result of one action, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    /// Why the action failed. `None` on success.
    pub reason: Option<String>,
    /// Failure class. `None` on success.
    pub kind: Option<ErrorKind>,
    /// The transaction may or may not have been applied.
    pub unknown_outcome: bool,
    /// Hash of the committed transaction, or of the transaction whose
    /// outcome is unknown.
    pub tx_hash: Option<String>,
}

impl ActionOutcome {
    pub fn succeeded(tx_hash: Option<String>) -> Self {
        Self {
            success: true,
            reason: None,
            kind: None,
            unknown_outcome: false,
            tx_hash,
        }
    }

    pub fn failed(error: &ActionError) -> Self {
        let tx_hash = match error {
            ActionError::Submit(e) => e.hash().map(str::to_string),
            _ => None,
        };
        Self {
            success: false,
            reason: Some(error.reason()),
            kind: Some(error.kind()),
            unknown_outcome: error.is_unknown_outcome(),
            tx_hash,
        }
    }

    pub fn from_result(result: Result<Option<String>, ActionError>) -> Self {
        match result {
            Ok(hash) => Self::succeeded(hash),
            Err(e) => Self::failed(&e),
        }
    }
}

// ---------------------------------------------------------------------------
// InsuranceActions
// ---------------------------------------------------------------------------

/// The five caller-facing operations, bound to one [`Session`].
pub struct InsuranceActions {
    session: Arc<Session>,
    builder: TransactionBuilder,
    submitter: TransactionSubmitter,
    faucet: Option<Faucet>,
}

impl InsuranceActions {
    pub fn new(
        session: Arc<Session>,
        builder: TransactionBuilder,
        submitter: TransactionSubmitter,
    ) -> Self {
        Self {
            session,
            builder,
            submitter,
            faucet: None,
        }
    }

    pub fn with_faucet(mut self, faucet: Faucet) -> Self {
        self.faucet = Some(faucet);
        self
    }

    /// Wire up the REST ledger, builder, and (if configured) faucet from
    /// `config`.
    pub fn from_config(session: Arc<Session>, config: &ClientConfig) -> Result<Self, ActionError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| PreconditionError::Setup(e.to_string()))?;
        let ledger: Arc<dyn LedgerClient> = Arc::new(RestLedgerClient::new(http.clone(), &config.node_url));
        let builder = TransactionBuilder::new(config.module.clone())?;
        let submitter = TransactionSubmitter::new(ledger, SubmitOptions::from(config));

        let actions = Self::new(session, builder, submitter);
        Ok(match &config.faucet_url {
            Some(url) => actions.with_faucet(Faucet::new(http, url)),
            None => actions,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Generate a new identity and make it the session's active one.
    ///
    /// Purely local. On success the new address is available through
    /// [`Session::identity`].
    pub fn create_identity(&self) -> ActionOutcome {
        match self.session.create_identity() {
            Ok(identity) => {
                info!("actions: created account {}", identity.address());
                ActionOutcome::succeeded(None)
            }
            Err(e) => {
                warn!("actions: account creation failed: {e}");
                ActionOutcome::failed(&ActionError::from(e))
            }
        }
    }

    pub async fn create_pool(&self, name: &str, premium: i128, coverage: i128) -> ActionOutcome {
        self.run(protocol::CREATE_POOL, || self.prepare_create_pool(name, premium, coverage))
            .await
    }

    pub async fn join_pool(&self, pool_id: i128) -> ActionOutcome {
        self.run(protocol::JOIN_POOL, || self.prepare_join_pool(pool_id))
            .await
    }

    pub async fn submit_claim(&self, pool_id: i128, amount: i128, description: &str) -> ActionOutcome {
        self.run(protocol::SUBMIT_CLAIM, || {
            self.prepare_submit_claim(pool_id, amount, description)
        })
        .await
    }

    pub async fn vote_on_claim(&self, claim_id: i128, approve: bool) -> ActionOutcome {
        self.run(protocol::VOTE_ON_CLAIM, || self.prepare_vote_on_claim(claim_id, approve))
            .await
    }

    /// Ask the configured faucet to fund the active identity, and wait for
    /// the funding transactions to finalize.
    ///
    /// A failure here leaves the identity untouched.
    pub async fn fund_account(&self, amount: i128) -> ActionOutcome {
        ActionOutcome::from_result(self.try_fund_account(amount).await)
    }

    async fn try_fund_account(&self, amount: i128) -> Result<Option<String>, ActionError> {
        let identity = self.require_identity()?;
        let faucet = self.faucet.as_ref().ok_or(PreconditionError::NoFaucet)?;
        let amount = require_positive("amount", amount)?;
        let amount = u64::try_from(amount).map_err(|_| EncodingError::OutOfRange {
            wire_type: WireType::U64,
            value: amount.to_string(),
        })?;

        let hashes = faucet
            .fund(&identity.address(), amount)
            .await
            .map_err(ActionError::Faucet)?;
        for hash in &hashes {
            self.submitter.await_finality(hash).await?;
        }
        Ok(hashes.into_iter().last())
    }

    // -----------------------------------------------------------------------
    // Call preparation (validate + build, no I/O)
    // -----------------------------------------------------------------------

    pub fn prepare_create_pool(
        &self,
        name: &str,
        premium: i128,
        coverage: i128,
    ) -> Result<EntryFunctionCall, ActionError> {
        let name = require_text("name", name)?;
        let premium = require_positive("premium", premium)?;
        let coverage = require_positive("coverage", coverage)?;
        Ok(self.builder.build(
            protocol::CREATE_POOL,
            &[
                TypedArg::string(name),
                TypedArg::u64(premium),
                TypedArg::u64(coverage),
            ],
        )?)
    }

    pub fn prepare_join_pool(&self, pool_id: i128) -> Result<EntryFunctionCall, ActionError> {
        let pool_id = require_positive("pool_id", pool_id)?;
        Ok(self
            .builder
            .build(protocol::JOIN_POOL, &[TypedArg::u64(pool_id)])?)
    }

    pub fn prepare_submit_claim(
        &self,
        pool_id: i128,
        amount: i128,
        description: &str,
    ) -> Result<EntryFunctionCall, ActionError> {
        let pool_id = require_positive("pool_id", pool_id)?;
        let amount = require_positive("amount", amount)?;
        let description = require_text("description", description)?;
        Ok(self.builder.build(
            protocol::SUBMIT_CLAIM,
            &[
                TypedArg::u64(pool_id),
                TypedArg::u64(amount),
                TypedArg::string(description),
            ],
        )?)
    }

    pub fn prepare_vote_on_claim(
        &self,
        claim_id: i128,
        approve: bool,
    ) -> Result<EntryFunctionCall, ActionError> {
        let claim_id = require_positive("claim_id", claim_id)?;
        Ok(self.builder.build(
            protocol::VOTE_ON_CLAIM,
            &[TypedArg::u64(claim_id), TypedArg::bool(approve)],
        )?)
    }

    // -----------------------------------------------------------------------
    // Shared pipeline
    // -----------------------------------------------------------------------

    fn require_identity(&self) -> Result<Arc<Identity>, PreconditionError> {
        self.session.identity().ok_or(PreconditionError::NoIdentity)
    }

    async fn run(
        &self,
        function: &str,
        prepare: impl FnOnce() -> Result<EntryFunctionCall, ActionError>,
    ) -> ActionOutcome {
        let result = self.try_run(prepare).await;
        match &result {
            Ok(hash) => info!(
                "actions: {function} committed ({})",
                hash.as_deref().unwrap_or("-")
            ),
            Err(e) => warn!("actions: {function} failed [{}]: {e}", e.kind()),
        }
        ActionOutcome::from_result(result)
    }

    async fn try_run(
        &self,
        prepare: impl FnOnce() -> Result<EntryFunctionCall, ActionError>,
    ) -> Result<Option<String>, ActionError> {
        let identity = self.require_identity()?;
        let call = prepare()?;
        let hash = self.submitter.submit(&identity, &call).await?;
        Ok(Some(hash))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
