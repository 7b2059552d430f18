//! Transaction submitter: from a built call to a committed transaction hash.
//!
//! [`TransactionSubmitter::submit`] runs three steps, each of which can fail
//! with its own [`SubmitError`] variant:
//!
//! 1. **Sign.** Fetch the chain id and the sender's current sequence number,
//!    wrap the call in a [`RawTransaction`], and sign it. Failures here mean
//!    nothing was sent ([`SubmitError::NotSent`]).
//! 2. **Transmit.** Post the BCS body. A 4xx answer is a confirmed
//!    rejection; anything else that is not a hash leaves the outcome
//!    unknown, because the ledger may have taken the payload anyway.
//! 3. **Await finality.** Poll the hash until the ledger reports it
//!    committed or aborted, bounded by the finality timeout.
//!
//! There is no resubmission at any step. The [`SignedTransaction`] is moved
//! into the transmit step and dropped there, so a retry always goes through
//! a fresh sign with a freshly fetched sequence number.

use std::sync::Arc;
use std::time::Duration;

use securepool::{sign_transaction, EntryFunctionCall, RawTransaction, SignedTransaction, TransactionOptions};
use securepool_agent_core::Identity;
use securepool_ledger_api::TransactionStatus;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{LedgerError, SubmitError};
use crate::ledger::LedgerClient;

/// Timing and gas settings for [`TransactionSubmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub transaction: TransactionOptions,
    pub poll_interval: Duration,
    pub finality_timeout: Duration,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for SubmitOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            transaction: config.transaction,
            poll_interval: config.poll_interval,
            finality_timeout: config.finality_timeout,
        }
    }
}

/// Submits calls to one ledger.
pub struct TransactionSubmitter {
    ledger: Arc<dyn LedgerClient>,
    options: SubmitOptions,
}

impl TransactionSubmitter {
    pub fn new(ledger: Arc<dyn LedgerClient>, options: SubmitOptions) -> Self {
        Self { ledger, options }
    }

    /// Sign `call` as `identity`, send it, and wait for a terminal status.
    ///
    /// Returns the transaction hash once the ledger reports the transaction
    /// committed. Never returns while the transaction is still pending.
    pub async fn submit(
        &self,
        identity: &Identity,
        call: &EntryFunctionCall,
    ) -> Result<String, SubmitError> {
        let signed = self.sign(identity, call).await?;
        let hash = self.transmit(signed).await?;
        self.await_finality(&hash).await?;
        Ok(hash)
    }

    /// Step 1: bind the call to the identity's next sequence number.
    async fn sign(
        &self,
        identity: &Identity,
        call: &EntryFunctionCall,
    ) -> Result<SignedTransaction, SubmitError> {
        let sender = identity.address();
        let chain_id = self.ledger.chain_id().await.map_err(SubmitError::NotSent)?;
        let sequence_number = self
            .ledger
            .sequence_number(&sender)
            .await
            .map_err(SubmitError::NotSent)?;

        let raw = RawTransaction::entry_function(
            sender,
            sequence_number,
            call,
            &self.options.transaction,
            chain_id,
        )?;
        debug!("submitter: signing {call} for {sender} at sequence {sequence_number}");
        Ok(sign_transaction(raw, identity)?)
    }

    /// Step 2: post the signed body. Consumes the signed transaction.
    async fn transmit(&self, signed: SignedTransaction) -> Result<String, SubmitError> {
        let body = signed.to_bcs_bytes()?;
        match self.ledger.submit_transaction(body).await {
            Ok(pending) => {
                info!("submitter: transaction {} accepted", pending.hash);
                Ok(pending.hash)
            }
            Err(LedgerError::Api {
                status,
                error_code,
                message,
                ..
            }) if (400..500).contains(&status) => {
                warn!("submitter: transaction rejected ({status} {error_code}): {message}");
                Err(SubmitError::Rejected {
                    error_code,
                    message,
                })
            }
            Err(e) => {
                warn!("submitter: transmit failed, outcome unknown: {e}");
                Err(SubmitError::Network {
                    hash: None,
                    source: e,
                })
            }
        }
    }

    /// Step 3: poll `hash` until committed or aborted, within the finality
    /// timeout.
    ///
    /// A transport error while polling ends the wait immediately with
    /// [`SubmitError::Network`]; it is not retried.
    pub async fn await_finality(&self, hash: &str) -> Result<(), SubmitError> {
        let timeout = self.options.finality_timeout;
        match tokio::time::timeout(timeout, self.poll_until_terminal(hash)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("submitter: {hash} not final after {timeout:?}");
                Err(SubmitError::Timeout {
                    hash: hash.to_string(),
                    timeout,
                })
            }
        }
    }

    async fn poll_until_terminal(&self, hash: &str) -> Result<(), SubmitError> {
        loop {
            let status = self
                .ledger
                .transaction_by_hash(hash)
                .await
                .map_err(|source| SubmitError::Network {
                    hash: Some(hash.to_string()),
                    source,
                })?
                .map(|info| info.status())
                .unwrap_or(TransactionStatus::Pending);

            match status {
                TransactionStatus::Committed { version } => {
                    info!(
                        "submitter: {hash} committed at version {}",
                        version.as_deref().unwrap_or("?")
                    );
                    return Ok(());
                }
                TransactionStatus::Aborted { vm_status } => {
                    warn!("submitter: {hash} aborted: {vm_status}");
                    return Err(SubmitError::Aborted {
                        hash: hash.to_string(),
                        vm_status,
                    });
                }
                TransactionStatus::Pending => {
                    tokio::time::sleep(self.options.poll_interval).await;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{PollStep, ScriptedLedger, SubmitStep};
    use securepool::{protocol, TransactionBuilder, TypedArg};

    fn fast() -> SubmitOptions {
        SubmitOptions {
            transaction: TransactionOptions::default(),
            poll_interval: Duration::from_millis(5),
            finality_timeout: Duration::from_millis(200),
        }
    }

    fn setup() -> (Arc<ScriptedLedger>, TransactionSubmitter) {
        let ledger = Arc::new(ScriptedLedger::new());
        let submitter = TransactionSubmitter::new(ledger.clone(), fast());
        (ledger, submitter)
    }

    fn join_call(pool: i128) -> EntryFunctionCall {
        TransactionBuilder::new(protocol::default_module())
            .unwrap()
            .build(protocol::JOIN_POOL, &[TypedArg::u64(pool)])
            .unwrap()
    }

    #[tokio::test]
    async fn commits_after_pending_polls() {
        let (ledger, submitter) = setup();
        ledger.push_poll(PollStep::Unknown);
        ledger.push_poll(PollStep::Pending);
        ledger.push_poll(PollStep::Commit);

        let id = Identity::generate().unwrap();
        let hash = submitter.submit(&id, &join_call(1)).await.unwrap();

        assert_eq!(
            ledger.requests(),
            vec!["chain_id", "sequence_number", "submit", "status", "status", "status"]
        );
        let submitted = ledger.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, id.address());
        assert_eq!(submitted[0].2, hash);
    }

    #[tokio::test]
    async fn abort_is_confirmed_rejection() {
        let (ledger, submitter) = setup();
        ledger.push_poll(PollStep::Abort("Move abort: E_POOL_NOT_FOUND".into()));

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(99)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Aborted { .. }));
        assert_eq!(err.kind(), ErrorKind::RemoteRejection);
        assert!(!err.is_unknown_outcome());
    }

    #[tokio::test]
    async fn submit_4xx_is_rejection_without_polling() {
        let (ledger, submitter) = setup();
        ledger.push_submit(SubmitStep::Reject("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE".into()));

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(1)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected { .. }));
        assert!(!ledger.requests().contains(&"status"));
    }

    #[tokio::test]
    async fn transport_failure_on_submit_is_unknown_outcome() {
        let (ledger, submitter) = setup();
        ledger.push_submit(SubmitStep::Fail(LedgerError::Transport("reset".into())));

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(1)).await.unwrap_err();
        assert!(err.is_unknown_outcome());
        assert_eq!(err.hash(), None);
    }

    #[tokio::test]
    async fn server_error_on_submit_is_unknown_outcome() {
        let (ledger, submitter) = setup();
        ledger.push_submit(SubmitStep::Fail(LedgerError::Api {
            status: 503,
            error_code: "internal_error".into(),
            message: "overloaded".into(),
            vm_error_code: None,
        }));

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(1)).await.unwrap_err();
        assert!(err.is_unknown_outcome());
    }

    #[tokio::test]
    async fn network_error_while_polling_is_unknown_outcome() {
        let (ledger, submitter) = setup();
        ledger.push_poll(PollStep::Pending);
        ledger.push_poll(PollStep::Fail(LedgerError::Transport("timed out".into())));

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(1)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Network { hash: Some(_), .. }));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_unknown_outcome());
        // The poll failure is reported, never retried.
        assert_eq!(ledger.requests().iter().filter(|r| **r == "status").count(), 2);
        assert_eq!(ledger.submitted().len(), 1);
    }

    #[tokio::test]
    async fn never_final_times_out() {
        let (ledger, submitter) = setup();
        for _ in 0..1000 {
            ledger.push_poll(PollStep::Pending);
        }

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(1)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Timeout { .. }));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_unknown_outcome());
        assert_eq!(ledger.submitted().len(), 1);
    }

    #[tokio::test]
    async fn prepare_failure_sends_nothing() {
        let (ledger, submitter) = setup();
        ledger.fail_prepare(LedgerError::Transport("dns".into()));

        let id = Identity::generate().unwrap();
        let err = submitter.submit(&id, &join_call(1)).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotSent(_)));
        assert!(!err.is_unknown_outcome());
        assert!(ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn each_submit_uses_fresh_sequence_number() {
        let (ledger, submitter) = setup();
        let id = Identity::generate().unwrap();

        submitter.submit(&id, &join_call(1)).await.unwrap();
        submitter.submit(&id, &join_call(2)).await.unwrap();

        let submitted = ledger.submitted();
        assert_eq!(submitted[0].1, 0);
        assert_eq!(submitted[1].1, 1);
        assert_ne!(submitted[0].2, submitted[1].2);
    }
}
