//! Scripted [`LedgerClient`] for unit tests.
//!
//! Behaves like a well-formed ledger by default: every submission is
//! accepted and commits on the first poll, and the account's sequence
//! number advances with each accepted transaction. Tests push scripted
//! outcomes to deviate from that, and read back every request made.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use securepool::signing::transaction_hash;
use securepool::SignedTransaction;
use securepool_agent_core::AccountAddress;
use securepool_ledger_api::{PendingTransaction, TransactionInfo};

use crate::error::LedgerError;
use crate::ledger::LedgerClient;

/// What the next `POST /transactions` does.
#[derive(Debug, Clone)]
pub enum SubmitStep {
    Accept,
    Reject(String),
    Fail(LedgerError),
}

/// What the next status poll returns.
#[derive(Debug, Clone)]
pub enum PollStep {
    Pending,
    Unknown,
    Commit,
    Abort(String),
    Fail(LedgerError),
}

#[derive(Default)]
struct State {
    requests: Vec<&'static str>,
    submitted: Vec<SignedTransaction>,
    sequence_number: u64,
    submit_script: VecDeque<SubmitStep>,
    poll_script: VecDeque<PollStep>,
    fail_prepare: Option<LedgerError>,
}

pub struct ScriptedLedger {
    chain_id: u8,
    state: Mutex<State>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self {
            chain_id: 4,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn push_submit(&self, step: SubmitStep) {
        self.state().submit_script.push_back(step);
    }

    pub fn push_poll(&self, step: PollStep) {
        self.state().poll_script.push_back(step);
    }

    /// Move the account's on-ledger sequence number, as another signer of
    /// the same account would.
    pub fn set_sequence_number(&self, n: u64) {
        self.state().sequence_number = n;
    }

    pub fn fail_prepare(&self, error: LedgerError) {
        self.state().fail_prepare = Some(error);
    }

    /// Every request made so far, in order.
    pub fn requests(&self) -> Vec<&'static str> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// `(sender, sequence_number, hash)` of every transaction received,
    /// accepted or not.
    pub fn submitted(&self) -> Vec<(AccountAddress, u64, String)> {
        self.state()
            .submitted
            .iter()
            .map(|t| (t.sender(), t.sequence_number(), transaction_hash(t).unwrap()))
            .collect()
    }

    pub fn last_submitted_function(&self) -> Option<(String, Vec<Vec<u8>>)> {
        self.state().submitted.last().and_then(|t| {
            t.raw_txn
                .entry_function_payload()
                .map(|f| (f.function.clone(), f.args.clone()))
        })
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn chain_id(&self) -> Result<u8, LedgerError> {
        let mut state = self.state();
        state.requests.push("chain_id");
        match state.fail_prepare.clone() {
            Some(e) => Err(e),
            None => Ok(self.chain_id),
        }
    }

    async fn sequence_number(&self, _address: &AccountAddress) -> Result<u64, LedgerError> {
        let mut state = self.state();
        state.requests.push("sequence_number");
        match state.fail_prepare.clone() {
            Some(e) => Err(e),
            None => Ok(state.sequence_number),
        }
    }

    async fn submit_transaction(&self, body: Vec<u8>) -> Result<PendingTransaction, LedgerError> {
        let mut state = self.state();
        state.requests.push("submit");
        let txn = SignedTransaction::from_bcs_bytes(&body)
            .map_err(|e| LedgerError::Decode(e.to_string()))?;
        let hash = transaction_hash(&txn).map_err(|e| LedgerError::Decode(e.to_string()))?;
        state.submitted.push(txn);

        match state.submit_script.pop_front().unwrap_or(SubmitStep::Accept) {
            SubmitStep::Accept => {
                state.sequence_number += 1;
                Ok(PendingTransaction { hash, sender: None })
            }
            SubmitStep::Reject(message) => Err(LedgerError::Api {
                status: 400,
                error_code: "vm_error".into(),
                message,
                vm_error_code: None,
            }),
            SubmitStep::Fail(e) => Err(e),
        }
    }

    async fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionInfo>, LedgerError> {
        let mut state = self.state();
        state.requests.push("status");
        let info = |kind: &str, success: Option<bool>, vm_status: Option<String>| TransactionInfo {
            kind: kind.into(),
            hash: hash.into(),
            version: success.map(|_| "1".into()),
            success,
            vm_status,
        };
        match state.poll_script.pop_front().unwrap_or(PollStep::Commit) {
            PollStep::Pending => Ok(Some(info(TransactionInfo::PENDING, None, None))),
            PollStep::Unknown => Ok(None),
            PollStep::Commit => Ok(Some(info(
                TransactionInfo::USER,
                Some(true),
                Some("Executed successfully".into()),
            ))),
            PollStep::Abort(vm_status) => Ok(Some(info(
                TransactionInfo::USER,
                Some(false),
                Some(vm_status),
            ))),
            PollStep::Fail(e) => Err(e),
        }
    }
}
