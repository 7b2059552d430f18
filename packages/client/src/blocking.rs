//! Synchronous adapter over [`InsuranceActions`].
//!
//! Callers without an async runtime (the interactive CLI, form handlers)
//! use [`BlockingActions`]. It owns a dedicated current-thread runtime and
//! runs exactly one action to completion per call. A mutex is held for the
//! whole call, so two callers sharing the adapter never have submissions in
//! flight at the same time and sequence numbers are consumed in order.

use std::io;
use std::sync::{Arc, Mutex};

use securepool_agent_core::Session;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::warn;

use crate::actions::{ActionOutcome, InsuranceActions};
use crate::error::{ActionError, PreconditionError};

pub struct BlockingActions {
    actions: InsuranceActions,
    runtime: Runtime,
    gate: Mutex<()>,
}

impl BlockingActions {
    pub fn new(actions: InsuranceActions) -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            actions,
            runtime,
            gate: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.actions.session()
    }

    pub fn create_identity(&self) -> ActionOutcome {
        let _guard = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        self.actions.create_identity()
    }

    pub fn create_pool(&self, name: &str, premium: i128, coverage: i128) -> ActionOutcome {
        self.block(self.actions.create_pool(name, premium, coverage))
    }

    pub fn join_pool(&self, pool_id: i128) -> ActionOutcome {
        self.block(self.actions.join_pool(pool_id))
    }

    pub fn submit_claim(&self, pool_id: i128, amount: i128, description: &str) -> ActionOutcome {
        self.block(self.actions.submit_claim(pool_id, amount, description))
    }

    pub fn vote_on_claim(&self, claim_id: i128, approve: bool) -> ActionOutcome {
        self.block(self.actions.vote_on_claim(claim_id, approve))
    }

    pub fn fund_account(&self, amount: i128) -> ActionOutcome {
        self.block(self.actions.fund_account(amount))
    }

    /// Drive `action` to completion on the owned runtime.
    ///
    /// `block_on` panics when called from inside another runtime, so that
    /// case is reported as a precondition failure instead.
    fn block(&self, action: impl std::future::Future<Output = ActionOutcome>) -> ActionOutcome {
        if Handle::try_current().is_ok() {
            warn!("blocking: called from inside an async runtime; refusing");
            return ActionOutcome::failed(&ActionError::from(PreconditionError::InsideRuntime));
        }
        let _guard = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        self.runtime.block_on(action)
    }
}
