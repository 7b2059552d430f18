//! Shared helpers for the SecurePool conformance test suite.
//!
//! Provides [`spawn_ledger`], which binds a `TcpListener` on an ephemeral
//! port and serves an in-process fake ledger behind the same REST surface a
//! fullnode exposes. The fake is strict where a real ledger is strict: it
//! decodes the BCS body, verifies the Ed25519 signature against the sender
//! address, checks chain id, expiry, and sequence number, and only then
//! executes the call.
//!
//! Execution is a small model of the `MicroInsurance` module: pools, members,
//! claims, and votes, with Move-style aborts for calls that make no sense
//! (unknown pool, non-member claim, double vote). That lets the tests
//! exercise remote rejection with real signed transactions.
//!
//! The returned [`FakeLedger`] handle exposes the model's state and a few
//! fault knobs (lost responses, failing polls, slow finality) so tests can
//! reproduce the unknown-outcome cases deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use securepool::transaction::EntryFunction;
use securepool::{protocol, transaction_hash, verify_signed_transaction, ModuleId, MoveValue, SignedTransaction};
use securepool_agent_core::AccountAddress;
use securepool_ledger_api::error::codes;
use securepool_ledger_api::{
    AccountData, ErrorResponse, FaucetResponse, LedgerInfo, PendingTransaction, TransactionInfo,
    SIGNED_TRANSACTION_CONTENT_TYPE,
};
use serde::Deserialize;

/// Chain id the fake ledger reports and requires.
pub const CHAIN_ID: u8 = 4;

// ---------------------------------------------------------------------------
// Model state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub id: u64,
    pub name: String,
    pub premium: u64,
    pub coverage: u64,
    pub members: HashSet<AccountAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: u64,
    pub pool_id: u64,
    pub claimant: AccountAddress,
    pub amount: u64,
    pub description: String,
    pub approvals: u64,
    pub rejections: u64,
    pub voters: HashSet<AccountAddress>,
}

/// A transaction the ledger executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed {
    pub hash: String,
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub function: String,
    pub args: Vec<MoveValue>,
    pub version: u64,
    /// `None` on success, otherwise the abort status.
    pub abort: Option<String>,
    polls_seen: u32,
}

#[derive(Default)]
struct LedgerState {
    module: Option<ModuleId>,
    sequence_numbers: HashMap<AccountAddress, u64>,
    balances: HashMap<AccountAddress, u64>,
    pools: Vec<Pool>,
    claims: Vec<Claim>,
    executed: HashMap<String, Executed>,
    order: Vec<String>,
    version: u64,

    require_funding: bool,
    pending_polls: u32,
    never_finalize: bool,
    failing_polls: u32,
    lose_submit_responses: u32,
    submit_attempts: u32,
}

// ---------------------------------------------------------------------------
// FakeLedger handle
// ---------------------------------------------------------------------------

/// A running fake ledger.
#[derive(Clone)]
pub struct FakeLedger {
    /// REST API base, e.g. `http://127.0.0.1:51234/v1`.
    pub node_url: String,
    /// Faucet base, e.g. `http://127.0.0.1:51234`.
    pub faucet_url: String,
    state: Arc<Mutex<LedgerState>>,
}

impl FakeLedger {
    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Refuse submissions from accounts that cannot cover max gas.
    pub fn require_funding(&self, on: bool) {
        self.state().require_funding = on;
    }

    /// Report every new transaction as pending for its first `n` polls.
    pub fn set_pending_polls(&self, n: u32) {
        self.state().pending_polls = n;
    }

    /// Report every transaction as pending forever.
    pub fn never_finalize(&self) {
        self.state().never_finalize = true;
    }

    /// Answer the next `n` status polls with `503`.
    pub fn fail_next_polls(&self, n: u32) {
        self.state().failing_polls = n;
    }

    /// Execute the next `n` submissions but answer them with `503`, as if
    /// the response were lost on the way back.
    pub fn lose_next_submit_responses(&self, n: u32) {
        self.state().lose_submit_responses = n;
    }

    pub fn sequence_number(&self, address: &AccountAddress) -> u64 {
        self.state()
            .sequence_numbers
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    pub fn balance(&self, address: &AccountAddress) -> u64 {
        self.state().balances.get(address).copied().unwrap_or(0)
    }

    pub fn pools(&self) -> Vec<Pool> {
        self.state().pools.clone()
    }

    pub fn claims(&self) -> Vec<Claim> {
        self.state().claims.clone()
    }

    /// Executed transactions in ledger order.
    pub fn executed(&self) -> Vec<Executed> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|h| state.executed.get(h).cloned())
            .collect()
    }

    pub fn executed_by_hash(&self, hash: &str) -> Option<Executed> {
        self.state().executed.get(hash).cloned()
    }

    /// Every `POST /transactions` received, valid or not.
    pub fn submit_attempts(&self) -> u32 {
        self.state().submit_attempts
    }
}

/// Start an ephemeral fake ledger serving `module` and return its handle.
///
/// The ledger runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`. Both the REST API (under `/v1`) and the faucet (`/mint`)
/// are served from the same port.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_ledger(module: ModuleId) -> FakeLedger {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let state = Arc::new(Mutex::new(LedgerState {
        module: Some(module),
        ..LedgerState::default()
    }));

    let router = Router::new()
        .route("/v1/", get(ledger_info))
        .route("/v1/accounts/{address}", get(account))
        .route("/v1/transactions", post(submit))
        .route("/v1/transactions/by_hash/{hash}", get(by_hash))
        .route("/mint", post(mint))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("fake ledger error");
    });

    FakeLedger {
        node_url: format!("http://{addr}/v1"),
        faucet_url: format!("http://{addr}"),
        state,
    }
}

/// Start a fake ledger serving the published insurance module.
pub async fn spawn_default_ledger() -> FakeLedger {
    spawn_ledger(protocol::default_module()).await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type Shared = Arc<Mutex<LedgerState>>;

fn lock(state: &Shared) -> MutexGuard<'_, LedgerState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

async fn ledger_info(State(state): State<Shared>) -> Json<LedgerInfo> {
    let state = lock(&state);
    Json(LedgerInfo {
        chain_id: CHAIN_ID,
        ledger_version: state.version,
        ledger_timestamp: Utc::now().timestamp_micros().max(0) as u64,
    })
}

async fn account(State(state): State<Shared>, Path(address): Path<String>) -> Response {
    let Ok(address) = AccountAddress::parse(&address) else {
        return error(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, "malformed address");
    };
    let state = lock(&state);
    match state.sequence_numbers.get(&address) {
        Some(&sequence_number) => Json(AccountData {
            sequence_number,
            authentication_key: address.to_hex(),
        })
        .into_response(),
        None => error(
            StatusCode::NOT_FOUND,
            codes::ACCOUNT_NOT_FOUND,
            format!("Account not found by Address({address})"),
        ),
    }
}

async fn submit(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    let mut state = lock(&state);
    state.submit_attempts += 1;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type != SIGNED_TRANSACTION_CONTENT_TYPE {
        return error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            codes::INVALID_INPUT,
            format!("unsupported content type {content_type:?}"),
        );
    }

    let txn = match SignedTransaction::from_bcs_bytes(&body) {
        Ok(txn) => txn,
        Err(e) => return error(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, e.to_string()),
    };
    if let Err(e) = verify_signed_transaction(&txn) {
        return vm_error(format!("INVALID_SIGNATURE: {e}"));
    }
    let raw = &txn.raw_txn;
    if raw.chain_id != CHAIN_ID {
        return vm_error("BAD_CHAIN_ID");
    }
    if raw.expiration_timestamp_secs <= Utc::now().timestamp().max(0) as u64 {
        return vm_error("TRANSACTION_EXPIRED");
    }

    let expected = state.sequence_numbers.get(&raw.sender).copied().unwrap_or(0);
    if raw.sequence_number < expected {
        return vm_error("SEQUENCE_NUMBER_TOO_OLD");
    }
    if raw.sequence_number > expected {
        return vm_error("SEQUENCE_NUMBER_TOO_NEW");
    }

    let fee = raw.max_gas_amount.saturating_mul(raw.gas_unit_price);
    if state.require_funding && state.balances.get(&raw.sender).copied().unwrap_or(0) < fee {
        return vm_error("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE");
    }

    let Some(entry) = raw.entry_function_payload() else {
        return error(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, "unsupported payload");
    };
    let hash = match transaction_hash(&txn) {
        Ok(hash) => hash,
        Err(e) => return error(StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, e.to_string()),
    };

    let (args, abort) = match execute(&mut state, raw.sender, entry) {
        Ok(args) => (args, None),
        Err((args, status)) => (args, Some(status)),
    };
    state.sequence_numbers.insert(raw.sender, expected + 1);
    state.version += 1;
    let record = Executed {
        hash: hash.clone(),
        sender: raw.sender,
        sequence_number: raw.sequence_number,
        function: entry.function.clone(),
        args,
        version: state.version,
        abort,
        polls_seen: 0,
    };
    state.executed.insert(hash.clone(), record);
    state.order.push(hash.clone());

    if state.lose_submit_responses > 0 {
        state.lose_submit_responses -= 1;
        return error(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::INTERNAL_ERROR,
            "upstream connection reset",
        );
    }

    (
        StatusCode::ACCEPTED,
        Json(PendingTransaction {
            hash,
            sender: Some(raw.sender.to_hex()),
        }),
    )
        .into_response()
}

fn vm_error(message: impl Into<String>) -> Response {
    error(StatusCode::BAD_REQUEST, codes::VM_ERROR, message)
}

async fn by_hash(State(state): State<Shared>, Path(hash): Path<String>) -> Response {
    let mut state = lock(&state);
    if state.failing_polls > 0 {
        state.failing_polls -= 1;
        return error(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::INTERNAL_ERROR,
            "node is syncing",
        );
    }

    let pending_polls = state.pending_polls;
    let never_finalize = state.never_finalize;
    let Some(record) = state.executed.get_mut(&hash) else {
        return error(
            StatusCode::NOT_FOUND,
            codes::TRANSACTION_NOT_FOUND,
            format!("Transaction not found by Transaction hash({hash})"),
        );
    };

    record.polls_seen += 1;
    if never_finalize || record.polls_seen <= pending_polls {
        return Json(TransactionInfo {
            kind: TransactionInfo::PENDING.into(),
            hash,
            version: None,
            success: None,
            vm_status: None,
        })
        .into_response();
    }

    Json(TransactionInfo {
        kind: TransactionInfo::USER.into(),
        hash,
        version: Some(record.version.to_string()),
        success: Some(record.abort.is_none()),
        vm_status: Some(
            record
                .abort
                .clone()
                .unwrap_or_else(|| "Executed successfully".into()),
        ),
    })
    .into_response()
}

#[derive(Deserialize)]
struct MintQuery {
    amount: u64,
    address: String,
}

async fn mint(State(state): State<Shared>, Query(q): Query<MintQuery>) -> Response {
    let Ok(address) = AccountAddress::parse(&q.address) else {
        return error(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, "malformed address");
    };
    let mut state = lock(&state);
    *state.balances.entry(address).or_insert(0) += q.amount;
    state.sequence_numbers.entry(address).or_insert(0);
    state.version += 1;

    let hash = format!("0x{:064x}", u128::from(state.version) << 64 | u128::from(q.amount));
    let record = Executed {
        hash: hash.clone(),
        sender: address,
        sequence_number: 0,
        function: "mint".into(),
        args: vec![MoveValue::U64(q.amount)],
        version: state.version,
        abort: None,
        polls_seen: 0,
    };
    state.executed.insert(hash.clone(), record);
    state.order.push(hash.clone());

    let body: FaucetResponse = vec![hash];
    Json(body).into_response()
}

// ---------------------------------------------------------------------------
// MicroInsurance model
// ---------------------------------------------------------------------------

type Execution = Result<Vec<MoveValue>, (Vec<MoveValue>, String)>;

fn execute(state: &mut LedgerState, sender: AccountAddress, entry: &EntryFunction) -> Execution {
    let module = state.module.clone();
    if Some(&entry.module) != module.as_ref() {
        return Err((Vec::new(), "LINKER_ERROR".into()));
    }
    let Some(signature) = protocol::signature_of(&entry.function) else {
        return Err((Vec::new(), "FUNCTION_RESOLUTION_FAILURE".into()));
    };
    let args = match entry.decode_args(signature) {
        Ok(args) => args,
        Err(e) => return Err((Vec::new(), format!("FAILED_TO_DESERIALIZE_ARGUMENT: {e}"))),
    };

    let abort = |code: &str| format!("Move abort in {}: {code}", entry.module);
    let result = match (entry.function.as_str(), args.as_slice()) {
        (
            protocol::CREATE_POOL,
            [MoveValue::String(name), MoveValue::U64(premium), MoveValue::U64(coverage)],
        ) => {
            let id = state.pools.len() as u64 + 1;
            state.pools.push(Pool {
                id,
                name: name.clone(),
                premium: *premium,
                coverage: *coverage,
                members: HashSet::from([sender]),
            });
            Ok(())
        }
        (protocol::JOIN_POOL, [MoveValue::U64(pool_id)]) => {
            match state.pools.iter_mut().find(|p| p.id == *pool_id) {
                None => Err(abort("E_POOL_NOT_FOUND")),
                Some(pool) => {
                    if pool.members.insert(sender) {
                        Ok(())
                    } else {
                        Err(abort("E_ALREADY_MEMBER"))
                    }
                }
            }
        }
        (
            protocol::SUBMIT_CLAIM,
            [MoveValue::U64(pool_id), MoveValue::U64(amount), MoveValue::String(description)],
        ) => match state.pools.iter().find(|p| p.id == *pool_id) {
            None => Err(abort("E_POOL_NOT_FOUND")),
            Some(pool) if !pool.members.contains(&sender) => Err(abort("E_NOT_MEMBER")),
            Some(pool) if *amount > pool.coverage => Err(abort("E_EXCEEDS_COVERAGE")),
            Some(_) => {
                let id = state.claims.len() as u64 + 1;
                state.claims.push(Claim {
                    id,
                    pool_id: *pool_id,
                    claimant: sender,
                    amount: *amount,
                    description: description.clone(),
                    approvals: 0,
                    rejections: 0,
                    voters: HashSet::new(),
                });
                Ok(())
            }
        },
        (protocol::VOTE_ON_CLAIM, [MoveValue::U64(claim_id), MoveValue::Bool(approve)]) => {
            let pools = &state.pools;
            match state.claims.iter_mut().find(|c| c.id == *claim_id) {
                None => Err(abort("E_CLAIM_NOT_FOUND")),
                Some(claim) => {
                    let member = pools
                        .iter()
                        .any(|p| p.id == claim.pool_id && p.members.contains(&sender));
                    if !member {
                        Err(abort("E_NOT_MEMBER"))
                    } else if !claim.voters.insert(sender) {
                        Err(abort("E_ALREADY_VOTED"))
                    } else {
                        if *approve {
                            claim.approvals += 1;
                        } else {
                            claim.rejections += 1;
                        }
                        Ok(())
                    }
                }
            }
        }
        _ => Err("NUMBER_OF_ARGUMENTS_MISMATCH".into()),
    };

    match result {
        Ok(()) => Ok(args),
        Err(status) => Err((args, status)),
    }
}
