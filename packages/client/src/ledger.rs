//! Ledger access — the [`LedgerClient`] trait and its REST implementation.
//!
//! The trait is the seam between the submitter and the network. The
//! submitter only ever talks to a `dyn LedgerClient`, so tests can swap in a
//! scripted ledger and count exactly which requests were made.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`RestLedgerClient`] | Real ledgers (fullnode REST API over HTTP) |
//! | scripted fakes | Unit tests in this crate and the conformance suite |

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use securepool_agent_core::AccountAddress;
use securepool_ledger_api::error::codes;
use securepool_ledger_api::{
    AccountData, ErrorResponse, LedgerInfo, PendingTransaction, TransactionInfo,
    SIGNED_TRANSACTION_CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// LedgerClient trait
// ---------------------------------------------------------------------------

/// The ledger requests the submission pipeline needs.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The network's chain id, which every signed transaction must carry.
    async fn chain_id(&self) -> Result<u8, LedgerError>;

    /// The sequence number the next transaction from `address` must use.
    /// An account the ledger has never seen starts at 0.
    async fn sequence_number(&self, address: &AccountAddress) -> Result<u64, LedgerError>;

    /// Post a BCS-encoded signed transaction.
    async fn submit_transaction(&self, body: Vec<u8>) -> Result<PendingTransaction, LedgerError>;

    /// Look up a transaction by hash. `Ok(None)` means the ledger does not
    /// know the hash (yet).
    async fn transaction_by_hash(&self, hash: &str)
        -> Result<Option<TransactionInfo>, LedgerError>;
}

// ---------------------------------------------------------------------------
// RestLedgerClient
// ---------------------------------------------------------------------------

/// [`LedgerClient`] over the fullnode REST API.
///
/// Holds a cloneable [`reqwest::Client`] (which pools connections internally)
/// and the API base URL, e.g. `https://fullnode.testnet.aptoslabs.com/v1`.
#[derive(Debug, Clone)]
pub struct RestLedgerClient {
    client: Client,
    base_url: String,
}

impl RestLedgerClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LedgerClient for RestLedgerClient {
    async fn chain_id(&self) -> Result<u8, LedgerError> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let info: LedgerInfo = read_json(response).await?;
        Ok(info.chain_id)
    }

    async fn sequence_number(&self, address: &AccountAddress) -> Result<u64, LedgerError> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        let response = self.client.get(&url).send().await?;
        match read_json::<AccountData>(response).await {
            Ok(account) => Ok(account.sequence_number),
            Err(LedgerError::Api {
                status: 404,
                ref error_code,
                ..
            }) if error_code == codes::ACCOUNT_NOT_FOUND => {
                debug!("ledger: {address} not found on-chain; using sequence number 0");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    async fn submit_transaction(&self, body: Vec<u8>) -> Result<PendingTransaction, LedgerError> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, SIGNED_TRANSACTION_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionInfo>, LedgerError> {
        let url = format!("{}/transactions/by_hash/{}", self.base_url, hash);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Decode a 2xx body as `T`, or turn a non-2xx response into
/// [`LedgerError::Api`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, LedgerError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => LedgerError::Api {
            status: status.as_u16(),
            error_code: err.error_code,
            message: err.message,
            vm_error_code: err.vm_error_code,
        },
        Err(_) => LedgerError::Api {
            status: status.as_u16(),
            error_code: codes::INTERNAL_ERROR.into(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
            vm_error_code: None,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
