//! Test-network faucet — funds a fresh account so it can pay gas.

use reqwest::Client;
use securepool_agent_core::AccountAddress;
use securepool_ledger_api::FaucetResponse;
use tracing::info;

use crate::error::LedgerError;
use crate::ledger::read_json;

/// A faucet at `base_url`, e.g. `https://faucet.testnet.aptoslabs.com`.
#[derive(Debug, Clone)]
pub struct Faucet {
    client: Client,
    base_url: String,
}

impl Faucet {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the faucet to mint `amount` octas to `address`. Returns the
    /// hashes of the funding transactions, which the caller should wait on.
    pub async fn fund(&self, address: &AccountAddress, amount: u64) -> Result<Vec<String>, LedgerError> {
        let url = format!("{}/mint", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("amount", amount.to_string()), ("address", address.to_hex())])
            .send()
            .await?;
        let hashes: FaucetResponse = read_json(response).await?;
        info!("faucet: requested {amount} octas for {address} ({} txns)", hashes.len());
        Ok(hashes)
    }
}
