//! Client configuration, populated from environment variables.

use std::time::Duration;

use securepool::protocol;
use securepool::{ModuleId, TransactionOptions};
use securepool_agent_core::AccountAddress;
use thiserror::Error;

/// A configuration value that could not be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the SecurePool client.
///
/// All fields are populated from environment variables with defaults that
/// point at the public test network, so the client runs with zero
/// configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `SPOOL_NODE_URL` | testnet fullnode | Base URL of the ledger REST API |
/// | `SPOOL_MODULE_ADDRESS` | published module address | Account holding the insurance module |
/// | `SPOOL_MODULE_NAME` | `MicroInsurance` | Module name |
/// | `SPOOL_FAUCET_URL` | (absent) | Faucet for funding fresh accounts |
/// | `SPOOL_MAX_GAS` | `200000` | Max gas units per transaction |
/// | `SPOOL_GAS_UNIT_PRICE` | `100` | Octas per gas unit |
/// | `SPOOL_TXN_EXPIRY_SECS` | `600` | Transaction lifetime after signing |
/// | `SPOOL_POLL_INTERVAL_MS` | `500` | Delay between finality polls |
/// | `SPOOL_FINALITY_TIMEOUT_SECS` | `30` | Give up waiting for finality after this |
/// | `SPOOL_HTTP_TIMEOUT_SECS` | `10` | Per-request HTTP timeout |
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the ledger REST API, without a trailing slash.
    /// Example: `"https://fullnode.testnet.aptoslabs.com/v1"`.
    pub node_url: String,

    /// The insurance module every action calls.
    pub module: ModuleId,

    /// Faucet base URL. `None` disables account funding.
    pub faucet_url: Option<String>,

    /// Gas and expiry applied to every transaction.
    pub transaction: TransactionOptions,

    pub poll_interval: Duration,
    pub finality_timeout: Duration,
    pub http_timeout: Duration,
}

/// Default ledger endpoint: the public test network.
pub const DEFAULT_NODE_URL: &str = "https://fullnode.testnet.aptoslabs.com/v1";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.into(),
            module: protocol::default_module(),
            faucet_url: None,
            transaction: TransactionOptions::default(),
            poll_interval: Duration::from_millis(500),
            finality_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Populate config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let node_url = lookup("SPOOL_NODE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.node_url);

        let module_address = match lookup("SPOOL_MODULE_ADDRESS") {
            Some(raw) => AccountAddress::parse(&raw).map_err(|e| ConfigError::Invalid {
                var: "SPOOL_MODULE_ADDRESS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.module.address,
        };
        let module_name = lookup("SPOOL_MODULE_NAME").unwrap_or(defaults.module.name);

        let transaction = TransactionOptions {
            max_gas_amount: parse_u64(&lookup, "SPOOL_MAX_GAS")?
                .unwrap_or(defaults.transaction.max_gas_amount),
            gas_unit_price: parse_u64(&lookup, "SPOOL_GAS_UNIT_PRICE")?
                .unwrap_or(defaults.transaction.gas_unit_price),
            expiration_secs: parse_u64(&lookup, "SPOOL_TXN_EXPIRY_SECS")?
                .unwrap_or(defaults.transaction.expiration_secs),
        };

        let poll_interval = parse_u64(&lookup, "SPOOL_POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);
        let finality_timeout = parse_u64(&lookup, "SPOOL_FINALITY_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.finality_timeout);
        let http_timeout = parse_u64(&lookup, "SPOOL_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Ok(Self {
            node_url,
            module: ModuleId::new(module_address, module_name),
            faucet_url: lookup("SPOOL_FAUCET_URL").map(|u| u.trim_end_matches('/').to_string()),
            transaction,
            poll_interval,
            finality_timeout,
            http_timeout,
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
