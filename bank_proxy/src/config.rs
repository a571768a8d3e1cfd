//! Proxy configuration, usually read from `~/.bank_proxy/config.toml`.
//!
//! ```toml
//! chain-id = "cosmoshub-4"
//! grpc-addr = "localhost:9090"
//! connect-timeout-secs = 5
//!
//! [pool]
//! max-idle = 4
//!
//! [tx]
//! command = ["gaiad"]
//! node = "tcp://localhost:26657"
//! home = "/var/cosmos-chain/gaia"
//! keyring-backend = "test"
//! gas-prices = "0.01uatom"
//! gas-adjustment = 1.3
//! ```
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, grpc::GrpcConnector, query::DEFAULT_MAX_IDLE};

/// Everything needed to reach one chain
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Chain ID passed to signed transactions
    pub chain_id: String,
    /// gRPC address of a node, e.g. `localhost:9090` or `https://grpc.example.com`
    #[serde(rename = "grpc-addr")]
    pub grpc_address: String,
    /// Seconds to wait when dialing the node. Unset waits as long as the OS does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// Settings for [`PooledClient`](crate::query::PooledClient)
    #[serde(default)]
    pub pool: PoolConfig,
    /// Settings for [`TxClient`](crate::tx::TxClient)
    #[serde(default)]
    pub tx: TxConfig,
}

/// Connection pool settings
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PoolConfig {
    /// Most idle connections kept between calls
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

/// Settings for submitting transactions through the chain binary
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TxConfig {
    /// Program and leading arguments, e.g. `["gaiad"]` or `["docker", "exec", "val0", "gaiad"]`
    pub command: Vec<String>,
    /// Tendermint RPC address passed as `--node`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Node home directory passed as `--home`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    /// Keyring backend holding the signing keys, passed as `--keyring-backend`
    pub keyring_backend: String,
    /// Gas price passed as `--gas-prices`, e.g. `0.01uatom`
    pub gas_prices: String,
    /// Multiplier on simulated gas, passed as `--gas-adjustment`
    pub gas_adjustment: f64,
}

impl Default for TxConfig {
    fn default() -> Self {
        TxConfig {
            command: vec!["gaiad".to_string()],
            node: None,
            home: None,
            keyring_backend: "test".to_string(),
            gas_prices: "0.01uatom".to_string(),
            gas_adjustment: 1.3,
        }
    }
}

impl ProxyConfig {
    /// A config for `chain_id` at `grpc_address` with every other setting defaulted.
    pub fn new(chain_id: &str, grpc_address: &str) -> Self {
        ProxyConfig {
            chain_id: chain_id.to_string(),
            grpc_address: grpc_address.to_string(),
            connect_timeout_secs: None,
            pool: PoolConfig::default(),
            tx: TxConfig::default(),
        }
    }

    /// Builds a config path in the users home directory
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::home_dir()?;
        path.push(".bank_proxy");
        path.push("config.toml");

        Some(path)
    }

    /// Parses a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses the TOML config at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|err| ConfigError::FileIO(format!("{}: {}", path.display(), err)))?;

        ProxyConfig::from_toml_str(&content)
    }

    /// Loads the config at `path`, or at [`ProxyConfig::default_path`] when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => ProxyConfig::from_file(p),
            None => match ProxyConfig::default_path() {
                Some(p) => ProxyConfig::from_file(&p),
                None => Err(ConfigError::FileIO(
                    "could not determine home directory".to_string(),
                )),
            },
        }
    }

    /// [`ProxyConfig::connect_timeout_secs`] as a [`Duration`]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// A [`GrpcConnector`] honoring the configured connect timeout
    pub fn connector(&self) -> GrpcConnector {
        match self.connect_timeout() {
            Some(timeout) => GrpcConnector::new().with_connect_timeout(timeout),
            None => GrpcConnector::new(),
        }
    }
}
