//! Transaction submission through the chain's CLI.
//!
//! Transactions are not built or signed here. [`TxClient`] renders a `tx` subcommand for the
//! chain binary, runs it with a [`CommandRunner`], and parses the JSON broadcast result.
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub use self::bank::*;
use crate::{
    config::{ProxyConfig, TxConfig},
    context::QueryContext,
    error::{ProxyError, TxError},
};

pub mod bank;

/// Runs a command line and returns its stdout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `argv`, where `argv[0]` is the program, and returns its stdout.
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TxError>;
}

/// Runs commands as local child processes. The child is killed if the call is cancelled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TxError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| TxError::Command("empty command".to_string()))?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| TxError::Command(format!("error invoking `{}`: {}", program, err)))?;

        if !output.status.success() {
            return Err(TxError::Command(format!(
                "`{}` exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim_end()
            )));
        }

        Ok(output.stdout)
    }
}

/// The broadcast result printed by `<binary> tx ... --output json`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TxResponse {
    /// Block height, `0` until the tx is included
    #[serde(default)]
    pub height: String,
    /// Transaction hash
    pub txhash: String,
    /// Module namespace of a failing `code`
    #[serde(default)]
    pub codespace: String,
    /// ABCI response code. Zero is success.
    #[serde(default)]
    pub code: u32,
    /// Raw log from the node
    #[serde(default)]
    pub raw_log: String,
}

impl TxResponse {
    /// Parses the JSON printed on stdout.
    pub fn parse(stdout: &[u8]) -> Result<Self, TxError> {
        Ok(serde_json::from_slice(stdout)?)
    }

    /// Whether the node accepted the tx
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Submits transactions for one chain by running its CLI
#[derive(Clone, Debug)]
pub struct TxClient<R = ProcessRunner> {
    chain_id: String,
    config: TxConfig,
    runner: R,
}

impl TxClient<ProcessRunner> {
    /// A client that runs the configured command as a local process.
    pub fn from_config(config: &ProxyConfig) -> Self {
        TxClient::new(&config.chain_id, config.tx.clone(), ProcessRunner)
    }
}

impl<R: CommandRunner> TxClient<R> {
    /// Creates a client for `chain_id` that runs commands with `runner`.
    pub fn new(chain_id: &str, config: TxConfig, runner: R) -> Self {
        TxClient {
            chain_id: chain_id.to_string(),
            config,
            runner,
        }
    }

    /// The runner commands go through
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Builds the full argv for `tx <args>` signed by `key_name`. Gas price and adjustment flags
    /// from the config are skipped when `args` already carries them (or `--fees`), in either the
    /// `--flag value` or `--flag=value` form.
    pub fn tx_command(&self, key_name: &str, args: &[String]) -> Vec<String> {
        let has_flag = |flag: &str| {
            args.iter().any(|a| {
                a == flag
                    || a.strip_prefix(flag)
                        .map_or(false, |rest| rest.starts_with('='))
            })
        };

        let mut command: Vec<String> = self.config.command.clone();
        command.push("tx".to_string());
        command.extend(args.iter().cloned());

        if !has_flag("--gas-prices") && !has_flag("--fees") {
            command.push("--gas-prices".to_string());
            command.push(self.config.gas_prices.clone());
        }
        if !has_flag("--gas-adjustment") {
            command.push("--gas-adjustment".to_string());
            command.push(self.config.gas_adjustment.to_string());
        }

        for arg in [
            "--from",
            key_name,
            "--gas",
            "auto",
            "--keyring-backend",
            self.config.keyring_backend.as_str(),
            "--output",
            "json",
            "-y",
            "--chain-id",
            self.chain_id.as_str(),
        ] {
            command.push(arg.to_string());
        }

        if let Some(home) = &self.config.home {
            command.push("--home".to_string());
            command.push(home.clone());
        }
        if let Some(node) = &self.config.node {
            command.push("--node".to_string());
            command.push(node.clone());
        }

        command
    }

    /// Runs a `tx` subcommand and returns the broadcast result. A non-zero response code is an
    /// error.
    pub async fn exec_tx(
        &self,
        ctx: &QueryContext,
        key_name: &str,
        args: &[String],
    ) -> Result<TxResponse, ProxyError> {
        let command = self.tx_command(key_name, args);
        debug!(command = %command.join(" "), "running tx command");

        let stdout = ctx
            .run(async {
                self.runner
                    .run(&command)
                    .await
                    .map_err(ProxyError::from)
            })
            .await?;
        let response = TxResponse::parse(&stdout)?;

        if !response.is_ok() {
            warn!(
                txhash = %response.txhash,
                code = response.code,
                raw_log = %response.raw_log,
                "tx failed"
            );
            return Err(TxError::Failed {
                txhash: response.txhash,
                code: response.code,
                raw_log: response.raw_log,
            }
            .into());
        }

        info!(txhash = %response.txhash, key_name, "tx broadcast");
        Ok(response)
    }
}
