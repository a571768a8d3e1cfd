//! Bank module transactions, submitted through the chain CLI
use tracing::debug;

use super::{CommandRunner, TxClient, TxResponse};
use crate::{coin::Coin, context::QueryContext, error::ProxyError};

/// An amount of a single denom destined for one address
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletAmount {
    /// Recipient address
    pub address: String,
    /// Denomination sent
    pub denom: String,
    /// Amount in the denom's base unit
    pub amount: u128,
}

impl WalletAmount {
    /// Creates the amount `amount` of `denom` for `address`.
    pub fn new(address: &str, amount: u128, denom: &str) -> Self {
        WalletAmount {
            address: address.to_string(),
            denom: denom.to_string(),
            amount,
        }
    }

    /// The amount as a [`Coin`]
    pub fn coin(&self) -> Coin {
        Coin {
            amount: self.amount,
            denom: self.denom.clone(),
        }
    }
}

impl<R: CommandRunner> TxClient<R> {
    /// Sends tokens from the `key_name` account to `amount.address`.
    pub async fn bank_send(
        &self,
        ctx: &QueryContext,
        key_name: &str,
        amount: &WalletAmount,
    ) -> Result<TxResponse, ProxyError> {
        debug!(key_name, to = %amount.address, amount = %amount.coin().to_cli_arg(), "bank send");

        let args = vec![
            "bank".to_string(),
            "send".to_string(),
            key_name.to_string(),
            amount.address.clone(),
            amount.coin().to_cli_arg(),
        ];

        self.exec_tx(ctx, key_name, &args).await
    }

    /// Sends `amount` of `denom` from the `key_name` account to each of `addresses`.
    pub async fn bank_multi_send(
        &self,
        ctx: &QueryContext,
        key_name: &str,
        addresses: &[String],
        amount: u128,
        denom: &str,
    ) -> Result<TxResponse, ProxyError> {
        debug!(key_name, recipients = addresses.len(), "bank multi-send");

        let mut args = vec![
            "bank".to_string(),
            "multi-send".to_string(),
            key_name.to_string(),
        ];
        args.extend(addresses.iter().cloned());
        args.push(format!("{}{}", amount, denom));

        self.exec_tx(ctx, key_name, &args).await
    }
}
