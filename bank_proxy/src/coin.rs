//! A simple coin type convertable from the Cosmos SDK proto coin type.
use cosmos_sdk_proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use serde::{Deserialize, Serialize};

use crate::error::CoinError;

/// An amount of a single denom
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Coin {
    /// Amount in the denom's base unit
    pub amount: u128,
    /// Denomination, e.g. `uatom` or an `ibc/` hash
    pub denom: String,
}

impl Coin {
    /// The `<amount><denom>` form the chain CLI expects, e.g. `1000uatom`.
    pub fn to_cli_arg(&self) -> String {
        format!("{}{}", self.amount, self.denom)
    }
}

impl From<Coin> for ProtoCoin {
    fn from(coin: Coin) -> Self {
        ProtoCoin {
            amount: coin.amount.to_string(),
            denom: coin.denom,
        }
    }
}

impl TryFrom<ProtoCoin> for Coin {
    type Error = CoinError;

    fn try_from(coin: ProtoCoin) -> Result<Coin, Self::Error> {
        Coin::try_from(&coin)
    }
}

impl TryFrom<&ProtoCoin> for Coin {
    type Error = CoinError;

    fn try_from(coin: &ProtoCoin) -> Result<Coin, Self::Error> {
        let amount = coin
            .amount
            .parse()
            .map_err(|_| CoinError::InvalidAmount {
                amount: coin.amount.clone(),
                denom: coin.denom.clone(),
            })?;

        Ok(Coin {
            denom: coin.denom.clone(),
            amount,
        })
    }
}

pub(crate) fn coins_from_proto(coins: Vec<ProtoCoin>) -> Result<Vec<Coin>, CoinError> {
    coins.iter().map(Coin::try_from).collect()
}
