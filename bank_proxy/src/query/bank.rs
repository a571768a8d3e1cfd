//! Queries for the [Bank module](https://github.com/cosmos/cosmos-sdk/blob/main/proto/cosmos/bank/v1beta1/query.proto). If you need a query that does not have a method wrapper here, you can use the [`BankQueryClient`](crate::grpc::BankQueryClient) directly.
//!
//! Every query acquires one connection, sends one request built verbatim from its arguments,
//! releases the connection, and only then looks at the response. A failed call returns the
//! remote [`tonic::Status`] without touching the response payload.
use async_trait::async_trait;
use cosmos_sdk_proto::cosmos::bank::v1beta1 as bank;
use tracing::debug;

use super::QueryClient;
use crate::{
    coin::{coins_from_proto, Coin},
    context::QueryContext,
    error::ProxyError,
    grpc::BankService,
};

pub use bank::{DenomOwner, Metadata, Params, SendEnabled};

/// Bank module queries, available on every [`QueryClient`]. Each one runs under the given
/// [`QueryContext`] and holds its connection only for the duration of the call.
#[async_trait]
pub trait BankQuery: QueryClient {
    /// Gets the amount of `denom` held at `address`. An account with no balance in the denom
    /// reports zero.
    async fn get_balance(
        &self,
        ctx: &QueryContext,
        address: &str,
        denom: &str,
    ) -> Result<u128, ProxyError> {
        let request = bank::QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        };
        debug!(endpoint = self.endpoint(), address, denom, "querying balance");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.balance(request).await.map_err(ProxyError::from)
            })
            .await?;

        match response.balance {
            Some(b) => Ok(Coin::try_from(b)?.amount),
            None => Ok(0),
        }
    }

    /// Alias for [`BankQuery::get_balance`]
    async fn bank_get_balance(
        &self,
        ctx: &QueryContext,
        address: &str,
        denom: &str,
    ) -> Result<u128, ProxyError> {
        self.get_balance(ctx, address, denom).await
    }

    /// Gets all coin balances of the specified address
    async fn all_balances(
        &self,
        ctx: &QueryContext,
        address: &str,
    ) -> Result<Vec<Coin>, ProxyError> {
        let request = bank::QueryAllBalancesRequest {
            address: address.to_string(),
            ..Default::default()
        };
        debug!(endpoint = self.endpoint(), address, "querying all balances");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.all_balances(request).await.map_err(ProxyError::from)
            })
            .await?;

        Ok(coins_from_proto(response.balances)?)
    }

    /// Gets metadata for the specified coin denomination if it exists, errors otherwise
    async fn denom_metadata(
        &self,
        ctx: &QueryContext,
        denom: &str,
    ) -> Result<Metadata, ProxyError> {
        let request = bank::QueryDenomMetadataRequest {
            denom: denom.to_string(),
        };
        debug!(endpoint = self.endpoint(), denom, "querying denom metadata");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.denom_metadata(request).await.map_err(ProxyError::from)
            })
            .await?;

        match response.metadata {
            Some(md) => Ok(md),
            None => Err(ProxyError::ModuleQuery(format!(
                "empty result. denom {} is probably invalid!",
                denom
            ))),
        }
    }

    /// Like [`BankQuery::denom_metadata`], but the denom is sent as a query string parameter,
    /// which lets denoms containing slashes through gateways that would mangle the path.
    async fn denom_metadata_by_query_string(
        &self,
        ctx: &QueryContext,
        denom: &str,
    ) -> Result<Metadata, ProxyError> {
        let request = bank::QueryDenomMetadataByQueryStringRequest {
            denom: denom.to_string(),
        };
        debug!(
            endpoint = self.endpoint(),
            denom, "querying denom metadata by query string"
        );

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.denom_metadata_by_query_string(request)
                    .await
                    .map_err(ProxyError::from)
            })
            .await?;

        match response.metadata {
            Some(md) => Ok(md),
            None => Err(ProxyError::ModuleQuery(format!(
                "empty result. denom {} is probably invalid!",
                denom
            ))),
        }
    }

    /// Gets every account holding `denom`, with its balance
    async fn denom_owners(
        &self,
        ctx: &QueryContext,
        denom: &str,
    ) -> Result<Vec<DenomOwner>, ProxyError> {
        let request = bank::QueryDenomOwnersRequest {
            denom: denom.to_string(),
            ..Default::default()
        };
        debug!(endpoint = self.endpoint(), denom, "querying denom owners");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.denom_owners(request).await.map_err(ProxyError::from)
            })
            .await?;

        Ok(response.denom_owners)
    }

    /// Gets the metadata for all coin denominations defined in the bank module.
    async fn denoms_metadata(&self, ctx: &QueryContext) -> Result<Vec<Metadata>, ProxyError> {
        let request = bank::QueryDenomsMetadataRequest::default();
        debug!(endpoint = self.endpoint(), "querying denoms metadata");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.denoms_metadata(request).await.map_err(ProxyError::from)
            })
            .await?;

        Ok(response.metadatas)
    }

    /// Gets the bank module's params
    async fn params(&self, ctx: &QueryContext) -> Result<Params, ProxyError> {
        let request = bank::QueryParamsRequest {};
        debug!(endpoint = self.endpoint(), "querying bank params");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.params(request).await.map_err(ProxyError::from)
            })
            .await?;

        match response.params {
            Some(p) => Ok(p),
            None => Err(ProxyError::ModuleQuery(
                "empty result. bank params missing from response".to_string(),
            )),
        }
    }

    /// Gets the send-enabled flags for `denoms`. An empty list asks for every denom with an
    /// explicit flag.
    async fn send_enabled(
        &self,
        ctx: &QueryContext,
        denoms: &[String],
    ) -> Result<Vec<SendEnabled>, ProxyError> {
        let request = bank::QuerySendEnabledRequest {
            denoms: denoms.to_vec(),
            ..Default::default()
        };
        debug!(endpoint = self.endpoint(), ?denoms, "querying send enabled");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.send_enabled(request).await.map_err(ProxyError::from)
            })
            .await?;

        Ok(response.send_enabled)
    }

    /// Gets the spendable balance of a single denom, i.e. the balance minus anything locked or
    /// vesting
    async fn spendable_balance(
        &self,
        ctx: &QueryContext,
        address: &str,
        denom: &str,
    ) -> Result<Coin, ProxyError> {
        let request = bank::QuerySpendableBalanceByDenomRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        };
        debug!(
            endpoint = self.endpoint(),
            address, denom, "querying spendable balance"
        );

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.spendable_balance_by_denom(request)
                    .await
                    .map_err(ProxyError::from)
            })
            .await?;

        match response.balance {
            Some(b) => Ok(b.try_into()?),
            None => Err(ProxyError::ModuleQuery(format!(
                "empty result. no spendable balance of {} for {}",
                denom, address
            ))),
        }
    }

    /// Gets spendable coin balances of the specified address
    async fn spendable_balances(
        &self,
        ctx: &QueryContext,
        address: &str,
    ) -> Result<Vec<Coin>, ProxyError> {
        let request = bank::QuerySpendableBalancesRequest {
            address: address.to_string(),
            ..Default::default()
        };
        debug!(
            endpoint = self.endpoint(),
            address, "querying spendable balances"
        );

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.spendable_balances(request)
                    .await
                    .map_err(ProxyError::from)
            })
            .await?;

        Ok(coins_from_proto(response.balances)?)
    }

    /// Gets the supply of all coin denominations
    async fn total_supply(&self, ctx: &QueryContext) -> Result<Vec<Coin>, ProxyError> {
        let request = bank::QueryTotalSupplyRequest::default();
        debug!(endpoint = self.endpoint(), "querying total supply");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.total_supply(request).await.map_err(ProxyError::from)
            })
            .await?;

        Ok(coins_from_proto(response.supply)?)
    }

    /// Gets the supply of the specified coin denomination
    async fn supply_of(&self, ctx: &QueryContext, denom: &str) -> Result<Coin, ProxyError> {
        let request = bank::QuerySupplyOfRequest {
            denom: denom.to_string(),
        };
        debug!(endpoint = self.endpoint(), denom, "querying supply");

        let response = ctx
            .run(async {
                let mut conn = self.acquire().await?;
                conn.supply_of(request).await.map_err(ProxyError::from)
            })
            .await?;

        match response.amount {
            Some(a) => Ok(a.try_into()?),
            None => Err(ProxyError::ModuleQuery(format!(
                "empty denom supply result. denom {} is probably invalid!",
                denom
            ))),
        }
    }
}

impl<T: QueryClient> BankQuery for T {}
