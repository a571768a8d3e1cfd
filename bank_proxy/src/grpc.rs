//! Connection seams for talking to a bank query service over gRPC.
//!
//! [`BankService`] is the capability set the proxy needs from a connection, and [`Connector`]
//! knows how to open one. The tonic implementations are [`BankQueryClient`] and [`GrpcConnector`],
//! which speaks plaintext to `http://` endpoints and TLS to `https://` ones.
use std::time::Duration;

use async_trait::async_trait;
use cosmos_sdk_proto::cosmos::bank::v1beta1 as bank;
use tonic::{
    transport::{Channel, ClientTlsConfig, Endpoint},
    Status,
};
use tracing::debug;

use crate::error::{GrpcError, ProxyError};

/// The bank module's query client proto definition
pub type BankQueryClient = bank::query_client::QueryClient<Channel>;

/// The bank module query procedures used by the proxy. Each method is a single unary RPC and
/// returns the service's response or [`Status`] untouched.
#[async_trait]
pub trait BankService: Send {
    /// Balance of a single denom at an address
    async fn balance(
        &mut self,
        request: bank::QueryBalanceRequest,
    ) -> Result<bank::QueryBalanceResponse, Status>;

    /// Every balance at an address
    async fn all_balances(
        &mut self,
        request: bank::QueryAllBalancesRequest,
    ) -> Result<bank::QueryAllBalancesResponse, Status>;

    /// Every spendable balance at an address
    async fn spendable_balances(
        &mut self,
        request: bank::QuerySpendableBalancesRequest,
    ) -> Result<bank::QuerySpendableBalancesResponse, Status>;

    /// Spendable balance of a single denom at an address
    async fn spendable_balance_by_denom(
        &mut self,
        request: bank::QuerySpendableBalanceByDenomRequest,
    ) -> Result<bank::QuerySpendableBalanceByDenomResponse, Status>;

    /// Supply of every denom
    async fn total_supply(
        &mut self,
        request: bank::QueryTotalSupplyRequest,
    ) -> Result<bank::QueryTotalSupplyResponse, Status>;

    /// Supply of a single denom
    async fn supply_of(
        &mut self,
        request: bank::QuerySupplyOfRequest,
    ) -> Result<bank::QuerySupplyOfResponse, Status>;

    /// Bank module params
    async fn params(
        &mut self,
        request: bank::QueryParamsRequest,
    ) -> Result<bank::QueryParamsResponse, Status>;

    /// Metadata of a denom, addressed by path
    async fn denom_metadata(
        &mut self,
        request: bank::QueryDenomMetadataRequest,
    ) -> Result<bank::QueryDenomMetadataResponse, Status>;

    /// Metadata of a denom, addressed by query string
    async fn denom_metadata_by_query_string(
        &mut self,
        request: bank::QueryDenomMetadataByQueryStringRequest,
    ) -> Result<bank::QueryDenomMetadataByQueryStringResponse, Status>;

    /// Metadata of every registered denom
    async fn denoms_metadata(
        &mut self,
        request: bank::QueryDenomsMetadataRequest,
    ) -> Result<bank::QueryDenomsMetadataResponse, Status>;

    /// Accounts holding a denom
    async fn denom_owners(
        &mut self,
        request: bank::QueryDenomOwnersRequest,
    ) -> Result<bank::QueryDenomOwnersResponse, Status>;

    /// Send-enabled flags of the requested denoms
    async fn send_enabled(
        &mut self,
        request: bank::QuerySendEnabledRequest,
    ) -> Result<bank::QuerySendEnabledResponse, Status>;
}

#[async_trait]
impl BankService for BankQueryClient {
    async fn balance(
        &mut self,
        request: bank::QueryBalanceRequest,
    ) -> Result<bank::QueryBalanceResponse, Status> {
        Ok(BankQueryClient::balance(self, request).await?.into_inner())
    }

    async fn all_balances(
        &mut self,
        request: bank::QueryAllBalancesRequest,
    ) -> Result<bank::QueryAllBalancesResponse, Status> {
        Ok(BankQueryClient::all_balances(self, request)
            .await?
            .into_inner())
    }

    async fn spendable_balances(
        &mut self,
        request: bank::QuerySpendableBalancesRequest,
    ) -> Result<bank::QuerySpendableBalancesResponse, Status> {
        Ok(BankQueryClient::spendable_balances(self, request)
            .await?
            .into_inner())
    }

    async fn spendable_balance_by_denom(
        &mut self,
        request: bank::QuerySpendableBalanceByDenomRequest,
    ) -> Result<bank::QuerySpendableBalanceByDenomResponse, Status> {
        Ok(BankQueryClient::spendable_balance_by_denom(self, request)
            .await?
            .into_inner())
    }

    async fn total_supply(
        &mut self,
        request: bank::QueryTotalSupplyRequest,
    ) -> Result<bank::QueryTotalSupplyResponse, Status> {
        Ok(BankQueryClient::total_supply(self, request)
            .await?
            .into_inner())
    }

    async fn supply_of(
        &mut self,
        request: bank::QuerySupplyOfRequest,
    ) -> Result<bank::QuerySupplyOfResponse, Status> {
        Ok(BankQueryClient::supply_of(self, request).await?.into_inner())
    }

    async fn params(
        &mut self,
        request: bank::QueryParamsRequest,
    ) -> Result<bank::QueryParamsResponse, Status> {
        Ok(BankQueryClient::params(self, request).await?.into_inner())
    }

    async fn denom_metadata(
        &mut self,
        request: bank::QueryDenomMetadataRequest,
    ) -> Result<bank::QueryDenomMetadataResponse, Status> {
        Ok(BankQueryClient::denom_metadata(self, request)
            .await?
            .into_inner())
    }

    async fn denom_metadata_by_query_string(
        &mut self,
        request: bank::QueryDenomMetadataByQueryStringRequest,
    ) -> Result<bank::QueryDenomMetadataByQueryStringResponse, Status> {
        Ok(BankQueryClient::denom_metadata_by_query_string(self, request)
            .await?
            .into_inner())
    }

    async fn denoms_metadata(
        &mut self,
        request: bank::QueryDenomsMetadataRequest,
    ) -> Result<bank::QueryDenomsMetadataResponse, Status> {
        Ok(BankQueryClient::denoms_metadata(self, request)
            .await?
            .into_inner())
    }

    async fn denom_owners(
        &mut self,
        request: bank::QueryDenomOwnersRequest,
    ) -> Result<bank::QueryDenomOwnersResponse, Status> {
        Ok(BankQueryClient::denom_owners(self, request)
            .await?
            .into_inner())
    }

    async fn send_enabled(
        &mut self,
        request: bank::QuerySendEnabledRequest,
    ) -> Result<bank::QuerySendEnabledResponse, Status> {
        Ok(BankQueryClient::send_enabled(self, request)
            .await?
            .into_inner())
    }
}

/// Opens connections to a bank query service
#[async_trait]
pub trait Connector: Send + Sync {
    /// The connection handed to each call
    type Connection: BankService + Send + 'static;

    /// Opens a connection to `endpoint`, a URI already normalized by
    /// [`parse_or_build_grpc_endpoint`](crate::utils::parse_or_build_grpc_endpoint).
    async fn connect(&self, endpoint: &str) -> Result<Self::Connection, ProxyError>;
}

/// Dials gRPC endpoints with tonic. `http://` endpoints are plaintext; `https://` endpoints use
/// TLS verified against the platform's native root certificates. No retries are attempted.
#[derive(Clone, Debug, Default)]
pub struct GrpcConnector {
    connect_timeout: Option<Duration>,
}

impl GrpcConnector {
    /// A connector with no connect timeout
    pub fn new() -> Self {
        GrpcConnector::default()
    }

    /// Gives up on dialing after `timeout`
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the tonic endpoint for `endpoint`, with TLS configured for `https` URIs.
    pub fn endpoint(&self, endpoint: &str) -> Result<Endpoint, ProxyError> {
        let mut builder =
            Endpoint::from_shared(endpoint.to_string()).map_err(GrpcError::Connection)?;
        if builder.uri().scheme_str() == Some("https") {
            builder = builder
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(GrpcError::Connection)?;
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(builder)
    }
}

#[async_trait]
impl Connector for GrpcConnector {
    type Connection = BankQueryClient;

    async fn connect(&self, endpoint: &str) -> Result<BankQueryClient, ProxyError> {
        debug!(endpoint, "opening gRPC connection");

        let channel = self
            .endpoint(endpoint)?
            .connect()
            .await
            .map_err(GrpcError::Connection)?;

        Ok(BankQueryClient::new(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay::assay;

    #[assay]
    fn builds_plaintext_and_tls_endpoints() {
        let connector = GrpcConnector::new().with_connect_timeout(Duration::from_secs(3));

        let plain = connector.endpoint("http://localhost:9090/").unwrap();
        assert_eq!(plain.uri().scheme_str(), Some("http"));

        let tls = connector
            .endpoint("https://grpc.cosmos.network:443/")
            .unwrap();
        assert_eq!(tls.uri().scheme_str(), Some("https"));
        assert_eq!(tls.uri().host(), Some("grpc.cosmos.network"));
    }

    #[assay]
    fn rejects_unparseable_endpoint() {
        let err = GrpcConnector::new().endpoint("http://[::1").unwrap_err();

        assert!(err.is_connection());
    }
}
