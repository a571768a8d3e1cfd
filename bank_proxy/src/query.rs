//! Query clients for the bank module.
//!
//! [`QueryClient`] describes how a client gets hold of a connection for the duration of one call.
//! Two implementations are provided:
//!
//! * [`PerCallClient`] dials a fresh connection for every call and closes it when the call ends.
//! * [`PooledClient`] leases connections from an idle pool and hands them back afterwards.
//!
//! The bank queries themselves live on [`BankQuery`], which every [`QueryClient`] gets for free.
//!
//! # Examples
//!
//! ```no_run
//! use bank_proxy::prelude::*;
//!
//! async fn get_balance_example() {
//!     let client = PerCallClient::new("localhost:9090", GrpcConnector::new()).unwrap();
//!     let ctx = QueryContext::background().with_timeout(std::time::Duration::from_secs(5));
//!     let amount = client.get_balance(&ctx, "cosmos1...", "uatom").await.unwrap();
//! }
//! ```
use std::ops::{Deref, DerefMut};

use async_trait::async_trait;
use tracing::debug;

pub use self::{bank::*, pool::*};
use crate::{
    config::ProxyConfig,
    error::ProxyError,
    grpc::{BankService, Connector, GrpcConnector},
    utils,
};

pub mod bank;
pub mod pool;

/// A source of bank service connections, each scoped to a single call. Dropping the lease returned
/// by [`QueryClient::acquire`] releases the connection.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// The connection a call talks through
    type Connection: BankService + Send + 'static;
    /// Exclusive access to a connection for one call
    type Lease: DerefMut<Target = Self::Connection> + Send;

    /// The normalized gRPC endpoint this client talks to
    fn endpoint(&self) -> &str;

    /// Gets a connection for one call.
    async fn acquire(&self) -> Result<Self::Lease, ProxyError>;
}

/// Opens a new connection for every call
#[derive(Clone, Debug)]
pub struct PerCallClient<C> {
    endpoint: String,
    connector: C,
}

impl<C: Connector> PerCallClient<C> {
    /// Creates a client for `endpoint`, normalized with
    /// [`parse_or_build_grpc_endpoint`](crate::utils::parse_or_build_grpc_endpoint).
    pub fn new(endpoint: &str, connector: C) -> Result<Self, ProxyError> {
        Ok(PerCallClient {
            endpoint: utils::parse_or_build_grpc_endpoint(endpoint)?,
            connector,
        })
    }

    /// The connector used to dial each call's connection
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl PerCallClient<GrpcConnector> {
    /// Builds a client from the config's gRPC address and connect timeout.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ProxyError> {
        PerCallClient::new(&config.grpc_address, config.connector())
    }
}

#[async_trait]
impl<C: Connector> QueryClient for PerCallClient<C> {
    type Connection = C::Connection;
    type Lease = ScopedConnection<C::Connection>;

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn acquire(&self) -> Result<Self::Lease, ProxyError> {
        let inner = self.connector.connect(&self.endpoint).await?;

        Ok(ScopedConnection {
            inner,
            endpoint: self.endpoint.clone(),
        })
    }
}

/// A connection owned by exactly one call. Closed on drop.
#[derive(Debug)]
pub struct ScopedConnection<T> {
    inner: T,
    endpoint: String,
}

impl<T> Deref for ScopedConnection<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for ScopedConnection<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T> Drop for ScopedConnection<T> {
    fn drop(&mut self) {
        debug!(endpoint = %self.endpoint, "closing gRPC connection");
    }
}
