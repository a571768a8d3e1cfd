//! A [`QueryClient`] that reuses connections across calls.
use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tracing::debug;

use super::QueryClient;
use crate::{
    config::ProxyConfig,
    error::ProxyError,
    grpc::{Connector, GrpcConnector},
    utils,
};

/// Idle connections kept when no limit is configured
pub const DEFAULT_MAX_IDLE: usize = 4;

/// Leases connections from a pool of idle ones, dialing a new connection only when the pool is
/// empty. At most `max_idle` connections are kept once their leases end; extras are closed.
pub struct PooledClient<C: Connector> {
    endpoint: String,
    connector: C,
    idle: Arc<IdlePool<C::Connection>>,
}

struct IdlePool<T> {
    connections: Mutex<Vec<T>>,
    max_idle: usize,
}

impl<T> IdlePool<T> {
    // a panic while holding the lock can't leave the Vec half-modified, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Connector> PooledClient<C> {
    /// Creates a pool for `endpoint` that keeps at most `max_idle` idle connections. Nothing is
    /// dialed until the first call.
    pub fn new(endpoint: &str, connector: C, max_idle: usize) -> Result<Self, ProxyError> {
        Ok(PooledClient {
            endpoint: utils::parse_or_build_grpc_endpoint(endpoint)?,
            connector,
            idle: Arc::new(IdlePool {
                connections: Mutex::new(Vec::with_capacity(max_idle)),
                max_idle,
            }),
        })
    }

    /// The connector used to dial new connections
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Number of connections currently sitting in the pool
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().len()
    }

    /// Closes every idle connection. Leased connections are unaffected and return to the pool
    /// as usual.
    pub fn clear(&self) {
        let drained: Vec<_> = self.idle.lock().drain(..).collect();
        debug!(endpoint = %self.endpoint, count = drained.len(), "closing idle gRPC connections");
    }
}

impl PooledClient<GrpcConnector> {
    /// Builds a pool from the config's gRPC address, connect timeout and `[pool]` settings.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ProxyError> {
        PooledClient::new(
            &config.grpc_address,
            config.connector(),
            config.pool.max_idle,
        )
    }
}

impl<C: Connector + fmt::Debug> fmt::Debug for PooledClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledClient")
            .field("endpoint", &self.endpoint)
            .field("connector", &self.connector)
            .field("idle", &self.idle.lock().len())
            .field("max_idle", &self.idle.max_idle)
            .finish()
    }
}

#[async_trait]
impl<C: Connector> QueryClient for PooledClient<C> {
    type Connection = C::Connection;
    type Lease = PooledConnection<C::Connection>;

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn acquire(&self) -> Result<Self::Lease, ProxyError> {
        let reused = self.idle.lock().pop();
        let inner = match reused {
            Some(conn) => {
                debug!(endpoint = %self.endpoint, "reusing pooled gRPC connection");
                conn
            }
            None => self.connector.connect(&self.endpoint).await?,
        };

        Ok(PooledConnection {
            inner: Some(inner),
            pool: self.idle.clone(),
        })
    }
}

/// A connection leased from a [`PooledClient`]. Returned to the pool on drop.
pub struct PooledConnection<T> {
    inner: Option<T>,
    pool: Arc<IdlePool<T>>,
}

impl<T> Deref for PooledConnection<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.inner {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<T> DerefMut for PooledConnection<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<T> Drop for PooledConnection<T> {
    fn drop(&mut self) {
        let conn = match self.inner.take() {
            Some(conn) => conn,
            None => return,
        };

        let mut idle = self.pool.lock();
        if idle.len() < self.pool.max_idle {
            idle.push(conn);
        } else {
            drop(idle);
            debug!("idle pool full, closing gRPC connection");
        }
    }
}
