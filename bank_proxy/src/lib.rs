#![warn(missing_docs)]
//! bank_proxy is a small client for the Cosmos SDK bank module. Queries go over gRPC with one
//! connection scoped to each call (or leased from a pool), and bank transfers are submitted
//! through the chain's own CLI.
pub use cosmos_sdk_proto;

pub use crate::{
    coin::Coin,
    config::ProxyConfig,
    context::{CancelHandle, QueryContext},
    error::ProxyError,
    query::{BankQuery, PerCallClient, PooledClient, QueryClient},
    tx::TxClient,
};

pub mod coin;
pub mod config;
pub mod context;
pub mod error;
pub mod grpc;
pub mod prelude;
pub mod query;
pub mod tx;
pub mod utils;
