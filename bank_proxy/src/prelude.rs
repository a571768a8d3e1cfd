//! Everything needed to query and transact: `use bank_proxy::prelude::*;`
pub use crate::{
    coin::Coin,
    config::ProxyConfig,
    context::{CancelHandle, QueryContext},
    error::{ContextError, GrpcError, ProxyError, TxError},
    grpc::{BankQueryClient, BankService, Connector, GrpcConnector},
    query::{BankQuery, PerCallClient, PooledClient, QueryClient},
    tx::{CommandRunner, ProcessRunner, TxClient, TxResponse, WalletAmount},
};
