//! Error types for proxy operations.
use thiserror::Error;

/// Higher level error returned by every proxy operation
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Dialing or calling the gRPC service failed
    #[error("{0}")]
    Grpc(#[from] GrpcError),
    /// The call's context was cancelled or its deadline passed
    #[error("{0}")]
    Context(#[from] ContextError),
    /// The service answered but left out the requested payload
    #[error("{0}")]
    ModuleQuery(String),
    /// A coin in the response could not be converted
    #[error("{0}")]
    Coin(#[from] CoinError),
    /// Submitting a transaction failed
    #[error("{0}")]
    Tx(#[from] TxError),
    /// The configuration could not be loaded
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl ProxyError {
    /// The status reported by the remote service, if the call got that far.
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            ProxyError::Grpc(GrpcError::Request(status)) => Some(status),
            _ => None,
        }
    }

    /// Whether the call was stopped by its context rather than by a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ProxyError::Context(_))
    }

    /// Whether the call failed before any request reached the service.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            ProxyError::Grpc(GrpcError::Connection(_) | GrpcError::InvalidEndpoint(_))
        )
    }
}

impl From<tonic::Status> for ProxyError {
    fn from(status: tonic::Status) -> ProxyError {
        GrpcError::Request(status).into()
    }
}

// Lower level errors; should be used by higher level errors

/// gRPC transport and call failures
#[derive(Debug, Error)]
pub enum GrpcError {
    /// The endpoint could not be built or dialed
    #[error("{0}")]
    Connection(#[from] tonic::transport::Error),
    /// The address is not a usable gRPC endpoint
    #[error("invalid gRPC endpoint: {0}")]
    InvalidEndpoint(String),
    /// The service returned a non-OK status
    #[error("{0}")]
    Request(#[from] tonic::Status),
}

/// Why a [`QueryContext`](crate::context::QueryContext) stopped a call
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// A [`CancelHandle`](crate::context::CancelHandle) fired
    #[error("context canceled")]
    Cancelled,
    /// The deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Coin conversion failures
#[derive(Debug, Error)]
pub enum CoinError {
    /// The amount does not fit a `u128`
    #[error("invalid amount '{amount}' for denom {denom}")]
    InvalidAmount {
        /// The amount as received
        amount: String,
        /// The coin's denom
        denom: String,
    },
}

/// Failures submitting a transaction through the chain CLI
#[derive(Debug, Error)]
pub enum TxError {
    /// The command could not be started or exited unsuccessfully
    #[error("error running tx command: {0}")]
    Command(String),
    /// The command's stdout is not a tx response
    #[error("error parsing tx output: {0}")]
    Output(String),
    /// The chain rejected the transaction
    #[error("tx {txhash} failed with code {code}: {raw_log}")]
    Failed {
        /// Hash of the rejected transaction
        txhash: String,
        /// Non-zero ABCI response code
        code: u32,
        /// The node's log explaining the failure
        raw_log: String,
    },
}

impl From<serde_json::Error> for TxError {
    fn from(error: serde_json::Error) -> TxError {
        TxError::Output(error.to_string())
    }
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("error reading file: {0}")]
    FileIO(String),
    /// The file is not a valid config
    #[error("error parsing toml: {0}")]
    Toml(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> ConfigError {
        ConfigError::FileIO(error.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> ConfigError {
        ConfigError::Toml(error.to_string())
    }
}
