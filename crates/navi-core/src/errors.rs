//! Error types shared across the SDK

use thiserror::Error;

/// Core errors that can occur in the SDK
#[derive(Debug, Error)]
pub enum Error {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Fullnode and REST collaborator errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Endpoint unreachable at {url}")]
    Unreachable { url: String },

    #[error("Endpoint returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("RPC returned error {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: String },

    #[error("Gave up after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },
}

/// Protocol-specific errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Protocol not available on {network}")]
    NetworkNotSupported { network: String },

    #[error("Unknown asset: {symbol}")]
    UnknownAsset { symbol: String },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Action not allowed: {reason}")]
    ActionNotAllowed { reason: String },

    #[error("Insufficient balance of {coin_type}: need {required}, have {available}")]
    InsufficientBalance {
        coin_type: String,
        required: u64,
        available: u64,
    },
}

/// Transaction building errors
#[derive(Debug, Error)]
pub enum TxError {
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Invalid object id: {id}")]
    InvalidObjectId { id: String },

    #[error("No coins provided")]
    NoCoins,

    #[error("Failed to build transaction: {message}")]
    BuildFailed { message: String },

    #[error("{count} value handle(s) left unconsumed: {handles}")]
    UnconsumedHandles { count: usize, handles: String },

    #[error("Transaction exceeds {limit} commands")]
    TooManyCommands { limit: usize },
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

impl ProtocolError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NetworkNotSupported { .. } => "network_not_supported",
            Self::UnknownAsset { .. } => "unknown_asset",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::ActionNotAllowed { .. } => "action_not_allowed",
            Self::InsufficientBalance { .. } => "insufficient_balance",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::UnknownAsset { .. } => 400,
            Self::InsufficientBalance { .. } => 422,
            Self::ActionNotAllowed { .. } | Self::NetworkNotSupported { .. } => 422,
        }
    }
}

impl RpcError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::ApiError { .. }
            | Self::ParseError(_)
            | Self::ObjectNotFound { .. }
            | Self::RetriesExhausted { .. } => false,
        }
    }
}
