// File: src/error.rs
// Query error taxonomy and its mapping onto Bitcoin JSON-RPC error codes

use serde::Serialize;
use thiserror::Error;

/// Bitcoin Core / btcd JSON-RPC error codes.
pub mod codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid request object
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Also used for "command unimplemented"
    pub const MISC_ERROR: i32 = -1;
    pub const OUT_OF_RANGE: i32 = -1;
    /// Block, transaction, or output not found
    pub const INVALID_ADDRESS_OR_KEY: i32 = -5;
    pub const INVALID_PARAMETER: i32 = -8;
    pub const DECODE_HEX_STRING: i32 = -22;
}

/// Coarse classification every query failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    OutOfRange,
    DecodeError,
    Unsupported,
}

/// Failures produced by data store queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("No blocks loaded")]
    EmptyDataset,

    #[error("Block number out of range")]
    HeightOutOfRange(i64),

    #[error("Block not found")]
    BlockNotFound(String),

    #[error("Output index number (vout) does not exist for transaction.")]
    InvalidVout { txid: String, index: u32 },

    #[error("No information available about transaction {0}")]
    NoTxInfo(String),

    #[error("No information available about transaction")]
    TxNotFound(String),

    /// Caller-supplied text is not a hash
    #[error("Argument must be hexadecimal string (not {0:?})")]
    DecodeHex(String),

    /// A stored field cannot be parsed back into its typed form. The detail
    /// is logged, never sent to the caller.
    #[error("decode hex string failed")]
    Corrupt(String),

    #[error("Command unimplemented")]
    Unsupported(&'static str),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::EmptyDataset
            | QueryError::BlockNotFound(_)
            | QueryError::NoTxInfo(_)
            | QueryError::TxNotFound(_) => ErrorKind::NotFound,
            QueryError::HeightOutOfRange(_) | QueryError::InvalidVout { .. } => {
                ErrorKind::OutOfRange
            }
            QueryError::DecodeHex(_) | QueryError::Corrupt(_) => ErrorKind::DecodeError,
            QueryError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            QueryError::HeightOutOfRange(_) => codes::OUT_OF_RANGE,
            QueryError::EmptyDataset
            | QueryError::BlockNotFound(_)
            | QueryError::InvalidVout { .. }
            | QueryError::NoTxInfo(_)
            | QueryError::TxNotFound(_) => codes::INVALID_ADDRESS_OR_KEY,
            QueryError::DecodeHex(_) | QueryError::Corrupt(_) => codes::DECODE_HEX_STRING,
            QueryError::Unsupported(_) => codes::MISC_ERROR,
        }
    }
}

/// Error object placed in a JSON-RPC reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    pub fn method_not_found() -> Self {
        Self::new(codes::METHOD_NOT_FOUND, "Method not found")
    }
}

impl From<QueryError> for RpcError {
    fn from(err: QueryError) -> Self {
        if let QueryError::Corrupt(detail) = &err {
            tracing::error!(%detail, "stored record failed to decode");
        }
        Self::new(err.code(), err.to_string())
    }
}
