//! RPC façade over the cache: typed messages, the service, and a JSON
//! dispatcher keyed by method name.

pub mod dispatch;
pub mod messages;
pub mod service;

pub use dispatch::METHODS;
pub use service::DexStateService;

use crate::error::{StateError, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] serde_json::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::State(e) => e.status(),
            RpcError::UnknownMethod(_) | RpcError::InvalidRequest(_) => StatusCode::InvalidArgument,
            RpcError::Encode(_) => StatusCode::Internal,
        }
    }
}
