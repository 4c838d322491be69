//! HTTP transport seam used by the fetch controller
//!
//! A transport turns an [`OutboundRequest`] into either a JSON body or a
//! [`TransportError`]. Cancellation is by dropping the returned future.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::Method;

pub mod http;

pub use http::ReqwestTransport;

/// Fully resolved request handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Map<String, Value>>,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response attached to a failure when the server answered at all
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<TransportResponse>,
}

impl TransportError {
    /// Failure before any response arrived
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// Non-success status with whatever body the server sent
    pub fn status(status: u16, data: Value) -> Self {
        Self {
            message: format!("Request failed with status code {}", status),
            response: Some(TransportResponse { status, data }),
        }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<Value, TransportError>;
}
