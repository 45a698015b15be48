//! HTTP transport abstraction.
//!
//! Defines the [`Dhttp`] trait the client issues every request through, a
//! `reqwest` implementation ([`HttpTransport`]) and a fake regtest node for
//! tests (`mock::MockNode`).

mod http_adapter;
#[cfg(test)]
pub mod mock;

pub use http_adapter::HttpTransport;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::error::ClientError;

/// One outbound request: method, absolute URL and an optional text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

impl DhttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A successful response body, classified by content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Json(serde_json::Value),
}

impl ResponseBody {
    /// Classify a raw body. JSON bodies that fail to parse are an error.
    pub fn classify(raw: String, is_json: bool) -> Result<Self, ClientError> {
        if raw.is_empty() {
            return Ok(Self::Empty);
        }
        if !is_json {
            return Ok(Self::Text(raw));
        }
        serde_json::from_str(&raw)
            .map(Self::Json)
            .map_err(|e| ClientError::InvalidResponse(format!("decode JSON body: {e}; body={raw}")))
    }
}

/// The request/response primitive every client operation is built on.
///
/// Implementations resolve with the parsed body of a 2xx response and map
/// any other status to [`ClientError::Status`].
#[async_trait]
pub trait Dhttp: Send + Sync {
    async fn request(&self, request: DhttpRequest) -> Result<ResponseBody, ClientError>;
}
