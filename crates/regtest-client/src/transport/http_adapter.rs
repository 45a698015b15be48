use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::{debug, trace};

use crate::error::ClientError;

use super::{Dhttp, DhttpRequest, ResponseBody};

/// [`Dhttp`] over a pooled `reqwest` client.
///
/// Building the transport opens no connections; the first request does.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client builder uses valid static config");

        Self::with_client(client)
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dhttp for HttpTransport {
    async fn request(&self, request: DhttpRequest) -> Result<ResponseBody, ClientError> {
        let DhttpRequest { method, url, body } = request;
        debug!(http.method = %method, http.url = %url, "http request");

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder
                .header(header::CONTENT_TYPE, "text/plain")
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let body = response.text().await?;
        debug!(http.method = %method, http.url = %url, %status, body_len = body.len(), "http response");
        trace!(http.url = %url, body = %body, "http response body");

        if !status.is_success() {
            return Err(ClientError::Status { status, body });
        }

        ResponseBody::classify(body, is_json)
    }
}
