//! Abstract transport seam and the reqwest-backed implementation.

use async_trait::async_trait;
use bytes::Bytes;
use pullstring_core::{PullStringError, Result};
use serde_json::Value;
use url::Url;

/// The payload attached to an outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Raw mono 16-bit PCM samples at 16 kHz, uploaded in one request.
    Audio(Vec<u8>),
}

/// A fully assembled outbound call: target URL, credentials, payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: Url,
    pub api_key: String,
    pub body: RequestBody,
}

/// Performs a single request and returns the raw response bytes.
///
/// Implementations own connection pooling, TLS, and timeouts; this layer
/// never retries. A socket-level failure is a `Transport` error; an HTTP
/// error status with a body is not, since server error payloads decode
/// into a failure status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<Bytes>;
}

/// `Transport` backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-configured `reqwest` client, e.g. with a proxy or custom
    /// timeouts.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<Bytes> {
        let builder = self.http.post(request.url.clone()).bearer_auth(&request.api_key);
        let builder = match &request.body {
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Audio(samples) => builder
                .header(reqwest::header::CONTENT_TYPE, "audio/l16; rate=16000")
                .body(samples.clone()),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| PullStringError::Transport(e.to_string()))?;
        tracing::debug!(status = %response.status(), url = %request.url, "response received");

        response
            .bytes()
            .await
            .map_err(|e| PullStringError::Transport(e.to_string()))
    }
}
