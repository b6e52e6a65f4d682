//! HTTP transport capability.
//!
//! The publisher only needs "send method + url + body + headers, report
//! success or failure". [`HttpTransport`] implements that with a shared
//! reqwest client; tests substitute their own [`Transport`].

use std::error::Error as StdError;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// A fully resolved request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<String>,
    pub content_type: Option<String>,
}

/// The request could not be completed (connection, DNS, timeout, ...).
#[derive(Debug, Error)]
#[error("request to {url} failed: {source}")]
pub struct TransportError {
    url: String,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(url: impl Into<String>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. The response status is not inspected.
    async fn send(&self, request: HttpRequest) -> Result<(), TransportError>;
}

/// Transport backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client keeping up to `max_idle_per_host` idle connections,
    /// one per publisher is enough.
    pub fn new(max_idle_per_host: usize) -> reqwest::Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(max_idle_per_host)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<(), TransportError> {
        let url = request.url.to_string();
        let mut builder = self.client.request(request.method, request.url);

        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        match builder.send().await {
            Ok(resp) => {
                let status_code = resp.status().as_u16();
                // Drain the body so the connection goes back to the pool.
                let _ = resp.bytes().await;
                debug!(url = %url, status_code = status_code, "http_request_complete");
                Ok(())
            }
            Err(e) => Err(TransportError::new(url, e)),
        }
    }
}
