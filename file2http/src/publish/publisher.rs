//! Publishing a single message as an HTTP request.

use std::sync::Arc;

use reqwest::Method;
use thiserror::Error;
use tracing::debug;
use url::{form_urlencoded, Url};

use super::transport::{HttpRequest, Transport, TransportError};
use crate::config::Config;
use crate::transform::{JsonUrlTransformer, TimestampTransformer, TransformError};

/// Placeholder in a GET destination that receives the escaped message.
pub const GET_PLACEHOLDER: &str = "%s";

/// Per-message publish failures. None of them are retried.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("invalid endpoint '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Static publisher settings, shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub addr: String,
    pub method: Method,
    pub content_type: Option<String>,
    pub url_transformer: Option<JsonUrlTransformer>,
    pub field_transformer: Option<TimestampTransformer>,
}

impl PublisherConfig {
    pub fn new(addr: impl Into<String>, method: Method) -> Self {
        Self {
            addr: addr.into(),
            method,
            content_type: None,
            url_transformer: None,
            field_transformer: None,
        }
    }
}

impl From<&Config> for PublisherConfig {
    fn from(config: &Config) -> Self {
        Self {
            addr: config.addr.clone(),
            method: config.method.clone(),
            content_type: config.content_type.clone(),
            url_transformer: config.url_rules.as_deref().map(JsonUrlTransformer::new),
            field_transformer: config.timestamp_fields.clone().map(TimestampTransformer::new),
        }
    }
}

/// Cheaply cloneable handle; clones share configuration and transport.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    config: PublisherConfig,
    transport: Arc<dyn Transport>,
}

impl Publisher {
    pub fn new(config: PublisherConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(PublisherInner { config, transport }),
        }
    }

    /// Publish one message.
    ///
    /// The field transformer runs first, then the URL transformer on its
    /// output. GET requests ignore both: the original message is escaped
    /// into the destination template and no body is sent.
    pub async fn publish(&self, msg: &str) -> Result<(), PublishError> {
        let request = self.build_request(msg)?;
        debug!(method = %request.method, url = %request.url, "publish_sending");
        self.inner.transport.send(request).await?;
        Ok(())
    }

    fn build_request(&self, msg: &str) -> Result<HttpRequest, PublishError> {
        let config = &self.inner.config;

        let body = match &config.field_transformer {
            Some(transformer) => transformer.transform(msg)?,
            None => msg.to_string(),
        };

        let endpoint = match &config.url_transformer {
            Some(transformer) => transformer.transform(&body, &config.addr)?,
            None => config.addr.clone(),
        };

        let (endpoint, body) = if config.method == Method::GET {
            (format_get_url(&config.addr, msg), None)
        } else {
            (endpoint, Some(body))
        };

        let url = Url::parse(&endpoint).map_err(|source| PublishError::InvalidUrl {
            url: endpoint.clone(),
            source,
        })?;

        Ok(HttpRequest {
            method: config.method.clone(),
            url,
            body,
            content_type: config.content_type.clone(),
        })
    }
}

/// Substitute the query-escaped message into the template's placeholder.
fn format_get_url(template: &str, msg: &str) -> String {
    let escaped: String = form_urlencoded::byte_serialize(msg.as_bytes()).collect();
    template.replacen(GET_PLACEHOLDER, &escaped, 1)
}
