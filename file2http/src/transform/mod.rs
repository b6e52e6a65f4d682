//! Message transformers applied before publishing.
//!
//! - [`JsonUrlTransformer`] rewrites the destination URL from JSON fields
//! - [`TimestampTransformer`] scales unix-second timestamps to milliseconds
//!
//! Both parse the message as a JSON object; anything else is a
//! [`TransformError::Parse`].

pub mod json_url;
pub mod timestamp;

use serde_json::{Map, Value};
use thiserror::Error;

pub use json_url::{JsonUrlTransformer, KeyFieldPair};
pub use timestamp::TimestampTransformer;

/// Errors raised while transforming a single message.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The message is not a valid JSON object
    #[error("failed to parse message as JSON object: {0}")]
    Parse(#[source] serde_json::Error),

    /// The rewritten object could not be encoded again
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Parse a message into a JSON object.
fn parse_object(msg: &str) -> Result<Map<String, Value>, TransformError> {
    serde_json::from_str(msg).map_err(TransformError::Parse)
}
