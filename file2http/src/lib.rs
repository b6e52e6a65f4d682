//! file2http - relay input lines to an HTTP endpoint.
//!
//! Every line read from the input becomes one HTTP request. Lines are handed
//! to a pool of concurrent publishers through an unbounded queue; each
//! publisher optionally rewrites the message or the destination URL from the
//! message's JSON fields before sending it.
//!
//! ## Architecture
//!
//! ```text
//! stdin → relay queue → Publisher × N → transformers → Transport (HTTP)
//! ```

pub mod config;
pub mod publish;
pub mod relay;
pub mod transform;

// Re-export commonly used types
pub use config::{Args, Config, ConfigError};
pub use publish::{HttpTransport, PublishError, Publisher, PublisherConfig, Transport};
pub use relay::RelaySummary;
pub use transform::{JsonUrlTransformer, TimestampTransformer, TransformError};
