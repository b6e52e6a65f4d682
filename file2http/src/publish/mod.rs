//! Publisher module: turns one message into one HTTP request.
//!
//! - [`Publisher`] applies the configured transformers and builds the request
//! - [`Transport`] sends it; [`HttpTransport`] is the reqwest implementation

pub mod publisher;
pub mod transport;

pub use publisher::{PublishError, Publisher, PublisherConfig, GET_PLACEHOLDER};
pub use transport::{HttpRequest, HttpTransport, Transport, TransportError};
