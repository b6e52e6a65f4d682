//! Configuration module for command-line and environment parsing.
//!
//! Every option can be given as a flag or through its `FILE2HTTP_*`
//! environment variable. The raw [`Args`] are validated once into an
//! immutable [`Config`] before any publisher is started.

use std::num::NonZeroUsize;
use std::thread;

use clap::Parser;
use reqwest::Method;
use thiserror::Error;
use tracing::warn;

use crate::publish::GET_PLACEHOLDER;

/// Multiplier applied to the available parallelism for the default pool size.
const PUBLISHERS_PER_CPU: usize = 5;

/// Fatal configuration errors detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config: address and method must not be empty")]
    Empty,

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid address for GET - must be a format string with exactly one %s, got '{addr}'")]
    GetAddress { addr: String },

    #[error("number of publishers must be at least 1")]
    NoPublishers,
}

/// Raw command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "file2http")]
#[command(version, about = "Read lines from stdin and send each one as an HTTP request")]
pub struct Args {
    /// HTTP address to make a request to.
    #[arg(long, env = "FILE2HTTP_ADDR", default_value = "http://localhost")]
    pub addr: String,

    /// HTTP request method.
    #[arg(long, env = "FILE2HTTP_METHOD", default_value = "GET")]
    pub method: String,

    /// HTTP header content type, set to empty to not send the header.
    #[arg(long, env = "FILE2HTTP_CONTENT_TYPE", default_value = "application/octet-stream")]
    pub content_type: String,

    /// Number of concurrent publishers (default: available CPUs * 5).
    #[arg(short = 'n', long = "publishers", env = "FILE2HTTP_PUBLISHERS")]
    pub publishers: Option<usize>,

    /// Format: KEY_TO_REPLACE:JSON_FIELD;KEY_TO_REPLACE:JSON_FIELD
    #[arg(long, env = "FILE2HTTP_TRANSFORM_JSON_URL", default_value = "")]
    pub transform_json_url: String,

    /// Comma separated list of fields that are unix timestamps and should be multiplied by 1000.
    #[arg(long, env = "FILE2HTTP_TRANSFORM_TS_FIELDS", default_value = "")]
    pub transform_ts_fields: String,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination address; a `%s` format string when the method is GET
    pub addr: String,

    /// Normalized (uppercase) HTTP method
    pub method: Method,

    /// Content-Type header value, `None` disables the header
    pub content_type: Option<String>,

    /// Number of concurrent publishers
    pub publishers: usize,

    /// URL transform rule string, `None` when disabled
    pub url_rules: Option<String>,

    /// Timestamp fields to scale, `None` when disabled
    pub timestamp_fields: Option<Vec<String>>,
}

impl Config {
    /// Parse arguments from the process command line and environment.
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::validate(Args::parse())
    }

    /// Validate raw arguments into a [`Config`].
    pub fn validate(args: Args) -> Result<Self, ConfigError> {
        let method_name = args.method.trim().to_uppercase();
        if args.addr.is_empty() || method_name.is_empty() {
            return Err(ConfigError::Empty);
        }

        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(method_name.clone()))?;

        if method == Method::GET && args.addr.matches(GET_PLACEHOLDER).count() != 1 {
            return Err(ConfigError::GetAddress { addr: args.addr });
        }

        let publishers = args.publishers.unwrap_or_else(default_publishers);
        if publishers == 0 {
            return Err(ConfigError::NoPublishers);
        }

        let url_rules = Some(args.transform_json_url).filter(|s| !s.is_empty());

        let timestamp_fields = if args.transform_ts_fields.is_empty() {
            None
        } else {
            let fields = parse_fields(&args.transform_ts_fields);
            if fields.is_empty() {
                warn!(value = %args.transform_ts_fields, "No usable timestamp fields, transform disabled");
                None
            } else {
                Some(fields)
            }
        };

        Ok(Config {
            addr: args.addr,
            method,
            content_type: Some(args.content_type).filter(|s| !s.is_empty()),
            publishers,
            url_rules,
            timestamp_fields,
        })
    }
}

/// Default pool size: available parallelism times a small constant.
pub fn default_publishers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        * PUBLISHERS_PER_CPU
}

/// Parse a comma-separated list of field names.
fn parse_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(addr: &str, method: &str) -> Args {
        Args {
            addr: addr.to_string(),
            method: method.to_string(),
            content_type: "application/octet-stream".to_string(),
            publishers: Some(4),
            transform_json_url: String::new(),
            transform_ts_fields: String::new(),
        }
    }

    #[test]
    fn test_method_is_uppercased() {
        let config = Config::validate(args("http://x/", "post")).unwrap();
        assert_eq!(config.method, Method::POST);
    }

    #[test]
    fn test_get_requires_single_placeholder() {
        assert!(Config::validate(args("http://x/?q=%s", "get")).is_ok());
        assert_eq!(
            Config::validate(args("http://x/", "GET")).unwrap_err(),
            ConfigError::GetAddress { addr: "http://x/".to_string() }
        );
        assert!(matches!(
            Config::validate(args("http://x/%s/%s", "GET")),
            Err(ConfigError::GetAddress { .. })
        ));
    }

    #[test]
    fn test_post_does_not_need_placeholder() {
        assert!(Config::validate(args("http://x/", "PUT")).is_ok());
    }

    #[test]
    fn test_empty_values_rejected() {
        assert_eq!(Config::validate(args("", "POST")).unwrap_err(), ConfigError::Empty);
        assert_eq!(Config::validate(args("http://x/", " ")).unwrap_err(), ConfigError::Empty);
    }

    #[test]
    fn test_invalid_method_rejected() {
        assert!(matches!(
            Config::validate(args("http://x/", "PO ST")),
            Err(ConfigError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_zero_publishers_rejected() {
        let mut a = args("http://x/", "POST");
        a.publishers = Some(0);
        assert_eq!(Config::validate(a).unwrap_err(), ConfigError::NoPublishers);
    }

    #[test]
    fn test_default_publishers() {
        let mut a = args("http://x/", "POST");
        a.publishers = None;
        let config = Config::validate(a).unwrap();
        assert_eq!(config.publishers, default_publishers());
        assert_eq!(config.publishers % PUBLISHERS_PER_CPU, 0);
    }

    #[test]
    fn test_empty_options_disable_features() {
        let mut a = args("http://x/", "POST");
        a.content_type = String::new();
        let config = Config::validate(a).unwrap();
        assert_eq!(config.content_type, None);
        assert_eq!(config.url_rules, None);
        assert_eq!(config.timestamp_fields, None);
    }

    #[test]
    fn test_transform_options() {
        let mut a = args("http://x/{{ID}}", "POST");
        a.transform_json_url = "{{ID}}:id".to_string();
        a.transform_ts_fields = "ts, created,,".to_string();
        let config = Config::validate(a).unwrap();
        assert_eq!(config.url_rules.as_deref(), Some("{{ID}}:id"));
        assert_eq!(
            config.timestamp_fields,
            Some(vec!["ts".to_string(), "created".to_string()])
        );
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(parse_fields("a, b ,c"), vec!["a", "b", "c"]);
        assert!(parse_fields(",").is_empty());
    }

    #[test]
    fn test_args_parse_from_flags() {
        let args = Args::try_parse_from([
            "file2http",
            "--addr",
            "http://x/",
            "--method",
            "post",
            "-n",
            "3",
            "--content-type",
            "",
        ])
        .unwrap();
        assert_eq!(args.publishers, Some(3));
        let config = Config::validate(args).unwrap();
        assert_eq!(config.publishers, 3);
        assert_eq!(config.content_type, None);
    }
}
