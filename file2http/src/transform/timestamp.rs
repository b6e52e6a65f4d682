//! Scaling of unix-second timestamp fields to milliseconds.

use serde_json::{Number, Value};

use super::{parse_object, TransformError};

const MILLIS_PER_SECOND: i64 = 1000;

/// Multiplies the configured timestamp fields by 1000.
#[derive(Debug, Clone, Default)]
pub struct TimestampTransformer {
    fields: Vec<String>,
}

impl TimestampTransformer {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    #[cfg(test)]
    pub(crate) fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Rewrite every configured field holding a number or an integer string.
    ///
    /// Converted values are always emitted as JSON numbers. Fields that are
    /// missing, hold other types or would overflow are left as they are.
    pub fn transform(&self, msg: &str) -> Result<String, TransformError> {
        let mut object = parse_object(msg)?;

        for field in &self.fields {
            let Some(value) = object.get_mut(field) else {
                continue;
            };

            let scaled = match value {
                Value::Number(n) => floor_seconds(n).and_then(to_millis),
                Value::String(s) => s.parse::<i64>().ok().and_then(to_millis),
                _ => None,
            };

            if let Some(millis) = scaled {
                *value = Value::from(millis);
            }
        }

        serde_json::to_string(&object).map_err(TransformError::Encode)
    }
}

fn floor_seconds(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }

    let f = n.as_f64()?.floor();
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn to_millis(seconds: i64) -> Option<i64> {
    seconds.checked_mul(MILLIS_PER_SECOND)
}
