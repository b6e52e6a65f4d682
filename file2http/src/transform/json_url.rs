//! URL templating from JSON message fields.

use serde_json::{Number, Value};

use super::{parse_object, TransformError};

/// One substitution rule: every `key` in the URL is replaced by the value of
/// the JSON field `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFieldPair {
    pub key: String,
    pub field: String,
}

/// Rewrites a destination URL with values taken from the message.
#[derive(Debug, Clone, Default)]
pub struct JsonUrlTransformer {
    pairs: Vec<KeyFieldPair>,
}

impl JsonUrlTransformer {
    /// Build from a rule string `KEY:FIELD;KEY:FIELD;...`.
    ///
    /// Pairs that do not contain exactly one `:` are dropped.
    pub fn new(rules: &str) -> Self {
        let pairs = rules
            .split(';')
            .filter_map(|pair| {
                let mut parts = pair.split(':');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(key), Some(field), None) => Some(KeyFieldPair {
                        key: key.to_string(),
                        field: field.to_string(),
                    }),
                    _ => None,
                }
            })
            .collect();

        Self { pairs }
    }

    #[cfg(test)]
    pub(crate) fn pairs(&self) -> &[KeyFieldPair] {
        &self.pairs
    }

    /// Substitute rule values into `url`.
    ///
    /// Strings are used verbatim and numbers are truncated to integers.
    /// Rules whose field is missing or of any other type leave their
    /// placeholder untouched.
    pub fn transform(&self, msg: &str, url: &str) -> Result<String, TransformError> {
        let object = parse_object(msg)?;

        let mut url = url.to_string();
        for pair in &self.pairs {
            let value = match object.get(&pair.field) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => truncated(n),
                _ => continue,
            };
            url = url.replace(&pair.key, &value);
        }

        Ok(url)
    }
}

/// Render a JSON number truncated toward zero, without a decimal point.
fn truncated(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // Saturates outside the i64 range.
        (n.as_f64().unwrap_or_default().trunc() as i64).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost/test/{{FIELD}}/123/{{ABCD}}/abc";

    fn transformer() -> JsonUrlTransformer {
        JsonUrlTransformer::new("{{FIELD}}:field;{{ABCD}}:abcd")
    }

    #[test]
    fn test_rule_parsing_drops_malformed_pairs() {
        let t = JsonUrlTransformer::new("{{A}}:a;broken;x:y:z;;{{B}}:b");
        assert_eq!(
            t.pairs(),
            &[
                KeyFieldPair { key: "{{A}}".into(), field: "a".into() },
                KeyFieldPair { key: "{{B}}".into(), field: "b".into() },
            ]
        );
        assert!(JsonUrlTransformer::new("").pairs().is_empty());
    }

    #[test]
    fn test_substitutions() {
        let cases = [
            (r#"{"field": "str_value"}"#, "http://localhost/test/str_value/123/{{ABCD}}/abc"),
            (r#"{"field": 555}"#, "http://localhost/test/555/123/{{ABCD}}/abc"),
            (r#"{"field": ""}"#, "http://localhost/test//123/{{ABCD}}/abc"),
            (r#"{"field": -1}"#, "http://localhost/test/-1/123/{{ABCD}}/abc"),
            (r#"{"abcd": "abcd"}"#, "http://localhost/test/{{FIELD}}/123/abcd/abc"),
            (r#"{"field": "blub","abcd": "abcd"}"#, "http://localhost/test/blub/123/abcd/abc"),
            (r#"{"123": "blub","456": "abcd"}"#, URL),
        ];

        let t = transformer();
        for (msg, expected) in cases {
            assert_eq!(t.transform(msg, URL).unwrap(), expected, "msg: {msg}");
        }
    }

    #[test]
    fn test_unmatched_placeholder_left_verbatim() {
        let t = JsonUrlTransformer::new("{{FIELD}}:field");
        let res = t.transform(r#"{"other":"field"}"#, "http://x/{{FIELD}}/x").unwrap();
        assert_eq!(res, "http://x/{{FIELD}}/x");
    }

    #[test]
    fn test_non_scalar_values_skipped() {
        let t = transformer();
        for msg in [
            r#"{"field": null}"#,
            r#"{"field": true}"#,
            r#"{"field": {"a": 1}}"#,
            r#"{"field": [1, 2]}"#,
        ] {
            assert_eq!(t.transform(msg, URL).unwrap(), URL, "msg: {msg}");
        }
    }

    #[test]
    fn test_float_truncates_toward_zero() {
        let t = JsonUrlTransformer::new("{{N}}:n");
        assert_eq!(t.transform(r#"{"n": 12.9}"#, "/{{N}}").unwrap(), "/12");
        assert_eq!(t.transform(r#"{"n": -12.9}"#, "/{{N}}").unwrap(), "/-12");
        assert_eq!(t.transform(r#"{"n": 1e3}"#, "/{{N}}").unwrap(), "/1000");
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let t = JsonUrlTransformer::new("{{ID}}:id");
        let res = t.transform(r#"{"id": "7"}"#, "http://x/{{ID}}/y/{{ID}}?id={{ID}}").unwrap();
        assert_eq!(res, "http://x/7/y/7?id=7");
    }

    #[test]
    fn test_invalid_json_fails() {
        let t = transformer();
        for msg in [r#"{"field": <<borked>>}"#, r#"{"field": 11-11}"#, "not json", "[1,2]"] {
            assert!(
                matches!(t.transform(msg, URL), Err(TransformError::Parse(_))),
                "should have failed, msg: {msg}"
            );
        }
    }
}
