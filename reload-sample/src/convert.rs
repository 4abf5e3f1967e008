//! JSON to YAML re-encoding for the `/yaml` endpoint.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("YAML encoding failed: {0}")]
    Yaml(#[source] serde_yaml::Error),
}

/// Parses a JSON document. Object key order is kept as written.
pub fn parse_json(raw: &[u8]) -> Result<Value, ConvertError> {
    serde_json::from_slice(raw).map_err(ConvertError::InvalidJson)
}

pub fn to_yaml(value: &Value) -> Result<String, ConvertError> {
    serde_yaml::to_string(value).map_err(ConvertError::Yaml)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::{json, Value};

    use super::{parse_json, to_yaml, ConvertError};

    fn round_trip(raw: &str) -> (Value, Value) {
        let parsed = parse_json(raw.as_bytes()).unwrap();
        let yaml = to_yaml(&parsed).unwrap();
        let back: Value = serde_yaml::from_str(&yaml).unwrap();
        (parsed, back)
    }

    #[test]
    fn simple_document_converts_to_block_yaml() {
        let value = parse_json(br#"{"a":1,"b":[1,2]}"#).unwrap();
        let yaml = to_yaml(&value).unwrap();

        assert!(yaml.starts_with("a: 1\n"), "unexpected yaml {yaml}");
        assert!(yaml.contains("- 1\n"));
        assert!(yaml.contains("- 2\n"));
        let back: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn object_key_order_is_preserved() {
        let value = parse_json(br#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        let yaml = to_yaml(&value).unwrap();

        let zeta = yaml.find("zeta").unwrap();
        let alpha = yaml.find("alpha").unwrap();
        let mid = yaml.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid, "keys reordered in {yaml}");
    }

    #[test]
    fn documents_survive_a_round_trip() {
        let documents = [
            r#"{"a":1,"b":[1,2]}"#,
            r#"{"nested":{"list":[{"x":true},{"y":null}],"empty_obj":{},"empty_list":[]}}"#,
            r#"["true","null","1","","- dash","key: value"]"#,
            r#"{"int":-42,"big":18446744073709551615,"float":1.5,"exp":2.5e10}"#,
            r#"{"unicode":"héllo wörld ✓","multi":"line one\nline two"}"#,
            "42",
            r#""plain string""#,
            "null",
            "[]",
        ];

        for raw in documents {
            let (parsed, back) = round_trip(raw);
            assert_eq!(parsed, back, "round trip changed {raw}");
        }
    }

    #[test]
    fn malformed_json_is_rejected_before_conversion() {
        let inputs: [&[u8]; 4] = [b"{\"a\":", b"not json", b"", b"{'a':1}"];
        for raw in inputs {
            let err = parse_json(raw).unwrap_err();
            assert!(matches!(err, ConvertError::InvalidJson(_)));
        }
    }
}
