//! Decoding of `GET _all/_ilm/explain` responses.
//!
//! Only the fields kept by [`FILTER_PATH`] are modelled. Anything else in the
//! payload is ignored, and missing fields fall back to empty values.

use std::collections::HashMap;

use serde::de::Error as _;
use serde::Deserialize;

use super::{null_as_default, ParseError};

pub const EXPLAIN_PATH: &str = "_all/_ilm/explain";
pub const FILTER_PATH: &str = "filter_path=indices.*.failed_step,indices.*.step_info.reason";

/// Explain response, keyed by index name. Key order carries no meaning.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct IlmExplain {
    // `filter_path` makes Elasticsearch answer `{}` when nothing matched.
    #[serde(default, deserialize_with = "null_as_default")]
    pub indices: HashMap<String, IndexIlmStatus>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexIlmStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_step: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step_info: StepInfo,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct StepInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

/// Decodes an explain response.
///
/// Nothing is returned on failure. A response that decodes but has an empty
/// index name is rejected as a whole.
pub fn decode(data: &[u8]) -> Result<IlmExplain, ParseError> {
    let value: serde_json::Value = serde_json::from_slice(data)?;

    // Structs also deserialize from arrays, which is never a valid response.
    if !value.is_object() {
        return Err(serde_json::Error::custom("expected an object at the top level").into());
    }

    let explain = IlmExplain::deserialize(value)?;

    if explain.indices.contains_key("") {
        return Err(ParseError::EmptyIndexName);
    }

    Ok(explain)
}

#[cfg(test)]
mod tests {
    use super::*;

    // curl 'http://localhost:9200/_all/_ilm/explain?filter_path=indices.*.failed_step,indices.*.step_info.reason'
    const ES_7_5_4: &str = r#"{"indices":{"mrf_fastly-20191025-000328":{"failed_step":"shrink","step_info":{"reason":"index mrf_fastly-20191025-000328 must have all shards allocated on the same node to shrink index"}},"mrf_fastly-20191026-000343":{"failed_step":"shrink","step_info":{"reason":"index mrf_fastly-20191026-000343 must have all shards allocated on the same node to shrink index"}},"mrf_fastly-20191028-000364":{"failed_step":"shrink","step_info":{"reason":"index mrf_fastly-20191028-000364 must have all shards allocated on the same node to shrink index"}}}}"#;

    #[test]
    fn test_decode_es_7_5_4() {
        let explain = decode(ES_7_5_4.as_bytes()).unwrap();

        assert_eq!(explain.indices.len(), 3);
        for (name, status) in &explain.indices {
            assert!(name.starts_with("mrf_fastly-"));
            assert_eq!(status.failed_step, "shrink");
            assert!(status
                .step_info
                .reason
                .contains("all shards allocated on the same node to shrink index"));
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        let first = decode(ES_7_5_4.as_bytes()).unwrap();
        let second = decode(ES_7_5_4.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let explain = decode(br#"{"indices":{"a":{},"b":{"failed_step":null,"step_info":null},"c":{"step_info":{}}}}"#).unwrap();

        assert_eq!(explain.indices.len(), 3);
        assert!(explain.indices.values().all(|s| *s == IndexIlmStatus::default()));
    }

    #[test]
    fn test_empty_object_has_no_indices() {
        assert!(decode(b"{}").unwrap().indices.is_empty());
        assert!(decode(br#"{"indices":{}}"#).unwrap().indices.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let explain = decode(
            br#"{"indices":{"logs-1":{"index":"logs-1","managed":true,"failed_step":"rollover","step_info":{"type":"illegal_argument_exception","reason":"alias missing"}}},"took":3}"#,
        )
        .unwrap();

        let status = &explain.indices["logs-1"];
        assert_eq!(status.failed_step, "rollover");
        assert_eq!(status.step_info.reason, "alias missing");
    }

    #[test]
    fn test_malformed_json() {
        let bodies: [&[u8]; 5] = [b"not-json", b"{\"indices\":{", b"[]", b"\"indices\"", b""];
        for body in bodies {
            assert!(
                matches!(decode(body), Err(ParseError::InvalidJson(_))),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_wrong_indices_shape() {
        assert!(matches!(
            decode(br#"{"indices":["a","b"]}"#),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_empty_index_name() {
        assert!(matches!(
            decode(br#"{"indices":{"":{"failed_step":"shrink"}}}"#),
            Err(ParseError::EmptyIndexName)
        ));
    }
}
