//! Prediction history entries and the pure half of reconciliation.
//!
//! Remote history arrives in several shapes and with several spellings of each field. This
//! module turns that into [`HistoryEntry`] values ([`decode_remote`]) and folds them together
//! with the local list ([`merge`]). Nothing here performs I/O; see [`crate::reconcile`] for the
//! store-backed read and write paths.
//!
//! ## Field aliases
//!
//! | field   | accepted names, highest priority first                            |
//! |---------|-------------------------------------------------------------------|
//! | `query` | `query`, `symptoms`, `history`, `symptom`, `symptom_text`         |
//! | `top`   | `top`, `top_disease`, `topDisease`, `result`                      |
//! | `when`  | `when`, `when_ts`, `checked_at`, `created_at`, `timestamp`        |

use crate::constants::{DEDUP_KEY_SEPARATOR, QUERY_SEPARATOR, WHEN_FORMAT};
use medtracker_types::SymptomToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

const QUERY_ALIASES: &[&str] = &["query", "symptoms", "history", "symptom", "symptom_text"];
const TOP_ALIASES: &[&str] = &["top", "top_disease", "topDisease", "result"];
const WHEN_ALIASES: &[&str] = &["when", "when_ts", "checked_at", "created_at", "timestamp"];

/// One past prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HistoryEntry {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub top: Option<String>,
}

impl HistoryEntry {
    pub fn new(query: impl Into<String>, when: impl Into<String>, top: Option<String>) -> Self {
        Self {
            query: query.into(),
            when: when.into(),
            top,
        }
    }

    /// Builds the entry for a prediction over `tokens`.
    pub fn for_tokens(
        tokens: &[SymptomToken],
        when: impl Into<String>,
        top: Option<String>,
    ) -> Self {
        Self::new(join_query(tokens), when, top)
    }

    /// Key used to recognise the same entry coming from two sources.
    pub fn dedup_key(&self) -> String {
        format!("{}{}{}", self.query, DEDUP_KEY_SEPARATOR, self.when)
    }
}

/// Current local time in the history display format.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(WHEN_FORMAT).to_string()
}

/// Joins tokens into the history query format (`"fever, cough"`).
pub fn join_query(tokens: &[SymptomToken]) -> String {
    tokens
        .iter()
        .map(SymptomToken::as_str)
        .collect::<Vec<_>>()
        .join(QUERY_SEPARATOR)
}

/// The shapes a `GET /api/history` response body is known to take.
#[derive(Debug, Clone, PartialEq)]
pub enum RemotePayload {
    /// `[ ... ]`
    Bare(Vec<Value>),
    /// `{ "history": [ ... ] }`
    History(Vec<Value>),
    /// `{ "rows": [ ... ] }`
    Rows(Vec<Value>),
    /// Anything else.
    Unrecognised,
}

impl RemotePayload {
    pub fn classify(body: Value) -> Self {
        match body {
            Value::Array(items) => Self::Bare(items),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove("history") {
                    Self::History(items)
                } else if let Some(Value::Array(items)) = map.remove("rows") {
                    Self::Rows(items)
                } else {
                    Self::Unrecognised
                }
            }
            _ => Self::Unrecognised,
        }
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Bare(items) | Self::History(items) | Self::Rows(items) => items,
            Self::Unrecognised => Vec::new(),
        }
    }
}

/// Decodes a remote response body into history entries.
///
/// Records that are not JSON objects are skipped. `fallback_when` is stored on records that
/// carry no timestamp.
pub fn decode_remote(body: Value, fallback_when: &str) -> Vec<HistoryEntry> {
    let payload = RemotePayload::classify(body);
    if payload == RemotePayload::Unrecognised {
        tracing::debug!("remote history payload has no recognised list; treating as empty");
    }

    payload
        .into_records()
        .iter()
        .filter_map(|record| normalize_record(record, fallback_when))
        .collect()
}

/// Normalizes one opaque remote record.
///
/// Returns `None` when `record` is not an object.
pub fn normalize_record(record: &Value, fallback_when: &str) -> Option<HistoryEntry> {
    let fields = record.as_object()?;
    let pick = |aliases: &[&str]| {
        aliases
            .iter()
            .find_map(|alias| fields.get(*alias).and_then(field_text))
    };

    Some(HistoryEntry {
        query: pick(QUERY_ALIASES).unwrap_or_default(),
        when: pick(WHEN_ALIASES).unwrap_or_else(|| fallback_when.to_owned()),
        top: pick(TOP_ALIASES),
    })
}

/// Text of a field value, or `None` if the value counts as absent.
///
/// `null`, `""`, `false` and zero are absent, so the next alias is tried.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some(true.to_string()),
        Value::Array(items) if !items.is_empty() => {
            let parts: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            parts.map(|p| p.join(QUERY_SEPARATOR))
        }
        _ => None,
    }
}

/// Merges remote and local history into one deduplicated list.
///
/// Remote entries come first in their given order, then local entries in theirs. An entry is
/// dropped when an earlier entry in the result has the same dedup key, so on a collision the
/// remote copy is the one kept.
pub fn merge(remote: Vec<HistoryEntry>, local: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    remote
        .into_iter()
        .chain(local)
        .filter(|entry| seen.insert(entry.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: &str = "2026-01-01 00:00:00";

    fn entry(query: &str, when: &str) -> HistoryEntry {
        HistoryEntry::new(query, when, None)
    }

    #[test]
    fn dedup_key_joins_query_and_when() {
        assert_eq!(entry("fever, cough", "t1").dedup_key(), "fever, cough||t1");
        assert_eq!(HistoryEntry::default().dedup_key(), "||");
    }

    #[test]
    fn for_tokens_joins_with_comma_space() {
        let tokens = vec![
            SymptomToken::new("fever").unwrap(),
            SymptomToken::new("dry cough").unwrap(),
        ];
        let e = HistoryEntry::for_tokens(&tokens, "t", Some("COVID-19".into()));
        assert_eq!(e.query, "fever, dry cough");
        assert_eq!(e.top.as_deref(), Some("COVID-19"));
    }

    #[test]
    fn classify_recognises_supported_shapes() {
        assert!(matches!(RemotePayload::classify(json!([])), RemotePayload::Bare(_)));
        assert!(matches!(
            RemotePayload::classify(json!({"history": [1]})),
            RemotePayload::History(_)
        ));
        assert!(matches!(
            RemotePayload::classify(json!({"rows": []})),
            RemotePayload::Rows(_)
        ));
        assert_eq!(RemotePayload::classify(json!({})), RemotePayload::Unrecognised);
        assert_eq!(
            RemotePayload::classify(json!({"history": "nope"})),
            RemotePayload::Unrecognised
        );
        assert_eq!(RemotePayload::classify(json!("text")), RemotePayload::Unrecognised);
    }

    #[test]
    fn classify_falls_through_to_rows_when_history_is_not_a_list() {
        let payload = RemotePayload::classify(json!({"history": null, "rows": [{"query": "a"}]}));
        assert!(matches!(payload, RemotePayload::Rows(ref r) if r.len() == 1));
    }

    #[test]
    fn normalize_uses_alias_priority() {
        let record = json!({
            "symptom_text": "ignored",
            "symptoms": "fever",
            "result": "ignored",
            "top_disease": "Malaria",
            "timestamp": "ignored",
            "checked_at": "2025-05-05 10:00:00",
        });
        let e = normalize_record(&record, NOW).unwrap();
        assert_eq!(e.query, "fever");
        assert_eq!(e.top.as_deref(), Some("Malaria"));
        assert_eq!(e.when, "2025-05-05 10:00:00");
    }

    #[test]
    fn normalize_skips_empty_and_null_aliases() {
        let record = json!({"query": "", "symptoms": "cough", "top": "", "topDisease": null, "result": "Asthma"});
        let e = normalize_record(&record, NOW).unwrap();
        assert_eq!(e.query, "cough");
        assert_eq!(e.top.as_deref(), Some("Asthma"));
    }

    #[test]
    fn normalize_skips_false_and_zero_aliases() {
        let record = json!({
            "query": false,
            "symptoms": "fever",
            "top": false,
            "result": "Flu",
            "when": 0,
            "created_at": "t1"
        });
        let e = normalize_record(&record, NOW).unwrap();
        assert_eq!(e.query, "fever");
        assert_eq!(e.top.as_deref(), Some("Flu"));
        assert_eq!(e.when, "t1");
        assert_eq!(e.dedup_key(), "fever||t1");
    }

    #[test]
    fn normalize_renders_truthy_scalars_as_text() {
        let e = normalize_record(&json!({"query": 42, "when": 1.5, "top": true}), NOW).unwrap();
        assert_eq!(e.query, "42");
        assert_eq!(e.when, "1.5");
        assert_eq!(e.top.as_deref(), Some("true"));
    }

    #[test]
    fn normalize_substitutes_fallback_when() {
        let e = normalize_record(&json!({"query": "fever"}), NOW).unwrap();
        assert_eq!(e.when, NOW);
        assert_eq!(e.top, None);
    }

    #[test]
    fn normalize_accepts_symptom_arrays_and_numbers() {
        let record = json!({"symptoms": ["fever", "chills"], "when_ts": 1700000000});
        let e = normalize_record(&record, NOW).unwrap();
        assert_eq!(e.query, "fever, chills");
        assert_eq!(e.when, "1700000000");
    }

    #[test]
    fn normalize_rejects_non_objects() {
        assert_eq!(normalize_record(&json!("fever"), NOW), None);
        assert_eq!(normalize_record(&json!(null), NOW), None);
    }

    #[test]
    fn decode_remote_reads_each_shape() {
        let rows = json!([{"query": "a", "when": "t1"}]);
        assert_eq!(decode_remote(rows.clone(), NOW), vec![entry("a", "t1")]);
        assert_eq!(decode_remote(json!({"history": rows.clone()}), NOW), vec![entry("a", "t1")]);
        assert_eq!(decode_remote(json!({"rows": rows}), NOW), vec![entry("a", "t1")]);
        assert!(decode_remote(json!({}), NOW).is_empty());
        assert!(decode_remote(json!(42), NOW).is_empty());
    }

    #[test]
    fn decode_remote_drops_non_object_records() {
        let body = json!({"history": [{"query": "a", "when": "t1"}, "junk", 3, null]});
        assert_eq!(decode_remote(body, NOW), vec![entry("a", "t1")]);
    }

    #[test]
    fn merge_prefers_remote_and_keeps_local_only_entries() {
        let remote = vec![entry("a", "t1")];
        let local = vec![entry("a", "t1"), entry("b", "t2")];
        assert_eq!(merge(remote, local), vec![entry("a", "t1"), entry("b", "t2")]);
    }

    #[test]
    fn merge_keeps_remote_version_on_collision() {
        let remote = vec![HistoryEntry::new("a", "t1", Some("Remote".into()))];
        let local = vec![HistoryEntry::new("a", "t1", Some("Local".into()))];
        let merged = merge(remote, local);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].top.as_deref(), Some("Remote"));
    }

    #[test]
    fn merge_of_identical_lists_is_idempotent() {
        let local = vec![entry("a", "t1"), entry("b", "t2"), entry("c", "t3")];
        let merged = merge(local.clone(), local.clone());
        assert_eq!(merged, local);

        let keys: HashSet<String> = merged.iter().map(HistoryEntry::dedup_key).collect();
        assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn merge_treats_same_query_different_time_as_distinct() {
        let merged = merge(vec![entry("a", "t1")], vec![entry("a", "t2")]);
        assert_eq!(merged, vec![entry("a", "t1"), entry("a", "t2")]);
    }

    #[test]
    fn merge_with_empty_remote_returns_local() {
        let local = vec![entry("a", "t1"), entry("b", "t2")];
        assert_eq!(merge(Vec::new(), local.clone()), local);
    }

    #[test]
    fn entry_serializes_missing_top_as_null() {
        let e = HistoryEntry::new("fever", "t1", None);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json, json!({"query": "fever", "when": "t1", "top": null}));
    }
}
