// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Structural validation of submitted log batches.
//!
//! Payloads are decoded to [`serde_json::Value`] by the caller; validation is
//! a pure check over the decoded value that either produces a typed
//! [`LogBatch`] or names the first rule the payload broke. The diagnostic
//! text is informational only; callers branch on Ok/Err, never on the
//! message.

use serde_json::Value;
use thiserror::Error;

const REQUIRED_BATCH_FIELDS: [&str; 3] = ["logs", "count", "collector_version"];
const REQUIRED_ENTRY_FIELDS: [&str; 3] = ["program", "message", "timestamp"];

/// First rule a submitted batch broke, in validation order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Logs field must be an array")]
    LogsNotArray,

    #[error("Count must be an integer")]
    CountNotInteger,

    #[error("Log entry {index}: missing required field: {field}")]
    EntryMissingField { index: usize, field: &'static str },

    #[error("Log entry {index}: timestamp must be integer")]
    EntryTimestampNotInteger { index: usize },

    #[error("Log entry {index}: message must be non-empty string")]
    EntryMessageInvalid { index: usize },
}

/// A single validated log line.
///
/// `message` is guaranteed non-empty and `timestamp` is a whole number of
/// unix epoch seconds. `program`, `facility` and `priority` are display-only
/// and carry whatever text the collector sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub program: String,
    pub message: String,
    pub timestamp: i64,
    pub facility: Option<String>,
    pub priority: Option<String>,
}

/// A validated submission.
///
/// `count` is the collector's advisory total; it is reported back verbatim
/// and is not required to match `logs.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBatch {
    pub logs: Vec<LogEntry>,
    pub count: i64,
    pub collector_version: String,
}

impl LogBatch {
    /// Validates a decoded payload and builds the typed batch.
    ///
    /// Entries are checked independently, in order, stopping at the first
    /// invalid one. Unknown fields anywhere are accepted.
    pub fn validate(payload: &Value) -> Result<LogBatch, ValidationError> {
        for field in REQUIRED_BATCH_FIELDS {
            // A non-object payload has no fields, so it fails here too.
            if payload.get(field).is_none() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let logs = payload["logs"]
            .as_array()
            .ok_or(ValidationError::LogsNotArray)?;
        let count = as_integer(&payload["count"]).ok_or(ValidationError::CountNotInteger)?;

        let entries = logs
            .iter()
            .enumerate()
            .map(|(index, entry)| LogEntry::validate(entry, index))
            .collect::<Result<Vec<LogEntry>, ValidationError>>()?;

        Ok(LogBatch {
            logs: entries,
            count,
            collector_version: display_string(&payload["collector_version"]),
        })
    }

    /// The advisory count as fed to the statistics counters. Negative
    /// advisory counts clamp to zero so the counters never run backwards.
    pub fn advisory_log_count(&self) -> u64 {
        u64::try_from(self.count).unwrap_or(0)
    }
}

impl LogEntry {
    fn validate(entry: &Value, index: usize) -> Result<LogEntry, ValidationError> {
        for field in REQUIRED_ENTRY_FIELDS {
            if entry.get(field).is_none() {
                return Err(ValidationError::EntryMissingField { index, field });
            }
        }

        let timestamp = as_integer(&entry["timestamp"])
            .ok_or(ValidationError::EntryTimestampNotInteger { index })?;

        let message = match &entry["message"] {
            Value::String(message) if !message.is_empty() => message.clone(),
            _ => return Err(ValidationError::EntryMessageInvalid { index }),
        };

        Ok(LogEntry {
            program: display_string(&entry["program"]),
            message,
            timestamp,
            facility: entry.get("facility").map(display_string),
            priority: entry.get("priority").map(display_string),
        })
    }
}

/// Accepts only JSON integers; floats, numeric strings and booleans are not
/// timestamps or counts.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        _ => None,
    }
}

/// Display-only fields are never rejected; non-string values keep their JSON
/// rendering.
fn display_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{LogBatch, ValidationError};

    fn valid_batch() -> serde_json::Value {
        json!({
            "logs": [
                {"program": "sshd", "message": "session opened", "timestamp": 1700000000},
                {"program": "cron", "message": "job ran", "timestamp": 1700000060,
                 "facility": "cron", "priority": "info"},
            ],
            "count": 2,
            "collector_version": "1.4.2",
        })
    }

    #[test]
    fn test_valid_batch() {
        let batch = LogBatch::validate(&valid_batch()).unwrap();
        assert_eq!(batch.count, 2);
        assert_eq!(batch.collector_version, "1.4.2");
        assert_eq!(batch.logs.len(), 2);
        assert_eq!(batch.logs[0].program, "sshd");
        assert_eq!(batch.logs[0].facility, None);
        assert_eq!(batch.logs[1].facility.as_deref(), Some("cron"));
        assert_eq!(batch.logs[1].timestamp, 1700000060);
    }

    #[test]
    fn test_empty_logs_array_is_valid() {
        let payload = json!({"logs": [], "count": 0, "collector_version": "x"});
        let batch = LogBatch::validate(&payload).unwrap();
        assert!(batch.logs.is_empty());
        assert_eq!(batch.count, 0);
    }

    #[test]
    fn test_missing_top_level_fields_named_in_order() {
        let missing_logs = json!({"count": 0, "collector_version": "x"});
        assert_eq!(
            LogBatch::validate(&missing_logs).unwrap_err(),
            ValidationError::MissingField("logs")
        );

        let missing_count = json!({"logs": [], "collector_version": "x"});
        assert_eq!(
            LogBatch::validate(&missing_count).unwrap_err(),
            ValidationError::MissingField("count")
        );

        let missing_version = json!({"logs": [], "count": 0});
        assert_eq!(
            LogBatch::validate(&missing_version).unwrap_err(),
            ValidationError::MissingField("collector_version")
        );
    }

    #[test]
    fn test_non_object_payload_reports_first_field_missing() {
        for payload in [json!([1, 2, 3]), json!("batch"), json!(42), json!(null)] {
            assert_eq!(
                LogBatch::validate(&payload).unwrap_err(),
                ValidationError::MissingField("logs")
            );
        }
    }

    #[test]
    fn test_logs_must_be_an_array() {
        let payload = json!({"logs": {"0": {}}, "count": 1, "collector_version": "x"});
        assert_eq!(
            LogBatch::validate(&payload).unwrap_err(),
            ValidationError::LogsNotArray
        );
    }

    #[test]
    fn test_count_must_be_an_integer() {
        for count in [json!(1.5), json!("2"), json!(true), json!(null)] {
            let payload = json!({"logs": [], "count": count, "collector_version": "x"});
            assert_eq!(
                LogBatch::validate(&payload).unwrap_err(),
                ValidationError::CountNotInteger
            );
        }
    }

    #[test]
    fn test_entry_missing_fields_include_index() {
        let payload = json!({
            "logs": [
                {"program": "sshd", "message": "ok", "timestamp": 1},
                {"message": "no program", "timestamp": 2},
            ],
            "count": 2,
            "collector_version": "x",
        });
        assert_eq!(
            LogBatch::validate(&payload).unwrap_err(),
            ValidationError::EntryMissingField {
                index: 1,
                field: "program"
            }
        );
    }

    #[test]
    fn test_first_invalid_entry_short_circuits() {
        let payload = json!({
            "logs": [
                {"program": "a", "timestamp": 1},
                {"message": "also broken", "timestamp": 2},
            ],
            "count": 2,
            "collector_version": "x",
        });
        assert_eq!(
            LogBatch::validate(&payload).unwrap_err(),
            ValidationError::EntryMissingField {
                index: 0,
                field: "message"
            }
        );
    }

    #[test]
    fn test_timestamp_must_be_integer() {
        for timestamp in [json!(1700000000.5), json!("1700000000"), json!(false)] {
            let payload = json!({
                "logs": [{"program": "a", "message": "m", "timestamp": timestamp}],
                "count": 1,
                "collector_version": "x",
            });
            assert_eq!(
                LogBatch::validate(&payload).unwrap_err(),
                ValidationError::EntryTimestampNotInteger { index: 0 }
            );
        }
    }

    #[test]
    fn test_message_must_be_non_empty_string() {
        for message in [json!(""), json!(17), json!(null), json!(["m"])] {
            let payload = json!({
                "logs": [{"program": "a", "message": message, "timestamp": 1}],
                "count": 1,
                "collector_version": "x",
            });
            assert_eq!(
                LogBatch::validate(&payload).unwrap_err(),
                ValidationError::EntryMessageInvalid { index: 0 }
            );
        }
    }

    #[test]
    fn test_unknown_fields_are_accepted() {
        let payload = json!({
            "logs": [{
                "program": "a", "message": "m", "timestamp": 1,
                "hostname": "web-1", "pid": 4242,
            }],
            "count": 1,
            "collector_version": "x",
            "batch_id": "abc-123",
        });
        assert!(LogBatch::validate(&payload).is_ok());
    }

    #[test]
    fn test_display_fields_are_coerced_not_rejected() {
        let payload = json!({
            "logs": [{"program": 99, "message": "m", "timestamp": 1, "priority": 3}],
            "count": 1,
            "collector_version": 2,
        });
        let batch = LogBatch::validate(&payload).unwrap();
        assert_eq!(batch.logs[0].program, "99");
        assert_eq!(batch.logs[0].priority.as_deref(), Some("3"));
        assert_eq!(batch.collector_version, "2");
    }

    #[test]
    fn test_advisory_count_clamps_negatives() {
        let payload = json!({"logs": [], "count": -7, "collector_version": "x"});
        let batch = LogBatch::validate(&payload).unwrap();
        assert_eq!(batch.count, -7);
        assert_eq!(batch.advisory_log_count(), 0);
    }

    #[test]
    fn test_error_display_names_the_rule() {
        assert_eq!(
            ValidationError::MissingField("count").to_string(),
            "Missing required field: count"
        );
        assert_eq!(
            ValidationError::EntryTimestampNotInteger { index: 3 }.to_string(),
            "Log entry 3: timestamp must be integer"
        );
        assert_eq!(
            ValidationError::EntryMessageInvalid { index: 0 }.to_string(),
            "Log entry 0: message must be non-empty string"
        );
    }
}
