//! Chat message type and its tolerant wire decoding.
//!
//! Messages are append-only: insertion order is display order, and a message
//! is never mutated after creation. The backend timestamps messages with
//! either an RFC 3339 string or an epoch number, so `created_at` accepts
//! both shapes and settles to `None` for anything else.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single message within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Backend-issued identifier, treated as opaque.
    pub uuid: String,
    /// Authorship flag: true for the human, false for the assistant.
    pub is_human: bool,
    pub text: String,
    /// Optional creation time for display. ISO string or epoch on the wire.
    #[serde(default, deserialize_with = "deserialize_created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Epoch values this large are taken as milliseconds rather than seconds.
const EPOCH_MILLIS_CUTOFF: i64 = 100_000_000_000;

/// Accept `created_at` as RFC 3339 text, epoch seconds, or epoch
/// milliseconds. Unparseable values decode to `None` instead of failing the
/// whole message.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}

fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => {
            let epoch = n.as_i64()?;
            if epoch.abs() >= EPOCH_MILLIS_CUTOFF {
                Utc.timestamp_millis_opt(epoch).single()
            } else {
                Utc.timestamp_opt(epoch, 0).single()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rfc3339_created_at() {
        let json = r#"{"uuid":"m-1","is_human":true,"text":"hi","created_at":"2024-05-01T12:00:00Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.created_at.unwrap().to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn decodes_epoch_seconds_and_millis() {
        let seconds: Message =
            serde_json::from_str(r#"{"uuid":"m","is_human":false,"text":"","created_at":1714564800}"#)
                .unwrap();
        let millis: Message =
            serde_json::from_str(r#"{"uuid":"m","is_human":false,"text":"","created_at":1714564800000}"#)
                .unwrap();
        assert_eq!(seconds.created_at, millis.created_at);
        assert!(seconds.created_at.is_some());
    }

    #[test]
    fn missing_or_garbage_created_at_is_none() {
        let missing: Message =
            serde_json::from_str(r#"{"uuid":"m","is_human":true,"text":"x"}"#).unwrap();
        assert!(missing.created_at.is_none());

        let garbage: Message =
            serde_json::from_str(r#"{"uuid":"m","is_human":true,"text":"x","created_at":"yesterday"}"#)
                .unwrap();
        assert!(garbage.created_at.is_none());
    }

    #[test]
    fn null_created_at_is_none() {
        let msg: Message =
            serde_json::from_str(r#"{"uuid":"m","is_human":true,"text":"x","created_at":null}"#)
                .unwrap();
        assert!(msg.created_at.is_none());
    }
}
