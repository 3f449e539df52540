//! Clock and identifier helpers: record timestamps and audit event ids.

use chrono::{SecondsFormat, Utc};
use ulid::Ulid;

/// Milliseconds since the unix epoch; the raw material for record ids.
pub fn now_epoch_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// RFC 3339 UTC timestamp with millisecond precision (e.g. `2026-01-01T10:00:00.000Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}
