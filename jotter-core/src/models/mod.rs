mod note;

pub use note::*;

use chrono::{DateTime, Utc};

/// Current time truncated to millisecond precision, so a timestamp
/// survives a save/load cycle unchanged.
pub(crate) fn now_ms() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
