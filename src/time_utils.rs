// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serializer;

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z`
/// suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time truncated to what the stored format can hold.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Current time in the stored timestamp format.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(now_millis())
}

/// `serialize_with` adapter for stored timestamps.
pub fn serialize_millis<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_utc_rfc3339(*date))
}

/// `serialize_with` adapter for optional stored timestamps.
pub fn serialize_millis_opt<S: Serializer>(
    date: &Option<DateTime<Utc>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serialize_millis(date, s),
        None => s.serialize_none(),
    }
}
