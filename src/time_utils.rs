// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Absolute expiry for a token that lives `expires_in` seconds from `now`.
pub fn expiry_from_now(now: DateTime<Utc>, expires_in: i64) -> String {
    format_utc_rfc3339(now + Duration::seconds(expires_in.max(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_from_now() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(expiry_from_now(now, 3600), "2023-11-14T23:13:20Z");
        assert_eq!(expiry_from_now(now, -5), format_utc_rfc3339(now));
    }
}
