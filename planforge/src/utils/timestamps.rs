//! Timestamp helpers shared by the context, scheduler, and hub.

use chrono::{DateTime, Utc};

/// UTC timestamp type used throughout the crate.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// Format: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`, the shape external update
/// consumers expect on the wire.
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp_shape() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
        // Microsecond precision: six fractional digits before the offset.
        let fractional = ts.split('.').nth(1).map(|tail| &tail[..6]);
        assert!(fractional.is_some_and(|f| f.chars().all(|c| c.is_ascii_digit())));
    }
}
