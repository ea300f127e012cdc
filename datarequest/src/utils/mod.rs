//! Small shared helpers.

use chrono::{SecondsFormat, Utc};

/// Returns the current UTC time as an RFC 3339 string with microseconds.
///
/// ```
/// let ts = datarequest::utils::iso_timestamp();
/// assert!(ts.ends_with('Z'));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Milliseconds elapsed since `start`.
#[must_use]
pub fn elapsed_ms(start: std::time::Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_elapsed_ms_is_non_negative() {
        let start = std::time::Instant::now();
        assert!(elapsed_ms(start) >= 0.0);
    }
}
