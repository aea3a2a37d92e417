use chrono::{DateTime, Local};
use std::fmt::Write;

// Get current local timestamp as a formatted string
pub fn current_local_timestamp_str(format_str: &str) -> String {
    let now: DateTime<Local> = Local::now();
    format_timestamp(&now, format_str)
}

/// Falls back to RFC 3339 when `format_str` is not a valid strftime pattern.
pub fn format_timestamp(ts: &DateTime<Local>, format_str: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", ts.format(format_str)) {
        Ok(()) => out,
        Err(_) => ts.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_strftime_pattern() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(&ts, "%Y-%m-%d %H:%M:%S"), "2024-03-09 07:05:01");
    }

    #[test]
    fn invalid_pattern_does_not_panic() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(&ts, "%Q"), ts.to_rfc3339());
    }
}
