//! Time-to-live parsing for shared secrets.
//!
//! Accepts the short duration strings users type on the command line:
//! `90s`, `1m`, `2h`, `1d`, `1w`, `1y`, long forms such as `10 minutes`, and
//! bare numbers, which are milliseconds.

use thiserror::Error;

/// Shortest TTL the storage service accepts.
pub const MIN_TTL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TtlError {
    #[error("invalid TTL `{0}`; use a duration such as 1m, 2h or 1d")]
    Invalid(String),

    #[error("TTL must be at least 1 minute")]
    TooShort,
}

/// Parse a duration string into whole seconds, enforcing [`MIN_TTL_SECS`].
///
/// # Errors
///
/// Returns [`TtlError::Invalid`] for unparseable or zero durations and
/// [`TtlError::TooShort`] for anything under one minute.
pub fn parse_ttl(input: &str) -> Result<u64, TtlError> {
    let millis = parse_millis(input).ok_or_else(|| TtlError::Invalid(input.to_owned()))?;
    if millis == 0.0 {
        return Err(TtlError::Invalid(input.to_owned()));
    }
    let secs = millis / 1000.0;
    if secs < MIN_TTL_SECS as f64 {
        return Err(TtlError::TooShort);
    }
    Ok(secs as u64)
}

fn parse_millis(input: &str) -> Option<f64> {
    let s = input.trim().to_ascii_lowercase();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let factor = match unit.trim() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        "w" | "week" | "weeks" => 604_800_000.0,
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000.0,
        _ => return None,
    };
    Some(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_units() {
        assert_eq!(parse_ttl("1m"), Ok(60));
        assert_eq!(parse_ttl("2h"), Ok(7_200));
        assert_eq!(parse_ttl("1d"), Ok(86_400));
        assert_eq!(parse_ttl("1w"), Ok(604_800));
        assert_eq!(parse_ttl("90s"), Ok(90));
        assert_eq!(parse_ttl("1.5h"), Ok(5_400));
        assert_eq!(parse_ttl("10 minutes"), Ok(600));
        assert_eq!(parse_ttl("2H"), Ok(7_200));
    }

    #[test]
    fn bare_numbers_are_milliseconds() {
        assert_eq!(parse_ttl("120000"), Ok(120));
        assert_eq!(parse_ttl("500"), Err(TtlError::TooShort));
    }

    #[test]
    fn under_one_minute_rejected() {
        assert_eq!(parse_ttl("59s"), Err(TtlError::TooShort));
        assert_eq!(parse_ttl("30s"), Err(TtlError::TooShort));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(parse_ttl(""), Err(TtlError::Invalid(_))));
        assert!(matches!(parse_ttl("soon"), Err(TtlError::Invalid(_))));
        assert!(matches!(parse_ttl("5 fortnights"), Err(TtlError::Invalid(_))));
        assert!(matches!(parse_ttl("0m"), Err(TtlError::Invalid(_))));
    }
}
