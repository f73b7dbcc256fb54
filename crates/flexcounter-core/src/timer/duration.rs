//! Parsing of countdown targets entered by the user.
//!
//! Accepted forms:
//!
//! ```text
//! 90          plain seconds
//! 1:30        minutes:seconds
//! 1:02:03     hours:minutes:seconds
//! 1h30m, 45s  unit suffixes, each unit at most once, largest first
//! ```

use crate::error::{CoreError, Result};

/// Parse a countdown target into whole seconds.
///
/// # Errors
/// Returns [`CoreError::InvalidDuration`] for empty, negative, non-numeric or
/// overflowing input.
pub fn parse_duration(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_duration(input, "duration is empty"));
    }
    if trimmed.starts_with('-') {
        return Err(CoreError::invalid_duration(input, "duration cannot be negative"));
    }

    if trimmed.contains(':') {
        parse_clock_form(input, trimmed)
    } else if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        parse_number(input, trimmed)
    } else {
        parse_unit_form(input, trimmed)
    }
}

/// Combine separate hour/minute/second fields into seconds.
pub fn duration_from_parts(hours: u64, minutes: u64, seconds: u64) -> Result<u64> {
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(|| {
            CoreError::invalid_duration(
                &format!("{hours}h{minutes}m{seconds}s"),
                "duration is too large",
            )
        })
}

fn parse_number(input: &str, digits: &str) -> Result<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::invalid_duration(input, "expected a whole number"));
    }
    digits
        .parse::<u64>()
        .map_err(|_| CoreError::invalid_duration(input, "duration is too large"))
}

fn parse_clock_form(input: &str, trimmed: &str) -> Result<u64> {
    let fields = trimmed
        .split(':')
        .map(|field| parse_number(input, field))
        .collect::<Result<Vec<_>>>()?;

    let (hours, minutes, seconds) = match fields.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => {
            if *m >= 60 {
                return Err(CoreError::invalid_duration(input, "minutes must be below 60"));
            }
            (*h, *m, *s)
        }
        _ => {
            return Err(CoreError::invalid_duration(
                input,
                "expected MM:SS or H:MM:SS",
            ))
        }
    };
    if seconds >= 60 {
        return Err(CoreError::invalid_duration(input, "seconds must be below 60"));
    }
    duration_from_parts(hours, minutes, seconds)
        .map_err(|_| CoreError::invalid_duration(input, "duration is too large"))
}

fn parse_unit_form(input: &str, trimmed: &str) -> Result<u64> {
    const UNITS: [(char, u64); 3] = [('h', 3600), ('m', 60), ('s', 1)];

    let mut total: u64 = 0;
    let mut rest = trimmed;
    let mut next_unit = 0;

    while !rest.is_empty() {
        let split = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoreError::invalid_duration(input, "missing unit after number"))?;
        let (digits, tail) = rest.split_at(split);
        let value = parse_number(input, digits)?;

        let unit = tail.chars().next().map(|c| c.to_ascii_lowercase());
        let position = UNITS[next_unit..]
            .iter()
            .position(|(name, _)| Some(*name) == unit)
            .ok_or_else(|| CoreError::invalid_duration(input, "expected units h, m, s in that order"))?;
        let (_, factor) = UNITS[next_unit + position];
        next_unit += position + 1;

        total = value
            .checked_mul(factor)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| CoreError::invalid_duration(input, "duration is too large"))?;
        rest = &tail[1..];
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_seconds() {
        assert_eq!(parse_duration("0").unwrap(), 0);
        assert_eq!(parse_duration(" 90 ").unwrap(), 90);
    }

    #[test]
    fn accepts_clock_forms() {
        assert_eq!(parse_duration("1:30").unwrap(), 90);
        assert_eq!(parse_duration("90:00").unwrap(), 5400);
        assert_eq!(parse_duration("1:02:03").unwrap(), 3723);
    }

    #[test]
    fn accepts_unit_forms() {
        assert_eq!(parse_duration("1h30m").unwrap(), 5400);
        assert_eq!(parse_duration("45s").unwrap(), 45);
        assert_eq!(parse_duration("2H5S").unwrap(), 7205);
    }

    #[test]
    fn rejects_bad_input() {
        for bad in ["", "  ", "-5", "-1:00", "abc", "1:60", "1:60:00", "1:2:3:4", "5x", "30m1h", "1h1h", "10m5", ":30"] {
            assert!(
                matches!(parse_duration(bad), Err(CoreError::InvalidDuration { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_duration("99999999999999999999").is_err());
        assert!(parse_duration("9999999999999999999h").is_err());
        assert!(duration_from_parts(u64::MAX, 1, 0).is_err());
    }

    #[test]
    fn parts_combine() {
        assert_eq!(duration_from_parts(1, 2, 3).unwrap(), 3723);
        assert_eq!(duration_from_parts(0, 0, 0).unwrap(), 0);
    }
}
