use std::time::Duration;

use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;
const FRACTION_DIGITS: usize = 9;

/// Parse a playback position into a [`Duration`] from the start of the source.
///
/// Three spellings are accepted:
///
/// ```text
/// 12.5            bare seconds
/// 01:30.25        [HH:]MM:SS[.fraction], as printed by `format_timestamp`
/// 1m 30s, 250ms   unit components (h, m, s, ms), each unit at most once
/// ```
pub fn parse_position(value: &str) -> Result<Duration, PositionParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PositionParseError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(PositionParseError::Negative);
    }

    let nanos = if trimmed.contains(':') {
        parse_clock(trimmed)?
    } else {
        parse_components(trimmed)?
    };

    let secs = u64::try_from(nanos / NANOS_PER_SEC).map_err(|_| PositionParseError::TooLarge)?;
    Ok(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionParseError {
    #[error("time cannot be empty")]
    Empty,
    #[error("time cannot be negative")]
    Negative,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unknown unit '{0}'; use h, m, s or ms")]
    UnknownUnit(String),
    #[error("missing unit after '{0}'")]
    MissingUnit(String),
    #[error("unit '{0}' appears more than once")]
    DuplicateUnit(&'static str),
    #[error("clock time '{0}' must look like MM:SS or HH:MM:SS")]
    InvalidClock(String),
    #[error("'{0}' must be below 60 in a clock time")]
    ClockFieldOutOfRange(String),
    #[error("time is too large")]
    TooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl Unit {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "ms" => Some(Unit::Millisecond),
            "s" => Some(Unit::Second),
            "m" => Some(Unit::Minute),
            "h" => Some(Unit::Hour),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Millisecond => "ms",
            Unit::Second => "s",
            Unit::Minute => "m",
            Unit::Hour => "h",
        }
    }

    fn seconds_per_unit(self) -> (u128, u128) {
        // numerator / denominator, so milliseconds stay exact
        match self {
            Unit::Millisecond => (1, 1_000),
            Unit::Second => (1, 1),
            Unit::Minute => (60, 1),
            Unit::Hour => (3_600, 1),
        }
    }
}

/// Decimal number scaled to nanos-of-one, e.g. `1.5` becomes `1_500_000_000`.
fn parse_decimal(text: &str) -> Result<u128, PositionParseError> {
    let invalid = || PositionParseError::InvalidNumber(text.to_string());
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }
    if text.ends_with('.') || fraction.len() > FRACTION_DIGITS {
        return Err(invalid());
    }

    let whole: u128 = whole.parse().map_err(|_| PositionParseError::TooLarge)?;
    let fraction = format!("{fraction:0<width$}", width = FRACTION_DIGITS);
    let fraction: u128 = fraction.parse().map_err(|_| invalid())?;

    whole
        .checked_mul(NANOS_PER_SEC)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or(PositionParseError::TooLarge)
}

fn parse_clock(text: &str) -> Result<u128, PositionParseError> {
    let fields: Vec<&str> = text.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [minutes, seconds] => ("0", *minutes, *seconds),
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        _ => return Err(PositionParseError::InvalidClock(text.to_string())),
    };

    let whole_field = |field: &str| -> Result<u128, PositionParseError> {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PositionParseError::InvalidClock(text.to_string()));
        }
        field.parse().map_err(|_| PositionParseError::TooLarge)
    };

    let hours = whole_field(hours)?;
    let minutes = whole_field(minutes)?;
    if fields.len() == 3 && minutes >= 60 {
        return Err(PositionParseError::ClockFieldOutOfRange(minutes.to_string()));
    }
    let seconds_nanos = parse_decimal(seconds)?;
    if seconds_nanos >= 60 * NANOS_PER_SEC {
        return Err(PositionParseError::ClockFieldOutOfRange(seconds.to_string()));
    }

    hours
        .checked_mul(3_600)
        .and_then(|secs| secs.checked_add(minutes.checked_mul(60)?))
        .and_then(|secs| secs.checked_mul(NANOS_PER_SEC))
        .and_then(|nanos| nanos.checked_add(seconds_nanos))
        .ok_or(PositionParseError::TooLarge)
}

fn parse_components(text: &str) -> Result<u128, PositionParseError> {
    let mut rest = text;
    let mut seen: Vec<Unit> = Vec::with_capacity(4);
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after) = rest.split_at(number_len);
        let value = parse_decimal(number)?;

        let after = after.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '_');
        let unit_len = after
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after.len());
        let (symbol, after) = after.split_at(unit_len);

        let unit = if symbol.is_empty() {
            if !seen.is_empty() || !after.is_empty() {
                return Err(PositionParseError::MissingUnit(number.to_string()));
            }
            Unit::Second
        } else {
            Unit::from_symbol(symbol)
                .ok_or_else(|| PositionParseError::UnknownUnit(symbol.to_string()))?
        };
        if seen.contains(&unit) {
            return Err(PositionParseError::DuplicateUnit(unit.symbol()));
        }
        seen.push(unit);

        let (numerator, denominator) = unit.seconds_per_unit();
        let nanos = value
            .checked_mul(numerator)
            .ok_or(PositionParseError::TooLarge)?
            / denominator;
        total = total.checked_add(nanos).ok_or(PositionParseError::TooLarge)?;

        rest = after.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '_');
    }

    Ok(total)
}
