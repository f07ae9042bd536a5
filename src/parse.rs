// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Date-string grammars.
//!
//! - **Fixed format**: `MMM dd HH:mm:ss Z yyyy`, e.g.
//!   `"May 15 17:05:37 PDT 1997"`. Field widths are exact and separators are
//!   single spaces.
//! - **Free form**: a lenient, order-insensitive token grammar (`"1997 Apr 1"`,
//!   `"Tuesday, April 1, 1997 6:30 PM EST"`, `"4/1/1997"`), used for the
//!   whole-day part of fractional-day strings.
//! - **Day fraction**: the `.nnn` tail of a fractional-day string.
//!
//! All functions here are pure; the time-zone probe and clock fallback live
//! in [`Calendar`](crate::Calendar).

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::stardate::MILLIS_PER_DAY;
use crate::zone::Zone;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Split a fractional-day string at its first `.`.
///
/// Returns `(main, fraction)` where `fraction` keeps the leading dot. A dot
/// in the first position does not count.
pub(crate) fn split_fraction(s: &str) -> Option<(&str, &str)> {
    match s.find('.') {
        Some(dot) if dot > 0 => Some(s.split_at(dot)),
        _ => None,
    }
}

/// Parse a `.nnn` day fraction into whole milliseconds (rounded).
///
/// Only a dot followed by one or more ASCII digits is accepted, so the result
/// always lies in `0..=MILLIS_PER_DAY`.
pub(crate) fn day_fraction_millis(input: &str, fraction: &str) -> ParseResult<i64> {
    let malformed = || ParseError::new(input, ParseErrorKind::Fraction(fraction.to_owned()));
    let digits = fraction
        .trim()
        .strip_prefix('.')
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(malformed)?;
    let value: f64 = format!("0.{digits}").parse().map_err(|_| malformed())?;
    Ok((value * MILLIS_PER_DAY as f64).round() as i64)
}

// ═══════════════════════════════════════════════════════════════════════════
// Fixed format
// ═══════════════════════════════════════════════════════════════════════════

/// Parse `MMM dd HH:mm:ss Z yyyy` into epoch milliseconds.
pub(crate) fn parse_fixed(input: &str) -> ParseResult<i64> {
    let fail = |kind| ParseError::new(input, kind);
    let field = |field: &'static str, value: &str| {
        fail(ParseErrorKind::Field {
            field,
            value: value.to_owned(),
        })
    };

    let fields: Vec<&str> = input.split(' ').collect();
    let &[month, day, clock, zone, year] = fields.as_slice() else {
        return Err(fail(ParseErrorKind::Shape));
    };

    let month_number = Some(month)
        .filter(|m| m.len() == 3)
        .and_then(month_from_name)
        .ok_or_else(|| fail(ParseErrorKind::Month(month.to_owned())))?;
    let day_number = digits(day, 2).ok_or_else(|| field("day", day))?;

    let clock_fields: Vec<&str> = clock.split(':').collect();
    let &[hour, minute, second] = clock_fields.as_slice() else {
        return Err(field("time", clock));
    };
    let hour = digits(hour, 2).ok_or_else(|| field("hour", hour))?;
    let minute = digits(minute, 2).ok_or_else(|| field("minute", minute))?;
    let second = digits(second, 2).ok_or_else(|| field("second", second))?;

    let zone =
        Zone::from_abbreviation(zone).ok_or_else(|| fail(ParseErrorKind::Zone(zone.to_owned())))?;
    let year = digits(year, 4).ok_or_else(|| field("year", year))?;

    wall_time(year as i32, month_number, day_number, (hour, minute, second))
        .and_then(|local| zone.local_to_epoch_millis(local))
        .ok_or_else(|| fail(ParseErrorKind::InvalidDate))
}

/// Exactly `width` ASCII digits.
fn digits(s: &str, width: usize) -> Option<u32> {
    if s.len() == width && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn wall_time(year: i32, month: u32, day: u32, (h, m, s): (u32, u32, u32)) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(h, m, s)
}

/// Month number from an English name or any prefix of at least three letters.
fn month_from_name(token: &str) -> Option<u32> {
    prefix_index(&MONTHS, token).map(|i| i as u32 + 1)
}

fn prefix_index(names: &[&str], token: &str) -> Option<usize> {
    if token.len() < 3 || !token.is_ascii() {
        return None;
    }
    let token = token.to_ascii_lowercase();
    names.iter().position(|name| name.starts_with(&token))
}

// ═══════════════════════════════════════════════════════════════════════════
// Free form
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    clock: Option<(u32, u32, u32)>,
    pm: Option<bool>,
    zone: Option<Zone>,
}

/// Parse a free-form date. Wall times without a zone token are read in
/// `default_zone`; a missing time of day means local midnight.
pub(crate) fn parse_lenient(input: &str, default_zone: Zone) -> ParseResult<i64> {
    let fail = |kind| ParseError::new(input, kind);
    let bad_token = |token: &str| {
        fail(ParseErrorKind::Field {
            field: "token",
            value: token.to_owned(),
        })
    };

    let mut fields = Fields::default();
    let tokens = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    for token in tokens {
        if token.contains(':') && !is_offset_like(token) {
            fields.clock = Some(clock_of_day(token).ok_or_else(|| bad_token(token))?);
        } else if token.contains('/') {
            let (m, d, y) = slashed_date(token).ok_or_else(|| bad_token(token))?;
            fields.month = Some(m);
            fields.day = Some(d);
            fields.year = Some(y);
        } else if token.bytes().all(|b| b.is_ascii_digit()) {
            let n: i32 = token.parse().map_err(|_| bad_token(token))?;
            if token.len() >= 3 {
                fields.year = Some(n);
            } else if n >= 32 {
                fields.year = Some(expand_year(n));
            } else if fields.day.is_none() {
                fields.day = Some(n as u32);
            } else if fields.year.is_none() {
                fields.year = Some(expand_year(n));
            } else {
                return Err(bad_token(token));
            }
        } else if token.eq_ignore_ascii_case("am") || token.eq_ignore_ascii_case("pm") {
            fields.pm = Some(token.eq_ignore_ascii_case("pm"));
        } else if let Some(month) = month_from_name(token) {
            fields.month = Some(month);
        } else if prefix_index(&WEEKDAYS, token).is_some() {
            // weekday names carry no information
        } else if let Some(zone) = Zone::from_abbreviation(token) {
            fields.zone = Some(zone);
        } else {
            return Err(bad_token(token));
        }
    }

    let year = fields
        .year
        .ok_or_else(|| fail(ParseErrorKind::Incomplete("year")))?;
    let month = fields
        .month
        .ok_or_else(|| fail(ParseErrorKind::Incomplete("month")))?;
    let day = fields
        .day
        .ok_or_else(|| fail(ParseErrorKind::Incomplete("day")))?;

    let (mut hour, minute, second) = fields.clock.unwrap_or((0, 0, 0));
    match fields.pm {
        Some(_) if hour == 0 || hour > 12 => {
            return Err(fail(ParseErrorKind::InvalidDate));
        }
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }

    let zone = fields.zone.unwrap_or(default_zone);
    wall_time(year, month, day, (hour, minute, second))
        .and_then(|local| zone.local_to_epoch_millis(local))
        .ok_or_else(|| fail(ParseErrorKind::InvalidDate))
}

/// `GMT+05:30` style tokens contain a colon but are zones, not times.
fn is_offset_like(token: &str) -> bool {
    token.contains(['+', '-'])
}

/// `H:MM`, `HH:MM` or `HH:MM:SS`.
fn clock_of_day(token: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = token.split(':').collect();
    let (hour, minute, second) = match parts.as_slice() {
        &[h, m] => (h, m, "00"),
        &[h, m, s] => (h, m, s),
        _ => return None,
    };
    let hour = if hour.len() == 1 {
        digits(hour, 1)?
    } else {
        digits(hour, 2)?
    };
    Some((hour, digits(minute, 2)?, digits(second, 2)?))
}

/// `M/D/Y` with one- or two-digit month and day.
fn slashed_date(token: &str) -> Option<(u32, u32, i32)> {
    let parts: Vec<&str> = token.split('/').collect();
    let &[m, d, y] = parts.as_slice() else {
        return None;
    };
    let small = |s: &str| (1..=2).find_map(|w| digits(s, w));
    let year = if y.len() == 4 {
        digits(y, 4)? as i32
    } else {
        expand_year(digits(y, 2)? as i32)
    };
    Some((small(m)?, small(d)?, year))
}

/// Two-digit years belong to the twentieth century.
fn expand_year(n: i32) -> i32 {
    if n < 100 {
        1900 + n
    } else {
        n
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;
    const MAY_15_1997_PDT: i64 = 863_741_137_000;
    const APR_1_1997_PST: i64 = 859_881_600_000;

    #[test]
    fn fixed_form_with_abbreviation() {
        assert_eq!(parse_fixed("May 15 17:05:37 PDT 1997"), Ok(MAY_15_1997_PDT));
        assert_eq!(
            parse_fixed("May 15 17:05:37 PST 1997"),
            Ok(MAY_15_1997_PDT + HOUR_MS)
        );
        assert_eq!(parse_fixed("may 16 00:05:37 UTC 1997"), Ok(MAY_15_1997_PDT));
    }

    #[test]
    fn fixed_form_with_numeric_offsets() {
        assert_eq!(parse_fixed("May 15 17:05:37 -0700 1997"), Ok(MAY_15_1997_PDT));
        assert_eq!(parse_fixed("May 15 17:05:37 GMT-07:00 1997"), Ok(MAY_15_1997_PDT));
    }

    #[test]
    fn fixed_form_rejects_short_fields() {
        let err = parse_fixed("May 5 17:5:37 PDT 1997").unwrap_err();
        assert_eq!(err.input(), "May 5 17:5:37 PDT 1997");
        assert!(matches!(err.kind(), ParseErrorKind::Field { field: "day", .. }));

        let err = parse_fixed("May 05 17:5:37 PDT 1997").unwrap_err();
        assert!(matches!(err.kind(), ParseErrorKind::Field { field: "minute", .. }));

        assert!(parse_fixed("Jan 1 00:00:00 PST 1970").is_err());
        assert!(parse_fixed("May 15 17:05:37 PDT 97").is_err());
    }

    #[test]
    fn fixed_form_rejects_bad_shape_and_values() {
        assert_eq!(
            parse_fixed("May 15 17:05:37 PDT").unwrap_err().kind(),
            &ParseErrorKind::Shape
        );
        assert_eq!(
            parse_fixed("May  15 17:05:37 PDT 1997").unwrap_err().kind(),
            &ParseErrorKind::Shape
        );
        assert_eq!(
            parse_fixed("Mayo 15 17:05:37 PDT 1997").unwrap_err().kind(),
            &ParseErrorKind::Month("Mayo".into())
        );
        assert_eq!(
            parse_fixed("May 15 17:05:37 XST 1997").unwrap_err().kind(),
            &ParseErrorKind::Zone("XST".into())
        );
        assert_eq!(
            parse_fixed("Feb 30 17:05:37 UTC 1997").unwrap_err().kind(),
            &ParseErrorKind::InvalidDate
        );
        assert_eq!(
            parse_fixed("May 15 24:00:00 UTC 1997").unwrap_err().kind(),
            &ParseErrorKind::InvalidDate
        );
    }

    #[test]
    fn lenient_year_month_day() {
        assert_eq!(parse_lenient("1997 Apr 1", Zone::US_PACIFIC), Ok(APR_1_1997_PST));
        assert_eq!(parse_lenient("Apr 1 1997", Zone::US_PACIFIC), Ok(APR_1_1997_PST));
        assert_eq!(parse_lenient("4/1/1997", Zone::US_PACIFIC), Ok(APR_1_1997_PST));
        assert_eq!(
            parse_lenient("Tuesday, April 1, 1997", Zone::US_PACIFIC),
            Ok(APR_1_1997_PST)
        );
        assert_eq!(
            parse_lenient("1997 Apr 1", Zone::UTC),
            Ok(APR_1_1997_PST - 8 * HOUR_MS)
        );
    }

    #[test]
    fn lenient_time_zone_and_meridiem() {
        assert_eq!(
            parse_lenient("May 15 1997 5:05:37 PM PDT", Zone::UTC),
            Ok(MAY_15_1997_PDT)
        );
        assert_eq!(
            parse_lenient("1997 May 16 00:05:37 GMT+00:00", Zone::US_PACIFIC),
            Ok(MAY_15_1997_PDT)
        );
        assert_eq!(
            parse_lenient("1997 May 16 12:05:37 AM", Zone::UTC),
            Ok(MAY_15_1997_PDT)
        );
    }

    #[test]
    fn lenient_two_digit_year() {
        assert_eq!(parse_lenient("Apr 1 97", Zone::US_PACIFIC), Ok(APR_1_1997_PST));
        assert_eq!(parse_lenient("4/1/97", Zone::US_PACIFIC), Ok(APR_1_1997_PST));
    }

    #[test]
    fn lenient_failures() {
        assert_eq!(
            parse_lenient("Apr 1", Zone::UTC).unwrap_err().kind(),
            &ParseErrorKind::Incomplete("year")
        );
        assert_eq!(
            parse_lenient("1997 1", Zone::UTC).unwrap_err().kind(),
            &ParseErrorKind::Incomplete("month")
        );
        assert!(parse_lenient("not a date", Zone::UTC).is_err());
        assert!(parse_lenient("1997 Feb 30", Zone::UTC).is_err());
        assert!(parse_lenient("1997 Feb 3 13:00 PM", Zone::UTC).is_err());
        assert!(parse_lenient("", Zone::UTC).is_err());
    }

    #[test]
    fn clock_glued_to_offset_is_an_unknown_token() {
        // Offsets must stand alone; `12:00-0800` reads as neither a time nor a zone.
        assert_eq!(
            parse_lenient("1997 Apr 1 12:00-0800", Zone::UTC).unwrap_err().kind(),
            &ParseErrorKind::Field {
                field: "token",
                value: "12:00-0800".to_owned()
            }
        );
        assert_eq!(
            parse_lenient("1997 Apr 1 12:00 -0800", Zone::UTC),
            Ok(APR_1_1997_PST + 12 * HOUR_MS)
        );
    }

    #[test]
    fn fraction_split_and_value() {
        assert_eq!(split_fraction("1997 Apr 1.034170"), Some(("1997 Apr 1", ".034170")));
        assert_eq!(split_fraction(".5"), None);
        assert_eq!(split_fraction("May 15 17:05:37 PDT 1997"), None);

        assert_eq!(day_fraction_millis("x", ".034170"), Ok(2_952_288));
        assert_eq!(day_fraction_millis("x", ".5"), Ok(43_200_000));
        assert_eq!(day_fraction_millis("x", ".5 "), Ok(43_200_000));
        // 0.0000001 day = 8.64 ms
        assert_eq!(day_fraction_millis("x", ".0000001"), Ok(9));
        assert!(day_fraction_millis("x", ".5.3").is_err());
        assert!(day_fraction_millis("x", ".").is_err());
    }

    #[test]
    fn fraction_accepts_only_digits() {
        for fraction in [".5e12", ".5E-3", ".inf", ".NaN", ". 5", ".-5", ".+5", ".5_0"] {
            assert_eq!(
                day_fraction_millis("x", fraction).unwrap_err().kind(),
                &ParseErrorKind::Fraction(fraction.to_owned()),
                "{fraction}"
            );
        }
        assert_eq!(day_fraction_millis("x", ".999999999999"), Ok(MILLIS_PER_DAY));
        assert_eq!(day_fraction_millis("x", ".0"), Ok(0));
    }
}
