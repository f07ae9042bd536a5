// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time zones.
//!
//! A [`Zone`] is either a fixed UTC offset (optionally carrying an
//! abbreviation such as `PDT`) or an IANA region backed by the tz database
//! through [`chrono_tz`], so historical rules (the 1974–75 emergency
//! daylight time, Alaska's 1983 move, …) apply without special cases.
//!
//! | Token | Zone |
//! |-------|------|
//! | `PST`, `EDT`, `UTC`, … | fixed offset with that abbreviation |
//! | `-0800`, `GMT+05:30` | unnamed fixed offset |
//! | `America/Los_Angeles`, `US/Pacific` | tz-database region |
//!
//! Date strings only ever carry the first two kinds; region names come from
//! configuration.

use chrono::{DateTime, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::ZoneError;

const SECS_PER_HOUR: i32 = 3_600;

/// Zone abbreviations accepted by the parsers, with their UTC offsets.
const ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("UT", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5 * SECS_PER_HOUR),
    ("EDT", -4 * SECS_PER_HOUR),
    ("CST", -6 * SECS_PER_HOUR),
    ("CDT", -5 * SECS_PER_HOUR),
    ("MST", -7 * SECS_PER_HOUR),
    ("MDT", -6 * SECS_PER_HOUR),
    ("PST", -8 * SECS_PER_HOUR),
    ("PDT", -7 * SECS_PER_HOUR),
    ("AKST", -9 * SECS_PER_HOUR),
    ("AKDT", -8 * SECS_PER_HOUR),
    ("HST", -10 * SECS_PER_HOUR),
];

/// The zone in which wall-clock times are read and written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Zone {
    /// A constant offset east of UTC.
    Fixed {
        offset_secs: i32,
        name: Option<&'static str>,
    },
    /// A tz-database region.
    Region(Tz),
}

impl Default for Zone {
    fn default() -> Self {
        Self::UTC
    }
}

impl Zone {
    pub const UTC: Self = Self::Fixed {
        offset_secs: 0,
        name: Some("UTC"),
    };

    pub const US_EASTERN: Self = Self::Region(chrono_tz::America::New_York);
    pub const US_CENTRAL: Self = Self::Region(chrono_tz::America::Chicago);
    pub const US_MOUNTAIN: Self = Self::Region(chrono_tz::America::Denver);
    pub const US_PACIFIC: Self = Self::Region(chrono_tz::America::Los_Angeles);
    pub const US_ALASKA: Self = Self::Region(chrono_tz::America::Anchorage);
    pub const US_HAWAII: Self = Self::Region(chrono_tz::Pacific::Honolulu);

    /// An unnamed fixed offset, in seconds east of UTC.
    pub const fn fixed(offset_secs: i32) -> Self {
        Self::Fixed {
            offset_secs,
            name: None,
        }
    }

    /// The host's zone as reported by the operating system, or [`Zone::UTC`]
    /// when it cannot be determined or is not in the tz database.
    pub fn host() -> Self {
        iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse().ok())
            .unwrap_or(Self::UTC)
    }

    /// Resolve a zone token as it appears inside a date string: an
    /// abbreviation (`PDT`), an RFC 822 offset (`-0700`) or a GMT offset
    /// (`GMT-07:00`). Abbreviations are case-insensitive.
    pub fn from_abbreviation(token: &str) -> Option<Self> {
        if let Some(&(name, offset_secs)) = ABBREVIATIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
        {
            return Some(Self::Fixed {
                offset_secs,
                name: Some(name),
            });
        }
        rfc822_offset(token)
            .or_else(|| gmt_offset(token))
            .map(Self::fixed)
    }

    /// UTC offset in seconds at the given instant, or `None` outside the
    /// range chrono can represent.
    pub fn offset_secs_at(&self, epoch_millis: i64) -> Option<i32> {
        match *self {
            Self::Fixed { offset_secs, .. } => Some(offset_secs),
            Self::Region(tz) => {
                let utc = DateTime::from_timestamp_millis(epoch_millis)?;
                Some(tz.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc())
            }
        }
    }

    /// Abbreviation shown for the given instant. Unnamed offsets render as
    /// `GMT±hh:mm`.
    pub fn abbreviation_at(&self, epoch_millis: i64) -> Option<Cow<'static, str>> {
        self.wall_clock(epoch_millis).map(|(_, abbreviation)| abbreviation)
    }

    /// Local wall-clock time and abbreviation of an instant.
    pub(crate) fn wall_clock(
        &self,
        epoch_millis: i64,
    ) -> Option<(NaiveDateTime, Cow<'static, str>)> {
        let utc = DateTime::from_timestamp_millis(epoch_millis)?;
        match *self {
            Self::Fixed { offset_secs, name } => {
                let local = utc
                    .naive_utc()
                    .checked_add_signed(TimeDelta::seconds(offset_secs.into()))?;
                let label = name.map_or_else(|| Cow::Owned(gmt_label(offset_secs)), Cow::Borrowed);
                Some((local, label))
            }
            Self::Region(tz) => {
                let local = utc.with_timezone(&tz);
                Some((local.naive_local(), Cow::Owned(local.format("%Z").to_string())))
            }
        }
    }

    /// Interpret a wall-clock time in this zone.
    ///
    /// Repeated autumn wall times resolve to the earlier instant. Wall times
    /// skipped by a forward transition are read one hour later, so `02:30`
    /// on a spring-forward night becomes `03:30` daylight time.
    pub fn local_to_epoch_millis(&self, local: NaiveDateTime) -> Option<i64> {
        match *self {
            Self::Fixed { offset_secs, .. } => local
                .and_utc()
                .timestamp_millis()
                .checked_sub(i64::from(offset_secs) * 1_000),
            Self::Region(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .or_else(|| {
                    let shifted = local.checked_add_signed(TimeDelta::hours(1))?;
                    tz.from_local_datetime(&shifted).earliest()
                })
                .map(|instant| instant.timestamp_millis()),
        }
    }
}

/// `+hhmm` / `-hhmm`.
fn rfc822_offset(token: &str) -> Option<i32> {
    let (sign, digits) = split_sign(token)?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    offset(sign, hours, minutes)
}

/// `GMT+h`, `GMT+hh`, `GMT+hh:mm`, `GMT+hhmm` (also with a `UTC` prefix).
fn gmt_offset(token: &str) -> Option<i32> {
    let prefix = token.get(..3)?;
    if !prefix.eq_ignore_ascii_case("GMT") && !prefix.eq_ignore_ascii_case("UTC") {
        return None;
    }
    let (sign, rest) = split_sign(&token[3..])?;
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h, m),
        Some(_) => return None,
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    if hours.is_empty()
        || hours.len() > 2
        || !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit())
    {
        return None;
    }
    offset(sign, hours.parse().ok()?, minutes.parse().ok()?)
}

fn split_sign(token: &str) -> Option<(i32, &str)> {
    if let Some(rest) = token.strip_prefix('+') {
        Some((1, rest))
    } else {
        token.strip_prefix('-').map(|rest| (-1, rest))
    }
}

fn offset(sign: i32, hours: i32, minutes: i32) -> Option<i32> {
    (hours <= 23 && minutes <= 59).then(|| sign * (hours * SECS_PER_HOUR + minutes * 60))
}

fn gmt_label(offset_secs: i32) -> String {
    if offset_secs == 0 {
        return "GMT".to_owned();
    }
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let minutes = offset_secs.unsigned_abs() / 60;
    format!("GMT{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}


// ── Configuration names ───────────────────────────────────────────────────

impl FromStr for Zone {
    type Err = ZoneError;

    /// Accepts tz-database names (`America/Los_Angeles`, `US/Pacific`,
    /// `PST8PDT`, …) as well as anything [`Zone::from_abbreviation`] accepts.
    /// Abbreviations win, so `EST` is the fixed `-05:00` offset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_abbreviation(s)
            .or_else(|| s.parse::<Tz>().ok().map(Self::Region))
            .ok_or_else(|| ZoneError::Unknown(s.to_owned()))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fixed {
                name: Some(name), ..
            } => f.write_str(name),
            Self::Fixed { offset_secs, .. } => f.write_str(&gmt_label(offset_secs)),
            Self::Region(tz) => f.write_str(tz.name()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
