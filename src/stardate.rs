// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The [`StarDate`] instant.
//!
//! A `StarDate` stores one absolute instant as milliseconds since
//! 1970-01-01T00:00:00Z together with the [`Zone`] it is displayed in. Only
//! the instant takes part in equality, ordering and hashing.
//!
//! ```text
//! "1997 Apr 1.034170"        ──┐
//! "May 15 17:05:37 PDT 1997" ──┴─▶ StarDate ──▶ julian_date(), decimal_years(), …
//!                                            └─▶ "May 15 17:05:37 PDT 1997"
//! ```

use chrono::{DateTime, Utc};
use qtty::Days;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;
use std::str::FromStr;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar::Calendar;
use crate::error::ParseResult;
use crate::zone::Zone;

/// Milliseconds in one (civil) day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Mean tropical year, in days, as used by [`StarDate::decimal_years`].
pub const TROPICAL_YEAR_DAYS: f64 = 365.242191;

/// `Jan 01 00:00:00 PST 1970`, the zero point of [`StarDate::julian_date`].
pub const JULIAN_ANCHOR: StarDate = StarDate::from_millis(28_800_000, Zone::US_PACIFIC);

/// Julian Date of [`JULIAN_ANCHOR`].
pub const JULIAN_ANCHOR_JD: f64 = 2_440_587.833_333_333_33;

#[derive(Debug, Copy, Clone)]
pub struct StarDate {
    epoch_millis: i64,
    zone: Zone,
}

impl StarDate {
    // ── constructors ──────────────────────────────────────────────────

    /// The current instant, from the global [`Calendar`].
    pub fn now() -> Self {
        Calendar::global().now()
    }

    #[inline]
    pub const fn from_millis(epoch_millis: i64, zone: Zone) -> Self {
        Self { epoch_millis, zone }
    }

    /// Copy another value's instant (and display zone).
    #[inline]
    pub const fn from_instant(other: &StarDate) -> Self {
        Self::from_millis(other.epoch_millis, other.zone)
    }

    pub fn from_utc(datetime: DateTime<Utc>, zone: Zone) -> Self {
        Self::from_millis(datetime.timestamp_millis(), zone)
    }

    /// Parse with the global [`Calendar`]; see [`Calendar::parse`].
    pub fn parse(s: &str) -> ParseResult<Self> {
        Calendar::global().parse(s)
    }

    // ── accessors ─────────────────────────────────────────────────────

    #[inline]
    pub const fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    #[inline]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    /// The same instant, displayed in `zone`.
    #[inline]
    pub const fn with_zone(self, zone: Zone) -> Self {
        Self::from_millis(self.epoch_millis, zone)
    }

    /// Returns `None` outside chrono's representable range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.epoch_millis)
    }

    // ── mutation ──────────────────────────────────────────────────────

    #[inline]
    pub fn set_millis(&mut self, epoch_millis: i64) {
        self.epoch_millis = epoch_millis;
    }

    /// Re-parse `s` with the global [`Calendar`]. On error the value is
    /// left untouched.
    pub fn set_time(&mut self, s: &str) -> ParseResult<()> {
        self.set_time_with(s, Calendar::global())
    }

    pub fn set_time_with(&mut self, s: &str, calendar: &Calendar) -> ParseResult<()> {
        self.epoch_millis = calendar.parse_millis(s)?;
        Ok(())
    }

    /// Move forward (or back, for negative `days`) by whole days.
    #[inline]
    pub fn add_days(&mut self, days: i64) {
        self.epoch_millis += days * MILLIS_PER_DAY;
    }

    // ── arithmetic & conversions ──────────────────────────────────────

    /// Days from `other` to `self`; positive when `self` is later.
    #[inline]
    pub fn days_since(&self, other: &StarDate) -> f64 {
        let millis = i128::from(self.epoch_millis) - i128::from(other.epoch_millis);
        millis as f64 / MILLIS_PER_DAY as f64
    }

    /// [`days_since`](Self::days_since) as a [`Days`] quantity.
    #[inline]
    pub fn elapsed_since(&self, other: &StarDate) -> Days {
        Days::new(self.days_since(other))
    }

    /// The epoch millisecond count divided by the tropical year and the day
    /// length: `ms / 365.242191 / 86 400 000`.
    ///
    /// This is *not* elapsed years since a reference year; callers rely on the
    /// exact value, so it is kept as is.
    #[inline]
    pub fn decimal_years(&self) -> f64 {
        self.epoch_millis as f64 / TROPICAL_YEAR_DAYS / MILLIS_PER_DAY as f64
    }

    /// Fractional part of the day count since the epoch (truncating toward
    /// zero, so negative instants give a negative fraction).
    pub fn time_as_decimal_day(&self) -> f64 {
        let days = self.epoch_millis as f64 / MILLIS_PER_DAY as f64;
        debug!(days, "decimal day");
        days - days.trunc()
    }

    /// Julian Date of this instant.
    #[inline]
    pub fn julian_date(&self) -> f64 {
        self.days_since(&JULIAN_ANCHOR) + JULIAN_ANCHOR_JD
    }

    /// [`julian_date`](Self::julian_date) as a [`Days`] quantity.
    #[inline]
    pub fn julian_day(&self) -> Days {
        Days::new(self.julian_date())
    }

    // ── formatting ────────────────────────────────────────────────────

    /// `"<month> <day> <year>"`, e.g. `"May 15 1997"`.
    pub fn to_date_string(&self) -> String {
        match self.wall_clock() {
            Some((local, _)) => format!("{} {}", local.format("%b %d"), year(&local)),
            None => self.out_of_range(),
        }
    }

    /// Weekday, date, time, zone and year, e.g.
    /// `"Thu May 15 17:05:37 PDT 1997"`.
    pub fn to_full_string(&self) -> String {
        match self.wall_clock() {
            Some((local, zone)) => format!(
                "{} {} {}",
                local.format("%a %b %d %H:%M:%S"),
                zone,
                year(&local)
            ),
            None => self.out_of_range(),
        }
    }

    /// Julian Date as plain decimal digits, never in exponent notation:
    /// the truncated integer part followed by the shortest rendering of the
    /// fractional part from its decimal point on.
    pub fn to_julian_string(&self) -> String {
        let jd = self.julian_date();
        let whole = jd.trunc();
        let fraction = (jd - whole).to_string();
        let digits = fraction.find('.').map_or(".0", |dot| &fraction[dot..]);
        format!("{}{}", whole as i64, digits)
    }

    fn wall_clock(&self) -> Option<(chrono::NaiveDateTime, std::borrow::Cow<'static, str>)> {
        self.zone.wall_clock(self.epoch_millis)
    }

    fn out_of_range(&self) -> String {
        format!("{} ms since epoch", self.epoch_millis)
    }
}

fn year(local: &chrono::NaiveDateTime) -> String {
    use chrono::Datelike;
    format!("{:04}", local.year())
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait implementations
// ═══════════════════════════════════════════════════════════════════════════

// ── Display ───────────────────────────────────────────────────────────────

/// Date, time, zone and year without the weekday, e.g.
/// `"May 15 17:05:37 PDT 1997"`. This is the fixed parse format, so a
/// fixed-format string in the value's own zone round-trips.
impl fmt::Display for StarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.to_full_string();
        match full.split_once(' ') {
            Some((_, rest)) if self.wall_clock().is_some() => f.write_str(rest),
            _ => f.write_str(&full),
        }
    }
}

impl FromStr for StarDate {
    type Err = crate::error::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Comparison (instant only) ─────────────────────────────────────────────

impl PartialEq for StarDate {
    fn eq(&self, other: &Self) -> bool {
        self.epoch_millis == other.epoch_millis
    }
}

impl Eq for StarDate {}

impl PartialOrd for StarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch_millis.cmp(&other.epoch_millis)
    }
}

impl Hash for StarDate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch_millis.hash(state);
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

impl Sub for StarDate {
    type Output = Days;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.elapsed_since(&rhs)
    }
}

impl From<DateTime<Utc>> for StarDate {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_utc(datetime, Zone::UTC)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for StarDate {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_i64(self.epoch_millis)
    }
}

/// Deserialised values are displayed in UTC.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for StarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        Ok(Self::from_millis(millis, Zone::UTC))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
