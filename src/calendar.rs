// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Parse context.
//!
//! A [`Calendar`] bundles what parsing depends on beyond the input string:
//! the [`Settings`] (zone for zone-less wall times), a [`Clock`] used when a
//! fractional-day string has an unreadable date part, and the one-time
//! [`TimeZoneProbe`].
//!
//! [`Calendar::global`] is the process-wide instance used by
//! [`StarDate::parse`] and friends; it is built from the environment on
//! first use. Independent calendars can be created for tests or embedding.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::parse;
use crate::stardate::StarDate;
use crate::zone::Zone;

const PROBE_STANDARD: &str = "May 15 17:05:37 PST 1997";
const PROBE_DAYLIGHT: &str = "May 15 17:05:37 PDT 1997";

// ═══════════════════════════════════════════════════════════════════════════
// TimeZoneProbe
// ═══════════════════════════════════════════════════════════════════════════

/// Detects parsers that apply daylight-saving offsets based on the host's
/// current DST state rather than the zone named in the string.
///
/// The same wall-clock time is parsed once as `PST` and once as `PDT`; a
/// correct parser yields instants one hour apart. Equal instants mean the
/// zone abbreviation was ignored. The check runs at most once per probe, even
/// under concurrent first use, and the diagnostic is emitted at most once.
#[derive(Debug, Default)]
pub struct TimeZoneProbe {
    result: OnceLock<bool>,
    runs: AtomicUsize,
}

impl TimeZoneProbe {
    pub const fn new() -> Self {
        Self {
            result: OnceLock::new(),
            runs: AtomicUsize::new(0),
        }
    }

    /// Run the check on first call; later calls return the cached answer.
    pub fn has_time_zone_bug(&self) -> bool {
        *self.result.get_or_init(|| {
            self.runs.fetch_add(1, Ordering::Relaxed);
            detect_time_zone_bug()
        })
    }

    /// The cached answer, if the check has run.
    pub fn result(&self) -> Option<bool> {
        self.result.get().copied()
    }

    /// How many times the check itself has executed (zero or one).
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::Relaxed)
    }
}

fn detect_time_zone_bug() -> bool {
    match (
        parse::parse_fixed(PROBE_STANDARD),
        parse::parse_fixed(PROBE_DAYLIGHT),
    ) {
        (Ok(standard), Ok(daylight)) => {
            let bug = standard == daylight;
            if bug {
                warn!("You have the time zone bug!");
            } else {
                debug!(
                    offset_ms = standard - daylight,
                    "time zone abbreviations honoured"
                );
            }
            bug
        }
        (Err(err), _) | (_, Err(err)) => {
            debug!(%err, "time zone probe could not parse its reference dates");
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Calendar
// ═══════════════════════════════════════════════════════════════════════════

pub struct Calendar {
    settings: Settings,
    clock: Arc<dyn Clock>,
    probe: TimeZoneProbe,
}

impl Calendar {
    /// A calendar reading the system clock.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            clock: Arc::new(SystemClock),
            probe: TimeZoneProbe::new(),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The process-wide calendar, configured from the environment on first use.
    pub fn global() -> &'static Calendar {
        static GLOBAL: OnceLock<Calendar> = OnceLock::new();
        GLOBAL.get_or_init(|| Calendar::new(Settings::from_env()))
    }

    #[inline]
    pub fn zone(&self) -> Zone {
        self.settings.zone
    }

    #[inline]
    pub fn probe(&self) -> &TimeZoneProbe {
        &self.probe
    }

    /// Run (or recall) the time-zone probe regardless of the settings.
    pub fn has_time_zone_bug(&self) -> bool {
        self.probe.has_time_zone_bug()
    }

    /// The current instant, displayed in this calendar's zone.
    pub fn now(&self) -> StarDate {
        StarDate::from_millis(self.clock.now_millis(), self.settings.zone)
    }

    /// Parse a fractional-day or fixed-format date string.
    ///
    /// A fractional-day string whose date part cannot be read does **not**
    /// fail: the current clock time is used instead and the fraction is added
    /// to it. Only a malformed fraction or a malformed fixed-format string is
    /// an error.
    pub fn parse(&self, s: &str) -> ParseResult<StarDate> {
        let millis = self.parse_millis(s)?;
        Ok(StarDate::from_millis(millis, self.settings.zone))
    }

    pub(crate) fn parse_millis(&self, s: &str) -> ParseResult<i64> {
        if self.settings.probe_time_zone_bug {
            self.probe.has_time_zone_bug();
        }

        let Some((main, fraction)) = parse::split_fraction(s) else {
            return parse::parse_fixed(s);
        };
        let correction = parse::day_fraction_millis(s, fraction)?;
        let base = match parse::parse_lenient(main, self.settings.zone) {
            Ok(millis) => millis,
            Err(err) => {
                warn!(input = s, %err, "error initializing time, using the current time");
                self.clock.now_millis()
            }
        };
        base.checked_add(correction)
            .ok_or_else(|| ParseError::new(s, ParseErrorKind::InvalidDate))
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("settings", &self.settings)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ParseErrorKind;

    const DAY_MS: i64 = 86_400_000;
    const APR_1_1997_PST: i64 = 859_881_600_000;

    fn pacific() -> Calendar {
        Calendar::new(Settings::default().with_zone(Zone::US_PACIFIC))
    }

    #[test]
    fn probe_runs_once_and_reports_no_bug() {
        let calendar = pacific();
        assert_eq!(calendar.probe().runs(), 0);
        assert_eq!(calendar.probe().result(), None);

        for _ in 0..5 {
            calendar.parse("May 15 17:05:37 PDT 1997").unwrap();
            calendar.parse("1997 Apr 1.5").unwrap();
        }
        assert_eq!(calendar.probe().runs(), 1);
        assert_eq!(calendar.probe().result(), Some(false));
        assert!(!calendar.has_time_zone_bug());
        assert_eq!(calendar.probe().runs(), 1);
    }

    #[test]
    fn probe_runs_once_under_concurrent_first_use() {
        let calendar = pacific();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| calendar.parse("Jan 01 00:00:00 PST 1970").unwrap());
            }
        });
        assert_eq!(calendar.probe().runs(), 1);
    }

    #[test]
    fn probe_can_be_disabled() {
        let calendar = Calendar::new(Settings::default().with_time_zone_probe(false));
        calendar.parse("May 15 17:05:37 PDT 1997").unwrap();
        assert_eq!(calendar.probe().runs(), 0);
        assert!(!calendar.has_time_zone_bug());
        assert_eq!(calendar.probe().runs(), 1);
    }

    #[test]
    fn fractional_day_is_added_to_local_midnight() {
        let calendar = pacific();
        let midnight = calendar.parse("1997 Apr 1.0").unwrap();
        let noon = calendar.parse("1997 Apr 1.5").unwrap();
        assert_eq!(midnight.epoch_millis(), APR_1_1997_PST);
        assert_eq!(noon.epoch_millis() - midnight.epoch_millis(), DAY_MS / 2);

        let sample = calendar.parse("1997 Apr 1.034170").unwrap();
        assert_eq!(sample.epoch_millis(), APR_1_1997_PST + 2_952_288);
    }

    #[test]
    fn unreadable_date_part_falls_back_to_clock() {
        let calendar = Calendar::default().with_clock(FixedClock(1_000_000));
        let parsed = calendar.parse("sometime soon.5").unwrap();
        assert_eq!(parsed.epoch_millis(), 1_000_000 + DAY_MS / 2);
    }

    #[test]
    fn malformed_fraction_is_an_error() {
        let calendar = Calendar::default();
        let err = calendar.parse("1997 Apr 1.5x").unwrap_err();
        assert_eq!(err.input(), "1997 Apr 1.5x");
        assert_eq!(err.kind(), &ParseErrorKind::Fraction(".5x".into()));
    }

    #[test]
    fn exponent_fraction_is_rejected() {
        let calendar = pacific();
        let err = calendar.parse("1997 Apr 1.5e12").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::Fraction(".5e12".into()));
        assert!(calendar.parse("1997 Apr 1.5E3").is_err());
    }

    #[test]
    fn fraction_past_the_clock_range_is_an_error() {
        let calendar = Calendar::default().with_clock(FixedClock(i64::MAX));
        let err = calendar.parse("whenever.5").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidDate);
    }

    #[test]
    fn leading_dot_uses_fixed_format() {
        let err = Calendar::default().parse(".5").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::Shape);
    }

    #[test]
    fn now_reads_the_clock() {
        let calendar = pacific().with_clock(FixedClock(42));
        let now = calendar.now();
        assert_eq!(now.epoch_millis(), 42);
        assert_eq!(now.zone(), Zone::US_PACIFIC);
    }

    #[test]
    fn parsed_dates_carry_the_calendar_zone() {
        let parsed = pacific().parse("May 16 00:05:37 UTC 1997").unwrap();
        assert_eq!(parsed.zone(), Zone::US_PACIFIC);
        assert_eq!(parsed.to_string(), "May 15 17:05:37 PDT 1997");
    }
}
