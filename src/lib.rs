// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! StarDate
//!
//! Calendar timestamps for astronomical calculations such as moon phases:
//! parse human-readable dates (including fractional days like
//! `"1997 Apr 1.034170"`), then read them back as Julian Dates, decimal
//! years or decimal days.
//!
//! # Core types
//!
//! - [`StarDate`] — one absolute instant (epoch milliseconds) plus the
//!   [`Zone`] it is displayed in.
//! - [`Calendar`] — parse context: [`Settings`], a [`Clock`] and the one-time
//!   [`TimeZoneProbe`].
//! - [`Zone`] — fixed offsets and tz-database regions.
//! - [`ParseError`] — returned when a string matches neither grammar.
//!
//! # Accepted strings
//!
//! | Form | Example |
//! |------|---------|
//! | Fractional day | `"1997 Apr 1.034170"` |
//! | Fixed format | `"May 15 17:05:37 PDT 1997"` |
//!
//! # Diagnostics
//!
//! Diagnostics go through [`tracing`]; install a subscriber to see them.

mod calendar;
mod clock;
mod config;
mod error;
mod parse;
mod stardate;
mod zone;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use calendar::{Calendar, TimeZoneProbe};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Settings, PROBE_VAR, ZONE_VAR};
pub use error::{ParseError, ParseErrorKind, ParseResult, ZoneError};
pub use stardate::{StarDate, JULIAN_ANCHOR, JULIAN_ANCHOR_JD, MILLIS_PER_DAY, TROPICAL_YEAR_DAYS};
pub use zone::Zone;
