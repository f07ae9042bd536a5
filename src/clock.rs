// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Sources of "now".

use chrono::Utc;

/// Provides the current instant in milliseconds since 1970-01-01T00:00:00Z.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// The host's wall clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at one instant, for reproducible results.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    #[inline]
    fn now_millis(&self) -> i64 {
        self.0
    }
}
