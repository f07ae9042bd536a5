// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Runtime settings.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `STARDATE_TZ` | zone for reading and printing wall-clock times | host zone, else `UTC` |
//! | `STARDATE_TZ_PROBE` | run the time-zone probe before the first parse | `1` |
//!
//! Unrecognised values are reported through `tracing` and replaced by the
//! default.

use tracing::warn;

use crate::zone::Zone;

/// Environment variable naming the display/parse zone.
pub const ZONE_VAR: &str = "STARDATE_TZ";

/// Environment variable toggling the time-zone probe.
pub const PROBE_VAR: &str = "STARDATE_TZ_PROBE";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Zone used to read zone-less wall times and to format instants.
    pub zone: Zone,
    /// Whether parsing runs the one-time time-zone probe.
    pub probe_time_zone_bug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zone: Zone::host(),
            probe_time_zone_bug: true,
        }
    }
}

impl Settings {
    /// Settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }

    /// Settings from an arbitrary set of `(name, value)` pairs.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ZONE_VAR => match value.parse::<Zone>() {
                    Ok(zone) => settings.zone = zone,
                    Err(err) => warn!(var = ZONE_VAR, %err, "ignoring time zone setting"),
                },
                PROBE_VAR => match parse_flag(value) {
                    Some(enabled) => settings.probe_time_zone_bug = enabled,
                    None => warn!(var = PROBE_VAR, value, "ignoring non-boolean setting"),
                },
                _ => {}
            }
        }
        settings
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_time_zone_probe(mut self, enabled: bool) -> Self {
        self.probe_time_zone_bug = enabled;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_variables() {
        let settings = Settings::from_env_vars(Vec::<(String, String)>::new());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.zone, Zone::host());
        assert!(settings.probe_time_zone_bug);
    }

    #[test]
    fn reads_zone_and_probe_flag() {
        let settings = Settings::from_env_vars([
            ("PATH", "/usr/bin"),
            (ZONE_VAR, "America/Los_Angeles"),
            (PROBE_VAR, "off"),
        ]);
        assert_eq!(settings.zone, Zone::US_PACIFIC);
        assert!(!settings.probe_time_zone_bug);
    }

    #[test]
    fn region_setting_roundtrips_fixed_format() {
        let settings = Settings::from_env_vars([(ZONE_VAR, "US/Pacific")]);
        let calendar = crate::Calendar::new(settings);
        let text = "May 15 17:05:37 PDT 1997";
        assert_eq!(calendar.parse(text).unwrap().to_string(), text);
        assert_eq!(
            calendar.parse("Feb 02 18:00:00 UTC 1974").unwrap().to_string(),
            "Feb 02 11:00:00 PDT 1974"
        );
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let settings =
            Settings::from_env_vars([(ZONE_VAR, "Atlantis/Capital"), (PROBE_VAR, "maybe")]);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn builder_helpers() {
        let settings = Settings::default()
            .with_zone(Zone::US_EASTERN)
            .with_time_zone_probe(false);
        assert_eq!(settings.zone, Zone::US_EASTERN);
        assert!(!settings.probe_time_zone_bug);
    }
}
