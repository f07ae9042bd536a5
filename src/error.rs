// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types.

use thiserror::Error;

/// Result alias for date parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// A date string matched neither accepted grammar.
///
/// Carries the original, unmodified input so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable date {input:?}: {kind}")]
pub struct ParseError {
    input: String,
    #[source]
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(input: &str, kind: ParseErrorKind) -> Self {
        Self {
            input: input.to_owned(),
            kind,
        }
    }

    /// The string that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// What went wrong.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected `MMM dd HH:mm:ss Z yyyy`")]
    Shape,

    #[error("unknown month {0:?}")]
    Month(String),

    #[error("malformed {field} field {value:?}")]
    Field { field: &'static str, value: String },

    #[error("unknown time zone {0:?}")]
    Zone(String),

    #[error("no such calendar date or time")]
    InvalidDate,

    #[error("malformed day fraction {0:?}")]
    Fraction(String),

    #[error("missing {0}")]
    Incomplete(&'static str),
}

/// A configured time-zone name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    #[error("unknown time zone {0:?}")]
    Unknown(String),
}
