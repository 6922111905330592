// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! ISO 8601 encoding of domain dates at the persistence boundary.
//!
//! Timestamps are stored as RFC 3339 text and calendar dates as
//! `YYYY-MM-DD` text. Both forms order lexicographically, which the
//! billing-period and overdue-sweep queries rely on.

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, OffsetDateTime};

use crate::error::PersistenceError;

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn format_datetime(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(format!("format timestamp: {e}")))
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns an error if the stored text is not a valid RFC 3339 timestamp.
pub fn parse_datetime(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
        PersistenceError::ReconstructionError(format!("invalid stored timestamp '{value}': {e}"))
    })
}

/// Formats an optional timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn format_datetime_opt(
    value: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(format_datetime).transpose()
}

/// Parses an optional stored timestamp.
///
/// # Errors
///
/// Returns an error if the stored text is not a valid RFC 3339 timestamp.
pub fn parse_datetime_opt(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(parse_datetime).transpose()
}

/// Parses a stored calendar date.
///
/// # Errors
///
/// Returns an error if the stored text is not a valid ISO 8601 date.
pub fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, &Iso8601::DEFAULT).map_err(|e| {
        PersistenceError::ReconstructionError(format!("invalid stored date '{value}': {e}"))
    })
}

/// Parses an optional stored calendar date.
///
/// # Errors
///
/// Returns an error if the stored text is not a valid ISO 8601 date.
pub fn parse_date_opt(value: Option<&str>) -> Result<Option<Date>, PersistenceError> {
    value.map(parse_date).transpose()
}
