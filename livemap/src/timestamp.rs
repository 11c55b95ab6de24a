//! API timestamps.
//!
//! The API exchanges timestamps as RFC 3339 strings. Every age computation
//! takes `now` explicitly so derived state stays a pure function of its inputs.

#[cfg(test)]
#[path = "timestamp_test.rs"]
mod timestamp_test;

use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::warn;

/// Errors produced while reading or writing API timestamps.
#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("invalid timestamp '{raw}': {source}")]
    Parse {
        raw: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("timestamp not representable: {0}")]
    Format(#[from] time::error::Format),
}

/// Parse an API timestamp.
///
/// # Errors
///
/// Returns [`TimestampError::Parse`] if `raw` is not valid RFC 3339.
pub fn parse(raw: &str) -> Result<OffsetDateTime, TimestampError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|source| TimestampError::Parse { raw: raw.to_owned(), source })
}

/// Format an instant for sending to the API.
///
/// # Errors
///
/// Returns [`TimestampError::Format`] for instants outside the RFC 3339 range.
pub fn format(instant: OffsetDateTime) -> Result<String, TimestampError> {
    Ok(instant.format(&Rfc3339)?)
}

/// Age of an API timestamp relative to `now`.
///
/// Absent timestamps have no age. Unparseable ones are logged and treated as
/// absent. Timestamps in the future yield a negative age.
#[must_use]
pub fn age(raw: Option<&str>, now: OffsetDateTime) -> Option<Duration> {
    let raw = raw?;
    match parse(raw) {
        Ok(instant) => Some(now - instant),
        Err(e) => {
            warn!(error = %e, "ignoring unparseable position timestamp");
            None
        }
    }
}
