//! Textual instant handling at the serialization boundary.
//!
//! Instants are exchanged as RFC 3339 strings with an explicit UTC offset.
//! An offset-less timestamp is interpreted as UTC rather than rejected,
//! matching the boundary contract of the engine interfaces.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Error returned when a string cannot be read as an instant.
#[derive(Debug, thiserror::Error)]
#[error("unparsable instant: {raw}")]
pub struct InstantParseError {
    /// The offending input.
    pub raw: String,
}

/// Parse a textual instant.
///
/// Accepts RFC 3339 with any offset (normalized to UTC), or an offset-less
/// `YYYY-MM-DDTHH:MM:SS[.frac]` timestamp which is taken to be UTC.
///
/// # Errors
///
/// Returns [`InstantParseError`] if neither form matches.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, InstantParseError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    // Offset-less timestamps default to UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_err| InstantParseError {
            raw: raw.to_owned(),
        })
}

/// Render an instant as RFC 3339 with a `Z` suffix.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Fractional hours elapsed from `earlier` to `later`, clamped to zero when
/// `later` precedes `earlier`.
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let millis = (later - earlier).num_milliseconds();
    if millis <= 0 {
        return 0.0;
    }
    // Millisecond counts stay far below 2^53, so the conversion is exact.
    #[allow(clippy::cast_precision_loss)]
    let millis_f = millis as f64;
    millis_f / 3_600_000.0
}
