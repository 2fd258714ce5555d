//! Canonical time handling.
//!
//! Every timestamp the engine stores is UTC. Inputs may arrive in any chrono
//! time zone, but only those with a zero offset are accepted.

use crate::RoundError;
use chrono::{DateTime, Offset, TimeDelta, TimeZone, Utc};
use std::time::Duration;
use tracing::{instrument, warn};

/// Converts `at` to UTC, failing if it carries a non-zero offset.
#[instrument(skip(at), fields(at = %at.to_rfc3339()))]
pub fn require_utc<Tz>(at: &DateTime<Tz>, field: &'static str) -> Result<DateTime<Utc>, RoundError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let offset_secs = at.offset().fix().local_minus_utc();
    if offset_secs != 0 {
        warn!(field, offset_secs, "Rejected non-UTC timestamp");
        return Err(RoundError::NonUtcTimestamp { field, offset_secs });
    }
    Ok(at.with_timezone(&Utc))
}

/// Adds a std duration to a UTC instant without overflowing.
pub(crate) fn offset_by(
    start: DateTime<Utc>,
    duration: Duration,
    field: &'static str,
) -> Result<DateTime<Utc>, RoundError> {
    let delta = TimeDelta::from_std(duration).map_err(|_| RoundError::DurationOutOfRange(field))?;
    start
        .checked_add_signed(delta)
        .ok_or(RoundError::DurationOutOfRange(field))
}
