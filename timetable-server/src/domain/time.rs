//! Timestamp and delay handling for timetable data.
//!
//! The upstream reports local wall-clock timestamps as
//! `"YYYY-MM-DD HH:MM:SS"` and real-time delays as whole minutes. A delay
//! may also be the literal `"X"`, which marks a cancelled call rather than
//! an offset. All arithmetic here works on already-parsed
//! [`NaiveDateTime`] values; formatted strings are never re-parsed.

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

/// Format of every timestamp in a trip-query response.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Candidate formats for disruption validity ranges, tried in order.
///
/// The upstream renders these in the locale of the request, so a German
/// (`21.03.2024 05:00`) or English (`03/21/2024 05:00`) form may arrive.
pub const TIME_RANGE_FORMATS: [&str; 2] = ["%d.%m.%Y %H:%M", "%m/%d/%Y %H:%M"];

/// Delay value the upstream uses for a cancelled call.
const CANCELLED_SENTINEL: &str = "X";

/// Error returned when parsing an invalid timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {input:?}: expected YYYY-MM-DD HH:MM:SS")]
pub struct TimeError {
    input: String,
}

/// Parses an upstream `"YYYY-MM-DD HH:MM:SS"` timestamp.
///
/// # Examples
///
/// ```
/// use timetable_server::domain::parse_timestamp;
///
/// let t = parse_timestamp("2024-03-15 08:02:00").unwrap();
/// assert_eq!(t.to_string(), "2024-03-15 08:02:00");
///
/// assert!(parse_timestamp("2024-03-15 08:02").is_err());
/// assert!(parse_timestamp("15.03.2024 08:02:00").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, TimeError> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map_err(|_| TimeError {
        input: s.to_string(),
    })
}

/// Parses a timestamp against each candidate format in turn.
///
/// Returns the first successful parse, or `None` if no format matches.
pub fn parse_with_candidates(s: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    let s = s.trim();
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

/// A real-time delay as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Delay {
    /// A numeric offset in minutes (may be negative for early running).
    Minutes(i64),
    /// The cancellation sentinel. Carries no offset.
    Cancelled,
    /// A value that was neither numeric nor the sentinel.
    Unparseable(String),
    /// No delay reported.
    #[default]
    None,
}

impl Delay {
    /// The delay in minutes; zero for anything that is not a numeric offset.
    pub fn minutes(&self) -> i64 {
        match self {
            Delay::Minutes(m) => *m,
            Delay::Cancelled | Delay::Unparseable(_) | Delay::None => 0,
        }
    }

    /// Returns true for the cancellation sentinel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Delay::Cancelled)
    }
}

/// Parses a textual delay value.
///
/// The sentinel `"X"` yields [`Delay::Cancelled`]; a signed integer yields
/// [`Delay::Minutes`]; anything else is logged and yields
/// [`Delay::Unparseable`]. This never fails.
///
/// # Examples
///
/// ```
/// use timetable_server::domain::{Delay, parse_delay};
///
/// assert_eq!(parse_delay("7"), Delay::Minutes(7));
/// assert_eq!(parse_delay("+3"), Delay::Minutes(3));
/// assert_eq!(parse_delay("X").minutes(), 0);
/// assert_eq!(parse_delay("bogus").minutes(), 0);
/// ```
pub fn parse_delay(raw: &str) -> Delay {
    let trimmed = raw.trim();
    if trimmed == CANCELLED_SENTINEL {
        return Delay::Cancelled;
    }
    if trimmed.is_empty() {
        return Delay::None;
    }
    match trimmed.parse::<i64>() {
        Ok(minutes) => Delay::Minutes(minutes),
        Err(_) => {
            warn!(raw, "unparseable delay value, treating as on time");
            Delay::Unparseable(raw.to_string())
        }
    }
}

/// Derives an expected time from a planned time and a delay in minutes.
///
/// Returns `None` when there is no planned time. A delay too large to
/// represent leaves the planned time unchanged.
///
/// # Examples
///
/// ```
/// use timetable_server::domain::{apply_delay, parse_timestamp};
///
/// let planned = parse_timestamp("2024-03-15 23:58:00").unwrap();
/// let expected = apply_delay(Some(planned), 5).unwrap();
/// assert_eq!(expected.to_string(), "2024-03-16 00:03:00");
///
/// assert_eq!(apply_delay(None, 5), None);
/// ```
pub fn apply_delay(planned: Option<NaiveDateTime>, minutes: i64) -> Option<NaiveDateTime> {
    let planned = planned?;
    let expected = Duration::try_minutes(minutes).and_then(|d| planned.checked_add_signed(d));
    Some(expected.unwrap_or(planned))
}
