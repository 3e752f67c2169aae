//! Stop types.
//!
//! A `Stop` is one boundary event of a leg (boarding or alighting) or an
//! intermediate call on the way. Each side carries a planned time and the
//! real-time expectation derived from the reported delay.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Delay, Location, apply_delay};

/// A planned time together with its real-time expectation.
///
/// `expected` equals `planned` when no delay was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTime {
    pub planned: NaiveDateTime,
    pub expected: NaiveDateTime,
}

impl StopTime {
    /// A time with no reported delay.
    pub fn on_time(planned: NaiveDateTime) -> Self {
        Self {
            planned,
            expected: planned,
        }
    }

    /// Overlays a delay onto an optional planned time.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::{StopTime, parse_delay, parse_timestamp};
    ///
    /// let planned = parse_timestamp("2024-03-15 08:02:00").unwrap();
    /// let t = StopTime::from_planned(Some(planned), &parse_delay("3")).unwrap();
    /// assert_eq!(t.delay_minutes(), 3);
    ///
    /// // A cancelled call keeps its planned time.
    /// let t = StopTime::from_planned(Some(planned), &parse_delay("X")).unwrap();
    /// assert_eq!(t.expected, planned);
    /// ```
    pub fn from_planned(planned: Option<NaiveDateTime>, delay: &Delay) -> Option<Self> {
        let expected = apply_delay(planned, delay.minutes())?;
        Some(Self {
            planned: planned?,
            expected,
        })
    }

    /// Minutes between planned and expected.
    pub fn delay_minutes(&self) -> i64 {
        (self.expected - self.planned).num_minutes()
    }
}

/// A call at a location, with optional arrival and departure times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub location: Location,
    pub arrival: Option<StopTime>,
    pub departure: Option<StopTime>,
    /// Track or platform, if reported.
    pub track: Option<String>,
    pub cancelled: bool,
}

impl Stop {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            arrival: None,
            departure: None,
            track: None,
            cancelled: false,
        }
    }

    pub fn with_arrival(mut self, time: Option<StopTime>) -> Self {
        self.arrival = time;
        self
    }

    pub fn with_departure(mut self, time: Option<StopTime>) -> Self {
        self.departure = time;
        self
    }

    pub fn with_track(mut self, track: Option<String>) -> Self {
        self.track = track.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Fills a missing side from the other one.
    ///
    /// Intermediate calls sometimes report only an arrival or only a
    /// departure; both sides then describe the same moment.
    pub fn with_sides_filled(mut self) -> Self {
        match (self.arrival, self.departure) {
            (Some(a), None) => self.departure = Some(a),
            (None, Some(d)) => self.arrival = Some(d),
            _ => {}
        }
        self
    }

    /// Arrival if known, else departure.
    pub fn arrival_or_departure(&self) -> Option<StopTime> {
        self.arrival.or(self.departure)
    }

    /// Departure if known, else arrival.
    pub fn departure_or_arrival(&self) -> Option<StopTime> {
        self.departure.or(self.arrival)
    }
}
