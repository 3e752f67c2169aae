//! Leg types.
//!
//! A trip is a sequence of legs. A leg is either a walk between two places
//! or a ride on one public-transport line from boarding to alighting.

use super::{Disruption, DomainError, Line, Location, Stop, StopTime};

/// How a raw upstream leg is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegClass {
    Walking,
    Transit,
    /// The final pseudo-leg that only names the destination. Dropped.
    Terminal,
}

impl LegClass {
    /// Classifies a raw leg by its type code and whether it has an exit.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::LegClass;
    ///
    /// assert_eq!(LegClass::classify(Some("walk"), true), LegClass::Walking);
    /// assert_eq!(LegClass::classify(Some("express_train"), true), LegClass::Transit);
    /// assert_eq!(LegClass::classify(None, false), LegClass::Terminal);
    /// ```
    pub fn classify(leg_type: Option<&str>, has_exit: bool) -> Self {
        if !has_exit {
            return LegClass::Terminal;
        }
        match leg_type {
            Some("walk") => LegClass::Walking,
            _ => LegClass::Transit,
        }
    }
}

/// A walk between two places. Carries only endpoints and times.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingLeg {
    pub departure: Location,
    pub arrival: Location,
    pub departure_time: StopTime,
    pub arrival_time: StopTime,
}

/// A ride on one line.
///
/// Times are validated at construction so `departure_time()` and
/// `arrival_time()` never fail.
///
/// # Invariants
///
/// - The boarding stop has a departure (or, failing that, arrival) time
/// - The alighting stop has an arrival (or, failing that, departure) time
#[derive(Debug, Clone, PartialEq)]
pub struct TransitLeg {
    line: Line,
    departure: Stop,
    arrival: Stop,
    intermediate_stops: Vec<Stop>,
    destination_name: Option<String>,
    info: Option<String>,
    disruptions: Vec<Disruption>,
    // Cached validated times
    departure_time: StopTime,
    arrival_time: StopTime,
}

impl TransitLeg {
    /// Constructs a transit leg, validating that boundary times exist.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingTime`] if the boarding stop has no time
    /// at all, or likewise the alighting stop.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::{
    ///     Line, Location, Product, Stop, StopTime, Style, TransitLeg, parse_timestamp,
    /// };
    ///
    /// let line = Line {
    ///     trip_number: Some("717".into()),
    ///     operator: Some("SBB".into()),
    ///     product: Product::HighSpeedTrain,
    ///     label: Some("IC 1".into()),
    ///     style: Style::default(),
    /// };
    /// let dep = Stop::new(Location::station("8503000", "Zürich HB")).with_departure(Some(
    ///     StopTime::on_time(parse_timestamp("2024-03-15 08:02:00").unwrap()),
    /// ));
    /// let arr = Stop::new(Location::station("8507000", "Bern")).with_arrival(Some(
    ///     StopTime::on_time(parse_timestamp("2024-03-15 08:58:00").unwrap()),
    /// ));
    ///
    /// let leg = TransitLeg::new(line, dep, arr).unwrap();
    /// assert_eq!(leg.duration().num_minutes(), 56);
    /// ```
    pub fn new(line: Line, departure: Stop, arrival: Stop) -> Result<Self, DomainError> {
        let departure_time = departure
            .departure_or_arrival()
            .ok_or(DomainError::MissingTime("boarding departure"))?;
        let arrival_time = arrival
            .arrival_or_departure()
            .ok_or(DomainError::MissingTime("alighting arrival"))?;

        Ok(Self {
            line,
            departure,
            arrival,
            intermediate_stops: Vec::new(),
            destination_name: None,
            info: None,
            disruptions: Vec::new(),
            departure_time,
            arrival_time,
        })
    }

    pub fn with_intermediate_stops(mut self, stops: Vec<Stop>) -> Self {
        self.intermediate_stops = stops;
        self
    }

    /// Sets the headsign shown on the vehicle.
    pub fn with_destination_name(mut self, name: Option<String>) -> Self {
        self.destination_name = name;
        self
    }

    pub fn with_info(mut self, info: Option<String>) -> Self {
        self.info = info;
        self
    }

    pub fn with_disruptions(mut self, disruptions: Vec<Disruption>) -> Self {
        self.disruptions = disruptions;
        self
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Returns the boarding stop.
    pub fn departure(&self) -> &Stop {
        &self.departure
    }

    /// Returns the alighting stop.
    pub fn arrival(&self) -> &Stop {
        &self.arrival
    }

    pub fn intermediate_stops(&self) -> &[Stop] {
        &self.intermediate_stops
    }

    pub fn destination_name(&self) -> Option<&str> {
        self.destination_name.as_deref()
    }

    /// Free text and disruption summaries, one per line.
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn disruptions(&self) -> &[Disruption] {
        &self.disruptions
    }

    /// Returns the departure time (guaranteed present).
    pub fn departure_time(&self) -> StopTime {
        self.departure_time
    }

    /// Returns the arrival time (guaranteed present).
    pub fn arrival_time(&self) -> StopTime {
        self.arrival_time
    }

    /// Planned riding time.
    pub fn duration(&self) -> chrono::Duration {
        self.arrival_time.planned - self.departure_time.planned
    }

    /// True if the ride is cancelled at either end.
    pub fn is_cancelled(&self) -> bool {
        self.departure.cancelled || self.arrival.cancelled
    }
}

/// One segment of a trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    Walking(WalkingLeg),
    Transit(TransitLeg),
}

impl Leg {
    /// Where this leg starts.
    pub fn departure_location(&self) -> &Location {
        match self {
            Leg::Walking(walk) => &walk.departure,
            Leg::Transit(ride) => &ride.departure().location,
        }
    }

    /// Where this leg ends.
    pub fn arrival_location(&self) -> &Location {
        match self {
            Leg::Walking(walk) => &walk.arrival,
            Leg::Transit(ride) => &ride.arrival().location,
        }
    }

    pub fn departure_time(&self) -> StopTime {
        match self {
            Leg::Walking(walk) => walk.departure_time,
            Leg::Transit(ride) => ride.departure_time(),
        }
    }

    pub fn arrival_time(&self) -> StopTime {
        match self {
            Leg::Walking(walk) => walk.arrival_time,
            Leg::Transit(ride) => ride.arrival_time(),
        }
    }

    /// Returns true if this is a transit leg.
    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit(_))
    }

    /// Returns the transit leg if this is one.
    pub fn as_transit(&self) -> Option<&TransitLeg> {
        match self {
            Leg::Transit(ride) => Some(ride),
            Leg::Walking(_) => None,
        }
    }

    /// Returns the walk if this is one.
    pub fn as_walking(&self) -> Option<&WalkingLeg> {
        match self {
            Leg::Walking(walk) => Some(walk),
            Leg::Transit(_) => None,
        }
    }

    /// Walks are never cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.as_transit().is_some_and(TransitLeg::is_cancelled)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Builders shared by domain tests.

    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::domain::{Product, Style};

    pub fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    pub fn station(id: &str) -> Location {
        Location::station(id, format!("Station {id}"))
    }

    pub fn line(label: &str) -> Line {
        Line {
            trip_number: None,
            operator: Some("SBB".into()),
            product: Product::RegionalTrain,
            label: Some(label.into()),
            style: Style::default(),
        }
    }

    pub fn ride(from: &str, dep: NaiveDateTime, to: &str, arr: NaiveDateTime) -> Leg {
        let departure =
            Stop::new(station(from)).with_departure(Some(StopTime::on_time(dep)));
        let arrival = Stop::new(station(to)).with_arrival(Some(StopTime::on_time(arr)));
        Leg::Transit(TransitLeg::new(line("R"), departure, arrival).unwrap())
    }

    pub fn walk(from: &str, dep: NaiveDateTime, to: &str, arr: NaiveDateTime) -> Leg {
        Leg::Walking(WalkingLeg {
            departure: station(from),
            arrival: station(to),
            departure_time: StopTime::on_time(dep),
            arrival_time: StopTime::on_time(arr),
        })
    }
}
