//! Trip query types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{DomainError, Location};

/// Whether the query time is a departure or an arrival bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeType {
    #[default]
    Depart,
    Arrival,
}

impl TimeType {
    /// Value of the upstream `time_type` parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            TimeType::Depart => "depart",
            TimeType::Arrival => "arrival",
        }
    }
}

/// Options carried unchanged across pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripOptions {
    /// Number of connections to request.
    pub max_trips: u32,
    pub show_delays: bool,
    pub show_track_changes: bool,
}

impl Default for TripOptions {
    fn default() -> Self {
        Self {
            max_trips: 8,
            show_delays: true,
            show_track_changes: true,
        }
    }
}

/// A trip search between two places at a given time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    pub from: Location,
    pub to: Location,
    pub via: Option<Location>,
    /// Local wall-clock time of the search.
    pub at: NaiveDateTime,
    pub time_type: TimeType,
    pub options: TripOptions,
}

impl TripQuery {
    /// Searches trips leaving at or after `at`.
    pub fn departing(from: Location, to: Location, at: NaiveDateTime) -> Self {
        Self {
            from,
            to,
            via: None,
            at,
            time_type: TimeType::Depart,
            options: TripOptions::default(),
        }
    }

    /// Searches trips arriving at or before `at`.
    pub fn arriving(from: Location, to: Location, at: NaiveDateTime) -> Self {
        Self {
            time_type: TimeType::Arrival,
            ..Self::departing(from, to, at)
        }
    }

    pub fn with_via(mut self, via: Option<Location>) -> Self {
        self.via = via;
        self
    }

    pub fn with_options(mut self, options: TripOptions) -> Self {
        self.options = options;
        self
    }

    /// The same query re-anchored at another time and direction.
    pub fn reanchored(&self, at: NaiveDateTime, time_type: TimeType) -> Self {
        Self {
            at,
            time_type,
            ..self.clone()
        }
    }

    /// Builds the upstream `route.json` query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnresolvableLocation`] if an endpoint has no
    /// id, coordinate or name.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::{Location, TripQuery, parse_timestamp};
    ///
    /// let at = parse_timestamp("2024-03-15 08:00:00").unwrap();
    /// let query = TripQuery::departing(
    ///     Location::from_query_term("8503000"),
    ///     Location::any("Bern"),
    ///     at,
    /// );
    /// let params = query.to_params().unwrap();
    /// assert!(params.contains(&("from", "8503000".to_string())));
    /// assert!(params.contains(&("date", "03/15/2024".to_string())));
    /// assert!(params.contains(&("time", "08:00".to_string())));
    /// ```
    pub fn to_params(&self) -> Result<Vec<(&'static str, String)>, DomainError> {
        let term = |loc: &Location, role| {
            loc.query_term()
                .ok_or(DomainError::UnresolvableLocation { role })
        };

        let mut params = vec![
            ("from", term(&self.from, "from")?),
            ("to", term(&self.to, "to")?),
        ];
        if let Some(via) = &self.via {
            params.push(("via", term(via, "via")?));
        }
        let flag = |on: bool| String::from(if on { "1" } else { "0" });
        params.extend([
            ("date", self.at.format("%m/%d/%Y").to_string()),
            ("time", self.at.format("%H:%M").to_string()),
            ("time_type", self.time_type.as_param().to_string()),
            ("num", self.options.max_trips.to_string()),
            ("show_delays", flag(self.options.show_delays)),
            ("show_trackchanges", flag(self.options.show_track_changes)),
        ]);
        Ok(params)
    }
}
