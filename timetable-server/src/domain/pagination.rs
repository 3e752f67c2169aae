//! Pagination over trip results.
//!
//! A `PaginationContext` is derived from one page of trips and remembers
//! just enough to re-issue the original query shifted earlier or later.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{TimeType, Trip, TripQuery};

/// Cursor for fetching the neighbouring page of trips.
///
/// # Invariants
///
/// - `can_query_later()` iff a latest departure is known
/// - `can_query_earlier()` iff an earliest arrival is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationContext {
    query: TripQuery,
    /// Planned departure of the first ride of the last trip.
    latest_departure: Option<NaiveDateTime>,
    /// Planned arrival of the last ride of the first trip.
    earliest_arrival: Option<NaiveDateTime>,
}

impl PaginationContext {
    /// Derives a context from a page of trips.
    ///
    /// Returns `None` for an empty page, since there is nothing to step from.
    pub fn derive(trips: &[Trip], query: &TripQuery) -> Option<Self> {
        let first = trips.first()?;
        let last = trips.last()?;
        Some(Self {
            query: query.clone(),
            latest_departure: last
                .first_transit_leg()
                .map(|leg| leg.departure_time().planned),
            earliest_arrival: first
                .last_transit_leg()
                .map(|leg| leg.arrival_time().planned),
        })
    }

    /// The query this context was derived from.
    pub fn query(&self) -> &TripQuery {
        &self.query
    }

    pub fn latest_departure(&self) -> Option<NaiveDateTime> {
        self.latest_departure
    }

    pub fn earliest_arrival(&self) -> Option<NaiveDateTime> {
        self.earliest_arrival
    }

    pub fn can_query_later(&self) -> bool {
        self.latest_departure.is_some()
    }

    pub fn can_query_earlier(&self) -> bool {
        self.earliest_arrival.is_some()
    }

    /// Departures from one minute after the latest departure seen.
    pub fn later_query(&self) -> Option<TripQuery> {
        let at = self.latest_departure? + Duration::minutes(1);
        Some(self.query.reanchored(at, TimeType::Depart))
    }

    /// Arrivals up to one minute before the earliest arrival seen.
    pub fn earlier_query(&self) -> Option<TripQuery> {
        let at = self.earliest_arrival? - Duration::minutes(1);
        Some(self.query.reanchored(at, TimeType::Arrival))
    }

    /// The neighbouring query in the requested direction.
    pub fn next_query(&self, later: bool) -> Option<TripQuery> {
        if later {
            self.later_query()
        } else {
            self.earlier_query()
        }
    }
}
