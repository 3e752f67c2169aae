//! Trip types.
//!
//! A `Trip` is a complete journey from origin to destination: an ordered,
//! contiguous sequence of walking and transit legs with at least one ride.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{Disruption, DomainError, Leg, Location, StopTime, TransitLeg};

/// Opaque trip identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    pub fn new(id: impl Into<String>) -> Self {
        TripId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of trip identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> TripId;
}

/// Random identifiers for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> TripId {
        TripId(format!("generated-{:032x}", rand::random::<u128>()))
    }
}

/// Deterministic identifiers: `"<prefix>-0"`, `"<prefix>-1"`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> TripId {
        let id = TripId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one leg, and at least one of them a transit leg
/// - Consecutive legs connect (arrival of one = departure of next)
#[derive(Debug, Clone)]
pub struct Trip {
    id: TripId,
    legs: Vec<Leg>,
    transfers: usize,
    disruptions: Vec<Disruption>,
}

impl Trip {
    /// Assembles a trip from decoded legs.
    ///
    /// The transfer count starts at -1 and rises by one per transit leg;
    /// walks never count.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `legs` is empty
    /// - two consecutive legs don't connect
    /// - no leg is a transit leg
    pub fn assemble(
        id: TripId,
        legs: Vec<Leg>,
        disruptions: Vec<Disruption>,
    ) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyTrip);
        }

        for (index, window) in legs.windows(2).enumerate() {
            if !window[0].arrival_location().same_place(window[1].departure_location()) {
                return Err(DomainError::LegsNotContiguous { index });
            }
        }

        let transfers = legs
            .iter()
            .fold(-1i64, |count, leg| if leg.is_transit() { count + 1 } else { count });
        let transfers = usize::try_from(transfers).map_err(|_| DomainError::NoTransitLegs)?;

        Ok(Trip {
            id,
            legs,
            transfers,
            disruptions,
        })
    }

    pub fn id(&self) -> &TripId {
        &self.id
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Number of changes between rides.
    pub fn transfers(&self) -> usize {
        self.transfers
    }

    /// Disruptions reported for the connection as a whole.
    pub fn disruptions(&self) -> &[Disruption] {
        &self.disruptions
    }

    /// Returns the transit legs in order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(Leg::as_transit)
    }

    pub fn first_transit_leg(&self) -> Option<&TransitLeg> {
        self.transit_legs().next()
    }

    pub fn last_transit_leg(&self) -> Option<&TransitLeg> {
        self.transit_legs().last()
    }

    pub fn origin(&self) -> &Location {
        // Non-empty: validated at construction
        self.legs[0].departure_location()
    }

    pub fn destination(&self) -> &Location {
        self.legs[self.legs.len() - 1].arrival_location()
    }

    pub fn departure_time(&self) -> StopTime {
        self.legs[0].departure_time()
    }

    pub fn arrival_time(&self) -> StopTime {
        self.legs[self.legs.len() - 1].arrival_time()
    }

    /// Planned door-to-door duration.
    pub fn duration(&self) -> Duration {
        self.arrival_time().planned - self.departure_time().planned
    }

    /// True if any ride is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.legs.iter().any(Leg::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::leg::test_support::*;

    fn id() -> TripId {
        TripId::new("t")
    }

    #[test]
    fn empty_trip_rejected() {
        let err = Trip::assemble(id(), vec![], vec![]).unwrap_err();
        assert_eq!(err, DomainError::EmptyTrip);
    }

    #[test]
    fn walking_only_rejected() {
        let legs = vec![walk("a", at(8, 0), "b", at(8, 10))];
        let err = Trip::assemble(id(), legs, vec![]).unwrap_err();
        assert_eq!(err, DomainError::NoTransitLegs);
    }

    #[test]
    fn direct_trip_has_no_transfers() {
        let trip = Trip::assemble(id(), vec![ride("a", at(8, 0), "b", at(9, 0))], vec![]).unwrap();
        assert_eq!(trip.transfers(), 0);
        assert_eq!(trip.duration(), Duration::hours(1));
    }

    #[test]
    fn walks_never_count_as_transfers() {
        let legs = vec![
            walk("a", at(8, 0), "b", at(8, 5)),
            ride("b", at(8, 10), "c", at(8, 40)),
            walk("c", at(8, 40), "d", at(8, 45)),
            ride("d", at(8, 50), "e", at(9, 20)),
            ride("e", at(9, 25), "f", at(10, 0)),
        ];
        let trip = Trip::assemble(id(), legs, vec![]).unwrap();
        assert_eq!(trip.transfers(), 2);
        assert_eq!(trip.origin().id.as_deref(), Some("a"));
        assert_eq!(trip.destination().id.as_deref(), Some("f"));
        assert_eq!(trip.departure_time().planned, at(8, 0));
        assert_eq!(trip.arrival_time().planned, at(10, 0));
        assert_eq!(
            trip.first_transit_leg().unwrap().departure_time().planned,
            at(8, 10)
        );
        assert_eq!(
            trip.last_transit_leg().unwrap().arrival_time().planned,
            at(10, 0)
        );
        assert_eq!(trip.transit_legs().count(), 3);
    }

    #[test]
    fn gap_between_legs_rejected() {
        let legs = vec![
            ride("a", at(8, 0), "b", at(8, 30)),
            ride("b", at(8, 35), "c", at(9, 0)),
            ride("x", at(9, 5), "y", at(9, 30)),
        ];
        let err = Trip::assemble(id(), legs, vec![]).unwrap_err();
        assert_eq!(err, DomainError::LegsNotContiguous { index: 1 });
    }

    #[test]
    fn sequential_ids() {
        let mut ids = SequentialIds::new("trip");
        assert_eq!(ids.next_id().as_str(), "trip-0");
        assert_eq!(ids.next_id().as_str(), "trip-1");
    }

    #[test]
    fn random_ids_differ() {
        let mut ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a.as_str().starts_with("generated-"));
        assert_ne!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::leg::test_support::*;
    use proptest::prelude::*;

    proptest! {
        /// For any contiguous walk/ride pattern with at least one ride,
        /// transfers == rides - 1 and every adjacent pair connects.
        #[test]
        fn transfers_are_rides_minus_one(pattern in prop::collection::vec(any::<bool>(), 1..12)) {
            prop_assume!(pattern.iter().any(|&is_ride| is_ride));
            let legs: Vec<Leg> = pattern
                .iter()
                .enumerate()
                .map(|(i, &is_ride)| {
                    let (from, to) = (i.to_string(), (i + 1).to_string());
                    let dep = at(6, 0) + Duration::minutes(i as i64 * 10);
                    let arr = dep + Duration::minutes(8);
                    if is_ride { ride(&from, dep, &to, arr) } else { walk(&from, dep, &to, arr) }
                })
                .collect();
            let rides = pattern.iter().filter(|&&is_ride| is_ride).count();

            let trip = Trip::assemble(TripId::new("p"), legs, vec![]).unwrap();
            prop_assert_eq!(trip.transfers(), rides - 1);
            for pair in trip.legs().windows(2) {
                prop_assert!(pair[0].arrival_location().same_place(pair[1].departure_location()));
            }
        }
    }
}
