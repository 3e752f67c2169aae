//! Domain types for the timetable trip decoder.
//!
//! This module contains the caller-facing itinerary model: locations,
//! stops, lines, legs, trips and the pagination cursor. Types that carry
//! invariants enforce them at construction time, so code that receives
//! them can trust their validity.

mod disruption;
mod error;
pub(crate) mod leg;
mod line;
mod location;
mod pagination;
mod query;
mod stop;
mod time;
mod trip;

pub use disruption::{Disruption, TimeRange};
pub use error::DomainError;
pub use leg::{Leg, LegClass, TransitLeg, WalkingLeg};
pub use line::{Color, ColorError, Line, Product, Shape, Style};
pub use location::{Location, LocationKind, Point};
pub use pagination::PaginationContext;
pub use query::{TimeType, TripOptions, TripQuery};
pub use stop::{Stop, StopTime};
pub use time::{
    Delay, TIME_RANGE_FORMATS, TIMESTAMP_FORMAT, TimeError, apply_delay, parse_delay,
    parse_timestamp, parse_with_candidates,
};
pub use trip::{IdGenerator, RandomIds, SequentialIds, Trip, TripId};
