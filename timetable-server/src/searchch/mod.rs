//! search.ch timetable client.
//!
//! This module provides an HTTP client for the search.ch timetable API,
//! which plans door-to-door trips on Swiss public transport.
//!
//! Key characteristics of the upstream:
//! - A `route.json` body is one of `{error}`, `{count, connections}` or
//!   `{messages}`; only the second carries trips
//! - Every connection ends with a pseudo-leg that has no `exit` and only
//!   names the destination
//! - Delays are whole minutes, or `"X"` for a cancelled call
//! - Times are local wall-clock `"YYYY-MM-DD HH:MM:SS"`
//! - Disruptions arrive as a map keyed by reference URL, or `[]` for none

mod client;
mod convert;
mod decode;
mod error;
mod fixture;
mod types;

pub use client::{ClientConfig, HttpTransport, TimetableClient, Transport, TripsResult};
pub use convert::{
    ConversionError, build_info, convert_completion, convert_connection, convert_connections,
    convert_leg, extract_disruptions,
};
pub use decode::{DecodeError, RouteOutcome, decode_completions, decode_route};
pub use error::SearchError;
pub use fixture::FixtureTransport;
pub use types::{
    CompletionEntry, RawConnection, RawDelay, RawDisruption, RawExit, RawInfoText, RawLeg,
    RawStop, RouteResponse,
};
