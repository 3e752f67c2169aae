//! Data transfer objects for web requests and responses.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Disruption, Leg, Location, LocationKind, PaginationContext, Product, Stop, StopTime,
    TransitLeg, Trip, WalkingLeg,
};

/// Format for times in responses.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Request to look up locations by name.
#[derive(Debug, Deserialize)]
pub struct LocationSearchRequest {
    /// Free text to complete
    pub q: String,

    /// Maximum results (defaults to 10)
    pub limit: Option<usize>,
}

/// Request to look up locations near a coordinate.
#[derive(Debug, Deserialize)]
pub struct NearbyRequest {
    pub lat: f64,
    pub lon: f64,

    /// Search radius hint in metres
    pub accuracy: Option<u32>,

    /// Maximum results (defaults to 10)
    pub limit: Option<usize>,
}

/// Request to search trips.
#[derive(Debug, Deserialize)]
pub struct TripSearchRequest {
    /// Origin: station id, `"lat,lon"` or free text
    pub from: String,

    /// Destination: station id, `"lat,lon"` or free text
    pub to: String,

    /// Optional intermediate place
    pub via: Option<String>,

    /// Date in YYYY-MM-DD format (defaults to today)
    pub date: Option<String>,

    /// Time in HH:MM format (defaults to now)
    pub time: Option<String>,

    /// Treat the time as an arrival bound
    #[serde(default)]
    pub arrival: bool,
}

/// Request for the neighbouring page of trips.
#[derive(Debug, Deserialize)]
pub struct MoreTripsRequest {
    /// Context token from a previous response
    pub context: String,

    /// Step later (default) or earlier
    #[serde(default = "default_later")]
    pub later: bool,
}

fn default_later() -> bool {
    true
}

/// A location in responses.
#[derive(Debug, Serialize)]
pub struct LocationResult {
    pub kind: LocationKind,
    pub id: Option<String>,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Response for location lookups.
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<LocationResult>,
}

/// A planned time and its real-time expectation.
#[derive(Debug, Serialize)]
pub struct TimeInfo {
    pub planned: String,
    pub expected: String,
    /// Minutes late (negative if early)
    pub delay_mins: i64,
}

/// A stop in a transit leg.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub location: LocationResult,
    pub arrival: Option<TimeInfo>,
    pub departure: Option<TimeInfo>,
    pub track: Option<String>,
    pub cancelled: bool,
}

/// Line identity and colors.
#[derive(Debug, Serialize)]
pub struct LineResult {
    pub label: Option<String>,
    pub product: Product,
    pub operator: Option<String>,
    pub trip_number: Option<String>,
    /// Background color as `#rrggbb`
    pub background: String,
    /// Foreground color as `#rrggbb`
    pub foreground: String,
}

/// A walk in a trip.
#[derive(Debug, Serialize)]
pub struct WalkResult {
    pub from: LocationResult,
    pub to: LocationResult,
    pub departure: TimeInfo,
    pub arrival: TimeInfo,
    pub duration_mins: i64,
}

/// A ride in a trip.
#[derive(Debug, Serialize)]
pub struct TransitResult {
    pub line: LineResult,
    /// Headsign
    pub destination: Option<String>,
    pub departure: StopResult,
    pub arrival: StopResult,
    /// Intermediate stops
    pub stops: Vec<StopResult>,
    pub info: Option<String>,
    pub cancelled: bool,
    pub disruptions: Vec<Disruption>,
}

/// A leg of a trip.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LegResult {
    Walk(WalkResult),
    Transit(TransitResult),
}

/// A trip option.
#[derive(Debug, Serialize)]
pub struct TripResult {
    pub id: String,
    pub origin: LocationResult,
    pub destination: LocationResult,
    pub departure: TimeInfo,
    pub arrival: TimeInfo,
    /// Total duration in minutes
    pub duration_mins: i64,
    /// Number of changes
    pub transfers: usize,
    pub cancelled: bool,
    pub legs: Vec<LegResult>,
    /// Connection-level disruptions
    pub disruptions: Vec<Disruption>,
}

/// Response for trip searches.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TripsResponse {
    Ok {
        trips: Vec<TripResult>,
        /// Token for `/api/trips/more`
        context: Option<String>,
        can_query_earlier: bool,
        can_query_later: bool,
    },
    NoResult {
        reason: String,
    },
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

fn format_time(t: NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

impl From<&Location> for LocationResult {
    fn from(location: &Location) -> Self {
        Self {
            kind: location.kind,
            id: location.id.clone(),
            name: location.display_name().to_string(),
            lat: location.coord.map(|c| c.lat),
            lon: location.coord.map(|c| c.lon),
        }
    }
}

impl From<StopTime> for TimeInfo {
    fn from(time: StopTime) -> Self {
        Self {
            planned: format_time(time.planned),
            expected: format_time(time.expected),
            delay_mins: time.delay_minutes(),
        }
    }
}

impl From<&Stop> for StopResult {
    fn from(stop: &Stop) -> Self {
        Self {
            location: (&stop.location).into(),
            arrival: stop.arrival.map(TimeInfo::from),
            departure: stop.departure.map(TimeInfo::from),
            track: stop.track.clone(),
            cancelled: stop.cancelled,
        }
    }
}

impl From<&WalkingLeg> for WalkResult {
    fn from(walk: &WalkingLeg) -> Self {
        Self {
            from: (&walk.departure).into(),
            to: (&walk.arrival).into(),
            departure: walk.departure_time.into(),
            arrival: walk.arrival_time.into(),
            duration_mins: (walk.arrival_time.planned - walk.departure_time.planned).num_minutes(),
        }
    }
}

impl From<&TransitLeg> for TransitResult {
    fn from(ride: &TransitLeg) -> Self {
        let line = ride.line();
        Self {
            line: LineResult {
                label: line.label.clone(),
                product: line.product,
                operator: line.operator.clone(),
                trip_number: line.trip_number.clone(),
                background: line.style.background.to_hex(),
                foreground: line.style.foreground.to_hex(),
            },
            destination: ride.destination_name().map(String::from),
            departure: ride.departure().into(),
            arrival: ride.arrival().into(),
            stops: ride.intermediate_stops().iter().map(StopResult::from).collect(),
            info: ride.info().map(String::from),
            cancelled: ride.is_cancelled(),
            disruptions: ride.disruptions().to_vec(),
        }
    }
}

impl From<&Leg> for LegResult {
    fn from(leg: &Leg) -> Self {
        match leg {
            Leg::Walking(walk) => LegResult::Walk(walk.into()),
            Leg::Transit(ride) => LegResult::Transit(ride.into()),
        }
    }
}

impl From<&Trip> for TripResult {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id().to_string(),
            origin: trip.origin().into(),
            destination: trip.destination().into(),
            departure: trip.departure_time().into(),
            arrival: trip.arrival_time().into(),
            duration_mins: trip.duration().num_minutes(),
            transfers: trip.transfers(),
            cancelled: trip.is_cancelled(),
            legs: trip.legs().iter().map(LegResult::from).collect(),
            disruptions: trip.disruptions().to_vec(),
        }
    }
}

/// Error decoding a context token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("context token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("context token is not a valid context: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encodes a pagination context as an opaque URL-safe token.
pub fn encode_context(context: &PaginationContext) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(context)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decodes a token produced by [`encode_context`].
pub fn decode_context(token: &str) -> Result<PaginationContext, TokenError> {
    let json = URL_SAFE_NO_PAD.decode(token.trim())?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::leg::test_support::*;
    use crate::domain::{TripId, TripQuery};

    fn trip() -> Trip {
        Trip::assemble(
            TripId::new("trip-0"),
            vec![
                walk("a", at(7, 50), "b", at(7, 58)),
                ride("b", at(8, 2), "c", at(8, 58)),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn trip_result_shape() {
        let result = TripResult::from(&trip());
        assert_eq!(result.id, "trip-0");
        assert_eq!(result.duration_mins, 68);
        assert_eq!(result.transfers, 0);
        assert_eq!(result.departure.planned, "2024-03-15 07:50");
        assert_eq!(result.legs.len(), 2);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["legs"][0]["type"], "walk");
        assert_eq!(json["legs"][1]["type"], "transit");
        assert_eq!(json["legs"][1]["line"]["background"], "#000000");
        assert_eq!(json["legs"][1]["line"]["product"], "regional_train");
        assert_eq!(json["origin"]["kind"], "station");
    }

    #[test]
    fn no_result_shape() {
        let json = serde_json::to_value(TripsResponse::NoResult {
            reason: "no connections".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "no_result");
        assert_eq!(json["reason"], "no connections");
    }

    #[test]
    fn context_token_roundtrip() {
        let query = TripQuery::departing(Location::any("a"), Location::any("c"), at(8, 0));
        let context = PaginationContext::derive(&[trip()], &query).unwrap();

        let token = encode_context(&context).unwrap();
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));

        assert_eq!(decode_context(&token).unwrap(), context);
    }

    #[test]
    fn bad_tokens_rejected() {
        assert!(matches!(decode_context("!!!"), Err(TokenError::Base64(_))));
        let not_a_context = URL_SAFE_NO_PAD.encode(b"{\"hello\":1}");
        assert!(matches!(decode_context(&not_a_context), Err(TokenError::Json(_))));
    }
}
