//! search.ch API response DTOs.
//!
//! These types map directly to the `route.json` and `completion.json`
//! responses. They use `Option` liberally because the upstream omits
//! fields or sends them as null, and a few fields arrive as either a
//! number or a string depending on the record. Non-optional fields read
//! null as their default.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::domain::{Delay, parse_delay};

/// Top-level response from `route.json`.
///
/// Exactly one of `error`, `connections` or `messages` is expected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteResponse {
    /// Upstream error text, e.g. for an unknown station.
    pub error: Option<String>,

    /// Number of connections the upstream claims to return.
    pub count: Option<i64>,

    /// Connections, in departure order.
    pub connections: Option<Vec<RawConnection>>,

    /// Informational messages sent instead of connections.
    pub messages: Option<Vec<String>>,
}

/// One connection (trip) in a route response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConnection {
    /// Origin name as the upstream resolved it.
    pub from: Option<String>,

    /// Destination name as the upstream resolved it.
    pub to: Option<String>,

    /// Total duration in seconds.
    pub duration: Option<f64>,

    /// Departure timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub departure: Option<String>,

    /// Arrival timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub arrival: Option<String>,

    /// Connection-level disruptions keyed by reference URL.
    #[serde(default, deserialize_with = "disruption_map")]
    pub disruptions: Option<BTreeMap<String, RawDisruption>>,

    /// Legs, the last of which is the terminal pseudo-leg.
    #[serde(default, deserialize_with = "null_as_default")]
    pub legs: Vec<RawLeg>,
}

/// One leg of a connection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeg {
    /// Leg type: `"walk"`, `"express_train"`, `"bus"`, ...
    #[serde(rename = "type")]
    pub leg_type: Option<String>,

    /// Name of the boarding place.
    pub name: Option<String>,

    /// Upstream station id of the boarding place.
    #[serde(default, deserialize_with = "string_or_number")]
    pub stopid: Option<String>,

    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Departure timestamp at the boarding place.
    pub departure: Option<String>,

    /// Arrival timestamp at the boarding place (first leg omits it).
    pub arrival: Option<String>,

    /// Line label, e.g. `"IC 1"`.
    pub line: Option<String>,

    /// Operator short name.
    pub operator: Option<String>,

    /// Headsign of the vehicle.
    pub terminal: Option<String>,

    /// Trip number.
    #[serde(rename = "*Z", default, deserialize_with = "string_or_number")]
    pub trip_number: Option<String>,

    /// Product code, e.g. `"IC"` or `"S"`.
    #[serde(rename = "*G")]
    pub product_code: Option<String>,

    /// Label text color as hex.
    pub fgcolor: Option<String>,

    /// Label background color as hex.
    pub bgcolor: Option<String>,

    /// Boarding track or platform.
    #[serde(default, deserialize_with = "string_or_number")]
    pub track: Option<String>,

    pub dep_delay: Option<RawDelay>,
    pub arr_delay: Option<RawDelay>,

    /// Whether the ride is cancelled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancelled: bool,

    /// Whether the boarding place is a street address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub isaddress: bool,

    /// Free informational text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub infotext: Vec<RawInfoText>,

    /// Intermediate calls.
    pub stops: Option<Vec<RawStop>>,

    /// Leg-level disruptions keyed by reference URL.
    #[serde(default, deserialize_with = "disruption_map")]
    pub disruptions: Option<BTreeMap<String, RawDisruption>>,

    /// Where this leg is left. Absent on the terminal pseudo-leg.
    pub exit: Option<RawExit>,

    /// Running time in seconds.
    pub runningtime: Option<f64>,

    /// Upstream trip id.
    pub tripid: Option<String>,
}

/// The alighting end of a leg.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExit {
    /// Arrival timestamp at the alighting place.
    pub arrival: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub stopid: Option<String>,

    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Waiting time at the alighting place, in seconds.
    pub waittime: Option<f64>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub track: Option<String>,

    pub arr_delay: Option<RawDelay>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub isaddress: bool,
}

/// An intermediate call of a leg.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStop {
    #[serde(default, deserialize_with = "string_or_number")]
    pub stopid: Option<String>,

    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub arrival: Option<String>,
    pub departure: Option<String>,
    pub dep_delay: Option<RawDelay>,
    pub arr_delay: Option<RawDelay>,
}

impl RawStop {
    /// A waypoint without times, such as a tunnel portal.
    pub fn is_special(&self) -> bool {
        self.arrival.is_none() && self.departure.is_none()
    }
}

/// A service alert as sent upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDisruption {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub header: Option<String>,
    pub lead: Option<String>,
    pub text: Option<String>,
    /// `"<start>-<end>"` in German or English form.
    pub timerange: Option<String>,
}

/// A delay value: a number, a numeric string, or the `"X"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawDelay {
    Minutes(i64),
    Text(String),
}

impl RawDelay {
    pub fn to_delay(&self) -> Delay {
        match self {
            RawDelay::Minutes(m) => Delay::Minutes(*m),
            RawDelay::Text(s) => parse_delay(s),
        }
    }
}

/// Converts an optional raw delay, treating absence as no delay.
pub fn delay_of(raw: Option<&RawDelay>) -> Delay {
    raw.map(RawDelay::to_delay).unwrap_or_default()
}

/// An `infotext` entry: either a bare string or an object with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawInfoText {
    Plain(String),
    Structured { text: Option<String> },
}

impl RawInfoText {
    pub fn text(&self) -> Option<&str> {
        match self {
            RawInfoText::Plain(s) => Some(s),
            RawInfoText::Structured { text } => text.as_deref(),
        }
    }
}

/// One entry of a `completion.json` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    /// Display label.
    pub label: Option<String>,

    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Icon hint; contains `"adr"` for street addresses.
    pub iconclass: Option<String>,

    /// Distance in metres, on nearby searches.
    pub dist: Option<f64>,
}

/// Accepts a JSON string or number, yielding its string form.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(
        Option::<Lenient>::deserialize(deserializer)?.map(|value| match value {
            Lenient::Text(s) => s,
            Lenient::Int(n) => n.to_string(),
            Lenient::Float(n) => n.to_string(),
        }),
    )
}

/// Reads an explicit null as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accepts a disruption map, or the empty array the upstream sends for none.
fn disruption_map<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, RawDisruption>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList {
        Map(BTreeMap<String, RawDisruption>),
        List(Vec<serde_json::Value>),
    }

    match Option::<MapOrList>::deserialize(deserializer)? {
        Some(MapOrList::Map(map)) => Ok(Some(map)),
        Some(MapOrList::List(list)) if list.is_empty() => Ok(None),
        Some(MapOrList::List(_)) => Err(serde::de::Error::custom(
            "disruptions must be a map keyed by reference URL",
        )),
        None => Ok(None),
    }
}
