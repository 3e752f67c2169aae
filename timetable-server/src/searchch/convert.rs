//! Conversion from search.ch DTOs to domain types.
//!
//! This is where the irregular upstream structure is interpreted: the
//! terminal pseudo-leg is dropped, walks are told apart from rides, delays
//! are overlaid on planned times, and disruptions are flattened into
//! summaries. Each connection converts independently; a bad connection is
//! logged and skipped rather than failing the whole response.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::domain::{
    Color, Disruption, DomainError, IdGenerator, Leg, LegClass, Line, Location,
    LocationKind, Point, Product, Shape, Stop, StopTime, Style, TimeRange, TransitLeg, Trip,
    TripId, WalkingLeg, parse_timestamp,
};

use super::types::{
    CompletionEntry, RawConnection, RawDisruption, RawExit, RawInfoText, RawLeg, RawStop,
    delay_of,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A timestamp was present but malformed
    #[error("invalid {field} timestamp: {value:?}")]
    InvalidTime { field: &'static str, value: String },

    /// The converted data violates a domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Converts every connection, skipping the ones that fail.
///
/// Each trip takes its id from `ids`. Rejected connections are logged at
/// warn level and left out of the result.
pub fn convert_connections(
    connections: &[RawConnection],
    ids: &mut impl IdGenerator,
) -> Vec<Trip> {
    let mut trips = Vec::with_capacity(connections.len());

    for (index, connection) in connections.iter().enumerate() {
        match convert_connection(connection, ids.next_id()) {
            Ok(trip) => trips.push(trip),
            Err(e) => warn!(
                index,
                from = connection.from.as_deref().unwrap_or("?"),
                to = connection.to.as_deref().unwrap_or("?"),
                error = %e,
                "skipping connection"
            ),
        }
    }

    trips
}

/// Converts one connection into a trip.
pub fn convert_connection(
    connection: &RawConnection,
    id: TripId,
) -> Result<Trip, ConversionError> {
    let disruptions = extract_disruptions(connection.disruptions.as_ref());

    let mut legs = Vec::with_capacity(connection.legs.len());
    for raw in &connection.legs {
        if let Some(leg) = convert_leg(raw, &disruptions)? {
            legs.push(leg);
        }
    }

    Ok(Trip::assemble(id, legs, disruptions)?)
}

/// Converts one raw leg. Returns `None` for the terminal pseudo-leg.
///
/// `connection_disruptions` are the alerts of the enclosing connection;
/// their summaries are added to a ride's info after its own.
pub fn convert_leg(
    raw: &RawLeg,
    connection_disruptions: &[Disruption],
) -> Result<Option<Leg>, ConversionError> {
    let class = LegClass::classify(raw.leg_type.as_deref(), raw.exit.is_some());
    let exit = match (class, &raw.exit) {
        (LegClass::Terminal, _) | (_, None) => return Ok(None),
        (_, Some(exit)) => exit,
    };

    let dep_delay = delay_of(raw.dep_delay.as_ref());
    // The leg's own `arr_delay` describes the boarding place, not the exit.
    let arr_delay = delay_of(exit.arr_delay.as_ref());

    let (planned_departure, planned_arrival) = leg_times(raw, exit)?;
    let departure_time = StopTime::from_planned(planned_departure, &dep_delay);
    let arrival_time = StopTime::from_planned(planned_arrival, &arr_delay);

    let departure = place(
        raw.isaddress,
        raw.stopid.as_deref(),
        raw.lat,
        raw.lon,
        raw.name.as_deref(),
    );
    let arrival = place(
        exit.isaddress,
        exit.stopid.as_deref(),
        exit.lat,
        exit.lon,
        exit.name.as_deref(),
    );

    if class == LegClass::Walking {
        return Ok(Some(Leg::Walking(WalkingLeg {
            departure,
            arrival,
            departure_time: departure_time
                .or(arrival_time)
                .ok_or(DomainError::MissingTime("walk departure"))?,
            arrival_time: arrival_time
                .or(departure_time)
                .ok_or(DomainError::MissingTime("walk arrival"))?,
        })));
    }

    let cancelled = raw.cancelled || dep_delay.is_cancelled() || arr_delay.is_cancelled();

    let departure = Stop::new(departure)
        .with_departure(departure_time)
        .with_track(raw.track.clone())
        .with_cancelled(cancelled);
    let arrival = Stop::new(arrival)
        .with_arrival(arrival_time)
        .with_track(exit.track.clone())
        .with_cancelled(cancelled);

    let intermediate_stops = raw
        .stops
        .iter()
        .flatten()
        .filter(|stop| !stop.is_special())
        .map(convert_stop)
        .collect::<Result<Vec<_>, _>>()?;

    let disruptions = extract_disruptions(raw.disruptions.as_ref());
    let summarised: Vec<Disruption> = disruptions
        .iter()
        .chain(connection_disruptions)
        .cloned()
        .collect();
    let info = build_info(&raw.infotext, &summarised);

    let leg = TransitLeg::new(line_of(raw), departure, arrival)?
        .with_intermediate_stops(intermediate_stops)
        .with_destination_name(raw.terminal.clone())
        .with_info(info)
        .with_disruptions(disruptions);

    Ok(Some(Leg::Transit(leg)))
}

/// Planned boarding and alighting times of a leg.
///
/// The boarding time is the leg's departure, else its arrival (first legs
/// may carry only one). The alighting time is the exit's arrival, else the
/// boarding time. The leg's own `arrival` is never used for the alighting
/// side since it is a time at the boarding place.
fn leg_times(
    raw: &RawLeg,
    exit: &RawExit,
) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>), ConversionError> {
    let departure = timestamp("leg departure", raw.departure.as_deref())?;
    let arrival = timestamp("leg arrival", raw.arrival.as_deref())?;
    let exit_arrival = timestamp("exit arrival", exit.arrival.as_deref())?;

    let boarding = departure.or(arrival);
    Ok((boarding, exit_arrival.or(boarding)))
}

fn convert_stop(raw: &RawStop) -> Result<Stop, ConversionError> {
    let arrival = timestamp("stop arrival", raw.arrival.as_deref())?;
    let departure = timestamp("stop departure", raw.departure.as_deref())?;

    let location = place(
        false,
        raw.stopid.as_deref(),
        raw.lat,
        raw.lon,
        raw.name.as_deref(),
    );

    Ok(Stop::new(location)
        .with_arrival(StopTime::from_planned(
            arrival,
            &delay_of(raw.arr_delay.as_ref()),
        ))
        .with_departure(StopTime::from_planned(
            departure,
            &delay_of(raw.dep_delay.as_ref()),
        ))
        .with_sides_filled())
}

fn line_of(raw: &RawLeg) -> Line {
    Line {
        trip_number: raw.trip_number.clone(),
        operator: raw.operator.clone(),
        product: raw
            .product_code
            .as_deref()
            .map_or(Product::Unknown, Product::from_code),
        label: raw.line.clone(),
        style: Style {
            shape: Shape::Rect,
            background: color_or("bgcolor", raw.bgcolor.as_deref(), Color::BLACK),
            foreground: color_or("fgcolor", raw.fgcolor.as_deref(), Color::WHITE),
        },
    }
}

/// Parses a display color, falling back to `default` if absent or invalid.
fn color_or(field: &'static str, raw: Option<&str>, default: Color) -> Color {
    let Some(raw) = raw else {
        return default;
    };
    Color::parse_hex(raw).unwrap_or_else(|e| {
        warn!(field, error = %e, "ignoring invalid line color");
        default
    })
}

fn place(
    is_address: bool,
    id: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
    name: Option<&str>,
) -> Location {
    Location {
        kind: if is_address {
            LocationKind::Address
        } else {
            LocationKind::Station
        },
        id: id.filter(|id| !id.is_empty()).map(String::from),
        coord: Point::from_parts(lat, lon),
        name: name.map(String::from),
    }
}

fn timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDateTime>, ConversionError> {
    value
        .map(|v| {
            parse_timestamp(v).map_err(|_| ConversionError::InvalidTime {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

/// Enumerates a disruption map keyed by reference URL.
///
/// An unparseable time range is dropped; the disruption itself is kept.
pub fn extract_disruptions(map: Option<&BTreeMap<String, RawDisruption>>) -> Vec<Disruption> {
    let Some(map) = map else {
        return Vec::new();
    };

    map.iter()
        .map(|(key, raw)| {
            let time_range = raw.timerange.as_deref().and_then(|range| {
                let parsed = TimeRange::parse(range);
                if parsed.is_none() {
                    debug!(key, range, "unparseable disruption time range");
                }
                parsed
            });
            Disruption {
                key: key.clone(),
                id: raw.id.clone(),
                header: raw.header.clone(),
                lead: raw.lead.clone(),
                text: raw.text.clone(),
                time_range,
            }
        })
        .collect()
}

/// Joins info texts and disruption summaries, one per line.
pub fn build_info(infotext: &[RawInfoText], disruptions: &[Disruption]) -> Option<String> {
    let lines: Vec<String> = infotext
        .iter()
        .filter_map(RawInfoText::text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .chain(disruptions.iter().filter_map(Disruption::summary))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Converts a location-lookup entry. Entries with neither id nor label are dropped.
pub fn convert_completion(entry: &CompletionEntry) -> Option<Location> {
    let id = entry.id.clone().filter(|id| !id.is_empty());
    let name = entry.label.clone().filter(|l| !l.trim().is_empty());
    if id.is_none() && name.is_none() {
        return None;
    }

    let is_address = entry
        .iconclass
        .as_deref()
        .is_some_and(|class| class.contains("adr"));
    let kind = match (&id, is_address) {
        (_, true) => LocationKind::Address,
        (None, false) => LocationKind::Any,
        (Some(_), false) => LocationKind::Station,
    };

    Some(Location {
        kind,
        id,
        coord: Point::from_parts(entry.lat, entry.lon),
        name,
    })
}
