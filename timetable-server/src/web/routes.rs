//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{Location, Point, TripQuery};
use crate::searchch::{SearchError, Transport, TripsResult};

use super::dto::*;
use super::state::AppState;

/// Default and maximum number of locations per lookup.
const DEFAULT_LOCATION_LIMIT: usize = 10;
const MAX_LOCATION_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router<T: Transport>(state: AppState<T>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/locations", get(search_locations::<T>))
        .route("/api/locations/nearby", get(nearby_locations::<T>))
        .route("/api/trips", get(search_trips::<T>))
        .route("/api/trips/more", get(more_trips::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn location_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_LOCATION_LIMIT)
        .min(MAX_LOCATION_LIMIT)
}

fn locations_response(locations: &[Location]) -> Json<LocationsResponse> {
    Json(LocationsResponse {
        locations: locations.iter().map(LocationResult::from).collect(),
    })
}

/// Search locations by name.
async fn search_locations<T: Transport>(
    State(state): State<AppState<T>>,
    Query(req): Query<LocationSearchRequest>,
) -> Result<Json<LocationsResponse>, AppError> {
    let term = req.q.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest {
            message: "Query must not be empty".to_string(),
        });
    }

    let locations = state
        .client
        .suggest_locations(term, location_limit(req.limit))
        .await?;
    Ok(locations_response(&locations))
}

/// Locations near a coordinate.
async fn nearby_locations<T: Transport>(
    State(state): State<AppState<T>>,
    Query(req): Query<NearbyRequest>,
) -> Result<Json<LocationsResponse>, AppError> {
    if !(-90.0..=90.0).contains(&req.lat) || !(-180.0..=180.0).contains(&req.lon) {
        return Err(AppError::BadRequest {
            message: format!("Coordinate out of range: {},{}", req.lat, req.lon),
        });
    }

    let locations = state
        .client
        .nearby_locations(
            Point::new(req.lat, req.lon),
            req.accuracy,
            location_limit(req.limit),
        )
        .await?;
    Ok(locations_response(&locations))
}

/// Resolve the requested date and time, defaulting to now.
fn requested_time(date: Option<&str>, time: Option<&str>) -> Result<NaiveDateTime, AppError> {
    let now = Local::now().naive_local();

    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
            message: format!("Invalid date (expected YYYY-MM-DD): {d}"),
        })?,
        None => now.date(),
    };
    let time = match time {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| AppError::BadRequest {
            message: format!("Invalid time (expected HH:MM): {t}"),
        })?,
        None => now.time(),
    };

    Ok(date.and_time(time))
}

fn trips_response(result: TripsResult) -> Result<Json<TripsResponse>, AppError> {
    let response = match result {
        TripsResult::Trips { trips, context } => {
            let token = encode_context(&context).map_err(|e| AppError::Internal {
                message: format!("Failed to encode context: {e}"),
            })?;
            TripsResponse::Ok {
                trips: trips.iter().map(TripResult::from).collect(),
                context: Some(token),
                can_query_earlier: context.can_query_earlier(),
                can_query_later: context.can_query_later(),
            }
        }
        TripsResult::NoResult { reason } => TripsResponse::NoResult { reason },
    };
    Ok(Json(response))
}

/// Search trips between two places.
async fn search_trips<T: Transport>(
    State(state): State<AppState<T>>,
    Query(req): Query<TripSearchRequest>,
) -> Result<Json<TripsResponse>, AppError> {
    let at = requested_time(req.date.as_deref(), req.time.as_deref())?;
    let from = Location::from_query_term(&req.from);
    let to = Location::from_query_term(&req.to);
    let via = req
        .via
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(Location::from_query_term);

    let query = if req.arrival {
        TripQuery::arriving(from, to, at)
    } else {
        TripQuery::departing(from, to, at)
    }
    .with_via(via)
    .with_options(state.client.trip_options());

    trips_response(state.client.query_trips(&query).await?)
}

/// Fetch the page of trips before or after a previous response.
async fn more_trips<T: Transport>(
    State(state): State<AppState<T>>,
    Query(req): Query<MoreTripsRequest>,
) -> Result<Json<TripsResponse>, AppError> {
    let context = decode_context(&req.context).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    trips_response(state.client.query_more_trips(&context, req.later).await?)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        let message = e.to_string();
        match e {
            SearchError::InvalidQuery(_) | SearchError::InvalidUrl(_) => {
                AppError::BadRequest { message }
            }
            SearchError::NoMoreResults => AppError::NotFound { message },
            SearchError::Http(_)
            | SearchError::Status { .. }
            | SearchError::RateLimited
            | SearchError::Decode(_)
            | SearchError::Fixture(_) => AppError::Upstream { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::searchch::{ClientConfig, FixtureTransport, TimetableClient};

    const ROUTE: &str = include_str!("../../data/fixtures/route.json");
    const COMPLETION: &str = include_str!("../../data/fixtures/completion.json");

    fn app_with(route: &str) -> (Router, FixtureTransport) {
        let transport = FixtureTransport::new()
            .with_body("route", route)
            .with_body("completion", COMPLETION);
        let client = TimetableClient::with_transport(ClientConfig::new(), transport.clone());
        (create_router(AppState::new(client)), transport)
    }

    fn app() -> Router {
        app_with(ROUTE).0
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    const TRIPS_URI: &str = "/api/trips?from=8503000&to=8507000&date=2024-03-15&time=08:00";

    #[tokio::test]
    async fn health_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn locations_from_completion() {
        let (status, json) = get_json(app(), "/api/locations?q=Bern&limit=3").await;
        assert_eq!(status, StatusCode::OK);
        let locations = json["locations"].as_array().unwrap();
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0]["id"], "8507000");
        assert_eq!(locations[0]["kind"], "station");
    }

    #[tokio::test]
    async fn empty_location_query_rejected() {
        let (status, json) = get_json(app(), "/api/locations?q=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn nearby_sends_coordinate() {
        let (app, transport) = app_with(ROUTE);
        let (status, json) =
            get_json(app, "/api/locations/nearby?lat=46.9488&lon=7.4391&accuracy=50").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!json["locations"].as_array().unwrap().is_empty());

        let requests = transport.requests().await;
        let pairs: Vec<(String, String)> = requests[0].query_pairs().into_owned().collect();
        assert!(pairs.contains(&("latlon".into(), "46.9488,7.4391".into())));
        assert!(pairs.contains(&("accuracy".into(), "50".into())));
    }

    #[tokio::test]
    async fn nearby_out_of_range_rejected() {
        let (status, _) = get_json(app(), "/api/locations/nearby?lat=120&lon=7").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn trips_from_fixture() {
        let (status, json) = get_json(app(), TRIPS_URI).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["can_query_later"], true);
        assert_eq!(json["can_query_earlier"], true);

        let trips = json["trips"].as_array().unwrap();
        assert_eq!(trips.len(), 3);
        assert_eq!(trips[0]["departure"]["delay_mins"], 2);
        assert_eq!(trips[1]["transfers"], 1);
        assert_eq!(trips[1]["legs"][1]["type"], "walk");
        assert_eq!(trips[1]["disruptions"].as_array().unwrap().len(), 1);
        assert_eq!(trips[2]["cancelled"], true);
        assert!(json["context"].is_string());
    }

    #[tokio::test]
    async fn arrival_flag_sent_upstream() {
        let (app, transport) = app_with(ROUTE);
        let (status, _) = get_json(app, &format!("{TRIPS_URI}&arrival=true&via=Olten")).await;
        assert_eq!(status, StatusCode::OK);

        let requests = transport.requests().await;
        let pairs: Vec<(String, String)> = requests[0].query_pairs().into_owned().collect();
        assert!(pairs.contains(&("time_type".into(), "arrival".into())));
        assert!(pairs.contains(&("via".into(), "Olten".into())));
    }

    #[tokio::test]
    async fn upstream_error_is_no_result() {
        let (app, _) = app_with(r#"{"error":"Keine Verbindung gefunden"}"#);
        let (status, json) = get_json(app, TRIPS_URI).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "no_result");
        assert_eq!(json["reason"], "Keine Verbindung gefunden");
    }

    #[tokio::test]
    async fn garbage_body_is_bad_gateway() {
        let (app, _) = app_with("<html>maintenance</html>");
        let (status, json) = get_json(app, TRIPS_URI).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_date_rejected() {
        let (status, _) = get_json(app(), "/api/trips?from=A&to=B&date=15.03.2024").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_origin_rejected() {
        let (status, _) = get_json(app(), "/api/trips?from=&to=8507000&time=08:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn more_trips_follows_context() {
        let (app, transport) = app_with(ROUTE);
        let (_, json) = get_json(app.clone(), TRIPS_URI).await;
        let token = json["context"].as_str().unwrap().to_string();

        let (status, json) =
            get_json(app, &format!("/api/trips/more?context={token}&later=false")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let requests = transport.requests().await;
        let pairs: Vec<(String, String)> = requests[1].query_pairs().into_owned().collect();
        assert!(pairs.contains(&("time".into(), "08:57".into())));
        assert!(pairs.contains(&("time_type".into(), "arrival".into())));
    }

    #[tokio::test]
    async fn bad_context_rejected() {
        let (status, _) = get_json(app(), "/api/trips/more?context=not-a-token").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unbounded_context_is_not_found() {
        let (_, json) = get_json(app(), TRIPS_URI).await;
        let context = decode_context(json["context"].as_str().unwrap()).unwrap();

        let mut raw = serde_json::to_value(&context).unwrap();
        raw["latest_departure"] = Value::Null;
        let token = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&raw).unwrap());

        let (status, _) = get_json(app(), &format!("/api/trips/more?context={token}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
