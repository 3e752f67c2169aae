//! search.ch timetable HTTP client.
//!
//! Provides async methods for trip queries, pagination and location
//! lookup. The network is reached through a [`Transport`], so the same
//! client runs against the live API or against fixture bodies.

use std::future::Future;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::domain::{
    IdGenerator, Location, PaginationContext, Point, RandomIds, Trip, TripOptions, TripQuery,
};

use super::convert::{convert_completion, convert_connections};
use super::decode::{RouteOutcome, decode_completions, decode_route};
use super::error::SearchError;

/// Default base URL for the search.ch timetable API.
const DEFAULT_BASE_URL: &str = "https://timetable.search.ch/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default number of connections per trip query.
const DEFAULT_MAX_TRIPS: u32 = 8;

const ROUTE_ENDPOINT: &str = "route.json";
const COMPLETION_ENDPOINT: &str = "completion.json";

/// Configuration for the timetable client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API (defaults to production search.ch)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connections requested per trip query
    pub max_trips: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    /// Create a config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            max_trips: DEFAULT_MAX_TRIPS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set connections requested per trip query.
    pub fn with_max_trips(mut self, n: u32) -> Self {
        self.max_trips = n;
        self
    }
}

/// A single HTTP GET returning the body text.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: Url) -> impl Future<Output = Result<String, SearchError>> + Send;
}

/// `reqwest`-backed transport.
///
/// Uses a semaphore to limit concurrent requests; the upstream allows a
/// fixed daily quota of route queries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<String, SearchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SearchError::Status {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        debug!(%url, "requesting");
        let response = self.http.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Result of a trip query.
#[derive(Debug, Clone)]
pub enum TripsResult {
    /// At least one usable trip, with a cursor for the neighbouring pages.
    Trips {
        trips: Vec<Trip>,
        context: PaginationContext,
    },
    /// The upstream found nothing, or nothing it sent was usable.
    NoResult { reason: String },
}

/// search.ch timetable client.
#[derive(Debug, Clone)]
pub struct TimetableClient<T = HttpTransport> {
    transport: T,
    base_url: String,
    max_trips: u32,
}

impl TimetableClient<HttpTransport> {
    /// Create a client that talks to the network.
    pub fn new(config: ClientConfig) -> Result<Self, SearchError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> TimetableClient<T> {
    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_trips: config.max_trips,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Options new queries start from.
    pub fn trip_options(&self) -> TripOptions {
        TripOptions {
            max_trips: self.max_trips,
            ..TripOptions::default()
        }
    }

    /// Query trips, identifying each with a random id.
    pub async fn query_trips(&self, query: &TripQuery) -> Result<TripsResult, SearchError> {
        self.query_trips_with_ids(query, &mut RandomIds).await
    }

    /// Query trips, taking ids from `ids`.
    ///
    /// Connections that cannot be converted are skipped; if none survive
    /// the result is [`TripsResult::NoResult`].
    pub async fn query_trips_with_ids(
        &self,
        query: &TripQuery,
        ids: &mut (impl IdGenerator + Send),
    ) -> Result<TripsResult, SearchError> {
        let url = self.url(ROUTE_ENDPOINT, query.to_params()?)?;
        let body = self.transport.get(url).await?;

        let connections = match decode_route(&body)? {
            RouteOutcome::Connections(connections) => connections,
            RouteOutcome::NoResult { reason } => {
                info!(%reason, "no trips found");
                return Ok(TripsResult::NoResult { reason });
            }
        };

        let received = connections.len();
        let trips = convert_connections(&connections, ids);
        debug!(received, usable = trips.len(), "converted connections");

        match PaginationContext::derive(&trips, query) {
            Some(context) => Ok(TripsResult::Trips { trips, context }),
            None if received == 0 => Ok(TripsResult::NoResult {
                reason: "no connections".to_string(),
            }),
            None => Ok(TripsResult::NoResult {
                reason: format!("none of the {received} connections could be decoded"),
            }),
        }
    }

    /// Re-issue the query behind `context` earlier or later.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NoMoreResults`] if the context has no bound
    /// in the requested direction.
    pub async fn query_more_trips(
        &self,
        context: &PaginationContext,
        later: bool,
    ) -> Result<TripsResult, SearchError> {
        let query = context.next_query(later).ok_or(SearchError::NoMoreResults)?;
        self.query_trips(&query).await
    }

    /// Suggest locations matching free text.
    pub async fn suggest_locations(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Location>, SearchError> {
        let url = self.url(
            COMPLETION_ENDPOINT,
            vec![
                ("term", term.to_string()),
                ("show_ids", "1".to_string()),
                ("show_coordinates", "1".to_string()),
            ],
        )?;
        self.locations(url, limit).await
    }

    /// Locations near a coordinate.
    pub async fn nearby_locations(
        &self,
        point: Point,
        accuracy_m: Option<u32>,
        limit: usize,
    ) -> Result<Vec<Location>, SearchError> {
        let mut params = vec![
            ("latlon", point.to_string()),
            ("show_ids", "1".to_string()),
            ("show_coordinates", "1".to_string()),
        ];
        if let Some(accuracy) = accuracy_m {
            params.push(("accuracy", accuracy.to_string()));
        }
        let url = self.url(COMPLETION_ENDPOINT, params)?;
        self.locations(url, limit).await
    }

    async fn locations(&self, url: Url, limit: usize) -> Result<Vec<Location>, SearchError> {
        let body = self.transport.get(url).await?;
        Ok(decode_completions(&body)?
            .iter()
            .filter_map(convert_completion)
            .take(limit)
            .collect())
    }

    fn url(&self, endpoint: &str, params: Vec<(&str, String)>) -> Result<Url, SearchError> {
        Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), &params)
            .map_err(|e| SearchError::InvalidUrl(e.to_string()))
    }
}
