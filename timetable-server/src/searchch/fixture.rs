//! Fixture transport for running without API access.
//!
//! Serves canned response bodies keyed by endpoint name (`route`,
//! `completion`) as if they were live API responses, and records every
//! requested URL so tests can inspect the query that was sent.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::Mutex;

use super::client::Transport;
use super::error::SearchError;

/// Transport that serves bodies from memory.
///
/// This is useful for development and testing without hitting the
/// upstream's daily quota.
#[derive(Debug, Clone, Default)]
pub struct FixtureTransport {
    /// Bodies keyed by endpoint name, e.g. `"route"` for `route.json`.
    /// Copy-on-write: clones made before a `with_body` keep the old map.
    bodies: Arc<HashMap<String, String>>,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl FixtureTransport {
    /// Create an empty transport. Every request fails until bodies are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for requests to `<endpoint>.json`.
    pub fn with_body(mut self, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.bodies).insert(endpoint.into(), body.into());
        self
    }

    /// Load every `<endpoint>.json` file in a directory.
    ///
    /// Expects files named after the endpoint (e.g. `route.json`,
    /// `completion.json`).
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, SearchError> {
        let data_dir = data_dir.as_ref();
        let mut bodies = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            SearchError::Fixture(format!("failed to read fixture directory {data_dir:?}: {e}"))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                SearchError::Fixture(format!("failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let endpoint = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| SearchError::Fixture(format!("invalid filename: {path:?}")))?;

            let body = std::fs::read_to_string(&path)
                .map_err(|e| SearchError::Fixture(format!("failed to read {path:?}: {e}")))?;

            bodies.insert(endpoint.to_string(), body);
        }

        if bodies.is_empty() {
            return Err(SearchError::Fixture(format!(
                "no fixture files found in {data_dir:?}"
            )));
        }

        Ok(Self {
            bodies: Arc::new(bodies),
            requests: Arc::default(),
        })
    }

    /// Endpoints with a body available.
    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self.bodies.keys().cloned().collect();
        endpoints.sort();
        endpoints
    }

    /// Every URL requested so far, in order.
    pub async fn requests(&self) -> Vec<Url> {
        self.requests.lock().await.clone()
    }
}

impl Transport for FixtureTransport {
    async fn get(&self, url: Url) -> Result<String, SearchError> {
        self.requests.lock().await.push(url.clone());

        let endpoint = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|last| last.trim_end_matches(".json").to_string())
            .unwrap_or_default();

        self.bodies.get(&endpoint).cloned().ok_or_else(|| {
            SearchError::Fixture(format!(
                "no fixture for endpoint {endpoint:?}. Available: {:?}",
                self.endpoints()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn serves_in_memory_body() {
        let transport = FixtureTransport::new().with_body("route", r#"{"error":"x"}"#);
        let body = transport
            .get(url("https://timetable.search.ch/api/route.json?from=A"))
            .await
            .unwrap();
        assert_eq!(body, r#"{"error":"x"}"#);
        assert_eq!(transport.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn body_added_after_clone_and_request_is_served() {
        let first = FixtureTransport::new().with_body("route", "{}");
        let shared = first.clone();
        shared
            .get(url("https://timetable.search.ch/api/route.json"))
            .await
            .unwrap();

        let extended = first.with_body("completion", "[]");
        let body = extended
            .get(url("https://timetable.search.ch/api/completion.json"))
            .await
            .unwrap();
        assert_eq!(body, "[]");
        assert_eq!(extended.endpoints(), vec!["completion", "route"]);
        assert_eq!(shared.endpoints(), vec!["route"]);
    }

    #[tokio::test]
    async fn unknown_endpoint_is_error() {
        let transport = FixtureTransport::new().with_body("route", "{}");
        let err = transport
            .get(url("https://timetable.search.ch/api/stationboard.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("stationboard"));
    }

    #[tokio::test]
    async fn load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("route.json"), r#"{"connections":[]}"#).unwrap();
        std::fs::write(dir.path().join("completion.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let transport = FixtureTransport::from_dir(dir.path()).unwrap();
        assert_eq!(transport.endpoints(), vec!["completion", "route"]);

        let body = transport
            .get(url("http://localhost/api/completion.json?term=Bern"))
            .await
            .unwrap();
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FixtureTransport::from_dir(dir.path()),
            Err(SearchError::Fixture(_))
        ));
    }

    #[tokio::test]
    async fn bundled_fixtures_load() {
        let transport = FixtureTransport::from_dir("data/fixtures").unwrap();
        let endpoints = transport.endpoints();
        assert!(endpoints.contains(&"route".to_string()));
        assert!(endpoints.contains(&"completion".to_string()));
    }
}
