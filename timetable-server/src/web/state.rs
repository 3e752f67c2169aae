//! Application state for the web layer.

use std::sync::Arc;

use crate::searchch::{HttpTransport, TimetableClient, Transport};

/// Shared application state.
///
/// Generic over the transport so the router can be driven by fixtures.
pub struct AppState<T = HttpTransport> {
    /// Timetable API client
    pub client: Arc<TimetableClient<T>>,
}

impl<T: Transport> AppState<T> {
    /// Create a new app state.
    pub fn new(client: TimetableClient<T>) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

// Manual impl: `T` itself need not be `Clone` behind the `Arc`.
impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}
