//! Web layer for the timetable server.
//!
//! Provides JSON endpoints for location lookup, trip search and paging
//! through neighbouring trips.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
