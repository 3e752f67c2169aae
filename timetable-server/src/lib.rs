//! Swiss public transport trip server.
//!
//! Queries the search.ch timetable API, decodes its loosely typed route
//! responses into validated trips, and serves them as JSON with cursors
//! for paging to earlier or later connections.

pub mod domain;
pub mod searchch;
pub mod web;
