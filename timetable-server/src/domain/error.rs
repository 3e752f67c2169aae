//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from transport and decode errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Missing required time data for a leg boundary
    #[error("missing required time data: {0}")]
    MissingTime(&'static str),

    /// Trip has no legs once the terminal pseudo-leg is dropped
    #[error("trip must have at least one leg")]
    EmptyTrip,

    /// Trip consists only of walking legs
    #[error("trip must have at least one transit leg")]
    NoTransitLegs,

    /// Arrival of leg `index` is not the departure of leg `index + 1`
    #[error("leg {index} does not arrive where leg {next} departs", next = .index + 1)]
    LegsNotContiguous { index: usize },

    /// A query endpoint has no id, coordinate or name to send upstream
    #[error("{role} location has no id, coordinate or name")]
    UnresolvableLocation { role: &'static str },
}
