use thiserror::Error;

/// A violated [`crate::state::BarState`] invariant (eg/ `low > high`).
///
/// Always indicates a bug in the bar-construction algorithm rather than bad input - malformed
/// `Trade` fields are rejected earlier, at `Trade::new`. Fatal: the caller should tear the
/// builder down rather than attempt to continue with corrupted state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bar state invariant violated: {0}")]
pub struct StateError(pub &'static str);

/// Errors surfaced while running the Bar Builder streaming engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Bus(#[from] tickstream_bus::BusError),

    #[error("no aggregation configured for product {0}")]
    UnconfiguredProduct(String),
}
