use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error a Tickstream binary can exit on.
///
/// Every variant is fatal by construction - non-fatal errors (a dropped malformed trade, one
/// adapter's transient disconnect) are handled and logged inside the component that hit them and
/// never propagate up to here.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] tickstream_data::error::DataError),

    #[error(transparent)]
    Bus(#[from] tickstream_bus::BusError),

    #[error(transparent)]
    Engine(#[from] tickstream_bars::EngineError),

    #[error(transparent)]
    Metrics(#[from] tickstream_metrics::MetricsError),
}

impl RuntimeError {
    /// Exit code the process should terminate with - 0 only ever comes from a clean shutdown
    /// path that never constructs a `RuntimeError`.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
