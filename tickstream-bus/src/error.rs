use thiserror::Error;

/// All errors generated in `tickstream-bus`.
///
/// Maps onto the error taxonomy's `BusError` kind: retried with bounded attempts by the caller,
/// persistent failure is fatal.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("topic not found: {0}")]
    UnknownTopic(String),

    #[error("record cannot be serialized to the bus: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("consumer group {group} has no committed offset for partition {partition}")]
    NoCommittedOffset { group: String, partition: u32 },

    #[error("bus produce/consume failure: {0}")]
    Transport(String),
}
