use tickstream_integration::{error::SocketError, subscription::SubscriptionId};
use thiserror::Error;

/// All errors generated in `tickstream-data`.
///
/// Maps onto the error taxonomy's adapter-facing kinds: `ConnectError`, `ProtocolError`,
/// `RateLimitError` are recovered by the caller (backoff, drop-and-log); `SerializationError`
/// is fatal and indicates a bug.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to connect to exchange: {0}")]
    Connect(SocketError),

    #[error("failed to initialise reconnecting adapter stream due to empty subscriptions")]
    SubscriptionsEmpty,

    #[error("unexpected payload shape from exchange: {0}")]
    Protocol(String),

    #[error("exchange rate-limited this adapter: {0}")]
    RateLimit(String),

    #[error("record cannot be serialized to the bus: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("consumed unidentifiable message: {0}")]
    Unidentifiable(SubscriptionId),

    #[error("SocketError: {0}")]
    Socket(String),
}

impl DataError {
    /// Determine if an error requires the live adapter stream to re-initialise the whole
    /// websocket connection, as opposed to simply dropping the offending record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DataError::Connect(_) | DataError::RateLimit(_))
    }
}

impl From<SocketError> for DataError {
    fn from(value: SocketError) -> Self {
        match value {
            SocketError::WebSocket(error) => DataError::Connect(SocketError::WebSocket(error)),
            SocketError::Http(error) => DataError::Connect(SocketError::Http(error)),
            SocketError::HttpTimeout(error) => DataError::Connect(SocketError::HttpTimeout(error)),
            SocketError::Terminated(reason) => DataError::Connect(SocketError::Terminated(reason)),
            other => DataError::Socket(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_terminal() {
        assert!(DataError::Connect(SocketError::Sink).is_terminal());
        assert!(DataError::RateLimit("too many requests".to_string()).is_terminal());
        assert!(!DataError::Protocol("bad payload".to_string()).is_terminal());
        assert!(!DataError::SubscriptionsEmpty.is_terminal());
    }
}
