use crate::{HeartbeatMarker, Identifier};
use serde::{Deserialize, Serialize};
use tickstream_integration::subscription::SubscriptionId;

/// [`Kraken`](super::Kraken) message variants that can be received over the WebSocket.
///
/// ### Raw Payload Examples
/// See docs: <https://docs.kraken.com/websockets/#overview>
///
/// #### Trades
/// See docs: <https://docs.kraken.com/websockets/#message-trade>
/// ```json
/// [
///     0,
///     [
///         ["5541.20000", "0.15850568", "1534614057.321597", "s", "l", ""],
///         ["6060.00000", "0.02455000", "1534614057.324998", "b", "l", ""]
///     ],
///     "trade",
///     "XBT/USD"
/// ]
/// ```
///
/// #### Heartbeat
/// See docs: <https://docs.kraken.com/websockets/#message-heartbeat>
/// ```json
/// { "event": "heartbeat" }
/// ```
///
/// #### KrakenError Generic
/// See docs: <https://docs.kraken.com/websockets/#errortypes>
/// ```json
/// { "errorMessage": "Malformed request", "event": "error" }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
#[serde(untagged, rename_all = "snake_case")]
pub enum KrakenMessage<T> {
    Data(T),
    Event(KrakenEvent),
}

impl<T> Identifier<Option<SubscriptionId>> for KrakenMessage<T>
where
    T: Identifier<Option<SubscriptionId>>,
{
    fn id(&self) -> Option<SubscriptionId> {
        match self {
            Self::Data(data) => data.id(),
            Self::Event(_) => None,
        }
    }
}

impl<T> HeartbeatMarker for KrakenMessage<T> {
    fn is_heartbeat(&self) -> bool {
        matches!(self, Self::Event(KrakenEvent::Heartbeat))
    }
}

/// [`Kraken`](super::Kraken) messages received over the WebSocket which are not subscription
/// data.
///
/// eg/ Kraken sends a [`KrakenEvent::Heartbeat`] if no subscription traffic has been sent within
/// the last second.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum KrakenEvent {
    Heartbeat,
    Error(KrakenError),
}

/// [`Kraken`](super::Kraken) generic error message received over the WebSocket.
///
/// Used both as [`KrakenSubResponse::Error`](super::subscription::KrakenSubResponse) and as a
/// generic error received over the WebSocket while subscriptions are active.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub struct KrakenError {
    #[serde(alias = "errorMessage")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_kraken_message_heartbeat() {
        let actual = serde_json::from_str::<KrakenMessage<()>>(r#"{"event": "heartbeat"}"#).unwrap();
        assert_eq!(actual, KrakenMessage::Event(KrakenEvent::Heartbeat));
    }

    #[test]
    fn test_de_kraken_message_error() {
        let actual = serde_json::from_str::<KrakenMessage<()>>(
            r#"{"errorMessage": "Malformed request", "event": "error"}"#,
        )
        .unwrap();

        assert_eq!(
            actual,
            KrakenMessage::Event(KrakenEvent::Error(KrakenError {
                message: "Malformed request".to_string(),
            }))
        );
    }
}
