use super::message::KrakenError;
use serde::{Deserialize, Serialize};
use tickstream_integration::{Validator, error::SocketError};

/// [`Kraken`](super::Kraken) message received in response to WebSocket subscription requests.
///
/// ### Raw Payload Examples
/// See docs: <https://docs.kraken.com/websockets/#message-subscriptionStatus>
/// #### Subscription Trade Success
/// ```json
/// {
///   "channelID": 10001,
///   "channelName": "trade",
///   "event": "subscriptionStatus",
///   "pair": "XBT/USD",
///   "status": "subscribed",
///   "subscription": { "name": "trade" }
/// }
/// ```
///
/// #### Subscription Trade Failure
/// ```json
/// {
///   "errorMessage": "Subscription name invalid",
///   "event": "subscriptionStatus",
///   "pair": "XBT/USD",
///   "status": "error",
///   "subscription": { "name": "trades" }
/// }
/// ```
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum KrakenSubResponse {
    Subscribed {
        #[serde(alias = "channelID")]
        channel_id: u64,
        #[serde(alias = "channelName")]
        channel_name: String,
        pair: String,
    },
    Error(KrakenError),
}

impl Validator for KrakenSubResponse {
    fn validate(self) -> Result<Self, SocketError>
    where
        Self: Sized,
    {
        match &self {
            KrakenSubResponse::Subscribed { .. } => Ok(self),
            KrakenSubResponse::Error(error) => Err(SocketError::Subscribe(format!(
                "received failure subscription response: {}",
                error.message
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_kraken_sub_response_subscribed() {
        let input = r#"
        {
            "channelID": 10001,
            "channelName": "trade",
            "event": "subscriptionStatus",
            "pair": "XBT/USD",
            "status": "subscribed",
            "subscription": { "name": "trade" }
        }
        "#;

        let actual = serde_json::from_str::<KrakenSubResponse>(input).unwrap();
        assert_eq!(
            actual,
            KrakenSubResponse::Subscribed {
                channel_id: 10001,
                channel_name: "trade".to_string(),
                pair: "XBT/USD".to_string(),
            }
        );
    }

    #[test]
    fn test_de_kraken_sub_response_error() {
        let input = r#"
        {
            "errorMessage": "Subscription name invalid",
            "event": "subscriptionStatus",
            "pair": "XBT/USD",
            "status": "error",
            "subscription": { "name": "trades" }
        }
        "#;

        let actual = serde_json::from_str::<KrakenSubResponse>(input).unwrap();
        assert_eq!(
            actual,
            KrakenSubResponse::Error(KrakenError {
                message: "Subscription name invalid".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_kraken_sub_response() {
        assert!(
            KrakenSubResponse::Subscribed {
                channel_id: 10001,
                channel_name: "trade".to_string(),
                pair: "XBT/USD".to_string(),
            }
            .validate()
            .is_ok()
        );

        assert!(
            KrakenSubResponse::Error(KrakenError {
                message: "Subscription name invalid".to_string(),
            })
            .validate()
            .is_err()
        );
    }
}
