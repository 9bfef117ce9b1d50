use serde::{Deserialize, Serialize};
use tickstream_integration::{Validator, error::SocketError};

/// [`Coinbase`](super::Coinbase) WebSocket subscription response.
///
/// ### Raw Payload Examples
/// See docs: <https://docs.cloud.coinbase.com/exchange/docs/websocket-overview#subscribe>
/// #### Subscription Success
/// ```json
/// {
///     "type":"subscriptions",
///     "channels":[
///         {"name":"matches","product_ids":["BTC-USD", "ETH-USD"]}
///     ]
/// }
/// ```
///
/// #### Subscription Failure
/// ```json
/// {
///     "type":"error",
///     "message":"Failed to subscribe",
///     "reason":"GIBBERISH-USD is not a valid product"
/// }
/// ```
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CoinbaseSubResponse {
    #[serde(alias = "subscriptions")]
    Subscribed { channels: Vec<CoinbaseChannels> },
    Error { reason: String },
}

/// Communicates the [`Coinbase`](super::Coinbase) product_ids (eg/ "ETH-USD") associated with
/// a successful channel (eg/ "matches") subscription.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub struct CoinbaseChannels {
    #[serde(alias = "name")]
    pub channel: String,
    pub product_ids: Vec<String>,
}

impl Validator for CoinbaseSubResponse {
    fn validate(self) -> Result<Self, SocketError>
    where
        Self: Sized,
    {
        match &self {
            CoinbaseSubResponse::Subscribed { .. } => Ok(self),
            CoinbaseSubResponse::Error { reason } => Err(SocketError::Subscribe(format!(
                "received failure subscription response: {}",
                reason
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_coinbase_sub_response_subscribed() {
        let input = r#"
        {
            "type":"subscriptions",
            "channels":[
                {"name":"matches","product_ids":["BTC-USD", "ETH-USD"]}
            ]
        }
        "#;

        let actual = serde_json::from_str::<CoinbaseSubResponse>(input).unwrap();
        assert_eq!(
            actual,
            CoinbaseSubResponse::Subscribed {
                channels: vec![CoinbaseChannels {
                    channel: "matches".to_string(),
                    product_ids: vec!["BTC-USD".to_string(), "ETH-USD".to_string()],
                }],
            }
        );
    }

    #[test]
    fn test_de_coinbase_sub_response_error() {
        let input = r#"
        {
            "type":"error",
            "message":"Failed to subscribe",
            "reason":"GIBBERISH-USD is not a valid product"
        }
        "#;

        let actual = serde_json::from_str::<CoinbaseSubResponse>(input).unwrap();
        assert_eq!(
            actual,
            CoinbaseSubResponse::Error {
                reason: "GIBBERISH-USD is not a valid product".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_coinbase_sub_response() {
        assert!(
            CoinbaseSubResponse::Subscribed {
                channels: vec![CoinbaseChannels {
                    channel: "matches".to_string(),
                    product_ids: vec!["BTC-USD".to_string()],
                }],
            }
            .validate()
            .is_ok()
        );

        assert!(
            CoinbaseSubResponse::Error {
                reason: "GIBBERISH-USD is not a valid product".to_string(),
            }
            .validate()
            .is_err()
        );
    }
}
