use crate::{exchange::Connector, subscription::Map};
use tickstream_integration::{
    Validator,
    error::SocketError,
    protocol::{StreamParser, websocket::WebSocket},
};
use futures::StreamExt;
use tracing::debug;

/// Defines how to validate that actioned [`Subscription`](crate::subscription::Subscription)s
/// were accepted by the exchange.
pub trait SubscriptionValidator {
    async fn validate<Exchange>(
        instrument_map: Map,
        websocket: &mut WebSocket,
    ) -> Result<Map, SocketError>
    where
        Exchange: Connector + Send;
}

/// Standard [`SubscriptionValidator`] for websockets, suitable for every exchange in scope.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct WebSocketSubValidator;

impl SubscriptionValidator for WebSocketSubValidator {
    async fn validate<Exchange>(
        instrument_map: Map,
        websocket: &mut WebSocket,
    ) -> Result<Map, SocketError>
    where
        Exchange: Connector + Send,
    {
        use tickstream_integration::protocol::websocket::WebSocketSerdeParser;

        let timeout = Exchange::subscription_timeout();
        let expected_responses = Exchange::expected_responses(&instrument_map);

        let mut success_responses = 0usize;

        loop {
            if success_responses == expected_responses {
                debug!(exchange = %Exchange::ID, "validated exchange WebSocket subscriptions");
                break Ok(instrument_map);
            }

            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    break Err(SocketError::Subscribe(
                        format!("subscription validation timeout reached: {timeout:?}")
                    ))
                },
                message = websocket.next() => {
                    let response = match message {
                        Some(response) => response,
                        None => break Err(SocketError::Subscribe("WebSocket stream terminated unexpectedly".to_string()))
                    };

                    match <WebSocketSerdeParser as StreamParser<Exchange::SubResponse>>::parse(response) {
                        Some(Ok(response)) => match response.validate() {
                            Ok(response) => {
                                success_responses += 1;
                                debug!(
                                    exchange = %Exchange::ID,
                                    %success_responses,
                                    %expected_responses,
                                    payload = ?response,
                                    "received valid Ok subscription response",
                                );
                            }
                            Err(err) => break Err(err)
                        }
                        Some(Err(SocketError::Deserialise { error, payload })) if success_responses >= 1 => {
                            debug!(
                                exchange = %Exchange::ID,
                                ?error,
                                %success_responses,
                                %expected_responses,
                                %payload,
                                "failed to deserialise non SubResponse payload"
                            );
                            continue
                        }
                        Some(Err(SocketError::Terminated(close_frame))) => {
                            break Err(SocketError::Subscribe(
                                format!("received WebSocket CloseFrame: {close_frame}")
                            ))
                        }
                        _ => continue
                    }
                }
            }
        }
    }
}

/// Read and discard `Exchange::control_messages_to_skip` raw messages from the `websocket`,
/// run immediately after [`SubscriptionValidator::validate`] succeeds and before the adapter is
/// considered streaming. A no-op for exchanges that don't interleave control messages ahead of
/// trade data (the default).
pub async fn skip_control_messages<Exchange>(
    map: &Map,
    websocket: &mut WebSocket,
) -> Result<(), SocketError>
where
    Exchange: Connector + Send,
{
    let to_skip = Exchange::control_messages_to_skip(map);
    let timeout = Exchange::subscription_timeout();

    for remaining in (0..to_skip).rev() {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                return Err(SocketError::Subscribe(
                    format!("control message skip timeout reached: {timeout:?}")
                ))
            },
            message = websocket.next() => {
                match message {
                    Some(_) => {
                        debug!(exchange = %Exchange::ID, remaining, "skipped leading control message");
                    }
                    None => return Err(SocketError::Subscribe(
                        "WebSocket stream terminated unexpectedly while skipping control messages".to_string()
                    )),
                }
            }
        }
    }

    Ok(())
}
