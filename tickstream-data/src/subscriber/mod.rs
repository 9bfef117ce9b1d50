use self::{
    mapper::{SubscriptionMapper, WebSocketSubMapper},
    validator::SubscriptionValidator,
};
use crate::{Identifier, exchange::Connector, subscription::Subscription};
use tickstream_integration::{
    error::SocketError,
    protocol::websocket::{WebSocket, connect},
};
use futures::SinkExt;
use tracing::debug;

/// [`SubscriptionMapper`] implementations defining how to map a collection of canonical
/// [`Subscription`]s into exchange specific payloads.
pub mod mapper;

/// [`SubscriptionValidator`] implementations defining how to validate actioned
/// [`Subscription`]s were successful.
pub mod validator;

/// Result of establishing a websocket connection and actioning a collection of subscriptions.
#[derive(Debug)]
pub struct Subscribed {
    pub websocket: WebSocket,
    pub map: crate::subscription::Map,
}

/// Connect to the exchange websocket server and action the given collection of canonical
/// [`Subscription`]s, suitable for every exchange in scope (both are plain websocket feeds).
pub async fn subscribe<Exchange>(
    subscriptions: &[Subscription<Exchange>],
) -> Result<Subscribed, SocketError>
where
    Exchange: Connector + Send + Sync,
    Subscription<Exchange>: Identifier<Exchange::Channel> + Identifier<Exchange::Market>,
{
    let exchange = Exchange::ID;
    let url = Exchange::url()?;
    debug!(%exchange, %url, ?subscriptions, "subscribing to WebSocket");

    let mut websocket = connect(url).await?;
    debug!(%exchange, ?subscriptions, "connected to WebSocket");

    let mapper::SubscriptionMeta {
        instrument_map,
        ws_subscriptions,
    } = WebSocketSubMapper::map::<Exchange>(subscriptions);

    for subscription in ws_subscriptions {
        debug!(%exchange, payload = ?subscription, "sending exchange subscription");
        websocket
            .send(subscription)
            .await
            .map_err(|error| SocketError::WebSocket(Box::new(error)))?;
    }

    let map =
        validator::WebSocketSubValidator::validate::<Exchange>(instrument_map, &mut websocket)
            .await?;

    validator::skip_control_messages::<Exchange>(&map, &mut websocket).await?;

    debug!(%exchange, "successfully initialised WebSocket stream with confirmed subscriptions");
    Ok(Subscribed { websocket, map })
}
