use crate::{
    Identifier,
    exchange::{Connector, subscription::ExchangeSub},
    subscription::{Map, Subscription},
};
use tickstream_integration::subscription::SubscriptionId;

/// Output of mapping a collection of canonical [`Subscription`]s into exchange specific
/// subscription payloads.
#[derive(Debug)]
pub struct SubscriptionMeta {
    pub instrument_map: Map,
    pub ws_subscriptions: Vec<tickstream_integration::protocol::websocket::WsMessage>,
}

/// Defines how to map a collection of canonical [`Subscription`]s into exchange specific
/// [`SubscriptionMeta`], containing subscription payloads that are sent to the exchange.
pub trait SubscriptionMapper {
    fn map<Exchange>(subscriptions: &[Subscription<Exchange>]) -> SubscriptionMeta
    where
        Exchange: Connector,
        Subscription<Exchange>: Identifier<Exchange::Channel> + Identifier<Exchange::Market>;
}

/// Standard [`SubscriptionMapper`] for websockets, suitable for every exchange in scope.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct WebSocketSubMapper;

impl SubscriptionMapper for WebSocketSubMapper {
    fn map<Exchange>(subscriptions: &[Subscription<Exchange>]) -> SubscriptionMeta
    where
        Exchange: Connector,
        Subscription<Exchange>: Identifier<Exchange::Channel> + Identifier<Exchange::Market>,
    {
        let mut instrument_map = Map::with_capacity(subscriptions.len());

        let exchange_subs = subscriptions
            .iter()
            .map(|subscription| {
                let exchange_sub = ExchangeSub::new(subscription);
                let subscription_id: SubscriptionId = exchange_sub.id();

                instrument_map
                    .0
                    .insert(subscription_id, subscription.product_id.clone());

                exchange_sub
            })
            .collect::<Vec<ExchangeSub<Exchange::Channel, Exchange::Market>>>();

        let ws_subscriptions = Exchange::requests(exchange_subs);

        SubscriptionMeta {
            instrument_map,
            ws_subscriptions,
        }
    }
}
