use crate::error::DataError;
use tickstream_instrument::trade::Trade;
use tickstream_integration::{Transformer, protocol::websocket::WsMessage};
use tokio::sync::mpsc;

/// Standard stateless [`ExchangeTransformer`] used for transforming public trade feeds.
pub mod stateless;

/// Defines how to construct a [`Transformer`] used by a live adapter stream to translate
/// exchange specific payloads into normalized [`Trade`]s.
///
/// `ws_sink_tx` allows an implementor to send [`WsMessage`]s back to the exchange (eg/ a custom
/// pong reply) - it also keeps the adapter's `WsSink` half alive for the lifetime of the
/// `Transformer`, even when the implementor never uses it.
pub trait ExchangeTransformer
where
    Self: Transformer<Output = Trade, Error = DataError> + Sized,
{
    fn init(instrument_map: crate::subscription::Map, ws_sink_tx: mpsc::UnboundedSender<WsMessage>) -> Self;
}
