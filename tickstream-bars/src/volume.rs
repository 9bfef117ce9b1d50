use crate::{
    bar::{Bar, BarType},
    error::StateError,
    feature::FeatureRegistry,
    snowflake::SnowflakeGenerator,
    state::BarState,
};
use tickstream_instrument::{Side, Trade};

/// Fold one `trade` into `state` under a volume threshold of `threshold`, splitting it across as
/// many bar boundaries as its volume crosses.
///
/// A single large trade can close multiple bars in one call - each closed bar gets its own
/// [`SnowflakeGenerator`] id. The final, still-open bar (if any) remains in `state` for the next
/// trade to continue building on.
pub fn process(
    state: &mut BarState,
    trade: &Trade,
    threshold: f64,
    snowflake: &SnowflakeGenerator,
    features: &FeatureRegistry,
) -> Result<Vec<Bar>, StateError> {
    if state.end_time.is_some_and(|end_time| trade.timestamp < end_time) {
        return Err(StateError(
            "trade timestamp precedes the current bar state's last observed timestamp",
        ));
    }

    let mut bars = Vec::new();
    let mut remaining_volume = trade.volume;

    while remaining_volume > 0.0 {
        if state.is_empty() {
            state.open_with(trade.price, trade.timestamp)?;
        }

        state.high = state.high.max(trade.price);
        state.low = state.low.min(trade.price);
        state.close = trade.price;
        state.end_time = Some(trade.timestamp);

        let remaining_to_threshold = threshold - state.volume;

        if remaining_volume >= remaining_to_threshold {
            fold_trade_fragment(state, trade.side, trade.price, remaining_to_threshold);
            bars.push(finalize(state, trade, features, snowflake.next_id()));
            state.reset();
            remaining_volume -= remaining_to_threshold;
        } else {
            fold_trade_fragment(state, trade.side, trade.price, remaining_volume);
            remaining_volume = 0.0;
        }
    }

    Ok(bars)
}

/// Fold a (possibly partial) `volume` slice of a trade into the tick/imbalance/run-tracking
/// fields `BarState::accumulate` normally owns, without re-deriving OHLC - the caller already
/// applied that above so a single trade spanning a boundary only widens high/low once.
fn fold_trade_fragment(state: &mut BarState, side: Side, price: f64, volume: f64) {
    state.volume += volume;
    state.cumulative_trade_amount += price * volume;
    state.tick_counter += 1;
    state.price_path.push(price);

    match state.trade_sequences.last_mut() {
        Some(run) if run.side == side => run.count += 1,
        _ => state.trade_sequences.push(crate::state::Run { side, count: 1 }),
    }

    if side == Side::Buy {
        state.buy_trades += 1;
    }
}

fn finalize(state: &BarState, trade: &Trade, features: &FeatureRegistry, unique_id: i64) -> Bar {
    Bar {
        product_id: trade.product_id.clone(),
        bar_type: BarType::Volume,
        open: state.open,
        high: state.high,
        low: state.low,
        close: state.close,
        volume: state.volume,
        cumulative_trade_amount: state.cumulative_trade_amount,
        start_time: state.start_time.expect("finalize called on non-empty state"),
        end_time: state.end_time.expect("finalize called on non-empty state"),
        tick_imbalance: state.cumulative_imbalance,
        ticks: state.tick_counter,
        features: features.compute(state),
        unique_id: Some(unique_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tickstream_instrument::{ExchangeId, ProductId};

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn trade(side: Side, price: f64, volume: f64, seconds: i64) -> Trade {
        Trade::new(ProductId::new("BTC-USD"), side, price, volume, ts(seconds), ExchangeId::Coinbase).unwrap()
    }

    #[test]
    fn test_scenario_1_volume_bar_split() {
        let mut state = BarState::default();
        let snowflake = SnowflakeGenerator::new(1);
        let features = FeatureRegistry::standard();

        let trades = [
            trade(Side::Buy, 100.0, 3.0, 0),
            trade(Side::Buy, 101.0, 4.0, 1),
            trade(Side::Sell, 99.0, 6.0, 2),
        ];

        let mut emitted = Vec::new();
        for trade in &trades {
            emitted.extend(process(&mut state, trade, 10.0, &snowflake, &features).unwrap());
        }

        assert_eq!(emitted.len(), 1);
        let bar = &emitted[0];
        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.high, 101.0);
        assert_eq!(bar.low, 99.0);
        assert_eq!(bar.close, 99.0);
        assert_eq!(bar.volume, 10.0);
        assert_eq!(bar.ticks, 3);
        assert!(bar.unique_id.is_some());

        assert_eq!(state.volume, 3.0);
        assert_eq!(state.open, 99.0);
    }

    #[test]
    fn test_trade_volume_equal_to_threshold_leaves_next_bar_empty() {
        let mut state = BarState::default();
        let snowflake = SnowflakeGenerator::new(1);
        let features = FeatureRegistry::standard();

        let emitted = process(&mut state, &trade(Side::Buy, 100.0, 10.0, 0), 10.0, &snowflake, &features).unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].volume, 10.0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_trade_volume_multiple_of_threshold_emits_k_bars() {
        let mut state = BarState::default();
        let snowflake = SnowflakeGenerator::new(1);
        let features = FeatureRegistry::standard();

        let emitted = process(&mut state, &trade(Side::Buy, 100.0, 30.0, 0), 10.0, &snowflake, &features).unwrap();
        assert_eq!(emitted.len(), 3);
        assert!(emitted.iter().all(|bar| bar.volume == 10.0));
        assert!(state.is_empty());

        let ids: std::collections::HashSet<_> = emitted.iter().map(|bar| bar.unique_id).collect();
        assert_eq!(ids.len(), 3, "each split bar must carry a distinct snowflake id");
    }
}
