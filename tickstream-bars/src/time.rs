use crate::{
    bar::{Bar, BarType},
    error::StateError,
    feature::FeatureRegistry,
    state::BarState,
};
use chrono::Duration;
use tickstream_instrument::Trade;

/// Fold one `trade` into `state` under a wall-clock window of `interval`, closing the bar once
/// its age since `start_time` reaches `interval`.
///
/// Resolves the open question over `type=time` aggregation: implemented with the same per-key
/// emission discipline as tick-imbalance and volume bars rather than rejected at config load.
pub fn process(
    state: &mut BarState,
    trade: &Trade,
    interval: Duration,
    features: &FeatureRegistry,
) -> Result<Option<Bar>, StateError> {
    let was_empty = state.is_empty();
    state.accumulate(trade.side, trade.price, trade.volume, trade.timestamp)?;

    if was_empty {
        // A single trade cannot itself span a window: the bar just opened.
        return Ok(None);
    }

    let start = state.start_time.expect("non-empty state always has a start_time");
    if trade.timestamp - start < interval {
        return Ok(None);
    }

    let bar = finalize(state, trade, features);
    state.reset();
    Ok(Some(bar))
}

fn finalize(state: &BarState, trade: &Trade, features: &FeatureRegistry) -> Bar {
    Bar {
        product_id: trade.product_id.clone(),
        bar_type: BarType::Time,
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
        unique_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tickstream_instrument::{ExchangeId, ProductId, Side};

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn trade(price: f64, seconds: i64) -> Trade {
        Trade::new(ProductId::new("BTC-USD"), Side::Buy, price, 1.0, ts(seconds), ExchangeId::Coinbase).unwrap()
    }

    #[test]
    fn test_bar_closes_once_window_elapses() {
        let mut state = BarState::default();
        let features = FeatureRegistry::standard();
        let interval = Duration::seconds(5);

        assert!(process(&mut state, &trade(100.0, 0), interval, &features).unwrap().is_none());
        assert!(process(&mut state, &trade(101.0, 2), interval, &features).unwrap().is_none());
        let bar = process(&mut state, &trade(102.0, 5), interval, &features).unwrap();
        let bar = bar.expect("5 seconds have elapsed since the bar opened");
        assert_eq!(bar.ticks, 3);
        assert!(state.is_empty());
    }
}
