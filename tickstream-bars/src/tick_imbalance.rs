use crate::{
    bar::{Bar, BarType},
    error::StateError,
    feature::FeatureRegistry,
    state::BarState,
};
use tickstream_instrument::Trade;

/// Fold one `trade` into `state` under a tick-imbalance threshold of `threshold`, returning the
/// finalized [`Bar`] and a reset `state` if the emission test fires.
///
/// Mirrors the threshold crossing test exactly: `|cumulative_imbalance| >= threshold` closes the
/// bar on the triggering trade itself, so a single trade that pushes the magnitude past the
/// threshold is included in the emitted bar, not deferred to the next one.
pub fn process(
    state: &mut BarState,
    trade: &Trade,
    threshold: i64,
    features: &FeatureRegistry,
) -> Result<Option<Bar>, StateError> {
    state.accumulate(trade.side, trade.price, trade.volume, trade.timestamp)?;
    state.cumulative_imbalance += trade.side.imbalance_tick();

    if state.cumulative_imbalance.unsigned_abs() < threshold as u64 {
        return Ok(None);
    }

    let bar = finalize(state, trade, features);
    state.reset();
    Ok(Some(bar))
}

fn finalize(state: &BarState, trade: &Trade, features: &FeatureRegistry) -> Bar {
    Bar {
        product_id: trade.product_id.clone(),
        bar_type: BarType::TickImbalance,
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

    fn trade(side: Side, price: f64, seconds: i64) -> Trade {
        Trade::new(
            ProductId::new("BTC-USD"),
            side,
            price,
            1.0,
            ts(seconds),
            ExchangeId::Coinbase,
        )
        .unwrap()
    }

    #[test]
    fn test_scenario_2_tick_imbalance_trigger() {
        let mut state = BarState::default();
        let registry = FeatureRegistry::standard();
        let trades = [
            trade(Side::Buy, 10.0, 0),
            trade(Side::Buy, 11.0, 1),
            trade(Side::Sell, 10.0, 2),
            trade(Side::Buy, 12.0, 3),
            trade(Side::Buy, 13.0, 4),
        ];

        let mut emitted = None;
        for trade in &trades {
            if let Some(bar) = process(&mut state, trade, 3, &registry).unwrap() {
                emitted = Some(bar);
            }
        }

        let bar = emitted.expect("5th trade must trigger emission");
        assert_eq!(bar.tick_imbalance, 3);
        assert_eq!(bar.ticks, 5);
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 13.0);
        assert_eq!(bar.low, 10.0);
        assert_eq!(bar.close, 13.0);
        assert_eq!(bar.features.net_buy_ratio, 0.6);
        assert!(state.is_empty());
    }

    #[test]
    fn test_single_trade_exactly_meeting_threshold_emits_immediately() {
        let mut state = BarState::default();
        let registry = FeatureRegistry::standard();
        let bar = process(&mut state, &trade(Side::Buy, 100.0, 0), 1, &registry).unwrap();
        let bar = bar.expect("threshold of 1 must emit on the first trade");
        assert_eq!(bar.ticks, 1);
        assert_eq!(bar.tick_imbalance, 1);
    }
}
