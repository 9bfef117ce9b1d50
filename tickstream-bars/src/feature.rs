use crate::state::{BarState, Run};
use tickstream_instrument::Side;

/// Derived, intra-bar statistics computed once at emission.
///
/// All floats are rounded to 4 decimal places - the precision the bars topic's consumers are
/// expected to round-trip on.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Deserialize, serde::Serialize)]
pub struct DerivedFeatures {
    pub net_buy_ratio: f64,
    pub bar_formation_time: f64,
    pub trade_intensity: f64,
    pub max_buy_run: u64,
    pub max_sell_run: u64,
    pub price_volatility: f64,
}

/// One named, independently computable intra-bar feature.
///
/// Each variant maps directly onto a method previously looked up by name (`add_<feature>`) from
/// a runtime configuration dictionary; here the mapping is a static dispatch table built once
/// from a [`FeatureRegistry`] rather than reflected attribute lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    NetBuyRatio,
    BarFormationTime,
    TradeIntensity,
    MaxRuns,
    PriceVolatility,
}

/// The set of features a [`crate::engine::BarEngine`] computes at emission.
///
/// Built once at startup from configuration; every bar type uses the same registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRegistry(Vec<FeatureKind>);

impl FeatureRegistry {
    pub fn new(kinds: Vec<FeatureKind>) -> Self {
        Self(kinds)
    }

    /// Every feature listed in the data model - the default the builder ships with.
    pub fn standard() -> Self {
        Self(vec![
            FeatureKind::NetBuyRatio,
            FeatureKind::BarFormationTime,
            FeatureKind::TradeIntensity,
            FeatureKind::MaxRuns,
            FeatureKind::PriceVolatility,
        ])
    }

    /// Evaluate every registered feature against `state`, folding results into one
    /// [`DerivedFeatures`]. Features absent from the registry are left at their zero default.
    pub fn compute(&self, state: &BarState) -> DerivedFeatures {
        let mut features = DerivedFeatures::default();

        for kind in &self.0 {
            match kind {
                FeatureKind::NetBuyRatio => {
                    features.net_buy_ratio = round4(net_buy_ratio(state));
                }
                FeatureKind::BarFormationTime => {
                    features.bar_formation_time = round4(bar_formation_time(state));
                }
                FeatureKind::TradeIntensity => {
                    features.trade_intensity = round4(trade_intensity(state, bar_formation_time(state)));
                }
                FeatureKind::MaxRuns => {
                    let (buy, sell) = max_runs(&state.trade_sequences);
                    features.max_buy_run = buy;
                    features.max_sell_run = sell;
                }
                FeatureKind::PriceVolatility => {
                    features.price_volatility = round4(price_volatility(&state.price_path));
                }
            }
        }

        features
    }
}

fn net_buy_ratio(state: &BarState) -> f64 {
    if state.tick_counter == 0 {
        return 0.0;
    }
    2.0 * (state.buy_trades as f64 / state.tick_counter as f64) - 1.0
}

fn bar_formation_time(state: &BarState) -> f64 {
    match (state.start_time, state.end_time) {
        (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 1_000.0,
        _ => 0.0,
    }
}

fn trade_intensity(state: &BarState, bar_formation_time_secs: f64) -> f64 {
    if bar_formation_time_secs > 0.0 {
        state.tick_counter as f64 / bar_formation_time_secs
    } else {
        0.0
    }
}

/// Maximum `(max_buy_run, max_sell_run)` scanning `runs` left to right, tracking a signed
/// `current_run` that extends on same-side runs and flips on the opposite side.
fn max_runs(runs: &[Run]) -> (u64, u64) {
    let (mut max_buy, mut max_sell) = (0, 0);
    for run in runs {
        match run.side {
            Side::Buy => max_buy = max_buy.max(run.count),
            Side::Sell => max_sell = max_sell.max(run.count),
        }
    }
    (max_buy, max_sell)
}

fn price_volatility(path: &[f64]) -> f64 {
    if path.len() <= 1 {
        return 0.0;
    }

    let mean = path.iter().sum::<f64>() / path.len() as f64;
    let variance = path.iter().map(|price| (price - mean).powi(2)).sum::<f64>() / path.len() as f64;
    variance.sqrt()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn state_from(sides: &[Side], prices: &[f64]) -> BarState {
        let mut state = BarState::default();
        for (i, (&side, &price)) in sides.iter().zip(prices).enumerate() {
            state.accumulate(side, price, 1.0, ts(i as i64)).unwrap();
        }
        state
    }

    #[test]
    fn test_net_buy_ratio_scenario_2() {
        let state = state_from(
            &[Side::Buy, Side::Buy, Side::Sell, Side::Buy, Side::Buy],
            &[10.0, 11.0, 10.0, 12.0, 13.0],
        );
        assert_eq!(net_buy_ratio(&state), 0.6);
    }

    #[test]
    fn test_max_runs_scenario_3() {
        let state = state_from(
            &[
                Side::Buy,
                Side::Buy,
                Side::Buy,
                Side::Sell,
                Side::Sell,
                Side::Buy,
                Side::Buy,
                Side::Buy,
                Side::Buy,
            ],
            &[1.0; 9],
        );
        let (buy, sell) = max_runs(&state.trade_sequences);
        assert_eq!(buy, 4);
        assert_eq!(sell, 2);
    }

    #[test]
    fn test_price_volatility_single_price_is_zero() {
        assert_eq!(price_volatility(&[100.0]), 0.0);
        assert_eq!(price_volatility(&[]), 0.0);
    }

    #[test]
    fn test_registry_compute_fills_all_standard_features() {
        let state = state_from(
            &[Side::Buy, Side::Buy, Side::Sell, Side::Buy, Side::Buy],
            &[10.0, 11.0, 10.0, 12.0, 13.0],
        );
        let features = FeatureRegistry::standard().compute(&state);
        assert_eq!(features.net_buy_ratio, 0.6);
        assert_eq!(features.max_buy_run, 2);
        assert_eq!(features.max_sell_run, 1);
    }
}
