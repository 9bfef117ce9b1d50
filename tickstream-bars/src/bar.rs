use crate::feature::DerivedFeatures;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tickstream_instrument::ProductId;

/// Which threshold policy closed a [`Bar`] - carried as the `bar_type` label on
/// `bars_emitted_total` and used by the runtime to pick a product's aggregation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarType {
    TickImbalance,
    Volume,
    Time,
}

impl BarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarType::TickImbalance => "tick_imbalance",
            BarType::Volume => "volume",
            BarType::Time => "time",
        }
    }
}

/// A completed, immutable bar - the value schema of the `bars` topic.
///
/// Produced once from a finalized [`crate::state::BarState`] and never mutated again.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Bar {
    pub product_id: ProductId,
    pub bar_type: BarType,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub cumulative_trade_amount: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub tick_imbalance: i64,
    pub ticks: u64,
    #[serde(flatten)]
    pub features: DerivedFeatures,
    /// Snowflake id, present only for volume bars - a single trade can close several of them in
    /// one pass, so each needs its own identity downstream idempotent upserts can key on.
    pub unique_id: Option<i64>,
}

impl Bar {
    /// Key downstream feature-store upserts dedup on.
    pub fn dedup_key(&self) -> (ProductId, i64) {
        (self.product_id.clone(), self.end_time.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar() -> Bar {
        Bar {
            product_id: ProductId::new("BTC-USD"),
            bar_type: BarType::TickImbalance,
            open: 10.0,
            high: 13.0,
            low: 10.0,
            close: 13.0,
            volume: 5.0,
            cumulative_trade_amount: 56.0,
            start_time: Utc.timestamp_opt(0, 0).unwrap(),
            end_time: Utc.timestamp_opt(4, 0).unwrap(),
            tick_imbalance: 3,
            ticks: 5,
            features: DerivedFeatures {
                net_buy_ratio: 0.6,
                bar_formation_time: 4.0,
                trade_intensity: 1.25,
                max_buy_run: 2,
                max_sell_run: 1,
                price_volatility: 1.2566,
            },
            unique_id: None,
        }
    }

    #[test]
    fn test_bar_round_trips_through_json() {
        let original = bar();
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_dedup_key_is_stable_under_retry() {
        let first = bar();
        let second = bar();
        assert_eq!(first.dedup_key(), second.dedup_key());
    }
}
