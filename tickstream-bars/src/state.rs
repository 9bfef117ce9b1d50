use crate::error::StateError;
use chrono::{DateTime, Utc};
use tickstream_instrument::Side;

/// A maximal run of consecutive same-side trades within the current bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run {
    pub side: Side,
    pub count: u64,
}

/// Per-`product_id` mutable state of the bar currently being built.
///
/// Exists for the lifetime of the in-flight bar: created on the first trade since startup or
/// since the last emission, mutated by every subsequent trade, reset to the sentinel empty state
/// once a bar is emitted. Never shared across partitions or products - the concurrency model
/// keeps it strictly partition-local.
#[derive(Debug, Clone, PartialEq)]
pub struct BarState {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub cumulative_trade_amount: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub tick_counter: u64,
    pub buy_trades: u64,
    pub cumulative_imbalance: i64,
    pub price_path: Vec<f64>,
    pub trade_sequences: Vec<Run>,
}

impl Default for BarState {
    fn default() -> Self {
        Self {
            open: 0.0,
            high: f64::MIN,
            low: f64::MAX,
            close: 0.0,
            volume: 0.0,
            cumulative_trade_amount: 0.0,
            start_time: None,
            end_time: None,
            tick_counter: 0,
            buy_trades: 0,
            cumulative_imbalance: 0,
            price_path: Vec::new(),
            trade_sequences: Vec::new(),
        }
    }
}

impl BarState {
    /// `true` once a bar has observed zero trades since the last reset - the "sentinel empty
    /// state" the numeric fields sit in until the first trade initializes them.
    pub fn is_empty(&self) -> bool {
        self.tick_counter == 0
    }

    pub fn sell_trades(&self) -> u64 {
        self.tick_counter - self.buy_trades
    }

    /// Initialize OHLC + timestamps from the first trade of a fresh bar.
    ///
    /// Errors if called on a bar that already has trades folded into it - opening twice would
    /// silently discard the OHLC built up so far.
    pub fn open_with(&mut self, price: f64, timestamp: DateTime<Utc>) -> Result<(), StateError> {
        if !self.is_empty() {
            return Err(StateError("open_with called on a bar state that already has trades"));
        }

        self.open = price;
        self.high = price;
        self.low = price;
        self.close = price;
        self.start_time = Some(timestamp);
        self.end_time = Some(timestamp);
        Ok(())
    }

    /// Fold one trade's price/side/volume into the running OHLCV and feature-tracking fields.
    /// Does not touch `cumulative_imbalance`/`buy_trades` bookkeeping specific to tick-imbalance
    /// bars - callers own that.
    ///
    /// Errors if `timestamp` precedes the bar's last observed trade - trades within a partition
    /// arrive in order, so this signals out-of-order delivery upstream rather than bad input.
    pub fn accumulate(
        &mut self,
        side: Side,
        price: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StateError> {
        if self.is_empty() {
            self.open_with(price, timestamp)?;
        } else if self.end_time.is_some_and(|end_time| timestamp < end_time) {
            return Err(StateError(
                "trade timestamp precedes the current bar state's last observed timestamp",
            ));
        }

        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.end_time = Some(timestamp);
        self.volume += volume;
        self.cumulative_trade_amount += price * volume;
        self.tick_counter += 1;
        self.price_path.push(price);

        match self.trade_sequences.last_mut() {
            Some(run) if run.side == side => run.count += 1,
            _ => self.trade_sequences.push(Run { side, count: 1 }),
        }

        if side == Side::Buy {
            self.buy_trades += 1;
        }

        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn test_accumulate_initializes_on_first_trade() {
        let mut state = BarState::default();
        state.accumulate(Side::Buy, 100.0, 1.0, ts(0)).unwrap();
        assert_eq!(state.open, 100.0);
        assert_eq!(state.high, 100.0);
        assert_eq!(state.low, 100.0);
        assert_eq!(state.tick_counter, 1);
        assert_eq!(state.buy_trades, 1);
    }

    #[test]
    fn test_accumulate_tracks_runs() {
        let mut state = BarState::default();
        for side in [Side::Buy, Side::Buy, Side::Sell] {
            state.accumulate(side, 100.0, 1.0, ts(0)).unwrap();
        }
        assert_eq!(
            state.trade_sequences,
            vec![
                Run { side: Side::Buy, count: 2 },
                Run { side: Side::Sell, count: 1 },
            ]
        );
    }

    #[test]
    fn test_reset_returns_to_sentinel() {
        let mut state = BarState::default();
        state.accumulate(Side::Buy, 100.0, 1.0, ts(0)).unwrap();
        state.reset();
        assert!(state.is_empty());
        assert!(state.price_path.is_empty());
    }

    #[test]
    fn test_accumulate_rejects_out_of_order_timestamp() {
        let mut state = BarState::default();
        state.accumulate(Side::Buy, 100.0, 1.0, ts(5)).unwrap();
        let error = state.accumulate(Side::Buy, 101.0, 1.0, ts(1)).unwrap_err();
        assert_eq!(
            error,
            StateError("trade timestamp precedes the current bar state's last observed timestamp")
        );
    }
}
