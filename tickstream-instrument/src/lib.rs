#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Tickstream-Instrument
//! Core `ExchangeId` and `Side` data structures shared across the ingestion and bar-building
//! crates.

use derive_more::Display as DeriveDisplay;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::{Display, Formatter};

/// Defines the [`ExchangeId`](exchange::ExchangeId) enum covering every supported exchange.
pub mod exchange;

/// Canonical [`Trade`] record and the [`Side`] it took.
pub mod trade;

/// Canonical, cross-exchange product identifier produced by the Symbol Normalizer (eg/
/// `"BTC-USD"`). Every downstream consumer (bar builder, feature store, message bus keys) keys
/// off this type rather than any exchange specific symbol spelling.
#[derive(
    Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize, DeriveDisplay,
)]
pub struct ProductId(SmolStr);

impl ProductId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<S> From<S> for ProductId
where
    S: Into<SmolStr>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// [`Side`] of a trade - Buy or Sell.
///
/// `Side` is the canonical, post-normalisation representation. Exchange adapters are
/// responsible for mapping raw feed tags (eg/ Kraken's `"b"`/`"s"`) onto this type - anything
/// else is a `ProtocolError`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// `+1` for [`Side::Buy`], `-1` for [`Side::Sell`] - the unit contribution to a tick
    /// imbalance bar's running `cumulative_imbalance`.
    pub fn imbalance_tick(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Buy => "buy",
                Side::Sell => "sell",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_imbalance_tick() {
        assert_eq!(Side::Buy.imbalance_tick(), 1);
        assert_eq!(Side::Sell.imbalance_tick(), -1);
    }
}
