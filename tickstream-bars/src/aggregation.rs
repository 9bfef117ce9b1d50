use serde::{Deserialize, Serialize};

/// Per-product threshold policy selecting which bar algorithm applies.
///
/// `TickImbalance` and `Volume` are the two variants the core bar builder is specified against;
/// `Time` resolves the open question over wall-clock aggregation by implementing it with the
/// same per-key emission discipline as the other two, rather than rejecting it at config load.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Aggregation {
    #[serde(rename = "volume")]
    Volume { interval: f64 },

    #[serde(rename = "tick imbalance")]
    TickImbalance { interval: i64 },

    #[serde(rename = "time")]
    Time {
        /// Bar width in seconds.
        interval: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_aggregation_tick_imbalance_has_a_literal_space_in_its_tag() {
        let aggregation: Aggregation =
            serde_json::from_str(r#"{"type": "tick imbalance", "interval": 3}"#).unwrap();
        assert_eq!(aggregation, Aggregation::TickImbalance { interval: 3 });
    }

    #[test]
    fn test_de_aggregation_volume() {
        let aggregation: Aggregation =
            serde_json::from_str(r#"{"type": "volume", "interval": 10}"#).unwrap();
        assert_eq!(aggregation, Aggregation::Volume { interval: 10.0 });
    }
}
