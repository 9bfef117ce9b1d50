use crate::normalizer::strip_separators;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Products that saturate a single adapter connection's throughput and therefore always receive
/// a dedicated adapter instance, rather than sharing one with other low-volume subscriptions.
///
/// Compared against a candidate symbol with separators stripped (eg/ `"BTC-USD"` -> `"BTCUSD"`).
static HIGH_VOLUME: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HashSet::from(["BTCUSD", "ETHUSD"]));

/// Whether `symbol` (an exchange's own spelling, eg/ `"BTC-USD"` or `"XBT/USD"`) warrants a
/// dedicated adapter connection under the fan-out policy.
pub fn is_high_volume(symbol: &str) -> bool {
    HIGH_VOLUME.contains(strip_separators(symbol).as_str())
}

/// Partition `symbols` into `(dedicated, shared)` groups under the fan-out policy: each
/// `HIGH_VOLUME` symbol gets its own single-element group, every remaining symbol shares one
/// group.
pub fn partition<T>(symbols: Vec<T>) -> (Vec<Vec<T>>, Vec<T>)
where
    T: AsRef<str>,
{
    let mut dedicated = Vec::new();
    let mut shared = Vec::new();

    for symbol in symbols {
        if is_high_volume(symbol.as_ref()) {
            dedicated.push(vec![symbol]);
        } else {
            shared.push(symbol);
        }
    }

    (dedicated, shared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_high_volume() {
        assert!(is_high_volume("BTC-USD"));
        assert!(is_high_volume("eth/usd"));
        assert!(!is_high_volume("SOL-USD"));
    }

    #[test]
    fn test_partition_splits_dedicated_from_shared() {
        let (dedicated, shared) =
            partition(vec!["BTC-USD", "SOL-USD", "ETH-USD", "ADA-USD"]);

        assert_eq!(dedicated, vec![vec!["BTC-USD"], vec!["ETH-USD"]]);
        assert_eq!(shared, vec!["SOL-USD", "ADA-USD"]);
    }
}
