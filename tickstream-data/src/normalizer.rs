use tickstream_instrument::ProductId;

/// Normalize an exchange specific product symbol into the canonical [`ProductId`] every
/// downstream consumer (bar builder, message bus keys, feature store) keys off.
///
/// `base` and `quote` are the exchange's own spelling of the instrument's two legs (eg/ Coinbase's
/// `"BTC"`/`"USD"`, Kraken's `"XBT"`/`"USD"`). The canonical form strips exchange specific
/// separators and always renders as `"{BASE}-{QUOTE}"` upper case.
pub fn normalize(base: &str, quote: &str) -> ProductId {
    ProductId::new(format!(
        "{}-{}",
        base.trim().to_uppercase(),
        quote.trim().to_uppercase()
    ))
}

/// Strip every non-alphanumeric separator from a symbol, upper casing the result.
///
/// Used by the fan-out policy to compare an exchange's raw market symbol (eg/ `"BTC-USD"`,
/// `"XBT/USD"`) against the separator-free `HIGH_VOLUME` set (eg/ `"BTCUSD"`).
pub fn strip_separators(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_case_and_whitespace() {
        assert_eq!(normalize("btc", "usd").as_str(), "BTC-USD");
        assert_eq!(normalize(" Btc ", " Usd ").as_str(), "BTC-USD");
    }

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators("BTC-USD"), "BTCUSD");
        assert_eq!(strip_separators("xbt/usd"), "XBTUSD");
        assert_eq!(strip_separators("ETH_USD"), "ETHUSD");
    }
}
