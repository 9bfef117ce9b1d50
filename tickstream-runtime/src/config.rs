use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tickstream_bars::Aggregation;

/// Top-level declarative configuration for a Tickstream process, sourced from a YAML file
/// layered with `TICKSTREAM_`-prefixed environment overrides.
///
/// There are no interactive flags - every process is long-running and configured entirely by
/// this document, per the CLI/process surface contract.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub kafka: KafkaConfig,
    pub exchanges: Vec<ExchangeConfig>,
    pub products: Vec<ProductConfig>,
    pub live_or_historical: LiveOrHistorical,
    #[serde(default = "default_last_n_days")]
    pub last_n_days: u32,
    pub cache_dir_historical_data: PathBuf,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_save_every_n_sec")]
    pub save_every_n_sec: u64,
}

fn default_last_n_days() -> u32 {
    30
}

fn default_buffer_size() -> usize {
    500
}

fn default_save_every_n_sec() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub broker_address: String,
    pub input_topic: String,
    pub output_topic: String,
    pub consumer_group: String,
    #[serde(default)]
    pub create_new_consumer_group: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeName {
    Coinbase,
    Kraken,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExchangeConfig {
    pub name: ExchangeName,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProductConfig {
    pub coin: String,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveOrHistorical {
    Live,
    Historical,
}

/// Errors encountered loading or validating [`Settings`] - always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl Settings {
    /// Load configuration from `path`, layering `TICKSTREAM_`-prefixed environment variables on
    /// top (eg/ `TICKSTREAM_KAFKA__BROKER_ADDRESS`).
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TICKSTREAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> &'static str {
        r#"
        kafka:
          broker_address: "localhost:9092"
          input_topic: "trades"
          output_topic: "bars"
          consumer_group: "bar-builder"
          create_new_consumer_group: false
        exchanges:
          - name: coinbase
            channels: ["matches"]
          - name: kraken
            channels: ["trade"]
        products:
          - coin: "BTC"
            aggregation:
              type: volume
              interval: 10
          - coin: "ETH"
            aggregation:
              type: "tick imbalance"
              interval: 3
        live_or_historical: live
        cache_dir_historical_data: "/tmp/tickstream-cache"
        "#
    }

    #[test]
    fn test_de_settings_applies_defaults() {
        let settings: Settings = serde_yaml::from_str(fixture()).unwrap();
        assert_eq!(settings.last_n_days, 30);
        assert_eq!(settings.buffer_size, 500);
        assert_eq!(settings.save_every_n_sec, 30);
        assert_eq!(settings.exchanges.len(), 2);
        assert_eq!(settings.products[0].coin, "BTC");
        assert_eq!(
            settings.products[1].aggregation,
            Aggregation::TickImbalance { interval: 3 }
        );
    }
}
