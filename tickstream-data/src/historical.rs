use crate::{error::DataError, exchange::Connector};
use chrono::Utc;
use md5::{Digest, Md5};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tickstream_instrument::{ProductId, trade::Trade};
use tickstream_integration::backoff::Backoff;
use tracing::{debug, warn};
use url::Url;

/// One page of historical trades returned by an exchange's REST trade-history endpoint.
#[derive(Debug)]
pub struct HistoricalPage<RawTrade> {
    pub trades: Vec<RawTrade>,
    /// Cursor the exchange reports should be used as `since` for the following page.
    pub next_cursor: i128,
}

/// Defines how to backfill a product's public trade history from an exchange's paginated REST
/// endpoint. Complements [`Connector`], which only covers the websocket live adapter.
pub trait HistoricalConnector
where
    Self: Connector,
{
    /// Raw, exchange specific trade payload returned by a single page of the trade history
    /// endpoint.
    type RawTrade: DeserializeOwned + Send;

    /// Build the `since`-paginated trade history request URL for `product_id`.
    fn historical_url(product_id: &ProductId, since: i128) -> Result<Url, DataError>;

    /// Parse an HTTP response body into a [`HistoricalPage`].
    fn parse_page(body: &[u8]) -> Result<HistoricalPage<Self::RawTrade>, DataError>;

    /// Translate a raw page trade into the canonical [`Trade`].
    fn historical_trade(product_id: &ProductId, raw: &Self::RawTrade) -> Result<Trade, DataError>;

    /// The exchange specific `since`-cursor carried by a raw page trade (eg/ Kraken's nanosecond
    /// trade id), used to detect the duplicate boundary trade shared by consecutive pages.
    fn historical_trade_cursor(raw: &Self::RawTrade) -> i128;

    /// Millisecond UNIX timestamp of a raw page trade, used to decide when backfill is complete.
    fn historical_trade_timestamp_ms(raw: &Self::RawTrade) -> i64;

    /// Convert a millisecond UNIX timestamp into this exchange's `since_cursor` unit.
    ///
    /// Per spec, the default assumes a nanosecond cursor (`since_cursor = from_ms * 1_000_000`).
    fn initial_cursor(from_ms: i64) -> i128 {
        from_ms as i128 * 1_000_000
    }
}

/// Compute `[from_ms, to_ms]` for a `last_n_days` historical backfill window, where `to_ms` is
/// today 00:00 UTC.
pub fn backfill_window(last_n_days: u32) -> (i64, i64) {
    let to_ms = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
        .timestamp_millis();

    let from_ms = to_ms - i64::from(last_n_days) * 86_400_000;

    (from_ms, to_ms)
}

/// Backfill every public trade for `product_id` over the `last_n_days` window, paginating the
/// REST trade history endpoint and caching each page response under `cache_dir`.
pub async fn backfill<Exchange>(
    product_id: &ProductId,
    last_n_days: u32,
    cache_dir: &Path,
) -> Result<Vec<Trade>, DataError>
where
    Exchange: HistoricalConnector,
{
    let (from_ms, to_ms) = backfill_window(last_n_days);

    let mut since_cursor = Exchange::initial_cursor(from_ms);
    let mut last_trade_ms = from_ms;
    let mut last_seen_cursor: Option<i128> = None;
    let mut trades = Vec::new();

    while last_trade_ms < to_ms {
        let url = Exchange::historical_url(product_id, since_cursor)?;
        let page = fetch_page::<Exchange>(&url, cache_dir).await?;

        let Some((first, rest)) = page.trades.split_first() else {
            break;
        };

        let page_trades = if last_seen_cursor == Some(Exchange::historical_trade_cursor(first)) {
            rest
        } else {
            page.trades.as_slice()
        };

        for raw in page_trades {
            trades.push(Exchange::historical_trade(product_id, raw)?);
            last_trade_ms = Exchange::historical_trade_timestamp_ms(raw);
        }

        let Some(last_raw) = page.trades.last() else {
            break;
        };
        last_seen_cursor = Some(Exchange::historical_trade_cursor(last_raw));
        since_cursor = page.next_cursor;
    }

    Ok(trades)
}

async fn fetch_page<Exchange>(
    url: &Url,
    cache_dir: &Path,
) -> Result<HistoricalPage<Exchange::RawTrade>, DataError>
where
    Exchange: HistoricalConnector,
{
    let cache_path = cache_dir.join(cache_file_name(url));

    if let Some(cached) = read_cache(&cache_path).await {
        debug!(%url, "historical adapter cache hit");
        return Exchange::parse_page(&cached);
    }

    let mut backoff = Backoff::default_policy();

    loop {
        match fetch_page_once(url).await {
            Ok(body) => {
                write_cache_atomically(&cache_path, &body).await;
                return Exchange::parse_page(&body);
            }
            Err(error) if error.is_terminal() => match backoff.next_delay() {
                Some(delay) => {
                    warn!(%url, ?error, ?delay, "historical adapter request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            },
            Err(error) => return Err(error),
        }
    }
}

async fn fetch_page_once(url: &Url) -> Result<bytes::Bytes, DataError> {
    let response = reqwest::get(url.clone())
        .await
        .map_err(|error| DataError::from(tickstream_integration::error::SocketError::from(error)))?;

    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(DataError::RateLimit(format!(
            "exchange rate-limited historical request: {url}"
        )));
    }

    if !response.status().is_success() {
        return Err(DataError::Connect(
            tickstream_integration::error::SocketError::HttpResponse(
                response.status(),
                url.to_string(),
            ),
        ));
    }

    response
        .bytes()
        .await
        .map_err(|error| DataError::from(tickstream_integration::error::SocketError::from(error)))
}

/// Hash the fully qualified URL (including query string) with MD5 to form the cache file name.
fn cache_file_name(url: &Url) -> String {
    let mut hasher = Md5::new();
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

async fn read_cache(path: &Path) -> Option<bytes::Bytes> {
    tokio::fs::read(path).await.ok().map(bytes::Bytes::from)
}

/// Write `body` to `path` atomically via write-to-temp-then-rename, so a concurrent reader never
/// observes a partially written cache entry.
async fn write_cache_atomically(path: &Path, body: &[u8]) {
    let Some(parent) = path.parent() else { return };
    if tokio::fs::create_dir_all(parent).await.is_err() {
        return;
    }

    let tmp_path: PathBuf = path.with_extension("tmp");

    if tokio::fs::write(&tmp_path, body).await.is_err() {
        return;
    }

    if let Err(error) = tokio::fs::rename(&tmp_path, path).await {
        warn!(?error, ?path, "failed to atomically rename historical cache entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_file_name_is_stable_md5_hex() {
        let url = Url::parse("https://api.kraken.com/0/public/Trades?pair=XBTUSD&since=123").unwrap();
        let name_a = cache_file_name(&url);
        let name_b = cache_file_name(&url);
        assert_eq!(name_a, name_b);
        assert_eq!(name_a.len(), 32);
    }

    #[test]
    fn test_cache_file_name_differs_for_different_urls() {
        let a = Url::parse("https://api.kraken.com/0/public/Trades?pair=XBTUSD&since=1").unwrap();
        let b = Url::parse("https://api.kraken.com/0/public/Trades?pair=XBTUSD&since=2").unwrap();
        assert_ne!(cache_file_name(&a), cache_file_name(&b));
    }

    #[test]
    fn test_backfill_window() {
        let (from_ms, to_ms) = backfill_window(5);
        assert_eq!(to_ms - from_ms, 5 * 86_400_000);
    }
}
