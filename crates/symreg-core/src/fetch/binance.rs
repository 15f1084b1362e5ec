use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::unix_millis_now;
use crate::fetch::{FetchError, SymbolFetcher};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{ExchangeId, ExchangeSymbols, SymbolInfo};

const EXCHANGE_INFO_URL: &str = "https://api.binance.com/api/v1/exchangeInfo";

/// Fetches the tradable symbol set from Binance's `exchangeInfo` endpoint.
pub struct BinanceFetcher {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl BinanceFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            url: String::from(EXCHANGE_INFO_URL),
        }
    }

    pub fn with_url(http: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn fetch(&self) -> Result<ExchangeSymbols, FetchError> {
        let request = HttpRequest::get(&self.url).with_timeout_ms(10_000);
        let response = self.http.execute(request).await.map_err(|e| {
            FetchError::transport(format!("binance exchangeInfo request failed: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(FetchError::transport(format!(
                "binance returned status {}",
                response.status
            )));
        }

        let info: ExchangeInfo = serde_json::from_str(&response.body).map_err(|e| {
            FetchError::bad_payload(format!("cannot decode binance exchangeInfo: {e}"))
        })?;

        // Entries with no symbol name carry no identity and are skipped;
        // any other missing field defaults.
        let symbols = info
            .symbols
            .into_iter()
            .filter(|raw| !raw.symbol.is_empty())
            .map(SymbolInfo::from)
            .collect();

        ExchangeSymbols::new(ExchangeId::Binance, unix_millis_now(), symbols)
            .map_err(|e| FetchError::internal(e.to_string()))
    }
}

impl SymbolFetcher for BinanceFetcher {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    fn fetch_symbols<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeSymbols, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch())
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    #[serde(default)]
    symbols: Vec<RawSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSymbol {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    base_asset: String,
    #[serde(default)]
    base_asset_precision: u32,
    #[serde(default)]
    quote_asset: String,
    #[serde(default)]
    quote_precision: u32,
    #[serde(default)]
    order_types: Vec<String>,
    #[serde(default)]
    iceberg_allowed: bool,
}

impl From<RawSymbol> for SymbolInfo {
    fn from(raw: RawSymbol) -> Self {
        Self {
            symbol: raw.symbol,
            status: raw.status,
            base_asset: raw.base_asset,
            base_asset_precision: raw.base_asset_precision,
            quote_asset: raw.quote_asset,
            quote_precision: raw.quote_precision,
            order_types: raw.order_types,
            iceberg_allowed: raw.iceberg_allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::CannedHttpClient;
    use crate::FetchErrorKind;

    const SAMPLE: &str = r#"{
        "timezone": "UTC",
        "serverTime": 1547121600000,
        "symbols": [
            {
                "symbol": "BTCUSDT",
                "status": "TRADING",
                "baseAsset": "BTC",
                "baseAssetPrecision": 8,
                "quoteAsset": "USDT",
                "quotePrecision": 8,
                "orderTypes": ["LIMIT", "MARKET"],
                "icebergAllowed": true
            },
            {
                "symbol": "ETHBTC",
                "status": "TRADING",
                "baseAsset": "ETH",
                "baseAssetPrecision": 8,
                "quoteAsset": "BTC",
                "quotePrecision": 8,
                "orderTypes": ["LIMIT"],
                "icebergAllowed": false
            }
        ]
    }"#;

    #[tokio::test]
    async fn parses_exchange_info_into_snapshot() {
        let fetcher = BinanceFetcher::new(Arc::new(CannedHttpClient::ok(SAMPLE)));
        let snapshot = fetcher.fetch_symbols().await.expect("fetch succeeds");

        assert_eq!(snapshot.exchange, ExchangeId::Binance);
        assert_eq!(snapshot.symbols.len(), 2);
        assert_eq!(snapshot.symbols[0].symbol, "BTCUSDT");
        assert_eq!(snapshot.symbols[0].base_asset, "BTC");
        assert_eq!(snapshot.symbols[0].order_types, ["LIMIT", "MARKET"]);
        assert!(snapshot.symbols[0].iceberg_allowed);
    }

    #[tokio::test]
    async fn snapshot_day_matches_snapshot_time() {
        let fetcher = BinanceFetcher::new(Arc::new(CannedHttpClient::ok(SAMPLE)));
        let snapshot = fetcher.fetch_symbols().await.expect("fetch succeeds");

        let derived = crate::CalendarDay::from_unix_millis(snapshot.snapshot_time)
            .expect("snapshot time in range");
        assert_eq!(snapshot.day, derived);
    }

    #[tokio::test]
    async fn tolerates_missing_symbol_fields() {
        let body = r#"{"symbols": [{"symbol": "BTCUSDT"}, {"status": "TRADING"}]}"#;
        let fetcher = BinanceFetcher::new(Arc::new(CannedHttpClient::ok(body)));
        let snapshot = fetcher.fetch_symbols().await.expect("fetch succeeds");

        // The nameless entry is dropped, the sparse one defaults.
        assert_eq!(snapshot.symbols.len(), 1);
        assert_eq!(snapshot.symbols[0].symbol, "BTCUSDT");
        assert_eq!(snapshot.symbols[0].status, "");
        assert_eq!(snapshot.symbols[0].base_asset_precision, 0);
    }

    #[tokio::test]
    async fn transport_failure_maps_to_transport_kind() {
        let fetcher = BinanceFetcher::new(Arc::new(CannedHttpClient::failing("refused")));
        let err = fetcher.fetch_symbols().await.expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::Transport);
    }

    #[tokio::test]
    async fn error_status_maps_to_transport_kind() {
        let fetcher = BinanceFetcher::new(Arc::new(CannedHttpClient::status(503, "busy")));
        let err = fetcher.fetch_symbols().await.expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::Transport);
    }

    #[tokio::test]
    async fn undecodable_body_maps_to_bad_payload() {
        let fetcher = BinanceFetcher::new(Arc::new(CannedHttpClient::ok("<html>nope</html>")));
        let err = fetcher.fetch_symbols().await.expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::BadPayload);
    }
}
