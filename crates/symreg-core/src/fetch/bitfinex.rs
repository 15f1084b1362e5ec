use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::unix_millis_now;
use crate::fetch::{FetchError, SymbolFetcher};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{ExchangeId, ExchangeSymbols, SymbolInfo};

const SYMBOLS_DETAILS_URL: &str = "https://api.bitfinex.com/v1/symbols_details";

const FUNDING_PRECISION: u32 = 8;

/// Fetches the tradable pair set from Bitfinex's `symbols_details` endpoint.
///
/// Trading pairs become `t<PAIR>` symbols. Pairs that support margin trading
/// additionally contribute `f<CCY>` funding symbols for both legs.
pub struct BitfinexFetcher {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl BitfinexFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            url: String::from(SYMBOLS_DETAILS_URL),
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
            FetchError::transport(format!(
                "bitfinex symbols_details request failed: {}",
                e.message()
            ))
        })?;

        if !response.is_success() {
            return Err(FetchError::transport(format!(
                "bitfinex returned status {}",
                response.status
            )));
        }

        let pairs: Vec<RawPair> = serde_json::from_str(&response.body).map_err(|e| {
            FetchError::bad_payload(format!("cannot decode bitfinex symbols_details: {e}"))
        })?;

        ExchangeSymbols::new(ExchangeId::Bitfinex, unix_millis_now(), convert_pairs(&pairs))
            .map_err(|e| FetchError::internal(e.to_string()))
    }
}

impl SymbolFetcher for BitfinexFetcher {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bitfinex
    }

    fn fetch_symbols<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeSymbols, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch())
    }
}

#[derive(Debug, Deserialize)]
struct RawPair {
    #[serde(default)]
    pair: String,
    #[serde(default)]
    price_precision: u32,
    #[serde(default)]
    margin: bool,
}

fn convert_pairs(pairs: &[RawPair]) -> Vec<SymbolInfo> {
    let mut symbols = Vec::with_capacity(pairs.len());
    // Funding symbols are deduplicated; both legs of a margin pair lend.
    let mut funding: BTreeSet<String> = BTreeSet::new();

    for pair in pairs {
        if pair.pair.is_empty() {
            continue;
        }

        symbols.push(SymbolInfo {
            symbol: format!("t{}", pair.pair.to_ascii_uppercase()),
            base_asset_precision: pair.price_precision,
            quote_precision: pair.price_precision,
            ..SymbolInfo::default()
        });

        // Six-letter pairs split as [base][quote]; anything else has no
        // derivable funding legs.
        if pair.margin && pair.pair.len() == 6 {
            if let (Some(base), Some(quote)) = (pair.pair.get(..3), pair.pair.get(3..)) {
                funding.insert(format!("f{}", quote.to_ascii_uppercase()));
                funding.insert(format!("f{}", base.to_ascii_uppercase()));
            }
        }
    }

    for name in funding {
        symbols.push(SymbolInfo {
            symbol: name,
            base_asset_precision: FUNDING_PRECISION,
            quote_precision: FUNDING_PRECISION,
            ..SymbolInfo::default()
        });
    }

    symbols
}
