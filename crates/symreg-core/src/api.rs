//! Outward-facing JSON shapes for the symbol query interface.
//!
//! The API view is deliberately narrower than the stored snapshot: symbol
//! names are prefixed with their exchange, and precision and order-type
//! fields are dropped at this boundary.

use serde::{Deserialize, Serialize};

use crate::{ExchangeSymbols, ExchangesSymbols, SymbolInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSymbolInfo {
    pub symbol: String,
    pub status: String,
    pub asset: String,
    pub quote: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiExchangeSymbols {
    pub exchange: String,
    pub snapshot_time: i64,
    pub symbols: Vec<ApiSymbolInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiExchangesSymbols {
    pub exchanges: Vec<ApiExchangeSymbols>,
}

fn api_symbol(exchange: &str, info: &SymbolInfo) -> ApiSymbolInfo {
    ApiSymbolInfo {
        symbol: format!("{exchange}-{}", info.symbol),
        status: info.status.clone(),
        asset: info.base_asset.clone(),
        quote: info.quote_asset.clone(),
    }
}

impl From<&ExchangeSymbols> for ApiExchangeSymbols {
    fn from(snapshot: &ExchangeSymbols) -> Self {
        let exchange = snapshot.exchange.as_str();
        Self {
            exchange: exchange.to_owned(),
            snapshot_time: snapshot.snapshot_time,
            symbols: snapshot
                .symbols
                .iter()
                .map(|info| api_symbol(exchange, info))
                .collect(),
        }
    }
}

impl From<&ExchangesSymbols> for ApiExchangesSymbols {
    fn from(snapshots: &ExchangesSymbols) -> Self {
        Self {
            exchanges: snapshots.exchanges.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExchangeId;

    fn sample_snapshot() -> ExchangeSymbols {
        ExchangeSymbols::new(
            ExchangeId::Binance,
            1_547_121_600_000,
            vec![SymbolInfo {
                symbol: String::from("BTCUSDT"),
                status: String::from("TRADING"),
                base_asset: String::from("BTC"),
                base_asset_precision: 8,
                quote_asset: String::from("USDT"),
                quote_precision: 8,
                order_types: vec![String::from("LIMIT"), String::from("MARKET")],
                iceberg_allowed: true,
            }],
        )
        .expect("valid snapshot")
    }

    #[test]
    fn symbols_are_prefixed_with_exchange_name() {
        let api: ApiExchangeSymbols = (&sample_snapshot()).into();
        assert_eq!(api.exchange, "binance");
        assert_eq!(api.symbols[0].symbol, "binance-BTCUSDT");
    }

    #[test]
    fn precision_and_order_type_fields_are_dropped() {
        let api: ApiExchangeSymbols = (&sample_snapshot()).into();
        let rendered = serde_json::to_string(&api).expect("serializable");

        assert!(!rendered.contains("precision"));
        assert!(!rendered.contains("order_types"));
        assert!(!rendered.contains("iceberg"));
        assert!(rendered.contains("\"asset\":\"BTC\""));
        assert!(rendered.contains("\"quote\":\"USDT\""));
    }

    #[test]
    fn snapshot_time_is_carried_through() {
        let mut snapshots = ExchangesSymbols::default();
        snapshots.insert(sample_snapshot());
        let api: ApiExchangesSymbols = (&snapshots).into();

        assert_eq!(api.exchanges.len(), 1);
        assert_eq!(api.exchanges[0].snapshot_time, 1_547_121_600_000);
    }
}
