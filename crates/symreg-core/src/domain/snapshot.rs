use serde::{Deserialize, Serialize};

use crate::{CalendarDay, ExchangeId, ValidationError};

/// One tradable instrument as reported by an exchange.
///
/// Immutable once fetched; the symbol string is the only identity within its
/// exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub base_asset_precision: u32,
    pub quote_asset: String,
    pub quote_precision: u32,
    pub order_types: Vec<String>,
    pub iceberg_allowed: bool,
}

/// One exchange's symbol snapshot for a single fetch round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSymbols {
    pub exchange: ExchangeId,
    /// UTC calendar day of `snapshot_time`. Derived at construction, never
    /// set independently.
    pub day: CalendarDay,
    /// Snapshot wall-clock time in milliseconds since the Unix epoch.
    pub snapshot_time: i64,
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeSymbols {
    pub fn new(
        exchange: ExchangeId,
        snapshot_time: i64,
        symbols: Vec<SymbolInfo>,
    ) -> Result<Self, ValidationError> {
        let day = CalendarDay::from_unix_millis(snapshot_time)?;
        Ok(Self {
            exchange,
            day,
            snapshot_time,
            symbols,
        })
    }
}

/// The snapshots of one fetch round or one resolved query.
///
/// Holds at most one entry per exchange; ordering is not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangesSymbols {
    pub exchanges: Vec<ExchangeSymbols>,
}

impl ExchangesSymbols {
    /// Add a snapshot, replacing any existing entry for the same exchange.
    pub fn insert(&mut self, snapshot: ExchangeSymbols) {
        match self
            .exchanges
            .iter_mut()
            .find(|existing| existing.exchange == snapshot.exchange)
        {
            Some(existing) => *existing = snapshot,
            None => self.exchanges.push(snapshot),
        }
    }

    pub fn get(&self, exchange: ExchangeId) -> Option<&ExchangeSymbols> {
        self.exchanges
            .iter()
            .find(|snapshot| snapshot.exchange == exchange)
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(exchange: ExchangeId, snapshot_time: i64) -> ExchangeSymbols {
        ExchangeSymbols::new(exchange, snapshot_time, Vec::new()).expect("valid snapshot")
    }

    #[test]
    fn calendar_day_is_derived_from_snapshot_time() {
        // 2019-01-10T12:00:00Z
        let built = snapshot(ExchangeId::Binance, 1_547_121_600_000);
        assert_eq!(built.day, CalendarDay::new(2019, 1, 10).expect("valid"));
    }

    #[test]
    fn insert_replaces_entry_for_same_exchange() {
        let mut round = ExchangesSymbols::default();
        round.insert(snapshot(ExchangeId::Binance, 1_547_121_600_000));
        round.insert(snapshot(ExchangeId::Bitfinex, 1_547_121_600_000));
        round.insert(snapshot(ExchangeId::Binance, 1_547_121_700_000));

        assert_eq!(round.len(), 2);
        let binance = round.get(ExchangeId::Binance).expect("present");
        assert_eq!(binance.snapshot_time, 1_547_121_700_000);
    }

    #[test]
    fn out_of_range_snapshot_time_is_rejected() {
        let err = ExchangeSymbols::new(ExchangeId::Binance, i64::MAX, Vec::new())
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::TimestampOutOfRange { .. }));
    }
}
