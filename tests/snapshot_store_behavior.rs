//! Behavior tests for the DuckDB-backed snapshot store.

use std::sync::Arc;

use tempfile::tempdir;
use time::OffsetDateTime;

use symreg_core::resolver::SnapshotResolver;
use symreg_core::store::{SnapshotStore, StoreError};
use symreg_core::{CalendarDay, ExchangeId, ExchangeSymbols};
use symreg_store::SnapshotDb;

use symreg_tests::{millis_at_noon, sample_symbol, snapshot_for_day};

fn day() -> CalendarDay {
    CalendarDay::new(2019, 1, 10).expect("valid day")
}

#[test]
fn saved_snapshot_round_trips_with_all_fields() {
    let temp = tempdir().expect("tempdir");
    let db = SnapshotDb::open(temp.path().join("symreg.duckdb")).expect("open");

    let saved = snapshot_for_day(ExchangeId::Binance, day());
    db.save(&saved).expect("save");

    let loaded = db.load_latest(day(), ExchangeId::Binance).expect("load");

    assert_eq!(loaded.exchange, ExchangeId::Binance);
    assert_eq!(loaded.day, day());
    assert_eq!(loaded.snapshot_time, saved.snapshot_time);
    assert_eq!(loaded.symbols.len(), 1);

    let symbol = &loaded.symbols[0];
    assert_eq!(symbol.symbol, "BTCUSDT");
    assert_eq!(symbol.status, "TRADING");
    assert_eq!(symbol.base_asset, "BTC");
    assert_eq!(symbol.base_asset_precision, 8);
    assert_eq!(symbol.quote_asset, "USDT");
    assert_eq!(symbol.quote_precision, 8);
    assert_eq!(symbol.order_types, ["LIMIT", "MARKET"]);
    assert!(symbol.iceberg_allowed);
}

#[test]
fn repeated_snapshots_on_one_day_load_only_the_latest() {
    let temp = tempdir().expect("tempdir");
    let db = SnapshotDb::open(temp.path().join("symreg.duckdb")).expect("open");

    let noon = millis_at_noon(day());
    let morning = ExchangeSymbols::new(
        ExchangeId::Binance,
        noon - 6 * 3600 * 1000,
        vec![sample_symbol("BTCUSDT"), sample_symbol("ETHUSDT")],
    )
    .expect("valid snapshot");
    let afternoon = ExchangeSymbols::new(
        ExchangeId::Binance,
        noon + 6 * 3600 * 1000,
        vec![sample_symbol("BTCUSDT")],
    )
    .expect("valid snapshot");

    db.save(&morning).expect("save morning");
    db.save(&afternoon).expect("save afternoon");

    let loaded = db.load_latest(day(), ExchangeId::Binance).expect("load");
    assert_eq!(loaded.snapshot_time, afternoon.snapshot_time);
    assert_eq!(loaded.symbols.len(), 1);
}

#[test]
fn exchanges_on_the_same_day_are_isolated() {
    let temp = tempdir().expect("tempdir");
    let db = SnapshotDb::open(temp.path().join("symreg.duckdb")).expect("open");

    db.save(&snapshot_for_day(ExchangeId::Binance, day()))
        .expect("save binance");
    db.save(&snapshot_for_day(ExchangeId::Bitfinex, day()))
        .expect("save bitfinex");

    let binance = db.load_latest(day(), ExchangeId::Binance).expect("load");
    let bitfinex = db.load_latest(day(), ExchangeId::Bitfinex).expect("load");

    assert_eq!(binance.exchange, ExchangeId::Binance);
    assert_eq!(bitfinex.exchange, ExchangeId::Bitfinex);
}

#[test]
fn missing_key_is_a_typed_not_found() {
    let temp = tempdir().expect("tempdir");
    let db = SnapshotDb::open(temp.path().join("symreg.duckdb")).expect("open");

    let err = db
        .load_latest(day(), ExchangeId::Binance)
        .expect_err("nothing stored");

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        StoreError::NotFound {
            exchange: ExchangeId::Binance,
            ..
        }
    ));
}

#[test]
fn data_survives_reopening_the_database_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("symreg.duckdb");

    {
        let db = SnapshotDb::open(&path).expect("first open");
        db.save(&snapshot_for_day(ExchangeId::Binance, day()))
            .expect("save");
    }

    let reopened = SnapshotDb::open(&path).expect("second open");
    let loaded = reopened
        .load_latest(day(), ExchangeId::Binance)
        .expect("load after reopen");
    assert_eq!(loaded.symbols.len(), 1);
}

#[test]
fn resolver_falls_back_to_yesterday_over_the_real_store() {
    let temp = tempdir().expect("tempdir");
    let db = SnapshotDb::open(temp.path().join("symreg.duckdb")).expect("open");

    let yesterday = CalendarDay::previous(OffsetDateTime::now_utc());
    db.save(&snapshot_for_day(ExchangeId::Binance, yesterday))
        .expect("save");

    let resolver = SnapshotResolver::new(Arc::new(db));
    let result = resolver
        .resolve(&[ExchangeId::Binance], || Ok(day()))
        .expect("resolves via fallback");

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.get(ExchangeId::Binance).expect("present").day,
        yesterday
    );
}
