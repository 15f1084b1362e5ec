//! # Symreg Store
//!
//! `DuckDB`-backed implementation of the [`SnapshotStore`] boundary.
//!
//! One row per symbol in `symbols_snapshots`, keyed by
//! `(year, month, day, exchange_id, snapshot_time)`. The same (day,
//! exchange) key may be written several times a day; reads always select the
//! rows of the most recent snapshot time for the key. All statements are
//! parameterized.

mod migrations;
mod pool;

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use duckdb::params;

use symreg_core::{CalendarDay, ExchangeId, ExchangeSymbols, SnapshotStore, StoreError, SymbolInfo};

pub use migrations::apply_migrations;
pub use pool::{ConnectionPool, PooledConnection};

const INSERT_SYMBOL_SQL: &str = "
INSERT INTO symbols_snapshots (
    year, month, day, exchange_id, snapshot_time,
    symbol, status, asset, asset_precision,
    quote, quote_precision, order_types, iceberg_allowed
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const SELECT_LATEST_SQL: &str = "
SELECT snapshot_time, symbol, status, asset, asset_precision,
       quote, quote_precision, order_types, iceberg_allowed
FROM symbols_snapshots
WHERE year = ? AND month = ? AND day = ? AND exchange_id = ?
  AND snapshot_time = (
      SELECT MAX(snapshot_time)
      FROM symbols_snapshots
      WHERE year = ? AND month = ? AND day = ? AND exchange_id = ?
  )
ORDER BY symbol";

fn transport(error: impl Display) -> StoreError {
    StoreError::Transport(error.to_string())
}

fn consistency(error: impl Display) -> StoreError {
    StoreError::Consistency(error.to_string())
}

/// Snapshot store over a `DuckDB` database file.
#[derive(Clone)]
pub struct SnapshotDb {
    pool: ConnectionPool,
}

impl SnapshotDb {
    /// Open (creating if needed) the database at `path` and apply pending
    /// migrations.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(transport)?;
            }
        }

        let pool = ConnectionPool::new(path, 4);
        let connection = pool.acquire().map_err(transport)?;
        migrations::apply_migrations(&connection).map_err(transport)?;
        drop(connection);

        Ok(Self { pool })
    }

    pub fn db_path(&self) -> &Path {
        self.pool.db_path()
    }
}

impl SnapshotStore for SnapshotDb {
    fn save(&self, snapshot: &ExchangeSymbols) -> Result<(), StoreError> {
        let connection = self.pool.acquire().map_err(transport)?;

        let year = i64::from(snapshot.day.year);
        let month = i64::from(snapshot.day.month);
        let day = i64::from(snapshot.day.day);
        let exchange_id = i64::from(snapshot.exchange.numeric_id());

        connection
            .execute_batch("BEGIN TRANSACTION")
            .map_err(transport)?;
        let result = (|| -> Result<(), StoreError> {
            for symbol in &snapshot.symbols {
                let order_types =
                    serde_json::to_string(&symbol.order_types).map_err(consistency)?;
                connection
                    .execute(
                        INSERT_SYMBOL_SQL,
                        params![
                            year,
                            month,
                            day,
                            exchange_id,
                            snapshot.snapshot_time,
                            symbol.symbol,
                            symbol.status,
                            symbol.base_asset,
                            i64::from(symbol.base_asset_precision),
                            symbol.quote_asset,
                            i64::from(symbol.quote_precision),
                            order_types,
                            symbol.iceberg_allowed,
                        ],
                    )
                    .map_err(transport)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                connection.execute_batch("COMMIT").map_err(transport)?;
                tracing::debug!(
                    exchange = snapshot.exchange.as_str(),
                    symbols = snapshot.symbols.len(),
                    day = %snapshot.day,
                    "snapshot saved"
                );
                Ok(())
            }
            Err(error) => {
                let _ = connection.execute_batch("ROLLBACK");
                Err(error)
            }
        }
    }

    fn load_latest(
        &self,
        day: CalendarDay,
        exchange: ExchangeId,
    ) -> Result<ExchangeSymbols, StoreError> {
        let connection = self.pool.acquire().map_err(transport)?;

        let year = i64::from(day.year);
        let month = i64::from(day.month);
        let day_of_month = i64::from(day.day);
        let exchange_id = i64::from(exchange.numeric_id());

        let mut statement = connection.prepare(SELECT_LATEST_SQL).map_err(transport)?;
        let mut rows = statement
            .query(params![
                year,
                month,
                day_of_month,
                exchange_id,
                year,
                month,
                day_of_month,
                exchange_id,
            ])
            .map_err(transport)?;

        let mut snapshot_time: Option<i64> = None;
        let mut symbols = Vec::new();

        while let Some(row) = rows.next().map_err(transport)? {
            snapshot_time = Some(row.get(0).map_err(transport)?);

            let asset_precision: i64 = row.get(4).map_err(transport)?;
            let quote_precision: i64 = row.get(6).map_err(transport)?;
            let order_types_json: String = row.get(7).map_err(transport)?;
            let order_types: Vec<String> =
                serde_json::from_str(&order_types_json).map_err(consistency)?;

            symbols.push(SymbolInfo {
                symbol: row.get(1).map_err(transport)?,
                status: row.get(2).map_err(transport)?,
                base_asset: row.get(3).map_err(transport)?,
                base_asset_precision: u32::try_from(asset_precision).map_err(consistency)?,
                quote_asset: row.get(5).map_err(transport)?,
                quote_precision: u32::try_from(quote_precision).map_err(consistency)?,
                order_types,
                iceberg_allowed: row.get(8).map_err(transport)?,
            });
        }

        let Some(snapshot_time) = snapshot_time else {
            return Err(StoreError::NotFound { exchange, day });
        };

        ExchangeSymbols::new(exchange, snapshot_time, symbols)
            .map_err(|error| StoreError::Consistency(error.to_string()))
    }
}
