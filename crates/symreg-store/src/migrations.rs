//! Versioned schema migrations for the snapshot database.

use duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "0001_symbols_snapshots",
    sql: r#"
CREATE TABLE IF NOT EXISTS symbols_snapshots (
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day INTEGER NOT NULL,
    exchange_id INTEGER NOT NULL,
    snapshot_time BIGINT NOT NULL,
    symbol TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT '',
    asset TEXT NOT NULL DEFAULT '',
    asset_precision INTEGER NOT NULL DEFAULT 0,
    quote TEXT NOT NULL DEFAULT '',
    quote_precision INTEGER NOT NULL DEFAULT 0,
    order_types TEXT NOT NULL DEFAULT '[]',
    iceberg_allowed BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX IF NOT EXISTS idx_symbols_snapshots_key
    ON symbols_snapshots (year, month, day, exchange_id, snapshot_time);
"#,
}];

/// Apply all pending migrations. Safe to call on every startup.
pub fn apply_migrations(connection: &Connection) -> Result<(), duckdb::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    for migration in MIGRATIONS {
        let applied: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            [migration.version],
            |row| row.get(0),
        )?;
        if applied == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                [migration.version],
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let connection = Connection::open_in_memory().expect("in-memory db");
        apply_migrations(&connection).expect("first run");
        apply_migrations(&connection).expect("second run");

        let applied: i64 = connection
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .expect("count");
        assert_eq!(applied as usize, MIGRATIONS.len());
    }
}
