//! Command-line arguments for the registry server.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--listen` | `0.0.0.0:8080` | HTTP listen address |
//! | `--db-path` | `data/symreg.duckdb` | Snapshot database file |
//! | `--exchanges` | all | `@`-separated exchange names to fetch |
//! | `--fetch-interval-secs` | `300` | Period between fetch rounds |
//! | `--fetch-timeout-secs` | `30` | Per-exchange fetch deadline |
//! | `--round-deadline-secs` | `120` | Whole-round deadline |
//! | `--import-retries` | `4` | Retries per snapshot write |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use symreg_core::{parse_exchange_filter, DispatchConfig, ExchangeId, ValidationError};

/// Exchange symbol registry server.
///
/// Periodically snapshots the tradable symbols of the configured exchanges
/// into a local DuckDB file and serves them over HTTP.
#[derive(Debug, Parser)]
#[command(name = "symreg-server", version, about = "Exchange symbol registry server")]
pub struct ServerArgs {
    /// Address the HTTP query interface binds to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Path of the snapshot database file. Parent directories are created.
    #[arg(long, default_value = "data/symreg.duckdb")]
    pub db_path: PathBuf,

    /// `@`-separated exchange names to fetch, e.g. `binance@bitfinex`.
    /// Omitted means every known exchange.
    #[arg(long)]
    pub exchanges: Option<String>,

    /// Seconds between scheduled fetch rounds.
    #[arg(long, default_value_t = 300)]
    pub fetch_interval_secs: u64,

    /// Seconds a single exchange fetch may take before it is abandoned.
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Seconds a whole fetch round may take before outstanding fetches are
    /// abandoned.
    #[arg(long, default_value_t = 120)]
    pub round_deadline_secs: u64,

    /// Retries per snapshot write before the round's data is dropped.
    #[arg(long, default_value_t = 4)]
    pub import_retries: u32,
}

impl ServerArgs {
    pub fn fetch_exchanges(&self) -> Result<Vec<ExchangeId>, ValidationError> {
        parse_exchange_filter(self.exchanges.as_deref())
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            round_deadline: Duration::from_secs(self.round_deadline_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_exchanges() {
        let args = ServerArgs::parse_from(["symreg-server"]);
        assert_eq!(args.fetch_exchanges().expect("valid"), ExchangeId::ALL);
        assert_eq!(args.fetch_interval(), Duration::from_secs(300));
        assert_eq!(
            args.dispatch_config().fetch_timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn exchange_filter_narrows_the_fetch_set() {
        let args = ServerArgs::parse_from(["symreg-server", "--exchanges", "bitfinex"]);
        assert_eq!(args.fetch_exchanges().expect("valid"), [ExchangeId::Bitfinex]);
    }

    #[test]
    fn unknown_exchange_name_is_rejected() {
        let args = ServerArgs::parse_from(["symreg-server", "--exchanges", "kraken"]);
        assert!(args.fetch_exchanges().is_err());
    }
}
