//! # Symreg Core
//!
//! Domain contracts and the snapshot acquisition/resolution pipeline for the
//! exchange symbol registry.
//!
//! ## Overview
//!
//! The registry periodically collects the tradable-instrument sets exposed by
//! a closed set of cryptocurrency exchanges, persists one dated snapshot per
//! (UTC calendar day, exchange), and serves the most recent or a requested
//! historical snapshot.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Outward-facing JSON shapes for the query interface |
//! | [`domain`] | Snapshot value types and calendar arithmetic |
//! | [`exchange`] | Closed exchange registry (id, numeric id, name) |
//! | [`fetch`] | Per-exchange fetchers, dispatcher, and scheduler |
//! | [`http_client`] | Transport abstraction (reqwest / canned test client) |
//! | [`resolver`] | Date-fallback snapshot lookup |
//! | [`retry`] | Backoff policy for the import path |
//! | [`store`] | Snapshot persistence boundary and typed store errors |
//!
//! ## Pipeline
//!
//! ```text
//! FetchScheduler ──tick──▶ FetchDispatcher ──▶ SymbolFetcher × N (parallel)
//!        │                                             │
//!        └──── aggregate per round ◀───────────────────┘
//!                      │
//!                      ▼ (capacity-1 channel, single consumer)
//!                  importer ──▶ SnapshotStore (write path)
//!
//! query date ──▶ SnapshotResolver ──▶ SnapshotStore (read path, one
//!                                     previous-day fallback on NotFound)
//! ```
//!
//! ## Error handling
//!
//! Per-exchange fetch failures are isolated and logged; they never abort a
//! round. Store lookups distinguish `NotFound` from transport and
//! consistency failures as typed variants, so the resolver's fallback branch
//! is structurally guaranteed.

pub mod api;
pub mod domain;
pub mod exchange;
pub mod fetch;
pub mod http_client;
pub mod resolver;
pub mod retry;
pub mod store;

mod error;

pub use api::{ApiExchangeSymbols, ApiExchangesSymbols, ApiSymbolInfo};
pub use domain::{unix_millis_now, CalendarDay, ExchangeSymbols, ExchangesSymbols, SymbolInfo};
pub use error::ValidationError;
pub use exchange::{parse_exchange_filter, ExchangeId};
pub use fetch::{
    fetcher_for, BinanceFetcher, BitfinexFetcher, DispatchConfig, FetchDispatcher, FetchError,
    FetchErrorKind, FetchFailure, FetchRound, FetchScheduler, SymbolFetcher,
};
pub use http_client::{CannedHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use resolver::{ResolveError, SnapshotResolver};
pub use retry::{Backoff, RetryPolicy};
pub use store::{SnapshotStore, StoreError};
