use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::store::{SnapshotStore, StoreError};
use crate::{CalendarDay, ExchangeId, ExchangesSymbols, ValidationError};

/// Errors surfaced by a snapshot resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Date(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves "symbols for these exchanges as of day D" against the store,
/// falling back once to the previous calendar day when D has no snapshot.
pub struct SnapshotResolver {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotResolver {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Resolve the latest snapshot per exchange for the day `date_fn` yields.
    ///
    /// `date_fn` is invoked once and its day shared across all exchanges; a
    /// failure aborts the resolution before any store query. Per exchange,
    /// a `NotFound` outcome triggers exactly one retry against the calendar
    /// day preceding the current wall-clock moment. Note this fallback day is
    /// relative to *now*, not to the requested date: a historical query with
    /// no snapshot falls back to yesterday, which may be unrelated to the
    /// date asked for. Any other error, or a failed fallback attempt, aborts
    /// the whole resolution.
    pub fn resolve<F>(
        &self,
        exchanges: &[ExchangeId],
        date_fn: F,
    ) -> Result<ExchangesSymbols, ResolveError>
    where
        F: FnOnce() -> Result<CalendarDay, ValidationError>,
    {
        let mut aggregate = ExchangesSymbols::default();
        if exchanges.is_empty() {
            return Ok(aggregate);
        }

        let requested = date_fn()?;

        for &exchange in exchanges {
            match self.store.load_latest(requested, exchange) {
                Ok(snapshot) => aggregate.insert(snapshot),
                Err(error) if error.is_not_found() => {
                    let fallback = CalendarDay::previous(OffsetDateTime::now_utc());
                    debug!(
                        exchange = exchange.as_str(),
                        %requested,
                        %fallback,
                        "no snapshot for requested day, falling back"
                    );
                    let snapshot = self.store.load_latest(fallback, exchange)?;
                    aggregate.insert(snapshot);
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok(aggregate)
    }
}
