use thiserror::Error;

use crate::{CalendarDay, ExchangeId, ExchangeSymbols};

/// Snapshot persistence errors.
///
/// `NotFound` is a first-class variant so the resolver's fallback branch is
/// driven by the type system, never by matching error text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot row exists for the requested (day, exchange) key.
    #[error("no snapshot for exchange '{exchange}' on {day}")]
    NotFound {
        exchange: ExchangeId,
        day: CalendarDay,
    },

    /// The backing database rejected or failed the operation.
    #[error("snapshot store transport error: {0}")]
    Transport(String),

    /// Stored rows could not be mapped back into domain types.
    #[error("snapshot store consistency error: {0}")]
    Consistency(String),
}

impl StoreError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Snapshot persistence boundary.
///
/// A write with an existing key is legal: an exchange may be snapshotted
/// several times a day, and `load_latest` always selects the most recent
/// snapshot by snapshot time. Implementations must be safe for concurrent
/// use from the import (write) and query (read) paths.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &ExchangeSymbols) -> Result<(), StoreError>;

    fn load_latest(
        &self,
        day: CalendarDay,
        exchange: ExchangeId,
    ) -> Result<ExchangeSymbols, StoreError>;
}
