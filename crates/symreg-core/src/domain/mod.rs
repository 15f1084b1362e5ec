//! Domain types for exchange symbol snapshots.
//!
//! All types here are plain values: created fresh by a fetch round or a store
//! read, handed over once, never mutated in place. Calendar keys are always
//! derived from the snapshot timestamp in UTC.

mod calendar;
mod snapshot;

pub use calendar::{unix_millis_now, CalendarDay};
pub use snapshot::{ExchangeSymbols, ExchangesSymbols, SymbolInfo};
