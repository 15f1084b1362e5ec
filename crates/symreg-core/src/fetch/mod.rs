//! Fetching symbol sets from exchange boundaries.
//!
//! One [`SymbolFetcher`] per exchange, fanned out concurrently by the
//! [`FetchDispatcher`] and driven on a fixed cadence by the
//! [`FetchScheduler`].

mod binance;
mod bitfinex;
mod dispatcher;
mod scheduler;

pub use binance::BinanceFetcher;
pub use bitfinex::BitfinexFetcher;
pub use dispatcher::{DispatchConfig, FetchDispatcher, FetchFailure, FetchRound};
pub use scheduler::FetchScheduler;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::http_client::HttpClient;
use crate::{ExchangeId, ExchangeSymbols};

/// Per-exchange fetch error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The exchange could not be reached or answered with a failure status.
    Transport,
    /// The exchange answered with a payload we could not decode.
    BadPayload,
    /// The fetch did not complete within its deadline.
    TimedOut,
    Internal,
}

/// Structured fetch error carried through a dispatch round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn bad_payload(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::BadPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timed_out(exchange: ExchangeId, after: Duration) -> Self {
        Self {
            kind: FetchErrorKind::TimedOut,
            message: format!(
                "fetch from '{exchange}' did not complete within {}ms",
                after.as_millis()
            ),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::BadPayload => "fetch.bad_payload",
            FetchErrorKind::TimedOut => "fetch.timed_out",
            FetchErrorKind::Internal => "fetch.internal",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Boundary adapter that retrieves one exchange's current symbol set.
///
/// Side-effect-free apart from the network call. Implementations populate
/// the exchange id, the snapshot wall-clock time in milliseconds, the
/// derived calendar key, and the symbol list.
pub trait SymbolFetcher: Send + Sync {
    fn exchange(&self) -> ExchangeId;

    fn fetch_symbols<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeSymbols, FetchError>> + Send + 'a>>;
}

/// Build the fetcher for `exchange` over a shared transport.
///
/// The single mapping site from exchange id to fetcher constructor; adding
/// an exchange means extending [`ExchangeId`] and this match.
pub fn fetcher_for(exchange: ExchangeId, http: Arc<dyn HttpClient>) -> Arc<dyn SymbolFetcher> {
    match exchange {
        ExchangeId::Binance => Arc::new(BinanceFetcher::new(http)),
        ExchangeId::Bitfinex => Arc::new(BitfinexFetcher::new(http)),
    }
}
