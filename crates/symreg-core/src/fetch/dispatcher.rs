use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::warn;

use crate::fetch::{FetchError, SymbolFetcher};
use crate::{ExchangeId, ExchangesSymbols};

/// Deadlines applied to a dispatch round.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Deadline for a single exchange fetch.
    pub fetch_timeout: Duration,
    /// Deadline for the whole round; exchanges still pending when it fires
    /// are reported as timed out.
    pub round_deadline: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            round_deadline: Duration::from_secs(120),
        }
    }
}

/// A fetch failure attributed to its exchange.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub exchange: ExchangeId,
    pub error: FetchError,
}

/// Outcome of one dispatch round: successful snapshots plus the failures
/// recorded for every exchange that produced no snapshot.
#[derive(Debug, Clone, Default)]
pub struct FetchRound {
    pub snapshots: ExchangesSymbols,
    pub failures: Vec<FetchFailure>,
}

impl FetchRound {
    /// Total outcomes observed, one per dispatched exchange.
    pub fn outcome_count(&self) -> usize {
        self.snapshots.len() + self.failures.len()
    }
}

/// Fans one fetch out per exchange and aggregates the round.
///
/// Failures are isolated: a failing exchange is recorded and the others
/// proceed. The round never returns early on the first failure and never
/// outlives its deadline.
pub struct FetchDispatcher {
    fetchers: HashMap<ExchangeId, Arc<dyn SymbolFetcher>>,
    config: DispatchConfig,
}

impl FetchDispatcher {
    pub fn new(
        fetchers: impl IntoIterator<Item = Arc<dyn SymbolFetcher>>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            fetchers: fetchers
                .into_iter()
                .map(|fetcher| (fetcher.exchange(), fetcher))
                .collect(),
            config,
        }
    }

    /// Fetch all requested exchanges concurrently and collect exactly one
    /// outcome per exchange. Duplicate ids are collapsed.
    pub async fn dispatch(&self, exchanges: &[ExchangeId]) -> FetchRound {
        let mut round = FetchRound::default();
        let mut tasks: JoinSet<(ExchangeId, Result<_, FetchError>)> = JoinSet::new();
        let mut pending: HashSet<ExchangeId> = HashSet::new();

        let mut seen = HashSet::new();
        for &exchange in exchanges {
            if !seen.insert(exchange) {
                continue;
            }

            let Some(fetcher) = self.fetchers.get(&exchange) else {
                round.failures.push(FetchFailure {
                    exchange,
                    error: FetchError::internal(format!(
                        "no fetcher registered for exchange '{exchange}'"
                    )),
                });
                continue;
            };

            pending.insert(exchange);
            let fetcher = Arc::clone(fetcher);
            let fetch_timeout = self.config.fetch_timeout;
            tasks.spawn(async move {
                let outcome =
                    match tokio::time::timeout(fetch_timeout, fetcher.fetch_symbols()).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::timed_out(exchange, fetch_timeout)),
                    };
                (exchange, outcome)
            });
        }

        let deadline = tokio::time::sleep(self.config.round_deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    match joined {
                        Ok((exchange, Ok(snapshot))) => {
                            pending.remove(&exchange);
                            round.snapshots.insert(snapshot);
                        }
                        Ok((exchange, Err(error))) => {
                            pending.remove(&exchange);
                            warn!(
                                exchange = exchange.as_str(),
                                code = error.code(),
                                error = %error,
                                "exchange fetch failed"
                            );
                            round.failures.push(FetchFailure { exchange, error });
                        }
                        // A panicked task loses its exchange attribution;
                        // the pending sweep below still records an outcome.
                        Err(join_error) => {
                            warn!(error = %join_error, "fetch task aborted");
                        }
                    }
                }
                () = &mut deadline => {
                    tasks.abort_all();
                    for exchange in pending.drain() {
                        round.failures.push(FetchFailure {
                            exchange,
                            error: FetchError::timed_out(exchange, self.config.round_deadline),
                        });
                    }
                    return round;
                }
            }
        }

        for exchange in pending.drain() {
            round.failures.push(FetchFailure {
                exchange,
                error: FetchError::internal(format!(
                    "fetch task for exchange '{exchange}' ended without an outcome"
                )),
            });
        }

        round
    }
}
