use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::fetch::FetchDispatcher;
use crate::{ExchangeId, ExchangesSymbols};

/// Drives the dispatcher on a fixed cadence and publishes each round's
/// aggregate to a single downstream consumer.
///
/// Rounds are strictly serialized: a new round does not start until the
/// previous aggregate has been accepted by the consumer. Ticks that fire
/// while a round is in flight are dropped, not queued. The first round runs
/// immediately on startup.
pub struct FetchScheduler {
    dispatcher: Arc<FetchDispatcher>,
    exchanges: Vec<ExchangeId>,
    period: Duration,
}

impl FetchScheduler {
    pub fn new(
        dispatcher: Arc<FetchDispatcher>,
        exchanges: Vec<ExchangeId>,
        period: Duration,
    ) -> Self {
        Self {
            dispatcher,
            exchanges,
            period,
        }
    }

    /// Run until the shutdown signal flips to `true` (observed between
    /// rounds) or the consumer side of `results` goes away.
    pub async fn run(
        self,
        results: mpsc::Sender<ExchangesSymbols>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("fetch scheduler shutting down");
                        return;
                    }
                }
                _ = ticker.tick() => {
                    let round = self.dispatcher.dispatch(&self.exchanges).await;
                    for failure in &round.failures {
                        warn!(
                            exchange = failure.exchange.as_str(),
                            error = %failure.error,
                            "round recorded a failure"
                        );
                    }
                    if round.snapshots.is_empty() {
                        error!("fetch round produced no snapshots");
                    }
                    if results.send(round.snapshots).await.is_err() {
                        info!("round consumer dropped, stopping fetch scheduler");
                        return;
                    }
                }
            }
        }
    }
}
