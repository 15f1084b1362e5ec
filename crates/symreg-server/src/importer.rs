//! Imports completed fetch rounds into the snapshot store.
//!
//! The importer is the single consumer of the scheduler's round channel. A
//! write failure is retried with backoff up to the configured bound; once
//! exhausted, that snapshot is dropped with an error log and the importer
//! moves on. It never takes the process down.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use symreg_core::store::SnapshotStore;
use symreg_core::{ExchangeSymbols, ExchangesSymbols, RetryPolicy};

pub struct SnapshotImporter {
    store: Arc<dyn SnapshotStore>,
    retry: RetryPolicy,
}

impl SnapshotImporter {
    pub fn new(store: Arc<dyn SnapshotStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Consume rounds until the sending side closes.
    pub async fn run(self, mut rounds: mpsc::Receiver<ExchangesSymbols>) {
        while let Some(round) = rounds.recv().await {
            if round.is_empty() {
                error!("received a round with no snapshots, nothing to import");
                continue;
            }
            self.import_round(round).await;
        }
        info!("round channel closed, importer stopping");
    }

    async fn import_round(&self, round: ExchangesSymbols) {
        for snapshot in round.exchanges {
            self.save_with_retry(snapshot).await;
        }
    }

    async fn save_with_retry(&self, snapshot: ExchangeSymbols) {
        let exchange = snapshot.exchange;
        let attempts = self.retry.max_retries + 1;

        for attempt in 0..attempts {
            let store = Arc::clone(&self.store);
            let to_save = snapshot.clone();
            let result =
                tokio::task::spawn_blocking(move || store.save(&to_save)).await;

            match result {
                Ok(Ok(())) => {
                    debug!(
                        exchange = exchange.as_str(),
                        symbols = snapshot.symbols.len(),
                        day = %snapshot.day,
                        "snapshot imported"
                    );
                    return;
                }
                Ok(Err(cause)) => {
                    warn!(
                        exchange = exchange.as_str(),
                        attempt = attempt + 1,
                        attempts,
                        %cause,
                        "snapshot import failed"
                    );
                }
                Err(cause) => {
                    warn!(
                        exchange = exchange.as_str(),
                        attempt = attempt + 1,
                        attempts,
                        %cause,
                        "snapshot import task failed"
                    );
                }
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
            }
        }

        error!(
            exchange = exchange.as_str(),
            day = %snapshot.day,
            "snapshot dropped after exhausting import retries"
        );
    }
}
