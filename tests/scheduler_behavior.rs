//! Behavior tests for the fetch scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use symreg_core::fetch::{DispatchConfig, FetchDispatcher, FetchError, FetchScheduler, SymbolFetcher};
use symreg_core::{CalendarDay, ExchangeId};

use symreg_tests::{snapshot_for_day, StaticFetcher};

fn day() -> CalendarDay {
    CalendarDay::new(2019, 1, 10).expect("valid day")
}

fn dispatcher_with(fetchers: Vec<Arc<dyn SymbolFetcher>>) -> Arc<FetchDispatcher> {
    Arc::new(FetchDispatcher::new(
        fetchers,
        DispatchConfig {
            fetch_timeout: Duration::from_millis(200),
            round_deadline: Duration::from_secs(2),
        },
    ))
}

fn all_succeeding() -> Arc<FetchDispatcher> {
    dispatcher_with(vec![
        Arc::new(StaticFetcher::succeeding(
            ExchangeId::Binance,
            snapshot_for_day(ExchangeId::Binance, day()),
        )),
        Arc::new(StaticFetcher::succeeding(
            ExchangeId::Bitfinex,
            snapshot_for_day(ExchangeId::Bitfinex, day()),
        )),
    ])
}

#[tokio::test]
async fn first_round_runs_immediately_not_one_period_later() {
    let scheduler = FetchScheduler::new(
        all_succeeding(),
        ExchangeId::ALL.to_vec(),
        Duration::from_secs(3600),
    );

    let (round_tx, mut round_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(round_tx, shutdown_rx));

    let round = timeout(Duration::from_secs(2), round_rx.recv())
        .await
        .expect("first round well before the period elapses")
        .expect("round published");

    assert_eq!(round.len(), 2);
    task.abort();
}

#[tokio::test]
async fn shutdown_signal_stops_the_scheduler_between_rounds() {
    let scheduler = FetchScheduler::new(
        all_succeeding(),
        ExchangeId::ALL.to_vec(),
        Duration::from_secs(3600),
    );

    let (round_tx, mut round_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(round_tx, shutdown_rx));

    round_rx.recv().await.expect("first round");
    shutdown_tx.send(true).expect("signal");

    timeout(Duration::from_secs(2), task)
        .await
        .expect("scheduler stops promptly")
        .expect("scheduler task completes");
}

#[tokio::test]
async fn dropped_consumer_stops_the_scheduler() {
    let scheduler = FetchScheduler::new(
        all_succeeding(),
        ExchangeId::ALL.to_vec(),
        Duration::from_millis(10),
    );

    let (round_tx, mut round_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(round_tx, shutdown_rx));

    round_rx.recv().await.expect("first round");
    drop(round_rx);

    timeout(Duration::from_secs(2), task)
        .await
        .expect("scheduler notices the dropped consumer")
        .expect("scheduler task completes");
}

#[tokio::test]
async fn partially_failing_round_is_still_published() {
    let dispatcher = dispatcher_with(vec![
        Arc::new(StaticFetcher::succeeding(
            ExchangeId::Binance,
            snapshot_for_day(ExchangeId::Binance, day()),
        )),
        Arc::new(StaticFetcher::failing(
            ExchangeId::Bitfinex,
            FetchError::transport("connection reset"),
        )),
    ]);
    let scheduler = FetchScheduler::new(
        dispatcher,
        ExchangeId::ALL.to_vec(),
        Duration::from_secs(3600),
    );

    let (round_tx, mut round_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(scheduler.run(round_tx, shutdown_rx));

    let round = round_rx.recv().await.expect("round published");
    assert_eq!(round.len(), 1);
    assert!(round.get(ExchangeId::Binance).is_some());
    assert!(round.get(ExchangeId::Bitfinex).is_none());
    task.abort();
}
