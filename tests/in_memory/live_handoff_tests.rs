//! Handoff from a statically rendered snapshot to live updates.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::rstest;
use tokio::runtime::Handle;
use taskboard::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{BoardState, TaskStatus},
    services::{BoardConfig, HandoffPhase, LiveBoard},
};

use super::helpers::{DelayedSubscription, clock, column_board};

const CEILING: Duration = Duration::from_millis(300);

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn live_snapshot_replaces_static_snapshot_exactly_once(clock: DefaultClock) {
    let live_snapshot = column_board(TaskStatus::Planning, &["t-1"]);
    let store = InMemoryTaskStore::new(live_snapshot.clone());
    let live = LiveBoard::mount(
        BoardState::empty(),
        Arc::new(store),
        Arc::new(clock),
        BoardConfig::default().with_handoff_ceiling(CEILING),
        Handle::current(),
    );

    let mut renders = live.coordinator().watch_display();
    let first_render = renders.borrow_and_update().column(TaskStatus::Planning).len();
    let recorder = tokio::spawn(async move {
        let mut counts = Vec::new();
        while renders.changed().await.is_ok() {
            counts.push(renders.borrow_and_update().column(TaskStatus::Planning).len());
        }
        counts
    });

    live.run(DelayedSubscription::new(vec![
        (Duration::from_millis(100), live_snapshot.clone()),
        (Duration::from_millis(50), live_snapshot),
    ]))
    .await;

    let report = live.handoff_report();
    let handoff = report.live_after.expect("handoff recorded");
    assert!(handoff >= Duration::from_millis(100));
    assert!(handoff < CEILING);
    assert!(report.completed_within(CEILING));
    assert_eq!(live.phase(), HandoffPhase::Live);

    drop(live);
    let later_renders = recorder.await.expect("recorder finishes");
    assert_eq!(first_render, 0);
    assert_eq!(later_renders, [1]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_subscription_hands_off_immediately(clock: DefaultClock) {
    let store = InMemoryTaskStore::new(column_board(TaskStatus::Ready, &["a", "b"]));
    let live = LiveBoard::mount(
        BoardState::empty(),
        Arc::new(store.clone()),
        Arc::new(clock),
        BoardConfig::default(),
        Handle::current(),
    );
    let pump = tokio::spawn({
        let live = live.clone();
        let subscription = store.subscribe();
        async move { live.run(subscription).await }
    });

    let mut display = live.coordinator().watch_display();
    tokio::time::timeout(
        Duration::from_secs(2),
        display.wait_for(|board| board.column(TaskStatus::Ready).len() == 2),
    )
    .await
    .expect("initial live snapshot arrives")
    .expect("coordinator alive");

    assert_eq!(live.phase(), HandoffPhase::Live);
    assert!(!live.handoff_report().overdue);

    pump.abort();
}
