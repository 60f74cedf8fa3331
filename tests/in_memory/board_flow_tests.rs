//! End-to-end optimistic move flows against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::rstest;
use tokio::runtime::Handle;
use taskboard::board::{
    adapters::memory::InMemoryTaskStore,
    domain::TaskStatus,
    services::{BoardConfig, LiveBoard, MoveResolution, OptimisticMoveCoordinator},
};

use super::helpers::{clock, column_board, column_ids, task, task_id};

#[rstest]
#[tokio::test]
async fn failed_move_reverts_to_the_original_columns() {
    let initial = column_board(TaskStatus::Planning, &["A", "B"]);
    let store = InMemoryTaskStore::new(initial.clone());
    store.reject_moves_to(TaskStatus::Done);
    let coordinator = OptimisticMoveCoordinator::new(
        initial.clone(),
        Arc::new(store),
        BoardConfig::default(),
        Handle::current(),
    );

    let ticket = coordinator.request_move(task_id("A"), TaskStatus::Done);

    let optimistic = coordinator.display_state();
    assert_eq!(column_ids(&optimistic, TaskStatus::Planning), ["B"]);
    assert_eq!(column_ids(&optimistic, TaskStatus::Done), ["A"]);

    let resolution = ticket.resolution().await.expect("move task completes");
    assert!(matches!(resolution, MoveResolution::RolledBack(_)));

    let reverted = coordinator.display_state();
    assert_eq!(column_ids(&reverted, TaskStatus::Planning), ["A", "B"]);
    assert!(reverted.column(TaskStatus::Done).is_empty());
    assert_eq!(*reverted, initial);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn committed_move_survives_live_snapshots(clock: DefaultClock) {
    let initial = column_board(TaskStatus::Planning, &["A", "B"]);
    let store = InMemoryTaskStore::new(initial.clone());
    store.set_latency(Duration::from_millis(20));
    let live = LiveBoard::mount(
        initial,
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

    let ticket = live.coordinator().request_move(task_id("B"), TaskStatus::InReview);
    assert_eq!(
        column_ids(&live.coordinator().display_state(), TaskStatus::InReview),
        ["B"]
    );
    let resolution = ticket.resolution().await.expect("move task completes");
    assert_eq!(resolution, MoveResolution::Committed);

    let mut display = live.coordinator().watch_display();
    let confirmed = tokio::time::timeout(
        Duration::from_secs(2),
        display.wait_for(|board| board.column(TaskStatus::InReview).len() == 1),
    )
    .await
    .expect("store snapshot arrives")
    .expect("coordinator alive")
    .clone();
    assert_eq!(column_ids(&confirmed, TaskStatus::Planning), ["A"]);
    assert!(!live.coordinator().is_pending(&task_id("B")));

    pump.abort();
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_users_edits_win_over_settled_state(clock: DefaultClock) {
    let initial = column_board(TaskStatus::Ready, &["A"]);
    let store = InMemoryTaskStore::new(initial.clone());
    let live = LiveBoard::mount(
        initial,
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
    store.replace_board(column_board(TaskStatus::Blocked, &["A", "Z"]));
    store.upsert_task(task("Y", TaskStatus::Ready));

    let latest = tokio::time::timeout(
        Duration::from_secs(2),
        display.wait_for(|board| board.len() == 3),
    )
    .await
    .expect("snapshots arrive")
    .expect("coordinator alive")
    .clone();
    assert_eq!(column_ids(&latest, TaskStatus::Blocked), ["A", "Z"]);
    assert_eq!(column_ids(&latest, TaskStatus::Ready), ["Y"]);

    pump.abort();
}
