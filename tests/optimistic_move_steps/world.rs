//! Shared world state for optimistic move BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use tokio::runtime::Handle;
use taskboard::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{AgentId, BoardState, NewTask, Task, TaskId, TaskStatus},
    services::{BoardConfig, MoveResolution, MoveTicket, OptimisticMoveCoordinator},
};

/// Coordinator type used by the BDD world.
pub type TestCoordinator = OptimisticMoveCoordinator<InMemoryTaskStore>;

/// Store latency that keeps a move pending until a step awaits it.
pub const STORE_LATENCY: Duration = Duration::from_millis(300);

/// Scenario world for optimistic move behaviour tests.
#[derive(Default)]
pub struct BoardWorld {
    pub store: Option<InMemoryTaskStore>,
    pub coordinator: Option<TestCoordinator>,
    pub tickets: Vec<MoveTicket>,
    pub last_resolution: Option<MoveResolution>,
}

impl BoardWorld {
    /// Returns the coordinator created by a given step.
    pub fn coordinator(&self) -> Result<&TestCoordinator, eyre::Report> {
        self.coordinator
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing coordinator in scenario world"))
    }

    /// Returns the store created by a given step.
    pub fn store(&self) -> Result<&InMemoryTaskStore, eyre::Report> {
        self.store
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing store in scenario world"))
    }

    /// Creates the store and coordinator over `tasks`.
    pub fn mount(&mut self, tasks: Vec<Task>) {
        let store = InMemoryTaskStore::new(BoardState::from_tasks(tasks));
        store.set_latency(STORE_LATENCY);
        let coordinator = OptimisticMoveCoordinator::new(
            store.board(),
            Arc::new(store.clone()),
            BoardConfig::default(),
            Handle::current(),
        );
        self.store = Some(store);
        self.coordinator = Some(coordinator);
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| Handle::current().block_on(future))
}

/// Parses a scenario status name.
pub fn parse_status(raw: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

/// Parses a scenario task identifier.
pub fn parse_task_id(raw: &str) -> Result<TaskId, eyre::Report> {
    TaskId::new(raw).map_err(|err| eyre::eyre!("invalid task id in scenario: {err}"))
}

/// Splits a comma-separated list of task identifiers.
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Builds a scenario task.
pub fn scenario_task(id: &str, status: TaskStatus) -> Result<Task, eyre::Report> {
    let agent = AgentId::new("agent-bdd").map_err(|err| eyre::eyre!("{err}"))?;
    let request = NewTask::new(parse_task_id(id)?, format!("Task {id}"), agent, "scenario")
        .with_status(status);
    Task::create(request, &DefaultClock).map_err(|err| eyre::eyre!("invalid task: {err}"))
}
