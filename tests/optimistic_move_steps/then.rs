//! Then steps for optimistic move BDD scenarios.

use super::world::{BoardWorld, parse_status, parse_task_id, split_ids};
use rstest_bdd_macros::then;
use taskboard::board::services::MoveResolution;

#[then(r#"column "{status}" shows "{tasks}""#)]
fn column_shows(world: &BoardWorld, status: String, tasks: String) -> Result<(), eyre::Report> {
    let column = parse_status(&status)?;
    let display = world.coordinator()?.display_state();
    let shown: Vec<String> = display
        .column(column)
        .iter()
        .map(|task| task.id().as_str().to_owned())
        .collect();
    let expected = split_ids(&tasks);

    if shown != expected {
        return Err(eyre::eyre!(
            "expected column {status} to show {expected:?}, found {shown:?}"
        ));
    }
    Ok(())
}

#[then(r#"column "{status}" is empty"#)]
fn column_is_empty(world: &BoardWorld, status: String) -> Result<(), eyre::Report> {
    let column = parse_status(&status)?;
    let display = world.coordinator()?.display_state();
    if !display.column(column).is_empty() {
        return Err(eyre::eyre!("expected column {status} to be empty"));
    }
    Ok(())
}

#[then(r#"task "{task}" has a pending move"#)]
fn task_has_pending_move(world: &BoardWorld, task: String) -> Result<(), eyre::Report> {
    let task_id = parse_task_id(&task)?;
    if !world.coordinator()?.is_pending(&task_id) {
        return Err(eyre::eyre!("expected task {task} to have a pending move"));
    }
    Ok(())
}

#[then(r#"task "{task}" has no pending move"#)]
fn task_has_no_pending_move(world: &BoardWorld, task: String) -> Result<(), eyre::Report> {
    let task_id = parse_task_id(&task)?;
    if world.coordinator()?.is_pending(&task_id) {
        return Err(eyre::eyre!("expected task {task} to have no pending move"));
    }
    Ok(())
}

#[then("the move was rolled back")]
fn move_was_rolled_back(world: &BoardWorld) -> Result<(), eyre::Report> {
    match &world.last_resolution {
        Some(MoveResolution::RolledBack(_)) => Ok(()),
        other => Err(eyre::eyre!("expected a rollback, got {other:?}")),
    }
}

#[then("the move was committed")]
fn move_was_committed(world: &BoardWorld) -> Result<(), eyre::Report> {
    match &world.last_resolution {
        Some(MoveResolution::Committed) => Ok(()),
        other => Err(eyre::eyre!("expected a commit, got {other:?}")),
    }
}
