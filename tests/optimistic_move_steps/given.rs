//! Given steps for optimistic move BDD scenarios.

use super::world::{BoardWorld, parse_status, scenario_task, split_ids};
use rstest_bdd_macros::given;

#[given(r#"a board with tasks "{tasks}" in "{status}""#)]
fn board_with_tasks(
    world: &mut BoardWorld,
    tasks: String,
    status: String,
) -> Result<(), eyre::Report> {
    let column = parse_status(&status)?;
    let created = split_ids(&tasks)
        .iter()
        .map(|id| scenario_task(id, column))
        .collect::<Result<Vec<_>, _>>()?;
    world.mount(created);
    Ok(())
}

#[given(r#"the store rejects moves to "{status}""#)]
fn store_rejects_moves(world: &mut BoardWorld, status: String) -> Result<(), eyre::Report> {
    let target = parse_status(&status)?;
    world.store()?.reject_moves_to(target);
    Ok(())
}
