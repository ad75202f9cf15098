//! Behaviour tests for task record mutations over a real collection.

#[path = "task_lifecycle_steps/mod.rs"]
mod task_lifecycle_steps_defs;

use rstest_bdd_macros::scenario;
use task_lifecycle_steps_defs::world::{LifecycleWorld, world};

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Start work on a ready task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn start_work_on_ready_task(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Reject a stale version"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_stale_version(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Block work while prerequisites are open"
)]
#[tokio::test(flavor = "multi_thread")]
async fn block_work_on_open_prerequisites(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Reject writers while a record is locked"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_writers_while_locked(world: LifecycleWorld) {
    let _ = world;
}
