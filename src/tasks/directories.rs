//! Destination directory step.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources};
use crate::resources::directory::DirectoryResource;

/// Create every destination directory before anything is copied into it.
#[derive(Debug)]
pub struct EnsureDirectories;

impl Task for EnsureDirectories {
    fn name(&self) -> &'static str {
        "Ensure directories"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resources = ctx
            .layout
            .directories()
            .into_iter()
            .map(DirectoryResource::new);
        process_resources(ctx, resources, "create")
    }
}
