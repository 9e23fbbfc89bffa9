//! PATH registration step.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources};
use crate::resources::path_entry::PathRegistrationResource;

/// Make `~/.local/bin` reachable from the user's shell.
#[derive(Debug)]
pub struct RegisterPath;

impl Task for RegisterPath {
    fn name(&self) -> &'static str {
        "Register PATH"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = PathRegistrationResource::new(
            ctx.layout.shell_config(),
            ctx.layout.manifest.path.line.clone(),
        );
        process_resources(ctx, [resource], "append")
    }
}
