//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Logger;
use crate::tasks::{self, Context};

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if the bundle cannot be resolved or a pipeline step
/// fails.
pub fn run(global: &GlobalOpts, opts: &UninstallOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::setup(global, log)?;
    uninstall(&ctx, opts, log)
}

/// Run the uninstall pipeline against an already-built context.
///
/// # Errors
///
/// Returns the first failing step's error.
pub fn uninstall(ctx: &Context, opts: &UninstallOpts, log: &Logger) -> Result<()> {
    let tasks = tasks::uninstall_tasks(!opts.no_reload);
    super::run_pipeline(tasks.iter().map(Box::as_ref), ctx, log)
}
