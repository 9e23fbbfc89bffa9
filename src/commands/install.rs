//! Install command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Logger;
use crate::tasks::{self, Context};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the bundle cannot be resolved or a pipeline step
/// fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("dst-install {}", super::version::version()));

    let ctx = super::setup(global, log)?;
    install(&ctx, opts, log)
}

/// Run the install pipeline against an already-built context.
///
/// # Errors
///
/// Returns the first failing step's error.
pub fn install(ctx: &Context, opts: &InstallOpts, log: &Logger) -> Result<()> {
    let tasks = tasks::install_tasks(!opts.no_reload, opts.enable_target);
    super::run_pipeline(tasks.iter().map(Box::as_ref), ctx, log)
}
