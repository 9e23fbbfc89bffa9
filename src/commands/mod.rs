//! Top-level subcommand orchestration.
pub mod install;
pub mod uninstall;
pub mod verify;
pub mod version;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::Layout;
use crate::error::{InstallError, Severity};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::resources::service_manager::SystemdUser;
use crate::tasks::{self, Context, Task};

/// Process exit status for a fatal failure.
pub const EXIT_FATAL: u8 = 1;
/// Process exit status when files are installed but the reload failed.
pub const EXIT_RELOAD_FAILED: u8 = 2;

/// Resolve the layout and build the production task context.
///
/// Fails before any side effect if the bundle, home directory or manifest
/// cannot be resolved. The log file is only created once they have.
///
/// # Errors
///
/// Returns [`InstallError::Resolution`] or [`InstallError::Manifest`].
pub fn setup(global: &GlobalOpts, log: &Arc<Logger>) -> Result<Context> {
    log.stage("Resolving bundle");
    let layout = Layout::load(global.root.as_deref(), global.home.as_deref())?;
    log.open_log_file();
    log.info(&format!("bundle: {}", layout.bundle_root.display()));
    log.info(&format!("home: {}", layout.home.display()));
    log.debug(&format!(
        "{} artifacts into {} directories",
        layout.manifest.artifacts.len(),
        layout.directories().len()
    ));

    let service_manager = SystemdUser::new(Arc::new(SystemExecutor));
    Ok(Context::new(
        Arc::new(layout),
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        Arc::new(service_manager),
    ))
}

/// Execute tasks in order, stopping at the first failure.
///
/// Tasks after a failure are recorded as not run.  The summary is printed
/// either way.
///
/// # Errors
///
/// Returns the failing task's error unchanged, so its [`InstallError`] kind
/// survives for [`exit_status`].
pub fn run_pipeline<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let mut tasks = tasks.into_iter();
    let mut failure = None;
    for task in tasks.by_ref() {
        if let Err(e) = tasks::execute(task, ctx) {
            failure = Some(e);
            break;
        }
    }
    if failure.is_some() {
        for task in tasks {
            ctx.log.record_task(task.name(), TaskStatus::NotRun, None);
        }
    }

    log.print_summary();
    failure.map_or(Ok(()), Err)
}

/// Execute every task, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        // Failures are recorded in the log and counted below.
        let _ = tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}

/// Process exit status for a failed command.
///
/// A service-manager failure after every file step succeeded is reported
/// separately from everything else, which leaves the installation broken or
/// incomplete.
#[must_use]
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match InstallError::find(err).map(InstallError::severity) {
        Some(Severity::Warning) => EXIT_RELOAD_FAILED,
        _ => EXIT_FATAL,
    }
}
