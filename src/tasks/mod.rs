//! Named pipeline steps that orchestrate resource changes.
pub mod context;
pub mod directories;
pub mod files;
pub mod path;
mod processing;
pub mod systemd;

pub use context::Context;
pub use processing::{
    TaskResult, TaskStats, apply_resource, check_resources, process_resources, remove_resources,
};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable pipeline step.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current run.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be brought to its desired state
    /// or the service manager rejects a command.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The install pipeline, in execution order.
///
/// Directories come before the copies into them, files before the PATH
/// line, and the service-manager reload is always last among the steps that
/// touch installed state.
#[must_use]
pub fn install_tasks(reload: bool, enable_target: bool) -> Vec<Box<dyn Task>> {
    vec![
        Box::new(directories::EnsureDirectories),
        Box::new(files::InstallFiles),
        Box::new(path::RegisterPath),
        Box::new(systemd::ReloadServiceManager::new(reload)),
        Box::new(systemd::EnableTarget::new(reload && enable_target)),
    ]
}

/// The uninstall pipeline, in execution order.
#[must_use]
pub fn uninstall_tasks(reload: bool) -> Vec<Box<dyn Task>> {
    vec![
        Box::new(files::RemoveInstalledFiles),
        Box::new(systemd::ReloadServiceManager::new(reload)),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Returns the task's error after recording it as failed; reporting it is
/// left to the caller.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    let _span = tracing::info_span!("task", task = task.name()).entered();
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            Ok(())
        }
        Err(e) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}
