//! Verify command: read-only drift checks.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::resources::chmod::ModeResource;
use crate::resources::directory::DirectoryResource;
use crate::resources::file::InstalledFileResource;
use crate::resources::path_entry::PathRegistrationResource;
use crate::tasks::{Context, Task, TaskResult, check_resources};

/// Run the verify command.
///
/// Changes nothing, even without `--dry-run`.
///
/// # Errors
///
/// Returns an error if the bundle cannot be resolved or anything is missing
/// or out of date.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::setup(global, log)?;
    verify(&ctx, log)
}

/// Check every installed resource against the bundle.
///
/// # Errors
///
/// Returns an error if one or more checks found drift.
pub fn verify(ctx: &Context, log: &Logger) -> Result<()> {
    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(VerifyDirectories),
        Box::new(VerifyFiles),
        Box::new(VerifyPermissions),
        Box::new(VerifyPathRegistration),
    ];
    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), ctx, log)
}

// ---------------------------------------------------------------------------
// Verification tasks
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct VerifyDirectories;

impl Task for VerifyDirectories {
    fn name(&self) -> &'static str {
        "Verify directories"
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
        check_resources(ctx, resources)
    }
}

/// Installed files must be byte-identical to the bundle.
#[derive(Debug)]
struct VerifyFiles;

impl Task for VerifyFiles {
    fn name(&self) -> &'static str {
        "Verify files"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = &ctx.layout;
        let resources = layout
            .manifest
            .artifacts
            .iter()
            .map(|a| InstalledFileResource::new(layout.source_path(a), layout.installed_path(a)));
        check_resources(ctx, resources)
    }
}

#[derive(Debug)]
struct VerifyPermissions;

impl Task for VerifyPermissions {
    fn name(&self) -> &'static str {
        "Verify permissions"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        cfg!(unix) && ctx.layout.manifest.artifacts.iter().any(|a| a.mode.is_some())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = &ctx.layout;
        let resources = layout
            .manifest
            .artifacts
            .iter()
            .filter_map(|a| a.mode.map(|mode| ModeResource::new(layout.installed_path(a), mode)));
        check_resources(ctx, resources)
    }
}

#[derive(Debug)]
struct VerifyPathRegistration;

impl Task for VerifyPathRegistration {
    fn name(&self) -> &'static str {
        "Verify PATH registration"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = PathRegistrationResource::new(
            ctx.layout.shell_config(),
            ctx.layout.manifest.path.line.clone(),
        );
        check_resources(ctx, [resource])
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::TaskStatus;
    use crate::tasks::test_helpers::{context_in, scratch_layout};
    use crate::tasks::{self, execute};

    #[test]
    fn fresh_home_fails_every_check() {
        let (_tmp, layout) = scratch_layout();
        let (ctx, log) = context_in(layout, false);

        assert!(verify(&ctx, &log).is_err());
        assert!(
            log.task_entries()
                .iter()
                .all(|t| t.status != TaskStatus::Ok),
            "{:?}",
            log.task_entries()
        );
    }

    #[test]
    fn passes_after_install() {
        let (_tmp, layout) = scratch_layout();
        let (ctx, log) = context_in(layout, false);
        for task in tasks::install_tasks(false, false) {
            execute(task.as_ref(), &ctx).unwrap();
        }

        verify(&ctx, &log).unwrap();
    }

    #[test]
    fn detects_edited_file() {
        let (_tmp, layout) = scratch_layout();
        let edited = layout.home.join(".config/dontstarve/shards.conf");
        let (ctx, log) = context_in(layout, false);
        for task in tasks::install_tasks(false, false) {
            execute(task.as_ref(), &ctx).unwrap();
        }
        std::fs::write(&edited, "Master only\n").unwrap();

        assert!(verify(&ctx, &log).is_err());
        let failed: Vec<_> = log
            .task_entries()
            .into_iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .map(|t| t.name)
            .collect();
        assert_eq!(failed, ["Verify files"]);
    }
}
