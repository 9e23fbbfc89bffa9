//! Service-manager steps: reload, then optionally enable the target.
use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Unit grouping every server shard.
pub const TARGET_UNIT: &str = "dontstarve.target";

/// Make the service manager pick up the unit files written earlier.
///
/// Always the last file-affecting step: a failure here does not roll back
/// anything already installed.
#[derive(Debug)]
pub struct ReloadServiceManager {
    enabled: bool,
}

impl ReloadServiceManager {
    /// Create the reload step; `enabled = false` records it as not applicable.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Task for ReloadServiceManager {
    fn name(&self) -> &'static str {
        "Reload service manager"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        self.enabled
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.dry_run {
            ctx.log.dry_run("would run: systemctl --user daemon-reload");
            return Ok(TaskResult::DryRun);
        }
        ctx.service_manager.reload()?;
        ctx.log.info("unit definitions reloaded");
        Ok(TaskResult::Ok)
    }
}

/// Enable and start `dontstarve.target` after the reload.
#[derive(Debug)]
pub struct EnableTarget {
    enabled: bool,
}

impl EnableTarget {
    /// Create the enable step; it only runs when `enabled` is set.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Task for EnableTarget {
    fn name(&self) -> &'static str {
        "Enable dontstarve.target"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        self.enabled
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would run: systemctl --user enable --now {TARGET_UNIT}"));
            return Ok(TaskResult::DryRun);
        }
        ctx.service_manager.enable_now(TARGET_UNIT)?;
        ctx.log.info(&format!("{TARGET_UNIT} enabled"));
        Ok(TaskResult::Ok)
    }
}
