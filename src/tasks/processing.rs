//! Apply, preview, remove and check loops shared by tasks.
use anyhow::{Context as _, Result};

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use dst_install::tasks::TaskResult;
///
/// assert!(matches!(TaskResult::Ok, TaskResult::Ok));
/// assert!(matches!(TaskResult::DryRun, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for tasks that process many resources.
///
/// # Examples
///
/// ```
/// use dst_install::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 7, already_ok: 0, blocked: 0 };
/// assert_eq!(stats.summary(false), "7 changed, 0 already ok");
/// assert_eq!(stats.summary(true), "7 would change, 0 already ok");
///
/// let stats = TaskStats { changed: 1, already_ok: 2, blocked: 1 };
/// assert_eq!(stats.summary(true), "1 would change, 2 already ok, 1 blocked");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Resources written (or that would be written in a dry run).
    pub changed: u32,
    /// Resources already in the desired state.
    pub already_ok: u32,
    /// Resources that cannot be applied as things stand (dry run only).
    pub blocked: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.blocked > 0 {
            format!(
                "{} {verb}, {} already ok, {} blocked",
                self.changed, self.already_ok, self.blocked
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.blocked += other.blocked;
    }
}

/// Apply one resource, or describe what would happen in a dry run.
///
/// Outside a dry run the resource is applied without consulting its current
/// state; the first error is returned with the resource named in context.
/// A dry run returns the same error when the resource's preflight shows the
/// apply would fail.
///
/// # Errors
///
/// Returns the resource's apply error, or its preflight or state-check
/// error in dry runs.
pub fn apply_resource<R: Resource>(ctx: &Context, resource: &R, verb: &str) -> Result<TaskStats> {
    let desc = resource.description();
    let _span = tracing::debug_span!("resource", resource = %desc).entered();
    if ctx.dry_run {
        return preview(ctx, resource, verb);
    }

    let mut delta = TaskStats::new();
    match resource
        .apply()
        .with_context(|| format!("failed to {verb} {desc}"))?
    {
        ResourceChange::Applied => {
            ctx.log.debug(&format!("{verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceChange::Skipped { reason } => {
            ctx.log.warn(&format!("skipped {verb} {desc}: {reason}"));
            delta.already_ok += 1;
        }
    }
    Ok(delta)
}

/// Apply every resource in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first resource error.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        stats += apply_resource(ctx, &resource, verb)?;
    }
    Ok(stats.finish(ctx))
}

/// Remove every resource that is present, stopping at the first failure.
///
/// # Errors
///
/// Returns the first state-check or removal error.
pub fn remove_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let desc = resource.description();
        if matches!(resource.current_state()?, ResourceState::Missing) {
            stats.already_ok += 1;
            continue;
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would {verb}: {desc}"));
            stats.changed += 1;
            continue;
        }
        if resource
            .remove()
            .with_context(|| format!("failed to {verb} {desc}"))?
            == ResourceChange::Applied
        {
            ctx.log.debug(&format!("{verb}: {desc}"));
            stats.changed += 1;
        } else {
            stats.already_ok += 1;
        }
    }
    Ok(stats.finish(ctx))
}

/// Check every resource and report drift without changing anything.
///
/// All resources are checked even after drift is found, so one run lists
/// everything that is out of date.
///
/// # Errors
///
/// Returns an error naming the number of resources that are missing, out of
/// date, or blocked, or the first state-check error.
pub fn check_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
) -> Result<TaskResult> {
    let mut ok = 0u32;
    let mut drift = 0u32;
    for resource in resources {
        let desc = resource.description();
        match resource.current_state()? {
            ResourceState::Correct => {
                ctx.log.debug(&format!("ok: {desc}"));
                ok += 1;
            }
            ResourceState::Missing => {
                ctx.log.error(&format!("missing: {desc}"));
                drift += 1;
            }
            ResourceState::Incorrect { current } => {
                ctx.log.error(&format!("out of date: {desc} ({current})"));
                drift += 1;
            }
            ResourceState::Invalid { reason } => {
                ctx.log.error(&format!("blocked: {desc} ({reason})"));
                drift += 1;
            }
        }
    }
    if drift > 0 {
        anyhow::bail!("{drift} resource(s) not in the installed state");
    }
    ctx.log.info(&format!("{ok} resource(s) up to date"));
    Ok(TaskResult::Ok)
}

fn preview<R: Resource>(ctx: &Context, resource: &R, verb: &str) -> Result<TaskStats> {
    let desc = resource.description();
    resource
        .preflight()
        .with_context(|| format!("failed to {verb} {desc}"))?;
    let mut delta = TaskStats::new();
    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Missing => {
            ctx.log.dry_run(&format!("would {verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceState::Incorrect { current } => {
            ctx.log
                .dry_run(&format!("would {verb} {desc} (currently {current})"));
            delta.changed += 1;
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("cannot {verb} {desc}: {reason}"));
            delta.blocked += 1;
        }
    }
    Ok(delta)
}
