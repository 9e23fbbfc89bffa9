//! Artifact copy and removal steps.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, apply_resource, remove_resources};
use crate::resources::chmod::ModeResource;
use crate::resources::file::InstalledFileResource;

/// Copy every artifact into place, setting its mode right after the copy.
///
/// Copies are unconditional.  The first missing source aborts the task,
/// leaving earlier artifacts installed and later ones untouched.
#[derive(Debug)]
pub struct InstallFiles;

impl Task for InstallFiles {
    fn name(&self) -> &'static str {
        "Install files"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = &ctx.layout;
        let mut stats = TaskStats::new();
        for artifact in &layout.manifest.artifacts {
            let target = layout.installed_path(artifact);
            let file = InstalledFileResource::new(layout.source_path(artifact), target.clone());
            stats += apply_resource(ctx, &file, "copy")?;
            if let Some(mode) = artifact.mode {
                stats += apply_resource(ctx, &ModeResource::new(target, mode), "chmod")?;
            }
        }
        Ok(stats.finish(ctx))
    }
}

/// Remove installed artifacts that are not marked `preserve`.
#[derive(Debug)]
pub struct RemoveInstalledFiles;

impl Task for RemoveInstalledFiles {
    fn name(&self) -> &'static str {
        "Remove installed files"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = &ctx.layout;
        for artifact in layout.manifest.artifacts.iter().filter(|a| a.preserve) {
            ctx.log.debug(&format!(
                "keeping {}",
                layout.installed_path(artifact).display()
            ));
        }
        let resources = layout
            .manifest
            .artifacts
            .iter()
            .filter(|a| !a.preserve)
            .map(|a| InstalledFileResource::new(layout.source_path(a), layout.installed_path(a)));
        remove_resources(ctx, resources, "remove")
    }
}
