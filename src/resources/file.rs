//! Installed-file resource: a byte-identical copy of a bundle artifact.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::InstallError;

/// A file copied from the bundle into a destination directory.
///
/// `apply()` always overwrites; the state check is only used for reporting
/// (`verify`, dry runs) and never to skip a copy.
#[derive(Debug, Clone)]
pub struct InstalledFileResource {
    /// Artifact inside the bundle.
    pub source: PathBuf,
    /// Installed path (destination directory joined with the source's name).
    pub target: PathBuf,
}

impl InstalledFileResource {
    /// Create a new installed-file resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    fn ensure_source(&self) -> Result<()> {
        if self.source.is_file() {
            Ok(())
        } else {
            Err(InstallError::MissingSource {
                path: self.source.clone(),
            }
            .into())
        }
    }
}

impl Applicable for InstalledFileResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn preflight(&self) -> Result<()> {
        self.ensure_source()
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.ensure_source()?;
        copy_into_place(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        std::fs::remove_file(&self.target)
            .map_err(|e| InstallError::filesystem("remove", &self.target, e))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for InstalledFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if self.target.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.target.display()),
            });
        }

        let wanted = std::fs::read(&self.source)
            .map_err(|e| InstallError::filesystem("read", &self.source, e))?;
        let current = std::fs::read(&self.target)
            .map_err(|e| InstallError::filesystem("read", &self.target, e))?;
        if wanted == current {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs from bundle".to_string(),
            })
        }
    }
}

/// Copy `source` to a sibling temp file, then rename it over `target`.
///
/// The rename replaces the directory entry, so an executable that is
/// currently running is swapped out instead of failing with `ETXTBSY`.
fn copy_into_place(source: &Path, target: &Path) -> Result<()> {
    let tmp = staging_path(target);
    std::fs::copy(source, &tmp).map_err(|e| InstallError::filesystem("copy", target, e))?;
    if let Err(e) = std::fs::rename(&tmp, target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(InstallError::filesystem("replace", target, e).into());
    }
    Ok(())
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".dst-install.tmp");
    target.with_file_name(name)
}
