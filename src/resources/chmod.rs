//! Permission bits on installed files.
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::InstallError;

/// Permission bits on an installed file (Unix only).
#[derive(Debug, Clone)]
pub struct ModeResource {
    /// Installed file (absolute).
    pub target: PathBuf,
    /// Desired permission bits, e.g. `0o755`.
    pub mode: u32,
}

impl ModeResource {
    /// Create a new mode resource.
    #[must_use]
    pub const fn new(target: PathBuf, mode: u32) -> Self {
        Self { target, mode }
    }
}

impl Applicable for ModeResource {
    fn description(&self) -> String {
        format!("{:o} {}", self.mode, self.target.display())
    }

    /// Set the mode unconditionally; re-applying the same bits is harmless.
    fn apply(&self) -> Result<ResourceChange> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            std::fs::set_permissions(&self.target, std::fs::Permissions::from_mode(self.mode))
                .map_err(|e| InstallError::filesystem("set permissions on", &self.target, e))?;
            Ok(ResourceChange::Applied)
        }

        #[cfg(not(unix))]
        {
            if !self.target.exists() {
                return Err(InstallError::filesystem(
                    "set permissions on",
                    &self.target,
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                )
                .into());
            }
            Ok(ResourceChange::Skipped {
                reason: "file modes are not supported on this platform".to_string(),
            })
        }
    }
}

impl Resource for ModeResource {
    fn current_state(&self) -> Result<ResourceState> {
        let meta = match std::fs::metadata(&self.target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResourceState::Missing);
            }
            Err(e) => return Err(InstallError::filesystem("inspect", &self.target, e).into()),
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let current = meta.permissions().mode() & 0o7777;
            if current == self.mode {
                Ok(ResourceState::Correct)
            } else {
                Ok(ResourceState::Incorrect {
                    current: format!("{current:o}"),
                })
            }
        }

        #[cfg(not(unix))]
        {
            let _ = meta;
            Ok(ResourceState::Correct)
        }
    }
}
