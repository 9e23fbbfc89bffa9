//! Installation layout: where artifacts come from and where they go.
pub mod bundle;
pub mod manifest;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use manifest::{Artifact, Manifest};

/// Explicit source and destination conventions for one run.
///
/// Every path the pipeline touches is derived from these values, so tests
/// can point `home` at a temporary directory.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Root of the artifact bundle.
    pub bundle_root: PathBuf,
    /// Base directory for all destinations (normally `$HOME`).
    pub home: PathBuf,
    /// What to install.
    pub manifest: Manifest,
}

impl Layout {
    /// Create a layout from explicit values.
    #[must_use]
    pub const fn new(bundle_root: PathBuf, home: PathBuf, manifest: Manifest) -> Self {
        Self {
            bundle_root,
            home,
            manifest,
        }
    }

    /// Resolve the bundle root, home directory and manifest.
    ///
    /// `home` defaults to `$HOME`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Resolution`] if the bundle or home directory
    /// cannot be determined, or [`InstallError::Manifest`] if the bundle's
    /// `install.toml` is invalid.
    pub fn load(root: Option<&Path>, home: Option<&Path>) -> Result<Self> {
        let bundle_root = bundle::resolve_source_root(root)?;
        let home = match home {
            Some(home) => home.to_path_buf(),
            None => home_dir()?,
        };
        let manifest = Manifest::load(&bundle_root)?;
        Ok(Self::new(bundle_root, home, manifest))
    }

    /// Absolute path of an artifact inside the bundle.
    #[must_use]
    pub fn source_path(&self, artifact: &Artifact) -> PathBuf {
        self.bundle_root.join(&artifact.source)
    }

    /// Absolute destination directory of an artifact.
    #[must_use]
    pub fn destination_dir(&self, artifact: &Artifact) -> PathBuf {
        self.home.join(&artifact.destination)
    }

    /// Absolute path the artifact is installed to.
    #[must_use]
    pub fn installed_path(&self, artifact: &Artifact) -> PathBuf {
        let dir = self.destination_dir(artifact);
        match artifact.file_name() {
            Some(name) => dir.join(name),
            None => dir,
        }
    }

    /// Absolute destination directories, deduplicated in manifest order.
    #[must_use]
    pub fn directories(&self) -> Vec<PathBuf> {
        self.manifest
            .directories()
            .into_iter()
            .map(|d| self.home.join(d))
            .collect()
    }

    /// Absolute path of the shell startup file that receives the PATH line.
    #[must_use]
    pub fn shell_config(&self) -> PathBuf {
        self.home.join(&self.manifest.path.shell_config)
    }
}

fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            InstallError::Resolution {
                hint: "HOME is not set; pass --home".to_string(),
            }
            .into()
        })
}
