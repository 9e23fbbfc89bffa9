//! Locating the artifact bundle shipped alongside the installer.
use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::error::InstallError;

/// Environment variable that points at the bundle root.
pub const BUNDLE_ROOT_ENV: &str = "DST_BUNDLE_ROOT";

/// Whether `dir` looks like an artifact bundle (has `config/` and `local/`).
#[must_use]
pub fn is_bundle_root(dir: &Path) -> bool {
    dir.join("config").is_dir() && dir.join("local").is_dir()
}

/// Determine the bundle root from the invocation context.
///
/// Tried in order: the explicit `--root` value, `$DST_BUNDLE_ROOT`, the
/// directory of the running executable and its ancestors (covers both a
/// binary shipped at the bundle root and one under `target/<profile>/`),
/// then the current directory.  No path is hardcoded, so the bundle works
/// wherever it was cloned or extracted.
///
/// # Errors
///
/// Returns [`InstallError::Resolution`] if an explicit root is not a bundle,
/// or if no candidate is.
pub fn resolve_source_root(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_from(
        explicit,
        std::env::var_os(BUNDLE_ROOT_ENV).map(PathBuf::from),
        std::env::current_exe().ok(),
        std::env::current_dir().ok(),
    )
}

/// [`resolve_source_root`] with the invocation context passed in.
pub(crate) fn resolve_from(
    explicit: Option<&Path>,
    env_root: Option<PathBuf>,
    exe: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return accept(root).ok_or_else(|| {
            InstallError::Resolution {
                hint: format!(
                    "{} has no config/ and local/ directories",
                    root.display()
                ),
            }
            .into()
        });
    }

    if let Some(root) = env_root.as_deref().and_then(accept) {
        return Ok(root);
    }

    if let Some(exe) = exe
        && let Some(found) = exe.ancestors().skip(1).take(4).find_map(accept)
    {
        return Ok(found);
    }

    if let Some(root) = cwd.as_deref().and_then(accept) {
        return Ok(root);
    }

    Err(InstallError::Resolution {
        hint: format!("pass --root or set {BUNDLE_ROOT_ENV}"),
    }
    .into())
}

fn accept(dir: &Path) -> Option<PathBuf> {
    if !is_bundle_root(dir) {
        return None;
    }
    Some(std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()))
}
