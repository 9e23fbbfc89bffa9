//! Artifact manifest: what to install, where, and with which mode.
//!
//! The built-in manifest describes the dontstarve bundle.  A bundle may ship
//! an `install.toml` at its root to replace it.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::error::InstallError;

/// Manifest file name looked up at the bundle root.
pub const MANIFEST_FILE: &str = "install.toml";

/// Mode applied to installed executables.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Line registering `~/.local/bin` in fish's command search path.
pub const FISH_PATH_LINE: &str = "fish_add_path -g $HOME/.local/bin";

/// One file to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the bundle root.
    pub source: PathBuf,
    /// Destination directory relative to the home directory.
    pub destination: PathBuf,
    /// Mode to apply after copying; `None` keeps the copied mode.
    pub mode: Option<u32>,
    /// Left in place by `uninstall` (user-editable configuration).
    pub preserve: bool,
}

impl Artifact {
    fn new(source: &str, destination: &str, mode: Option<u32>) -> Self {
        Self {
            source: PathBuf::from(source),
            destination: PathBuf::from(destination),
            mode,
            preserve: false,
        }
    }

    const fn preserved(mut self) -> Self {
        self.preserve = true;
        self
    }

    /// Base name of the source, which the installed file keeps.
    #[must_use]
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.source.file_name()
    }
}

/// The shell startup line to register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathRegistration {
    /// Shell startup file relative to the home directory.
    pub shell_config: PathBuf,
    /// Exact line to ensure is present.
    pub line: String,
}

/// Ordered set of artifacts plus the PATH registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Artifacts in pipeline order.
    pub artifacts: Vec<Artifact>,
    /// PATH registration for the user's shell.
    pub path: PathRegistration,
}

impl Default for Manifest {
    fn default() -> Self {
        let exe = Some(EXECUTABLE_MODE);
        Self {
            artifacts: vec![
                Artifact::new(
                    "config/systemd/user/dontstarve.target",
                    ".config/systemd/user",
                    None,
                ),
                Artifact::new(
                    "config/systemd/user/dontstarve@.service",
                    ".config/systemd/user",
                    None,
                ),
                Artifact::new("config/dontstarve/config", ".config/dontstarve", None).preserved(),
                Artifact::new("config/dontstarve/shards.conf", ".config/dontstarve", None)
                    .preserved(),
                Artifact::new("local/bin/dst-server", ".local/bin", exe),
                Artifact::new("local/bin/dst-tui", ".local/bin", exe),
                Artifact::new("local/bin/dst-updater", ".local/bin", exe),
            ],
            path: PathRegistration {
                shell_config: PathBuf::from(".config/fish/config.fish"),
                line: FISH_PATH_LINE.to_string(),
            },
        }
    }
}

impl Manifest {
    /// Destination directories in first-appearance order, without duplicates.
    #[must_use]
    pub fn directories(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = Vec::new();
        for artifact in &self.artifacts {
            if !dirs.contains(&artifact.destination.as_path()) {
                dirs.push(&artifact.destination);
            }
        }
        dirs
    }

    /// Load `install.toml` from `bundle_root`, or the built-in manifest when
    /// the file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Manifest`] if the file cannot be read, does not
    /// parse, or declares an invalid mode or path.
    pub fn load(bundle_root: &Path) -> Result<Self> {
        let path = bundle_root.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| InstallError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&content).map_err(|message| InstallError::Manifest { path, message })?)
    }

    /// Parse manifest TOML.  Errors are returned as plain messages so the
    /// caller can attach the file path.
    fn parse(content: &str) -> std::result::Result<Self, String> {
        let raw: RawManifest = toml::from_str(content).map_err(|e| e.to_string())?;
        if raw.artifacts.is_empty() {
            return Err("no [[artifacts]] declared".to_string());
        }

        let mut artifacts = Vec::with_capacity(raw.artifacts.len());
        for entry in raw.artifacts {
            check_relative(&entry.source)?;
            check_relative(&entry.destination)?;
            if entry.source.file_name().is_none() {
                return Err(format!("source has no file name: {}", entry.source.display()));
            }
            let mode = entry.mode.as_deref().map(parse_mode).transpose()?;
            artifacts.push(Artifact {
                source: entry.source,
                destination: entry.destination,
                mode,
                preserve: entry.preserve,
            });
        }

        let path = raw.path.unwrap_or_else(|| Self::default().path);
        check_relative(&path.shell_config)?;
        if path.line.trim().is_empty() || path.line.contains('\n') {
            return Err("path.line must be a single non-empty line".to_string());
        }

        Ok(Self { artifacts, path })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    artifacts: Vec<RawArtifact>,
    path: Option<PathRegistration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArtifact {
    source: PathBuf,
    destination: PathBuf,
    mode: Option<String>,
    #[serde(default)]
    preserve: bool,
}

/// Parse an octal permission string such as `"755"`.
fn parse_mode(mode: &str) -> std::result::Result<u32, String> {
    u32::from_str_radix(mode, 8)
        .ok()
        .filter(|m| *m <= 0o7777)
        .ok_or_else(|| format!("invalid octal mode: {mode}"))
}

/// Reject absolute paths and `..` so every path stays under its base.
fn check_relative(path: &Path) -> std::result::Result<(), String> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.as_os_str().is_empty() || escapes {
        return Err(format!("path must be relative and stay inside its base: {}", path.display()));
    }
    Ok(())
}
