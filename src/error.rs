//! Domain-specific error types for the installer.
//!
//! Resources and tasks return [`anyhow::Result`] and attach context as they
//! go.  Where a failure belongs to one of the installer's error kinds it is
//! raised as an [`InstallError`] inside the `anyhow::Error`, so the command
//! boundary can recover it with [`InstallError::find`] to pick the exit code
//! and severity.
//!
//! # Error hierarchy
//!
//! ```text
//! InstallError
//! ├── Resolution    : bundle root cannot be located (before any side effect)
//! ├── Manifest      : install.toml is unreadable or invalid
//! ├── MissingSource : a declared artifact is absent from the bundle
//! ├── Filesystem    : directory creation, copy or chmod denied/obstructed
//! └── Reload        : service-manager command absent or failed (warning level)
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the installation pipeline.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The artifact bundle's root directory could not be determined.
    #[error("cannot locate the artifact bundle: {hint}")]
    Resolution {
        /// What was tried and how to fix it.
        hint: String,
    },

    /// The bundle's `install.toml` could not be read or is invalid.
    #[error("invalid manifest {}: {message}", path.display())]
    Manifest {
        /// Path of the manifest file.
        path: PathBuf,
        /// Human-readable reason.
        message: String,
    },

    /// A declared source artifact does not exist in the bundle.
    #[error("missing source artifact: {}", path.display())]
    MissingSource {
        /// Absolute path of the missing artifact.
        path: PathBuf,
    },

    /// A filesystem operation was denied or obstructed.
    #[error("failed to {action} {}", path.display())]
    Filesystem {
        /// Path the operation targeted.
        path: PathBuf,
        /// Short verb phrase, e.g. `"create directory"`.
        action: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The service-manager command is unavailable or exited non-zero.
    #[error("service manager command '{command}' failed: {reason}")]
    Reload {
        /// The command line that was attempted.
        command: String,
        /// Exit status and stderr, or why it could not be started.
        reason: String,
    },
}

/// How a failure should be reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Installation is broken or incomplete.
    Fatal,
    /// Files are installed correctly; only service-manager reconciliation failed.
    Warning,
}

impl InstallError {
    /// Build a [`InstallError::Filesystem`] from an I/O error.
    #[must_use]
    pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            action,
            source,
        }
    }

    /// Severity of this error kind.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Reload { .. } => Severity::Warning,
            _ => Severity::Fatal,
        }
    }

    /// Short stable name of the variant, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "resolution",
            Self::Manifest { .. } => "manifest",
            Self::MissingSource { .. } => "missing-source",
            Self::Filesystem { .. } => "filesystem",
            Self::Reload { .. } => "reload",
        }
    }

    /// Find the first `InstallError` in an `anyhow` error chain.
    #[must_use]
    pub fn find(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|e| e.downcast_ref::<Self>())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::io;

    #[test]
    fn resolution_display() {
        let e = InstallError::Resolution {
            hint: "use --root".to_string(),
        };
        assert_eq!(e.to_string(), "cannot locate the artifact bundle: use --root");
    }

    #[test]
    fn missing_source_display_names_path() {
        let e = InstallError::MissingSource {
            path: PathBuf::from("/bundle/local/bin/dst-tui"),
        };
        assert_eq!(
            e.to_string(),
            "missing source artifact: /bundle/local/bin/dst-tui"
        );
    }

    #[test]
    fn filesystem_display_names_action_and_path() {
        let e = InstallError::filesystem(
            "create directory",
            "/home/u/.local/bin",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(
            e.to_string(),
            "failed to create directory /home/u/.local/bin"
        );
    }

    #[test]
    fn filesystem_cause_appears_once_in_alternate_chain() {
        let err: anyhow::Error = InstallError::filesystem(
            "read",
            "/home/u/.config/fish/config.fish",
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        )
        .into();
        let rendered = format!("{err:#}");
        assert_eq!(
            rendered,
            "failed to read /home/u/.config/fish/config.fish: stream did not contain valid UTF-8"
        );
        assert_eq!(rendered.matches("valid UTF-8").count(), 1);
    }

    #[test]
    fn filesystem_has_source() {
        use std::error::Error as StdError;
        let e = InstallError::filesystem(
            "copy",
            "/x",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(e.source().is_some());
    }

    #[test]
    fn reload_display() {
        let e = InstallError::Reload {
            command: "systemctl --user daemon-reload".to_string(),
            reason: "exit 1: Failed to connect to bus".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "service manager command 'systemctl --user daemon-reload' failed: exit 1: Failed to connect to bus"
        );
    }

    #[test]
    fn only_reload_is_warning_level() {
        let reload = InstallError::Reload {
            command: "systemctl".to_string(),
            reason: "not found".to_string(),
        };
        let missing = InstallError::MissingSource {
            path: PathBuf::from("/x"),
        };
        let resolution = InstallError::Resolution {
            hint: String::new(),
        };
        assert_eq!(reload.severity(), Severity::Warning);
        assert_eq!(missing.severity(), Severity::Fatal);
        assert_eq!(resolution.severity(), Severity::Fatal);
        assert_eq!(reload.kind(), "reload");
        assert_eq!(missing.kind(), "missing-source");
    }

    #[test]
    fn find_recovers_error_through_context() {
        let err: anyhow::Error = Err::<(), _>(InstallError::MissingSource {
            path: PathBuf::from("/bundle/a"),
        })
        .context("install files")
        .unwrap_err();
        let found = InstallError::find(&err).expect("should find InstallError");
        assert!(matches!(found, InstallError::MissingSource { .. }));
    }

    #[test]
    fn find_returns_none_for_foreign_errors() {
        let err = anyhow::anyhow!("something else");
        assert!(InstallError::find(&err).is_none());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn install_error_is_send_sync() {
        assert_send_sync::<InstallError>();
    }
}
