//! Service-manager capability: reload unit definitions and enable units.
use anyhow::Result;
use std::sync::Arc;

use crate::error::InstallError;
use crate::exec::{self, Executor};

/// Program used to talk to the user's service manager.
const SYSTEMCTL: &str = "systemctl";

/// Reconciles the user service manager with the unit files on disk.
///
/// Injected into the task context so tests never touch a real service
/// manager.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceManager: Send + Sync {
    /// Re-read all unit definitions (`systemctl --user daemon-reload`).
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Reload`] if the command is unavailable or
    /// exits non-zero.
    fn reload(&self) -> Result<()>;

    /// Enable and start a unit (`systemctl --user enable --now <unit>`).
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Reload`] if the command is unavailable or
    /// exits non-zero.
    fn enable_now(&self, unit: &str) -> Result<()>;
}

/// The per-user systemd instance, driven through `systemctl --user`.
#[derive(Debug, Clone)]
pub struct SystemdUser {
    executor: Arc<dyn Executor>,
}

impl SystemdUser {
    /// Create a service manager that runs commands through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        let command = exec::command_line(SYSTEMCTL, args);
        if !self.executor.which(SYSTEMCTL) {
            return Err(InstallError::Reload {
                command,
                reason: format!("{SYSTEMCTL} not found on PATH"),
            }
            .into());
        }

        let result = match self.executor.run_unchecked(SYSTEMCTL, args) {
            Ok(result) => result,
            Err(e) => {
                return Err(InstallError::Reload {
                    command,
                    reason: format!("{e:#}"),
                }
                .into());
            }
        };
        if result.success {
            return Ok(());
        }

        let code = result
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let stderr = result.stderr.trim();
        let reason = if stderr.is_empty() {
            format!("exit {code}")
        } else {
            format!("exit {code}: {stderr}")
        };
        Err(InstallError::Reload { command, reason }.into())
    }
}

impl ServiceManager for SystemdUser {
    fn reload(&self) -> Result<()> {
        self.systemctl(&["--user", "daemon-reload"])
    }

    fn enable_now(&self, unit: &str) -> Result<()> {
        self.systemctl(&["--user", "enable", "--now", unit])
    }
}
