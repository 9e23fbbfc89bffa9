//! The [`Logger`] facade over `tracing`, plus the per-run task summary.
use std::path::Path;
use std::sync::Mutex;

use super::file::LogFile;
use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, TaskEntry, TaskStatus};
use crate::error::{InstallError, Severity};

/// `Log` methods that just call the inherent method of the same name.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Console and file logger for one command run.
///
/// Messages go through [`tracing`]; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) also copies them
/// to `$XDG_CACHE_HOME/dst-install/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<LogFile>,
}

impl Logger {
    /// Create a logger that reports `log_file` in its summary once it is
    /// open. `None` keeps output on the console only.
    #[must_use]
    pub const fn new(log_file: Option<LogFile>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Create the log file and flush what was logged so far.
    ///
    /// Called once the bundle has resolved; a run that fails earlier leaves
    /// nothing in the cache directory.
    pub fn open_log_file(&self) {
        if let Some(file) = &self.log_file
            && !file.open()
        {
            self.debug(&format!(
                "log file unavailable: {}",
                file.path().display()
            ));
        }
    }

    /// Where this run's log file lives, if it was opened.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file
            .as_ref()
            .filter(|file| file.is_open())
            .map(LogFile::path)
    }

    /// Report the error that ends the run, with its kind and the exit status
    /// as structured fields.
    ///
    /// A warning-severity error (the service-manager reload) is logged as a
    /// warning, since every file change before it was kept.
    pub fn failure(&self, err: &anyhow::Error, exit_status: u8) {
        let found = InstallError::find(err);
        let kind = found.map_or("task", InstallError::kind);
        if found.map(InstallError::severity) == Some(Severity::Warning) {
            tracing::warn!(kind, exit_status, "file changes kept, but {err:#}");
        } else {
            tracing::error!(kind, exit_status, "{err:#}");
        }
    }

    /// Snapshot of the recorded tasks, in execution order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Error line (stderr).
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Warning line (stderr).
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// `==>` header, one per task.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Indented detail line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only with `-v`, always in the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// `[DRY RUN]` preview of a change that was not made.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Remember a task's outcome for [`print_summary`](Self::print_summary).
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Number of tasks recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(TaskStatus::Failed)
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.tasks
            .lock()
            .map_or(0, |entries| entries.iter().filter(|t| t.status == status).count())
    }

    /// Print one line per recorded task, then the totals and the log path.
    ///
    /// Does nothing when no task was recorded (e.g. resolution failed).
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let entries = self.task_entries();
        if entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for entry in &entries {
            let (icon, color) = entry.status.icon();
            let detail = entry
                .message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default();
            self.info(&format!("{color}{icon} {}{detail}\x1b[0m", entry.name));
        }

        println!();
        let totals: Vec<String> = TaskStatus::ALL
            .iter()
            .map(|&status| {
                let (_, color) = status.icon();
                format!("{color}{} {}\x1b[0m", self.count(status), status.label())
            })
            .collect();
        self.info(&format!("{} tasks: {}", entries.len(), totals.join(", ")));

        if let Some(path) = self.log_path() {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}
