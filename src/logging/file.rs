//! The per-command log file, opened only once a run is known to proceed.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::utils::format_utc_datetime;

/// Where lines go before, during and after [`LogFile::open`].
#[derive(Debug)]
enum Sink {
    /// Not opened yet; lines are held until the file is created.
    Pending(Vec<String>),
    Open(fs::File),
    /// Opening failed; lines are dropped and the console is the only output.
    Closed,
}

/// Shared handle to `$XDG_CACHE_HOME/dst-install/<command>.log`.
///
/// Nothing touches the filesystem until [`open`](Self::open) is called, so
/// a run that fails to resolve its bundle leaves no cache directory behind.
/// Lines written earlier are buffered and flushed when the file opens.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    sink: Arc<Mutex<Sink>>,
}

impl LogFile {
    /// A log file at `path` that has not been created yet.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            sink: Arc::new(Mutex::new(Sink::Pending(Vec::new()))),
        }
    }

    /// Path the file is (or will be) written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory, truncate the file, write the run header
    /// and any buffered lines.
    ///
    /// Returns whether the file is open. A failure closes the sink for the
    /// rest of the run; calling this again after success is a no-op.
    pub fn open(&self) -> bool {
        let Ok(mut sink) = self.sink.lock() else {
            return false;
        };
        match &*sink {
            Sink::Open(_) => return true,
            Sink::Closed => return false,
            Sink::Pending(_) => {}
        }
        let pending = match std::mem::replace(&mut *sink, Sink::Closed) {
            Sink::Pending(lines) => lines,
            Sink::Open(_) | Sink::Closed => Vec::new(),
        };
        if let Ok(file) = self.create(&pending) {
            *sink = Sink::Open(file);
            true
        } else {
            false
        }
    }

    fn create(&self, pending: &[String]) -> std::io::Result<fs::File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&self.path)?;
        let version = option_env!("DST_INSTALL_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        write!(
            file,
            "==========================================\n\
             dst-install {version} {}\n\
             ==========================================\n",
            format_utc_datetime(),
        )?;
        for line in pending {
            writeln!(file, "{line}")?;
        }
        Ok(file)
    }

    /// Whether [`open`](Self::open) succeeded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.sink
            .lock()
            .is_ok_and(|sink| matches!(*sink, Sink::Open(_)))
    }

    /// Append one line, or hold it until the file opens.
    pub(super) fn write_line(&self, line: String) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        match &mut *sink {
            Sink::Pending(lines) => lines.push(line),
            Sink::Open(file) => {
                writeln!(file, "{line}").ok();
            }
            Sink::Closed => {}
        }
    }
}
