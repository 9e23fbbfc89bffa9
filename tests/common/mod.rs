// Shared helpers for integration tests.
//
// Provides a temporary bundle and home directory plus a recording service
// manager, so each integration test runs the real pipelines against an
// isolated filesystem without touching systemd.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dst_install::config::Layout;
use dst_install::config::manifest::Manifest;
use dst_install::error::InstallError;
use dst_install::logging::{Log, Logger};
use dst_install::resources::service_manager::ServiceManager;
use dst_install::tasks::Context;

/// Content written for a bundle artifact: distinct per file so byte
/// comparisons catch a file copied to the wrong place.
pub fn artifact_content(source: &Path) -> String {
    format!("# {}\nversion=1\n", source.display())
}

/// Service manager stub that counts calls and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingServiceManager {
    pub reloads: AtomicU32,
    pub enabled: std::sync::Mutex<Vec<String>>,
    pub fail_reload: bool,
}

impl RecordingServiceManager {
    pub fn failing() -> Self {
        Self {
            fail_reload: true,
            ..Self::default()
        }
    }

    pub fn reload_count(&self) -> u32 {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl ServiceManager for RecordingServiceManager {
    fn reload(&self) -> anyhow::Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reload {
            return Err(InstallError::Reload {
                command: "systemctl --user daemon-reload".to_string(),
                reason: "Failed to connect to bus: No medium found".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn enable_now(&self, unit: &str) -> anyhow::Result<()> {
        self.enabled
            .lock()
            .expect("enabled lock")
            .push(unit.to_string());
        Ok(())
    }
}

/// An artifact bundle and an empty home directory, backed by a
/// [`tempfile::TempDir`] that is deleted on drop.
pub struct Fixture {
    pub tmp: tempfile::TempDir,
    pub bundle: PathBuf,
    pub home: PathBuf,
    pub service_manager: Arc<RecordingServiceManager>,
}

impl Fixture {
    /// A complete bundle for the built-in manifest.
    pub fn new() -> Self {
        Self::with_service_manager(RecordingServiceManager::default())
    }

    pub fn with_service_manager(service_manager: RecordingServiceManager) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let bundle = tmp.path().join("bundle");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).expect("create home");

        for artifact in &Manifest::default().artifacts {
            let source = bundle.join(&artifact.source);
            std::fs::create_dir_all(source.parent().expect("source parent"))
                .expect("create bundle dir");
            std::fs::write(&source, artifact_content(&artifact.source)).expect("write artifact");
        }

        Self {
            tmp,
            bundle,
            home,
            service_manager: Arc::new(service_manager),
        }
    }

    /// Remove one file from the bundle.
    pub fn without_source(self, source: &str) -> Self {
        std::fs::remove_file(self.bundle.join(source)).expect("remove bundle file");
        self
    }

    /// Build a context the way the CLI does, but with the stub service
    /// manager and no log file.
    pub fn context(&self, dry_run: bool) -> (Context, Arc<Logger>) {
        let layout = Layout::load(Some(self.bundle.as_path()), Some(self.home.as_path()))
            .expect("resolve layout");
        let log = Arc::new(Logger::new(None));
        let ctx = Context::new(
            Arc::new(layout),
            Arc::clone(&log) as Arc<dyn Log>,
            dry_run,
            Arc::clone(&self.service_manager) as Arc<dyn ServiceManager>,
        );
        (ctx, log)
    }

    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }

    pub fn read_home(&self, relative: &str) -> String {
        std::fs::read_to_string(self.home_path(relative)).expect("read installed file")
    }

    /// Every file under the home directory with its content and permission
    /// bits, sorted by path.  Used to compare whole-tree state between runs.
    pub fn snapshot_home(&self) -> Vec<FileState> {
        let mut out = Vec::new();
        collect_files(&self.home, &self.home, &mut out);
        out.sort();
        out
    }
}

/// Relative path, content and mode of one file under the home directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileState {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub mode: u32,
}

#[cfg(unix)]
fn mode_of(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt as _;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(meta: &std::fs::Metadata) -> u32 {
    u32::from(meta.permissions().readonly())
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<FileState>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            collect_files(base, &path, out);
        } else {
            let meta = std::fs::metadata(&path).expect("file metadata");
            out.push(FileState {
                path: path.strip_prefix(base).expect("under base").to_path_buf(),
                content: std::fs::read(&path).expect("read file"),
                mode: mode_of(&meta),
            });
        }
    }
}
