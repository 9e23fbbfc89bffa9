//! Per-run state shared by every task.
use std::sync::Arc;

use crate::config::Layout;
use crate::logging::Log;
use crate::resources::service_manager::ServiceManager;

/// Shared context for task execution.
pub struct Context {
    /// Where artifacts come from and where they go.
    pub layout: Arc<Layout>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// The user's service manager.
    pub service_manager: Arc<dyn ServiceManager>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("layout", &self.layout)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("service_manager", &"<dyn ServiceManager>")
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        layout: Arc<Layout>,
        log: Arc<dyn Log>,
        dry_run: bool,
        service_manager: Arc<dyn ServiceManager>,
    ) -> Self {
        Self {
            layout,
            log,
            dry_run,
            service_manager,
        }
    }
}
