//! Things on disk (or in the service manager) the installer converges.
//!
//! Each resource can describe itself, be applied, and report its current
//! state; tasks decide whether to apply, preview, check or remove.
pub mod chmod;
pub mod directory;
pub mod file;
pub mod path_entry;
pub mod service_manager;

use anyhow::Result;

/// A single installable item.
pub trait Applicable {
    /// Path or line shown in log output.
    fn description(&self) -> String;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to a missing
    /// source, I/O failure, or permission issue.
    fn apply(&self) -> Result<ResourceChange>;

    /// Fail now with the error `apply()` is certain to return, without
    /// touching the target.
    ///
    /// Dry runs call this before previewing, so a run that would abort
    /// reports the same error instead of a preview.
    ///
    /// # Errors
    ///
    /// Returns the error `apply()` would fail with.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Undo `apply()` for `uninstall`.
    ///
    /// Only installed files support this; everything else bails.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be removed, or if removal is
    /// not supported for this resource type.
    fn remove(&self) -> Result<ResourceChange> {
        anyhow::bail!(
            "operation 'remove' is not supported for resource '{}'",
            self.description()
        )
    }
}

/// State of a resource on disk.
///
/// # Examples
///
/// ```
/// use dst_install::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "mode 644".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Present and matching the bundle.
    Correct,
    /// Present but drifted (stale content, wrong mode).
    Incorrect {
        /// What was found instead.
        current: String,
    },
    /// Resource cannot be applied (e.g. a file sits where a directory belongs).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Outcome of `apply()` or `remove()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Written, created or removed.
    Applied,
    /// Nothing to do.
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Resources that can also report their current state.
pub trait Resource: Applicable {
    /// Inspect the resource without changing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Executor double for service-manager tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// An [`Executor`] that replays queued `(success, stderr)` responses and
    /// records every command line it receives.
    ///
    /// When the queue is empty, calls behave as if the program were missing
    /// (spawn error).
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        calls: Mutex<Vec<String>>,
        which_result: bool,
    }

    impl MockExecutor {
        /// Respond to every queued call in order.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, &str)>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(ok, err)| (ok, err.to_string()))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
                which_result: true,
            }
        }

        /// Set the value returned by [`Executor::which`].
        #[must_use]
        pub const fn with_which(mut self, result: bool) -> Self {
            self.which_result = result;
            self
        }

        /// Command lines received so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .map_or_else(|_| Vec::new(), |c| c.clone())
        }

        fn next(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(crate::exec::command_line(program, args));
            }
            let next = self
                .responses
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front());
            let Some((success, stderr)) = next else {
                anyhow::bail!("failed to execute: {program}: not found");
            };
            Ok(ExecResult {
                stdout: String::new(),
                stderr,
                success,
                code: Some(i32::from(!success)),
            })
        }
    }

    impl Executor for MockExecutor {
        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.next(program, args)
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }
}
