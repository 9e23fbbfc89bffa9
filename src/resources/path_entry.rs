//! PATH registration line in a shell startup file.
use anyhow::Result;
use std::io::Write as _;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::InstallError;

/// A single line that must appear in a shell startup file.
///
/// Presence is an exact byte-substring match, so a line that is formatted
/// differently but has the same effect is not recognised and gets appended.
/// The file is handled as raw bytes: shell configs are not required to be
/// UTF-8.
#[derive(Debug, Clone)]
pub struct PathRegistrationResource {
    /// Shell startup file (e.g. `~/.config/fish/config.fish`).
    pub file: PathBuf,
    /// Line to register, without trailing newline.
    pub line: String,
}

impl PathRegistrationResource {
    /// Create a new PATH registration resource.
    #[must_use]
    pub const fn new(file: PathBuf, line: String) -> Self {
        Self { file, line }
    }

    /// Current file content; an absent file reads as empty.
    fn read(&self) -> Result<Vec<u8>> {
        match std::fs::read(&self.file) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(InstallError::filesystem("read", &self.file, e).into()),
        }
    }

    fn is_registered(&self, content: &[u8]) -> bool {
        contains_bytes(content, self.line.as_bytes())
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

impl Applicable for PathRegistrationResource {
    fn description(&self) -> String {
        format!("{} in {}", self.line, self.file.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let content = self.read()?;
        if self.is_registered(&content) {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        if let Some(parent) = self.file.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InstallError::filesystem("create directory", parent, e))?;
        }

        let mut entry = Vec::with_capacity(self.line.len() + 2);
        if content.last().is_some_and(|&b| b != b'\n') {
            entry.push(b'\n');
        }
        entry.extend_from_slice(self.line.as_bytes());
        entry.push(b'\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .map_err(|e| InstallError::filesystem("open", &self.file, e))?;
        file.write_all(&entry)
            .map_err(|e| InstallError::filesystem("append to", &self.file, e))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PathRegistrationResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.is_registered(&self.read()?) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
