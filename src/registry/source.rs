// ABOUTME: Configuration sources - where subagent records come from.
// ABOUTME: A directory of markdown files or an in-memory record set.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// A store of subagent records.
///
/// The registry only needs to enumerate record ids and read one record at
/// a time. Ids are stable, `/`-separated, and their first component may
/// name a domain (e.g. `healthcare/patient-intake.md`).
pub trait ConfigSource {
    /// Human-readable location for error messages.
    fn location(&self) -> String;

    /// List record ids in a deterministic order.
    fn enumerate(&self) -> io::Result<Vec<String>>;

    /// Read one record's raw contents.
    fn read(&self, id: &str) -> io::Result<String>;
}

/// Records stored as `*.md` files anywhere below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ConfigSource for DirectorySource {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn enumerate(&self) -> io::Result<Vec<String>> {
        if !self.root.exists() {
            warn!(root = %self.root.display(), "subagent directory does not exist");
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", self.root.display()),
            ));
        }

        let pattern = format!("{}/**/*.md", glob::Pattern::escape(&self.root.to_string_lossy()));
        let entries =
            glob::glob(&pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| e.into_error())?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            let id = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }

    fn read(&self, id: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(id))
    }
}

/// Records held in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    records: Vec<(String, String)>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Add a record. A later record with the same id replaces the earlier one.
    pub fn record(mut self, id: impl Into<String>, contents: impl Into<String>) -> Self {
        let id = id.into();
        self.records.retain(|(existing, _)| existing != &id);
        self.records.push((id, contents.into()));
        self
    }
}

impl ConfigSource for MemorySource {
    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn enumerate(&self) -> io::Result<Vec<String>> {
        Ok(self.records.iter().map(|(id, _)| id.clone()).collect())
    }

    fn read(&self, id: &str) -> io::Result<String> {
        self.records
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, id.to_string()))
    }
}
