//! File access surface provided by the host platform
//!
//! Two families of entry points exist. Capability access hands out a
//! [`FileHandle`] that can be read and written again without prompting.
//! Fallback access only offers one-shot imports and forced downloads.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::document::TEXT_EXTENSIONS;

/// Capability-backed reference to a file granted by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileHandle(PathBuf);

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name as shown to the user
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.to_string_lossy().to_string())
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// File type restriction for pickers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeFilter {
    pub description: String,
    pub accepted_extensions: Vec<String>,
}

impl FileTypeFilter {
    /// Markdown and plain text, used for opening
    pub fn text_documents() -> Self {
        Self {
            description: "Markdown files".to_string(),
            accepted_extensions: TEXT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Markdown only, used for saving
    pub fn markdown() -> Self {
        Self {
            description: "Markdown files".to_string(),
            accepted_extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }

    pub fn extensions(&self) -> Vec<&str> {
        self.accepted_extensions.iter().map(String::as_str).collect()
    }
}

/// Readable snapshot of a file behind a handle
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub name: String,
    pub content: String,
    pub last_modified: SystemTime,
}

/// A file read through a one-shot picker; no reference survives
#[derive(Debug, Clone)]
pub struct ImportedFile {
    pub name: String,
    pub content: String,
    pub last_modified: SystemTime,
}

/// Scoped write access to a file behind a handle.
///
/// Writes become visible only on [`close`](WritableStream::close). Dropping
/// the stream without closing discards everything written and releases the
/// underlying lock.
pub trait WritableStream {
    fn write(&mut self, data: &str) -> io::Result<()>;

    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Host probe for capability-based file access
pub trait HostProbe {
    /// Whether the capability entry points are present
    fn exposes_capability_access(&self) -> bool;
}

/// Handle-based file access.
///
/// Picker methods return `Ok(None)` when the user dismisses the dialog.
pub trait CapabilityHost {
    fn show_open_picker(&self, filter: &FileTypeFilter) -> io::Result<Option<FileHandle>>;

    fn show_save_picker(
        &self,
        suggested_name: &str,
        filter: &FileTypeFilter,
    ) -> io::Result<Option<FileHandle>>;

    fn get_file(&self, handle: &FileHandle) -> io::Result<FileSnapshot>;

    fn create_writable(&self, handle: &FileHandle) -> io::Result<Box<dyn WritableStream>>;
}

/// One-shot import and forced download
pub trait FallbackHost {
    /// Generic file input; `Ok(None)` on dismissal
    fn show_file_input(&self, accept: &[&str]) -> io::Result<Option<ImportedFile>>;

    /// Ask for a display name; `None` on dismissal
    fn prompt_file_name(&self, default_name: &str) -> Option<String>;

    /// Hand bytes to the host as a download named `name`
    fn trigger_download(&self, name: &str, mime_type: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Everything a session backend needs from the host
pub trait Host: HostProbe + CapabilityHost + FallbackHost {}

impl<T: HostProbe + CapabilityHost + FallbackHost> Host for T {}
