//! Identity of the document currently open in the session

use std::path::Path;
use std::time::SystemTime;

use super::host::{FileHandle, FileSnapshot, ImportedFile};
use super::recent::RecentEntry;

/// Name given to documents created with "New"
pub const UNTITLED_NAME: &str = "Untitled.md";

/// Extensions accepted as markdown or plain text
pub const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// The currently open (or newly created) document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentIdentity {
    /// Display name, always with a text extension
    pub name: String,
    /// Backend-specific identifier; equals `name` without a handle
    pub path: String,
    /// Write-back capability, only under capability access
    pub handle: Option<FileHandle>,
    /// In-memory text
    pub content: String,
    /// Last successful load or save
    pub last_modified: SystemTime,
}

impl DocumentIdentity {
    /// Create an empty untitled document
    pub fn untitled() -> Self {
        Self {
            name: UNTITLED_NAME.to_string(),
            path: UNTITLED_NAME.to_string(),
            handle: None,
            content: String::new(),
            last_modified: SystemTime::now(),
        }
    }

    /// Build an identity from a file read through a retained handle
    pub fn from_handle(handle: FileHandle, snapshot: FileSnapshot) -> Self {
        Self {
            name: with_text_extension(&snapshot.name),
            path: handle.to_string(),
            handle: Some(handle),
            content: snapshot.content,
            last_modified: snapshot.last_modified,
        }
    }

    /// Build an identity from a one-shot import; nothing is retained
    pub fn from_import(file: ImportedFile) -> Self {
        let name = with_text_extension(&file.name);
        Self {
            path: name.clone(),
            name,
            handle: None,
            content: file.content,
            last_modified: file.last_modified,
        }
    }

    /// Whether the document can be written back without prompting
    pub fn can_write_back(&self) -> bool {
        self.handle.is_some()
    }

    /// File name without extension
    pub fn title(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }

    /// Snapshot for the recent-documents list
    pub fn to_recent_entry(&self) -> RecentEntry {
        RecentEntry {
            name: self.name.clone(),
            path: self.path.clone(),
            handle: self.handle.clone(),
            last_modified: self.last_modified,
        }
    }
}

/// Strip a leading `---` fenced frontmatter block
pub fn strip_frontmatter(content: &str) -> &str {
    if !content.starts_with("---") {
        return content;
    }

    if let Some(end) = content[3..].find("---") {
        let after_frontmatter = 3 + end + 3;
        if after_frontmatter < content.len() {
            return content[after_frontmatter..].trim_start();
        }
    }

    content
}

/// Append `.md` unless the name already carries a text extension
pub fn with_text_extension(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = if trimmed.is_empty() { UNTITLED_NAME } else { trimmed };

    let has_text_ext = Path::new(trimmed)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);

    if has_text_ext {
        trimmed.to_string()
    } else {
        format!("{trimmed}.md")
    }
}
