//! Persistence backend selection and the two persistence strategies

use std::io;

use super::document::{with_text_extension, DocumentIdentity};
use super::error::{SessionError, SessionResult};
use super::host::{CapabilityHost, FileHandle, FileTypeFilter, Host};
use super::recent::RecentEntry;

/// MIME type used for downloaded documents
pub const MARKDOWN_MIME: &str = "text/markdown";

/// How durable a completed save is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Written and closed through a retained handle
    Confirmed,
    /// Handed to the host as a download; completion cannot be observed
    Unconfirmed,
}

/// New target of a document after "Save As"
#[derive(Debug, Clone)]
pub struct Relocation {
    pub name: String,
    pub path: String,
    pub handle: Option<FileHandle>,
    pub durability: Durability,
}

/// The persistence strategy chosen for this process
#[derive(Debug)]
pub enum Backend<H> {
    /// Handle-based open/save with write-back
    Capability(H),
    /// One-shot import and download-only export
    Fallback(H),
}

impl<H: Host> Backend<H> {
    /// Probe `host` once and pick the matching strategy
    pub fn select(host: H) -> Self {
        if host.exposes_capability_access() {
            tracing::info!("Using capability file access");
            Self::Capability(host)
        } else {
            tracing::info!("Capability file access unavailable, using import/download fallback");
            Self::Fallback(host)
        }
    }

    pub fn has_capability_access(&self) -> bool {
        matches!(self, Self::Capability(_))
    }

    pub fn host(&self) -> &H {
        match self {
            Self::Capability(host) | Self::Fallback(host) => host,
        }
    }

    /// Let the user pick a document and read it
    pub fn open(&self) -> SessionResult<DocumentIdentity> {
        match self {
            Self::Capability(host) => {
                let filter = FileTypeFilter::text_documents();
                let handle = host
                    .show_open_picker(&filter)
                    .map_err(|e| SessionError::io("choose", "a document", e))?
                    .ok_or(SessionError::UserCancelled)?;
                let snapshot = host
                    .get_file(&handle)
                    .map_err(|e| SessionError::io("read", handle.name(), e))?;
                Ok(DocumentIdentity::from_handle(handle, snapshot))
            }
            Self::Fallback(host) => {
                let accept = FileTypeFilter::text_documents();
                let file = host
                    .show_file_input(&accept.extensions())
                    .map_err(|e| SessionError::io("read", "the selected file", e))?
                    .ok_or(SessionError::UserCancelled)?;
                Ok(DocumentIdentity::from_import(file))
            }
        }
    }

    /// Persist `doc` to its current target
    pub fn save(&self, doc: &DocumentIdentity) -> SessionResult<Durability> {
        match (self, &doc.handle) {
            (Self::Capability(host), Some(handle)) => {
                write_through(host, handle, &doc.content)
                    .map_err(|e| SessionError::io("write", &doc.name, e))?;
                Ok(Durability::Confirmed)
            }
            _ => {
                self.download(&doc.name, &doc.content)?;
                Ok(Durability::Unconfirmed)
            }
        }
    }

    /// Persist `doc` to a target chosen by the user
    pub fn save_as(&self, doc: &DocumentIdentity) -> SessionResult<Relocation> {
        match self {
            Self::Capability(host) => {
                let handle = host
                    .show_save_picker(&doc.name, &FileTypeFilter::markdown())
                    .map_err(|e| SessionError::io("choose", "a destination", e))?
                    .ok_or(SessionError::UserCancelled)?;
                let handle = with_text_extension_handle(handle);
                write_through(host, &handle, &doc.content)
                    .map_err(|e| SessionError::io("write", handle.name(), e))?;
                Ok(Relocation {
                    name: handle.name(),
                    path: handle.to_string(),
                    handle: Some(handle),
                    durability: Durability::Confirmed,
                })
            }
            Self::Fallback(host) => {
                let name = host
                    .prompt_file_name(&doc.name)
                    .map(|name| with_text_extension(&name))
                    .ok_or(SessionError::UserCancelled)?;
                self.download(&name, &doc.content)?;
                Ok(Relocation {
                    path: name.clone(),
                    name,
                    handle: None,
                    durability: Durability::Unconfirmed,
                })
            }
        }
    }

    /// Re-read a document remembered in the recent list
    pub fn reopen(&self, entry: &RecentEntry) -> SessionResult<DocumentIdentity> {
        let (host, handle) = match (self, &entry.handle) {
            (Self::Capability(host), Some(handle)) => (host, handle),
            _ => {
                return Err(SessionError::UnsupportedOperation(
                    "reopening a recent document",
                ))
            }
        };

        match host.get_file(handle) {
            Ok(snapshot) => {
                let mut doc = DocumentIdentity::from_handle(handle.clone(), snapshot);
                doc.path = entry.path.clone();
                Ok(doc)
            }
            Err(e) => {
                tracing::warn!("Recent file {} is no longer readable: {}", entry.path, e);
                Err(SessionError::StaleReference {
                    path: entry.path.clone(),
                })
            }
        }
    }

    /// Hand arbitrary bytes to the host as a download
    pub fn export(&self, name: &str, mime_type: &str, bytes: &[u8]) -> SessionResult<()> {
        self.host()
            .trigger_download(name, mime_type, bytes)
            .map_err(|e| SessionError::io("export", name, e))
    }

    fn download(&self, name: &str, content: &str) -> SessionResult<()> {
        self.export(name, MARKDOWN_MIME, content.as_bytes())
    }
}

/// Point `handle` at a file name that carries a text extension
fn with_text_extension_handle(handle: FileHandle) -> FileHandle {
    let name = handle.name();
    let normalized = with_text_extension(&name);
    if normalized == name {
        handle
    } else {
        FileHandle::new(handle.path().with_file_name(normalized))
    }
}

/// Acquire a writable stream, write the full content and close it.
///
/// An early return drops the stream, which releases it without committing.
fn write_through<H: CapabilityHost>(
    host: &H,
    handle: &FileHandle,
    content: &str,
) -> io::Result<()> {
    let mut stream = host.create_writable(handle)?;
    stream.write(content)?;
    stream.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeHost;

    #[test]
    fn test_select_follows_host_capability() {
        assert!(Backend::select(FakeHost::capability()).has_capability_access());
        assert!(!Backend::select(FakeHost::fallback()).has_capability_access());
    }

    #[test]
    fn test_failed_write_releases_stream_without_commit() {
        let host = FakeHost::capability();
        host.put_file("/notes/a.md", "original");
        host.fail_next_write();
        let backend = Backend::select(host);

        let mut doc = DocumentIdentity::untitled();
        doc.handle = Some(FileHandle::new("/notes/a.md"));
        doc.content = "changed".to_string();

        let err = backend.save(&doc).unwrap_err();
        assert!(matches!(err, SessionError::IoFailure { .. }));
        assert_eq!(backend.host().open_streams(), 0);
        assert_eq!(backend.host().file("/notes/a.md").as_deref(), Some("original"));
    }

    #[test]
    fn test_save_without_handle_downloads() {
        let backend = Backend::select(FakeHost::capability());
        let mut doc = DocumentIdentity::untitled();
        doc.content = "draft".to_string();

        assert_eq!(backend.save(&doc).unwrap(), Durability::Unconfirmed);
        let downloads = backend.host().downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].name, "Untitled.md");
        assert_eq!(downloads[0].mime_type, MARKDOWN_MIME);
        assert_eq!(downloads[0].bytes, b"draft");
    }

    #[test]
    fn test_capability_save_as_writes_to_extended_name() {
        let host = FakeHost::capability();
        host.pick_for_save("/notes/draft");
        let backend = Backend::select(host);

        let mut doc = DocumentIdentity::untitled();
        doc.content = "body".to_string();
        let relocation = backend.save_as(&doc).unwrap();

        assert_eq!(relocation.name, "draft.md");
        assert_eq!(relocation.path, "/notes/draft.md");
        assert_eq!(backend.host().file("/notes/draft.md").as_deref(), Some("body"));
        assert!(backend.host().file("/notes/draft").is_none());
    }

    #[test]
    fn test_fallback_save_as_appends_extension() {
        let host = FakeHost::fallback();
        host.answer_name_prompt(Some("report"));
        let backend = Backend::select(host);

        let relocation = backend.save_as(&DocumentIdentity::untitled()).unwrap();
        assert_eq!(relocation.name, "report.md");
        assert_eq!(relocation.path, "report.md");
        assert!(relocation.handle.is_none());
        assert_eq!(relocation.durability, Durability::Unconfirmed);
    }
}
