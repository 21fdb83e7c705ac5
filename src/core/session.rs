//! Document session: the open document, its dirty state and persistence
//!
//! The session owns the current [`DocumentIdentity`] and the
//! [`RecentRegistry`]. Whether the document is modified is derived by
//! comparing its content against the content captured at the last successful
//! load or save; it is never stored on the identity.
//!
//! Every mutating operation takes `&mut self`, so at most one of them can be
//! in flight for a given session.

use std::time::SystemTime;

use super::backend::{Backend, Durability};
use super::document::DocumentIdentity;
use super::error::{SessionError, SessionResult};
use super::host::Host;
use super::recent::{RecentEntry, RecentRegistry};

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing opened or created yet
    Empty,
    /// Content matches the last load or save
    Clean,
    /// Content differs from the last load or save
    Modified,
}

/// The document session of the process
pub struct DocumentSession<H> {
    backend: Backend<H>,
    recent: RecentRegistry,
    current: Option<DocumentIdentity>,
    /// Content at the last successful load or save
    baseline: String,
    modified: bool,
}

impl<H: Host> DocumentSession<H> {
    pub fn new(backend: Backend<H>, recent: RecentRegistry) -> Self {
        Self {
            backend,
            recent,
            current: None,
            baseline: String::new(),
            modified: false,
        }
    }

    pub fn current(&self) -> Option<&DocumentIdentity> {
        self.current.as_ref()
    }

    /// Text shown in the editor; empty when nothing is open
    pub fn content(&self) -> &str {
        self.current.as_ref().map(|d| d.content.as_str()).unwrap_or("")
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether save operations have a document to act on
    pub fn can_persist(&self) -> bool {
        self.current.is_some()
    }

    /// Whether save writes back without prompting or downloading
    pub fn can_write_back(&self) -> bool {
        self.backend.has_capability_access()
            && self.current.as_ref().is_some_and(|d| d.can_write_back())
    }

    pub fn has_capability_access(&self) -> bool {
        self.backend.has_capability_access()
    }

    /// Whether "Save" should ask for a destination instead of downloading:
    /// a handle could be obtained but the document has none yet
    pub fn save_needs_destination(&self) -> bool {
        self.backend.has_capability_access()
            && self.current.as_ref().is_some_and(|d| !d.can_write_back())
    }

    pub fn state(&self) -> SessionState {
        match (&self.current, self.modified) {
            (None, _) => SessionState::Empty,
            (Some(_), false) => SessionState::Clean,
            (Some(_), true) => SessionState::Modified,
        }
    }

    pub fn recent(&self) -> &RecentRegistry {
        &self.recent
    }

    pub fn backend(&self) -> &Backend<H> {
        &self.backend
    }

    /// Replace the current document with an empty untitled one
    pub fn new_document(&mut self) {
        if self.modified {
            tracing::debug!("Discarding unsaved changes for a new document");
        }
        self.replace(DocumentIdentity::untitled());
        tracing::info!("Created new document");
    }

    /// Let the user choose a document and make it current
    pub fn open(&mut self) -> SessionResult<()> {
        let doc = report("open", self.backend.open())?;
        tracing::info!("Opened document: {}", doc.path);
        self.recent.upsert(doc.to_recent_entry());
        self.replace(doc);
        Ok(())
    }

    /// Persist the current document to its current target
    pub fn save(&mut self) -> SessionResult<Durability> {
        let doc = self.current.as_ref().ok_or(SessionError::NoOpenDocument)?;
        let durability = report("save", self.backend.save(doc))?;
        self.mark_saved(durability);
        Ok(durability)
    }

    /// Persist the current document to a new target chosen by the user
    pub fn save_as(&mut self) -> SessionResult<Durability> {
        let doc = self.current.as_ref().ok_or(SessionError::NoOpenDocument)?;
        let relocation = report("save as", self.backend.save_as(doc))?;

        if let Some(doc) = self.current.as_mut() {
            doc.name = relocation.name;
            doc.path = relocation.path;
            doc.handle = relocation.handle;
        }
        self.mark_saved(relocation.durability);
        Ok(relocation.durability)
    }

    /// Replace the content of the current document; no-op when none is open
    pub fn set_content(&mut self, content: impl Into<String>) {
        let Some(doc) = self.current.as_mut() else {
            return;
        };
        doc.content = content.into();
        self.modified = doc.content != self.baseline;
    }

    /// Reopen a document from the recent list.
    ///
    /// An entry that can no longer be read is removed from the list.
    pub fn open_recent(&mut self, entry: &RecentEntry) -> SessionResult<()> {
        match self.backend.reopen(entry) {
            Ok(doc) => {
                tracing::info!("Reopened recent document: {}", doc.path);
                self.recent.upsert(doc.to_recent_entry());
                self.replace(doc);
                Ok(())
            }
            Err(err) => {
                if let SessionError::StaleReference { path } = &err {
                    self.recent.remove(path);
                }
                report("open recent", Err(err))
            }
        }
    }

    /// Forget a recent document at the user's request
    pub fn remove_recent(&mut self, path: &str) {
        self.recent.remove(path);
    }

    /// Hand a derived artifact (rendered HTML, an image) to the host
    pub fn export(&self, name: &str, mime_type: &str, bytes: &[u8]) -> SessionResult<()> {
        report("export", self.backend.export(name, mime_type, bytes))?;
        tracing::info!("Exported {}", name);
        Ok(())
    }

    fn replace(&mut self, doc: DocumentIdentity) {
        self.baseline = doc.content.clone();
        self.modified = false;
        self.current = Some(doc);
    }

    fn mark_saved(&mut self, durability: Durability) {
        let Some(doc) = self.current.as_mut() else {
            return;
        };
        doc.last_modified = SystemTime::now();
        self.baseline = doc.content.clone();
        self.modified = false;

        match durability {
            Durability::Confirmed => tracing::info!("Saved document: {}", doc.path),
            Durability::Unconfirmed => {
                tracing::info!("Downloaded document: {} (completion not observable)", doc.name)
            }
        }
        self.recent.upsert(doc.to_recent_entry());
    }
}

/// Log a failed operation at the level its kind deserves
fn report<T>(operation: &str, result: SessionResult<T>) -> SessionResult<T> {
    if let Err(err) = &result {
        match err {
            SessionError::UserCancelled => tracing::debug!("{} cancelled by user", operation),
            SessionError::UnsupportedOperation(_) | SessionError::StaleReference { .. } => {
                tracing::warn!("Cannot {}: {}", operation, err)
            }
            _ => tracing::error!("Failed to {}: {}", operation, err),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::core::testing::FakeHost;

    fn session(host: FakeHost) -> DocumentSession<FakeHost> {
        let recent = RecentRegistry::load(Box::new(MemoryStore::new()));
        DocumentSession::new(Backend::select(host), recent)
    }

    fn opened(path: &str, content: &str) -> DocumentSession<FakeHost> {
        let host = FakeHost::capability();
        host.put_file(path, content);
        host.pick_for_open(path);
        let mut session = session(host);
        session.open().unwrap();
        session
    }

    #[test]
    fn test_save_needs_destination_only_for_handleless_capability_documents() {
        let mut untitled = session(FakeHost::capability());
        assert!(!untitled.save_needs_destination());

        untitled.new_document();
        assert!(untitled.save_needs_destination());

        let reopened = opened("/notes/a.md", "text");
        assert!(!reopened.save_needs_destination());

        let mut fallback = session(FakeHost::fallback());
        fallback.new_document();
        assert!(!fallback.save_needs_destination());
    }

    #[test]
    fn test_new_document_then_edit_is_modified() {
        let mut session = session(FakeHost::capability());
        assert_eq!(session.state(), SessionState::Empty);

        session.new_document();
        assert_eq!(session.state(), SessionState::Clean);
        session.set_content("# Hi");

        assert!(session.is_modified());
        assert_eq!(session.current().unwrap().name, "Untitled.md");
        assert_eq!(session.content(), "# Hi");
    }

    #[test]
    fn test_set_content_without_document_is_noop() {
        let mut session = session(FakeHost::capability());
        session.set_content("ignored");
        assert!(session.current().is_none());
        assert!(!session.is_modified());
        assert_eq!(session.content(), "");
    }

    #[test]
    fn test_edit_save_cycle() {
        let mut session = opened("/notes/a.md", "first");
        for (c1, c2) in [("one", "two"), ("", "x"), ("same\n", "same")] {
            session.set_content(c1);
            session.save().unwrap();
            assert!(!session.is_modified());

            session.set_content(c2);
            assert!(session.is_modified());
            assert_eq!(session.save().unwrap(), Durability::Confirmed);
            assert!(!session.is_modified());
        }
        assert_eq!(
            session.backend().host().file("/notes/a.md").as_deref(),
            Some("same")
        );
    }

    #[test]
    fn test_reverting_to_baseline_clears_modified() {
        let mut session = opened("/notes/a.md", "base");
        session.set_content("base!");
        assert!(session.is_modified());
        session.set_content("base");
        assert!(!session.is_modified());
    }

    #[test]
    fn test_capability_open_then_save_stays_clean() {
        let mut session = opened("/notes/a.md", "# A");
        assert!(!session.is_modified());
        assert!(session.can_write_back());

        session.save().unwrap();
        assert!(!session.is_modified());
        assert_eq!(session.current().unwrap().path, "/notes/a.md");
        assert_eq!(session.recent().len(), 1);
        assert_eq!(session.recent().entries()[0].path, "/notes/a.md");
    }

    #[test]
    fn test_open_cancelled_leaves_state_untouched() {
        let mut session = opened("/notes/a.md", "keep");
        session.set_content("edited");

        let err = session.open().unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(session.content(), "edited");
        assert!(session.is_modified());
    }

    #[test]
    fn test_open_failure_leaves_state_untouched() {
        let mut session = opened("/notes/a.md", "keep");
        session.backend().host().pick_for_open("/notes/missing.md");

        let err = session.open().unwrap_err();
        assert!(matches!(err, SessionError::IoFailure { .. }));
        assert_eq!(session.current().unwrap().path, "/notes/a.md");
        assert_eq!(session.recent().len(), 1);

        session.backend().host().fail_open_picker();
        assert!(session.open().is_err());
        assert_eq!(session.content(), "keep");
    }

    #[test]
    fn test_save_without_document() {
        let mut session = session(FakeHost::capability());
        assert!(matches!(session.save(), Err(SessionError::NoOpenDocument)));
        assert!(matches!(session.save_as(), Err(SessionError::NoOpenDocument)));
        assert!(!session.can_persist());
    }

    #[test]
    fn test_failed_write_keeps_modified_and_identity() {
        let mut session = opened("/notes/a.md", "v1");
        session.set_content("v2");
        session.backend().host().fail_next_write();

        assert!(session.save().is_err());
        assert!(session.is_modified());
        assert_eq!(session.content(), "v2");
        assert_eq!(
            session.backend().host().file("/notes/a.md").as_deref(),
            Some("v1")
        );
        assert_eq!(session.backend().host().open_streams(), 0);
    }

    #[test]
    fn test_capability_save_as_rebinds_identity() {
        let mut session = session(FakeHost::capability());
        session.new_document();
        session.set_content("draft");
        session.backend().host().pick_for_save("/notes/final.md");

        assert_eq!(session.save_as().unwrap(), Durability::Confirmed);
        let doc = session.current().unwrap();
        assert_eq!(doc.name, "final.md");
        assert_eq!(doc.path, "/notes/final.md");
        assert!(doc.handle.is_some());
        assert!(!session.is_modified());
        assert_eq!(
            session.backend().host().file("/notes/final.md").as_deref(),
            Some("draft")
        );
        assert_eq!(session.recent().entries()[0].path, "/notes/final.md");

        session.set_content("draft 2");
        session.save().unwrap();
        assert_eq!(
            session.backend().host().file("/notes/final.md").as_deref(),
            Some("draft 2")
        );
    }

    #[test]
    fn test_save_as_cancelled_keeps_identity() {
        let mut session = opened("/notes/a.md", "x");
        session.set_content("y");
        assert!(session.save_as().unwrap_err().is_cancellation());
        assert_eq!(session.current().unwrap().path, "/notes/a.md");
        assert!(session.is_modified());
    }

    #[test]
    fn test_fallback_open_has_no_handle_and_cannot_reopen() {
        let host = FakeHost::fallback();
        host.choose_import("notes.md", "# Notes");
        let mut session = session(host);
        assert!(!session.has_capability_access());

        session.open().unwrap();
        let doc = session.current().unwrap();
        assert!(doc.handle.is_none());
        assert_eq!(doc.path, "notes.md");
        assert!(!session.can_write_back());

        let entry = session.recent().entries()[0].clone();
        let err = session.open_recent(&entry).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedOperation(_)));
        assert_eq!(session.recent().len(), 1);
    }

    #[test]
    fn test_fallback_save_is_optimistic_and_unconfirmed() {
        let host = FakeHost::fallback();
        host.choose_import("notes.md", "a");
        let mut session = session(host);
        session.open().unwrap();
        session.set_content("b");

        assert_eq!(session.save().unwrap(), Durability::Unconfirmed);
        assert!(!session.is_modified());
        let downloads = session.backend().host().downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].name, "notes.md");
        assert_eq!(downloads[0].bytes, b"b");
    }

    #[test]
    fn test_fallback_save_as_renames_display_name() {
        let host = FakeHost::fallback();
        host.answer_name_prompt(Some("renamed"));
        let mut session = session(host);
        session.new_document();
        session.set_content("text");

        assert_eq!(session.save_as().unwrap(), Durability::Unconfirmed);
        let doc = session.current().unwrap();
        assert_eq!(doc.name, "renamed.md");
        assert_eq!(doc.path, "renamed.md");
        assert_eq!(session.recent().entries()[0].path, "renamed.md");
        assert_eq!(session.backend().host().downloads()[0].name, "renamed.md");

        assert!(session.save_as().unwrap_err().is_cancellation());
        assert_eq!(session.backend().host().downloads().len(), 1);
    }

    #[test]
    fn test_open_recent_rereads_and_moves_to_front() {
        let mut session = opened("/notes/a.md", "a1");
        let host = session.backend().host();
        host.put_file("/notes/b.md", "b1");
        host.pick_for_open("/notes/b.md");
        session.open().unwrap();

        session.backend().host().put_file("/notes/a.md", "a2");
        let entry = session.recent().get("/notes/a.md").unwrap().clone();
        session.open_recent(&entry).unwrap();

        assert_eq!(session.content(), "a2");
        assert!(!session.is_modified());
        assert_eq!(session.recent().entries()[0].path, "/notes/a.md");
        assert_eq!(session.recent().len(), 2);
    }

    #[test]
    fn test_open_recent_stale_entry_is_removed() {
        let mut session = opened("/notes/a.md", "a");
        session.new_document();
        session.set_content("unsaved");
        session.backend().host().delete_file("/notes/a.md");

        let entry = session.recent().entries()[0].clone();
        let err = session.open_recent(&entry).unwrap_err();
        assert!(matches!(err, SessionError::StaleReference { ref path } if path == "/notes/a.md"));
        assert!(session.recent().is_empty());
        assert_eq!(session.content(), "unsaved");
    }

    #[test]
    fn test_new_document_discards_changes() {
        let mut session = opened("/notes/a.md", "a");
        session.set_content("changed");
        session.new_document();
        assert!(!session.is_modified());
        assert_eq!(session.content(), "");
        assert!(session.current().unwrap().handle.is_none());
    }

    #[test]
    fn test_export_downloads_bytes() {
        let session = session(FakeHost::capability());
        session.export("page.html", "text/html", b"<h1>x</h1>").unwrap();
        let downloads = session.backend().host().downloads();
        assert_eq!(downloads[0].name, "page.html");
        assert_eq!(downloads[0].mime_type, "text/html");
    }
}
