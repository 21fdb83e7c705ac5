//! In-memory fakes for the host, storage and handle allocator

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Result;

use super::host::{
    CapabilityHost, FallbackHost, FileHandle, FileSnapshot, FileTypeFilter, HostProbe,
    ImportedFile, WritableStream,
};
use super::resources::{HandleAllocator, ResourceHandle};
use super::storage::PreferenceStore;

type Files = Rc<RefCell<HashMap<PathBuf, String>>>;

/// A download captured by [`FakeHost`]
#[derive(Debug, Clone)]
pub struct Download {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Scriptable host. Unscripted dialogs behave as if the user cancelled.
#[derive(Default)]
pub struct FakeHost {
    capability: bool,
    files: Files,
    open_picks: RefCell<VecDeque<io::Result<Option<PathBuf>>>>,
    save_picks: RefCell<VecDeque<Option<PathBuf>>>,
    imports: RefCell<VecDeque<Option<ImportedFile>>>,
    name_answers: RefCell<VecDeque<Option<String>>>,
    downloads: RefCell<Vec<Download>>,
    fail_next_write: Cell<bool>,
    open_streams: Rc<Cell<usize>>,
}

impl FakeHost {
    pub fn capability() -> Self {
        Self {
            capability: true,
            ..Self::default()
        }
    }

    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn put_file(&self, path: &str, content: &str) {
        self.files
            .borrow_mut()
            .insert(PathBuf::from(path), content.to_string());
    }

    pub fn delete_file(&self, path: &str) {
        self.files.borrow_mut().remove(&PathBuf::from(path));
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.borrow().get(&PathBuf::from(path)).cloned()
    }

    pub fn pick_for_open(&self, path: &str) {
        self.open_picks
            .borrow_mut()
            .push_back(Ok(Some(PathBuf::from(path))));
    }

    pub fn fail_open_picker(&self) {
        self.open_picks
            .borrow_mut()
            .push_back(Err(io::Error::new(io::ErrorKind::Other, "picker crashed")));
    }

    pub fn pick_for_save(&self, path: &str) {
        self.save_picks
            .borrow_mut()
            .push_back(Some(PathBuf::from(path)));
    }

    pub fn choose_import(&self, name: &str, content: &str) {
        self.imports.borrow_mut().push_back(Some(ImportedFile {
            name: name.to_string(),
            content: content.to_string(),
            last_modified: SystemTime::UNIX_EPOCH,
        }));
    }

    pub fn answer_name_prompt(&self, answer: Option<&str>) {
        self.name_answers
            .borrow_mut()
            .push_back(answer.map(str::to_string));
    }

    pub fn fail_next_write(&self) {
        self.fail_next_write.set(true);
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }

    pub fn open_streams(&self) -> usize {
        self.open_streams.get()
    }
}

impl HostProbe for FakeHost {
    fn exposes_capability_access(&self) -> bool {
        self.capability
    }
}

impl CapabilityHost for FakeHost {
    fn show_open_picker(&self, _filter: &FileTypeFilter) -> io::Result<Option<FileHandle>> {
        let pick = self.open_picks.borrow_mut().pop_front().unwrap_or(Ok(None));
        pick.map(|path| path.map(FileHandle::new))
    }

    fn show_save_picker(
        &self,
        _suggested_name: &str,
        _filter: &FileTypeFilter,
    ) -> io::Result<Option<FileHandle>> {
        let pick = self.save_picks.borrow_mut().pop_front().flatten();
        Ok(pick.map(FileHandle::new))
    }

    fn get_file(&self, handle: &FileHandle) -> io::Result<FileSnapshot> {
        let content = self
            .files
            .borrow()
            .get(handle.path())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))?;
        Ok(FileSnapshot {
            name: handle.name(),
            content,
            last_modified: SystemTime::UNIX_EPOCH,
        })
    }

    fn create_writable(&self, handle: &FileHandle) -> io::Result<Box<dyn WritableStream>> {
        self.open_streams.set(self.open_streams.get() + 1);
        Ok(Box::new(FakeStream {
            path: handle.path().to_path_buf(),
            buffer: String::new(),
            fail: self.fail_next_write.replace(false),
            files: Rc::clone(&self.files),
            open_streams: Rc::clone(&self.open_streams),
        }))
    }
}

impl FallbackHost for FakeHost {
    fn show_file_input(&self, _accept: &[&str]) -> io::Result<Option<ImportedFile>> {
        Ok(self.imports.borrow_mut().pop_front().flatten())
    }

    fn prompt_file_name(&self, _default_name: &str) -> Option<String> {
        self.name_answers.borrow_mut().pop_front().flatten()
    }

    fn trigger_download(&self, name: &str, mime_type: &str, bytes: &[u8]) -> io::Result<()> {
        self.downloads.borrow_mut().push(Download {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

struct FakeStream {
    path: PathBuf,
    buffer: String,
    fail: bool,
    files: Files,
    open_streams: Rc<Cell<usize>>,
}

impl WritableStream for FakeStream {
    fn write(&mut self, data: &str) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.buffer.push_str(data);
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(self.path.clone(), self.buffer.clone());
        Ok(())
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.open_streams.set(self.open_streams.get() - 1);
    }
}

/// Store whose every operation fails
pub struct FailingStore;

impl PreferenceStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        anyhow::bail!("storage unavailable")
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("storage unavailable")
    }
}

/// Allocator that counts live handles; clones share the counters
#[derive(Debug, Clone, Default)]
pub struct CountingAllocator {
    live: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl CountingAllocator {
    pub fn live(&self) -> usize {
        self.live.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }
}

impl HandleAllocator for CountingAllocator {
    fn allocate(&mut self, id: &str, _mime_type: &str, _bytes: Arc<[u8]>) -> ResourceHandle {
        self.live.set(self.live.get() + 1);
        ResourceHandle::new(format!("blob:test/{id}"))
    }

    fn release(&mut self, _handle: ResourceHandle) {
        self.live.set(self.live.get() - 1);
        self.released.set(self.released.get() + 1);
    }
}
