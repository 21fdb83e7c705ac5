//! Desktop implementation of the host file access surface
//!
//! Capability access uses native dialogs and keeps the chosen path as the
//! file handle. Fallback access reads through a one-shot picker, forgets the
//! path, and writes "downloads" into the user's download folder.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use directories::{ProjectDirs, UserDirs};

use super::config::PersistenceConfig;
use super::host::{
    CapabilityHost, FallbackHost, FileHandle, FileSnapshot, FileTypeFilter, HostProbe,
    ImportedFile, WritableStream,
};

/// Environment variable that disables capability access
pub const FALLBACK_ENV: &str = "NOTIQ_FALLBACK_ONLY";

/// File access backed by the local file system and `rfd` dialogs
#[derive(Debug, Clone)]
pub struct DesktopHost {
    force_fallback: bool,
    download_dir: PathBuf,
}

impl DesktopHost {
    pub fn new(config: &PersistenceConfig) -> Self {
        let download_dir = config
            .download_dir
            .clone()
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)))
            .or_else(|| {
                ProjectDirs::from("com", "notiq", "Notiq")
                    .map(|dirs| dirs.data_dir().join("downloads"))
            })
            .unwrap_or_else(|| PathBuf::from("downloads"));

        Self {
            force_fallback: config.force_fallback,
            download_dir,
        }
    }

}

/// Whether native handle-based dialogs exist on this machine; probed once
fn native_dialogs_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        if std::env::var_os(FALLBACK_ENV).is_some() {
            return false;
        }
        if cfg!(any(target_os = "windows", target_os = "macos")) {
            return true;
        }
        std::env::var_os("WAYLAND_DISPLAY").is_some() || std::env::var_os("DISPLAY").is_some()
    })
}

impl HostProbe for DesktopHost {
    fn exposes_capability_access(&self) -> bool {
        !self.force_fallback && native_dialogs_available()
    }
}

impl CapabilityHost for DesktopHost {
    fn show_open_picker(&self, filter: &FileTypeFilter) -> io::Result<Option<FileHandle>> {
        let picked = rfd::FileDialog::new()
            .add_filter(filter.description.as_str(), filter.extensions().as_slice())
            .pick_file();
        Ok(picked.map(FileHandle::new))
    }

    fn show_save_picker(
        &self,
        suggested_name: &str,
        filter: &FileTypeFilter,
    ) -> io::Result<Option<FileHandle>> {
        let picked = rfd::FileDialog::new()
            .set_file_name(suggested_name)
            .add_filter(filter.description.as_str(), filter.extensions().as_slice())
            .save_file();
        Ok(picked.map(FileHandle::new))
    }

    fn get_file(&self, handle: &FileHandle) -> io::Result<FileSnapshot> {
        let bytes = fs::read(handle.path())?;
        let last_modified = fs::metadata(handle.path())
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());
        Ok(FileSnapshot {
            name: handle.name(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            last_modified,
        })
    }

    fn create_writable(&self, handle: &FileHandle) -> io::Result<Box<dyn WritableStream>> {
        Ok(Box::new(SwapFileStream::create(handle.path())?))
    }
}

impl FallbackHost for DesktopHost {
    fn show_file_input(&self, accept: &[&str]) -> io::Result<Option<ImportedFile>> {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text documents", accept)
            .pick_file()
        else {
            return Ok(None);
        };

        let bytes = fs::read(&path)?;
        let last_modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Some(ImportedFile {
            name,
            content: String::from_utf8_lossy(&bytes).into_owned(),
            last_modified,
        }))
    }

    fn prompt_file_name(&self, default_name: &str) -> Option<String> {
        // Only the chosen name is used; the folder is always the download dir.
        rfd::FileDialog::new()
            .set_title("Download as")
            .set_directory(&self.download_dir)
            .set_file_name(default_name)
            .save_file()
            .and_then(|path| path.file_name().map(|s| s.to_string_lossy().to_string()))
    }

    fn trigger_download(&self, name: &str, mime_type: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.download_dir)?;
        let target = unique_download_path(&self.download_dir, name);
        fs::write(&target, bytes)?;
        tracing::info!(
            "Downloaded {} ({}, {} bytes) to {}",
            name,
            mime_type,
            bytes.len(),
            target.display()
        );
        Ok(())
    }
}

/// `dir/name`, or `dir/stem (n).ext` when that file already exists
pub fn unique_download_path(dir: &Path, name: &str) -> PathBuf {
    let file_name = Path::new(name)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    let candidate = dir.join(&file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(&file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path.extension().map(|s| s.to_string_lossy().to_string());

    (1..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Writes to a hidden sibling file and renames it over the target on close.
///
/// Dropping the stream before `close` deletes the sibling and leaves the
/// target untouched.
pub struct SwapFileStream {
    target: PathBuf,
    swap: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl SwapFileStream {
    pub fn create(target: &Path) -> io::Result<Self> {
        let file_name = target
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let swap = target.with_file_name(format!(".{file_name}.notiq-swap"));
        let file = File::create(&swap)?;
        Ok(Self {
            target: target.to_path_buf(),
            swap,
            file: Some(file),
            committed: false,
        })
    }
}

impl WritableStream for SwapFileStream {
    fn write(&mut self, data: &str) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(data.as_bytes()),
            None => Err(io::Error::new(io::ErrorKind::Other, "stream already closed")),
        }
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        fs::rename(&self.swap, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for SwapFileStream {
    fn drop(&mut self) {
        self.file.take();
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.swap) {
                tracing::warn!("Failed to discard {}: {}", self.swap.display(), e);
            }
        }
    }
}
