//! Registry of transient binary assets such as dropped or pasted images
//!
//! Every asset owns exactly one [`ResourceHandle`]. Handles are not `Clone`
//! and [`HandleAllocator::release`] consumes them, so a handle can be released
//! only once and cannot be used afterwards. Consumers only ever see an asset
//! id and the access URL string.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex_lite::{Captures, Regex};

/// Prefix of every asset id
pub const ASSET_ID_PREFIX: &str = "img_";

static NEXT_ASSET_SEQ: AtomicU64 = AtomicU64::new(1);

/// Ownership of memory-backed bytes registered with the host
#[derive(Debug)]
pub struct ResourceHandle {
    url: String,
}

impl ResourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Allocates and releases memory-backed handles
pub trait HandleAllocator {
    /// Register `bytes` and return the handle that keeps them alive
    fn allocate(&mut self, id: &str, mime_type: &str, bytes: Arc<[u8]>) -> ResourceHandle;

    /// Release a handle previously returned by `allocate`
    fn release(&mut self, handle: ResourceHandle);
}

/// One transient binary object
#[derive(Debug)]
pub struct ResourceAsset {
    pub id: String,
    pub name: String,
    pub size: usize,
    pub mime_type: String,
    pub uploaded_at: SystemTime,
    bytes: Arc<[u8]>,
    handle: ResourceHandle,
}

impl ResourceAsset {
    /// Access URL for rendering
    pub fn url(&self) -> &str {
        self.handle.url()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Markdown that embeds this asset by id
    pub fn markdown(&self) -> String {
        format!("![{}]({})", self.name, self.id)
    }

    /// Self-contained `data:` URL carrying the bytes, for exported pages
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Subtype for display, e.g. `PNG` for `image/png`
    pub fn format_label(&self) -> String {
        self.mime_type
            .split('/')
            .nth(1)
            .unwrap_or(&self.mime_type)
            .to_uppercase()
    }
}

/// Owner of all transient assets of the process
pub struct ResourceRegistry {
    assets: Vec<ResourceAsset>,
    allocator: Box<dyn HandleAllocator>,
}

impl ResourceRegistry {
    pub fn new(allocator: Box<dyn HandleAllocator>) -> Self {
        Self {
            assets: Vec::new(),
            allocator,
        }
    }

    /// Register bytes as a new asset
    pub fn add(&mut self, bytes: Vec<u8>, name: &str, mime_type: &str) -> &ResourceAsset {
        let id = next_asset_id();
        let bytes: Arc<[u8]> = bytes.into();
        let handle = self.allocator.allocate(&id, mime_type, Arc::clone(&bytes));

        tracing::info!("Added asset {} ({}, {} bytes)", id, name, bytes.len());
        let index = self.assets.len();
        self.assets.push(ResourceAsset {
            id,
            name: name.to_string(),
            size: bytes.len(),
            mime_type: mime_type.to_string(),
            uploaded_at: SystemTime::now(),
            bytes,
            handle,
        });
        &self.assets[index]
    }

    /// Take the asset with `id` out and release its handle in the same call.
    ///
    /// Absent ids are ignored. The handle is released before this returns, so
    /// no caller can observe a removed asset with a live handle.
    pub fn remove(&mut self, id: &str) {
        if let Some(index) = self.assets.iter().position(|a| a.id == id) {
            let asset = self.assets.remove(index);
            self.allocator.release(asset.handle);
            tracing::info!("Removed asset {}", id);
        }
    }

    /// Drain every asset, releasing each handle as it leaves the collection
    pub fn clear(&mut self) {
        let count = self.assets.len();
        for asset in self.assets.drain(..) {
            self.allocator.release(asset.handle);
        }
        if count > 0 {
            tracing::info!("Released {} assets", count);
        }
    }

    pub fn get(&self, id: &str) -> Option<&ResourceAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Access URL for `id`, or `None` once it has been removed
    pub fn get_url(&self, id: &str) -> Option<String> {
        self.get(id).map(|a| a.url().to_string())
    }

    pub fn assets(&self) -> &[ResourceAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Rewrite image destinations that name a live asset to its access URL
    pub fn resolve_links<'a>(&self, markdown: &'a str) -> Cow<'a, str> {
        if self.assets.is_empty() {
            return Cow::Borrowed(markdown);
        }
        image_link_pattern().replace_all(markdown, |caps: &Captures| {
            match self.get(&caps[2]) {
                Some(asset) => format!("![{}]({})", &caps[1], asset.url()),
                None => caps[0].to_string(),
            }
        })
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        if !self.assets.is_empty() {
            tracing::debug!("Releasing {} assets on drop", self.assets.len());
            self.clear();
        }
    }
}

fn image_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"!\[([^\]]*)\]\((img_[A-Za-z0-9_]+)\)").expect("image link pattern is valid")
    })
}

fn next_asset_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = NEXT_ASSET_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{ASSET_ID_PREFIX}{millis}_{seq:x}")
}
