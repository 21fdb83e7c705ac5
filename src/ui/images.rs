//! Image handles backed by the egui bytes loader, and the image manager window

use std::path::Path;
use std::sync::Arc;

use eframe::egui;

use crate::app::NotiqApp;
use crate::core::resources::{HandleAllocator, ResourceHandle};
use crate::core::stats::format_bytes;

/// Registers asset bytes with egui under a `bytes://` URI
pub struct EguiImageAllocator {
    ctx: egui::Context,
}

impl EguiImageAllocator {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl HandleAllocator for EguiImageAllocator {
    fn allocate(&mut self, id: &str, mime_type: &str, bytes: Arc<[u8]>) -> ResourceHandle {
        let ext = extension_for_mime(mime_type).unwrap_or("bin");
        let url = format!("bytes://notiq/{id}.{ext}");
        self.ctx.include_bytes(url.clone(), bytes);
        ResourceHandle::new(url)
    }

    fn release(&mut self, handle: ResourceHandle) {
        self.ctx.forget_image(handle.url());
    }
}

/// MIME type of an image file, judged by extension
pub fn image_mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let ext = match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/svg+xml" => "svg",
        _ => return None,
    };
    Some(ext)
}

/// Bytes, name and MIME type of a dropped image; non-images are skipped
pub fn read_dropped_image(file: &egui::DroppedFile) -> Option<(Vec<u8>, String, String)> {
    let path = file.path.as_deref();
    let mime = if file.mime.starts_with("image/") {
        file.mime.clone()
    } else {
        path.and_then(image_mime_for_path)
            .or_else(|| image_mime_for_path(Path::new(&file.name)))?
            .to_string()
    };

    let name = if file.name.is_empty() {
        path.and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string())
    } else {
        file.name.clone()
    };

    let bytes = match (&file.bytes, path) {
        (Some(bytes), _) => bytes.to_vec(),
        (None, Some(path)) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to read dropped image {}: {}", path.display(), e);
                return None;
            }
        },
        (None, None) => return None,
    };

    Some((bytes, name, mime))
}

/// Floating window listing every registered image
#[derive(Debug, Default)]
pub struct ImageManagerWindow {
    pub open: bool,
}

impl ImageManagerWindow {
    pub fn show(ctx: &egui::Context, app: &mut NotiqApp) {
        let mut open = app.image_manager.open;
        let mut insert = None;
        let mut export = None;
        let mut remove = None;

        egui::Window::new("Image Manager")
            .open(&mut open)
            .default_width(420.0)
            .show(ctx, |ui| {
                let images = &app.context.images;
                if images.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading("No Images Yet");
                        ui.label("Drag and drop images into the editor to get started");
                    });
                    return;
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for asset in images.assets() {
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::Image::new(asset.url())
                                    .max_size(egui::vec2(64.0, 64.0))
                                    .maintain_aspect_ratio(true),
                            );
                            ui.vertical(|ui| {
                                ui.strong(&asset.name);
                                ui.label(format!(
                                    "{}  {}",
                                    format_bytes(asset.size),
                                    asset.format_label()
                                ));
                                ui.horizontal(|ui| {
                                    if ui.button("Insert").clicked() {
                                        insert = Some(asset.markdown());
                                    }
                                    if ui.button("Copy markdown").clicked() {
                                        ui.ctx().copy_text(asset.markdown());
                                    }
                                    if ui.button("Download").clicked() {
                                        export = Some(asset.id.clone());
                                    }
                                    if ui.button("Delete").clicked() {
                                        remove = Some(asset.id.clone());
                                    }
                                });
                            });
                        });
                        ui.separator();
                    }
                });
            });

        app.image_manager.open = open;

        if let Some(markdown) = insert {
            app.insert_text(&markdown);
            app.image_manager.open = false;
        }
        if let Some(id) = export {
            if let Some(asset) = app.context.images.get(&id) {
                let result = app
                    .context
                    .session
                    .export(&asset.name, &asset.mime_type, asset.bytes());
                if let Err(e) = result {
                    tracing::error!("Failed to export image {}: {}", id, e);
                }
            }
        }
        if let Some(id) = remove {
            app.context.images.remove(&id);
        }
    }
}
