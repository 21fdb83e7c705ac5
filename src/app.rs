//! Main application state and UI coordination

use std::ops::Range;
use std::time::Instant;

use eframe::egui;

use crate::core::autosave::AutoSave;
use crate::core::backend::{Backend, Durability};
use crate::core::config::AppConfig;
use crate::core::error::{SessionError, SessionResult};
use crate::core::file_system::DesktopHost;
use crate::core::format::{self, Format};
use crate::core::host::Host;
use crate::core::recent::{RecentEntry, RecentRegistry};
use crate::core::render;
use crate::core::resources::{HandleAllocator, ResourceRegistry};
use crate::core::session::DocumentSession;
use crate::core::storage::{JsonFileStore, MemoryStore, PreferenceStore};
use crate::core::theme::{PreviewTheme, PREVIEW_THEMES};
use crate::ui::command_palette::{Command, CommandPalette};
use crate::ui::images::{self, EguiImageAllocator, ImageManagerWindow};
use crate::ui::{editor::EditorPanel, preview::PreviewPanel, sidebar::Sidebar, status_bar::StatusBar};

/// Everything the editor works on, constructed once at startup
pub struct EditorContext<H = DesktopHost> {
    pub session: DocumentSession<H>,
    pub images: ResourceRegistry,
    pub config: AppConfig,
    pub autosave: AutoSave,
}

impl EditorContext<DesktopHost> {
    /// Probe the desktop, load persisted state and build the managers
    pub fn init(config: AppConfig, allocator: Box<dyn HandleAllocator>) -> Self {
        let backend = Backend::select(DesktopHost::new(&config.persistence));

        let store: Box<dyn PreferenceStore> = match JsonFileStore::in_data_dir() {
            Some(store) => Box::new(store),
            None => {
                tracing::warn!("No data directory available, recent files will not persist");
                Box::new(MemoryStore::new())
            }
        };

        Self::new(backend, store, config, allocator)
    }
}

impl<H: Host> EditorContext<H> {
    pub fn new(
        backend: Backend<H>,
        store: Box<dyn PreferenceStore>,
        config: AppConfig,
        allocator: Box<dyn HandleAllocator>,
    ) -> Self {
        let recent = RecentRegistry::load(store);
        let autosave = AutoSave::new(config.editor.auto_save, config.editor.auto_save_delay());

        Self {
            session: DocumentSession::new(backend, recent),
            images: ResourceRegistry::new(allocator),
            config,
            autosave,
        }
    }

    /// Release every transient resource
    pub fn teardown(&mut self) {
        self.autosave.cancel();
        self.images.clear();
        tracing::info!("Editor context torn down");
    }
}

/// Message shown in the status bar after an operation
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct NotiqApp {
    /// Session, images and settings
    pub context: EditorContext,
    /// Editor text buffer, mirrored into the session on change
    pub buffer: String,
    /// Editor selection, in characters
    pub selection: Option<Range<usize>>,
    /// Selection the editor should show on its next frame
    pub pending_selection: Option<Range<usize>>,
    /// Last operation result
    pub status: Option<StatusMessage>,
    /// Image manager window
    pub image_manager: ImageManagerWindow,
    /// Ctrl+K command palette
    pub palette: CommandPalette,
    /// Whether sidebar is visible
    pub sidebar_visible: bool,
    /// Commonmark cache for preview
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
}

impl NotiqApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        });
        Self::apply_theme(&cc.egui_ctx, &config);

        let allocator = EguiImageAllocator::new(cc.egui_ctx.clone());
        let context = EditorContext::init(config, Box::new(allocator));

        Self {
            context,
            buffer: String::new(),
            selection: None,
            pending_selection: None,
            status: None,
            image_manager: ImageManagerWindow::default(),
            palette: CommandPalette::default(),
            sidebar_visible: true,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
        }
    }

    fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
        if config.ui.is_dark() {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
    }

    /// Copy the session content into the editor buffer
    fn sync_buffer(&mut self) {
        self.buffer = self.context.session.content().to_string();
        self.selection = None;
        self.pending_selection = None;
        self.context.autosave.cancel();
    }

    /// Push an editor edit into the session
    pub fn on_content_change(&mut self) {
        self.context.session.set_content(self.buffer.clone());
        self.context.autosave.note_change(Instant::now());
    }

    pub fn new_document(&mut self) {
        self.context.session.new_document();
        self.sync_buffer();
    }

    pub fn open(&mut self) {
        let result = self.context.session.open();
        if result.is_ok() {
            self.sync_buffer();
        }
        self.report("Opened", result);
    }

    /// Save, or ask for a destination when a handle could be obtained
    pub fn save(&mut self) {
        if self.context.session.save_needs_destination() {
            self.save_as();
            return;
        }
        let result = self.context.session.save();
        self.after_save(result);
    }

    pub fn save_as(&mut self) {
        let result = self.context.session.save_as();
        self.after_save(result);
    }

    fn after_save(&mut self, result: SessionResult<Durability>) {
        if result.is_ok() {
            self.context.autosave.cancel();
        }
        let label = match result {
            Ok(Durability::Unconfirmed) => "Download started for",
            _ => "Saved",
        };
        self.report(label, result);
    }

    pub fn open_recent(&mut self, entry: &RecentEntry) {
        let result = self.context.session.open_recent(entry);
        if result.is_ok() {
            self.sync_buffer();
        }
        self.report("Opened", result);
    }

    pub fn remove_recent(&mut self, path: &str) {
        self.context.session.remove_recent(path);
    }

    /// Render the document to a self-contained HTML page and download it
    pub fn export_html(&mut self) {
        let Some(doc) = self.context.session.current() else {
            return;
        };
        let images = &self.context.images;
        let body = render::to_html(&doc.content, &self.context.config.export, |dest| {
            images.get(dest).map(|asset| asset.data_uri())
        });
        let theme = PreviewTheme::by_id(&self.context.config.preview.theme);
        let page = render::html_document(doc.title(), &body, theme);
        let name = format!("{}.html", doc.title());

        let result = self
            .context
            .session
            .export(&name, "text/html", page.as_bytes());
        self.report("Exported", result);
    }

    /// Insert markdown after the selection, or at the end without one
    pub fn insert_text(&mut self, text: &str) {
        if self.context.session.current().is_none() {
            self.new_document();
        }
        let at = self.selection.as_ref().map(|s| s.end);
        let byte_index = at
            .and_then(|chars| self.buffer.char_indices().nth(chars).map(|(i, _)| i))
            .unwrap_or(self.buffer.len());
        self.buffer.insert_str(byte_index, text);
        if let Some(at) = at {
            let after = at + text.chars().count();
            self.selection = Some(after..after);
        }
        self.on_content_change();
    }

    /// Wrap the selection in markdown and select the wrapped text
    pub fn apply_format(&mut self, format: Format) {
        if self.context.session.current().is_none() {
            self.new_document();
        }
        let selection = self.selection.clone().unwrap_or_else(|| {
            let end = self.buffer.chars().count();
            end..end
        });
        let edit = format::apply(&self.buffer, selection, format);
        self.buffer = edit.text;
        self.selection = Some(edit.selection.clone());
        self.pending_selection = Some(edit.selection);
        self.on_content_change();
    }

    pub fn set_preview_theme(&mut self, id: &str) {
        self.context.config.preview.theme = id.to_string();
    }

    /// Run a command picked in the palette
    pub fn run_command(&mut self, command: Command) {
        match command {
            Command::NewFile => self.new_document(),
            Command::OpenFile => self.open(),
            Command::Save if self.context.session.can_persist() => self.save(),
            Command::SaveAs if self.context.session.can_persist() => self.save_as(),
            Command::ExportHtml => self.export_html(),
            Command::Save | Command::SaveAs => {}
            Command::TogglePreview => {
                self.context.config.preview.visible = !self.context.config.preview.visible;
            }
            Command::ToggleSidebar => self.sidebar_visible = !self.sidebar_visible,
            Command::ToggleStatistics => {
                self.context.config.preview.show_stats = !self.context.config.preview.show_stats;
            }
            Command::ToggleToolbar => {
                self.context.config.editor.show_toolbar = !self.context.config.editor.show_toolbar;
            }
            Command::ImageManager => self.image_manager.open = true,
            Command::Theme(id) => self.set_preview_theme(id),
            Command::Format(format) => self.apply_format(format),
        }
    }

    /// Add dropped image files to the registry and embed them
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let Some((bytes, name, mime)) = images::read_dropped_image(&file) else {
                continue;
            };
            let markdown = self.context.images.add(bytes, &name, &mime).markdown();
            self.insert_text(&format!("{markdown}\n"));
        }
    }

    /// Show an operation result in the status bar
    fn report<T>(&mut self, done: &str, result: SessionResult<T>) {
        self.status = match result {
            Ok(_) => {
                let name = self
                    .context
                    .session
                    .current()
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                Some(StatusMessage {
                    text: format!("{done} {name}"),
                    is_error: false,
                })
            }
            Err(e) if e.is_cancellation() => return,
            Err(e @ SessionError::UnsupportedOperation(_)) => Some(StatusMessage {
                text: format!("{e}. Use Open... to pick the file again."),
                is_error: false,
            }),
            Err(e) => Some(StatusMessage {
                text: e.to_string(),
                is_error: true,
            }),
        };
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        let save_as = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::S));
        let save = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::S));
        let new = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::N));
        let open = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::O));
        let preview = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::P));
        let palette = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::K));

        match save_shortcut(save, save_as, self.context.session.can_persist()) {
            Some(Command::SaveAs) => self.save_as(),
            Some(_) => self.save(),
            None => {}
        }
        if new {
            self.new_document();
        }
        if open {
            self.open();
        }
        if preview {
            self.run_command(Command::TogglePreview);
        }
        if palette {
            self.palette.toggle();
        }
    }

    fn run_autosave(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.context.autosave.poll(now)
            && self.context.session.is_modified()
            && self.context.session.can_write_back()
        {
            tracing::debug!("Auto-saving");
            let result = self.context.session.save();
            self.after_save(result);
        }
        if let Some(remaining) = self.context.autosave.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.new_document();
                        ui.close();
                    }
                    if ui.button("Open...").clicked() {
                        self.open();
                        ui.close();
                    }
                    let can_persist = self.context.session.can_persist();
                    if ui.add_enabled(can_persist, egui::Button::new("Save")).clicked() {
                        self.save();
                        ui.close();
                    }
                    if ui.add_enabled(can_persist, egui::Button::new("Save As...")).clicked() {
                        self.save_as();
                        ui.close();
                    }
                    ui.separator();
                    if ui.add_enabled(can_persist, egui::Button::new("Export HTML")).clicked() {
                        self.export_html();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Command Palette").clicked() {
                        self.palette.toggle();
                        ui.close();
                    }
                    if ui.button("Toggle Sidebar").clicked() {
                        self.sidebar_visible = !self.sidebar_visible;
                        ui.close();
                    }
                    ui.checkbox(&mut self.context.config.editor.show_toolbar, "Formatting Toolbar");
                    let preview = &mut self.context.config.preview;
                    ui.checkbox(&mut preview.visible, "Preview");
                    ui.checkbox(&mut preview.show_stats, "Statistics");
                    ui.menu_button("Preview Theme", |ui| {
                        for theme in PREVIEW_THEMES.iter() {
                            let selected = self.context.config.preview.theme == theme.id;
                            if ui.selectable_label(selected, theme.name).clicked() {
                                self.set_preview_theme(theme.id);
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    let mut dark = self.context.config.ui.is_dark();
                    if ui.checkbox(&mut dark, "Dark Theme").changed() {
                        self.context.config.ui.theme = if dark { "dark" } else { "light" }.to_string();
                        Self::apply_theme(ctx, &self.context.config);
                    }
                });

                ui.menu_button("Settings", |ui| {
                    let mut enabled = self.context.autosave.is_enabled();
                    if ui.checkbox(&mut enabled, "Auto-save").changed() {
                        self.context.autosave.set_enabled(enabled);
                        self.context.config.editor.auto_save = enabled;
                    }
                    ui.separator();
                    ui.label("HTML export");
                    let export = &mut self.context.config.export;
                    ui.checkbox(&mut export.gfm, "GitHub Flavored Markdown");
                    ui.checkbox(&mut export.math, "Math");
                    ui.checkbox(&mut export.breaks, "Line breaks");
                    ui.checkbox(&mut export.heading_attributes, "Heading attributes");
                    ui.checkbox(&mut export.smart_punctuation, "Smart punctuation");
                });

                if ui
                    .button(format!("Images ({})", self.context.images.len()))
                    .clicked()
                {
                    self.image_manager.open = !self.image_manager.open;
                }
            });
        });
    }
}

/// Which save command a Ctrl+S / Ctrl+Shift+S press runs; none without a document
fn save_shortcut(save: bool, save_as: bool, can_persist: bool) -> Option<Command> {
    if !can_persist {
        None
    } else if save_as {
        Some(Command::SaveAs)
    } else if save {
        Some(Command::Save)
    } else {
        None
    }
}

impl eframe::App for NotiqApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);
        self.run_autosave(ctx);

        // Render menu bar
        self.render_menu_bar(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            StatusBar::show(ui, self);
        });

        if self.sidebar_visible {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(self.context.config.ui.sidebar_width)
                .min_width(150.0)
                .show(ctx, |ui| {
                    Sidebar::show(ui, self);
                });
        }

        ImageManagerWindow::show(ctx, self);
        CommandPalette::show(ctx, self);

        // Render main content area
        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.context.config.preview.visible {
                EditorPanel::show(ui, self);
                return;
            }

            // Split view: editor on left, preview on right
            let available_width = ui.available_width();
            ui.horizontal(|ui| {
                ui.set_min_width(available_width);

                ui.vertical(|ui| {
                    ui.set_width(available_width / 2.0 - 4.0);
                    EditorPanel::show(ui, self);
                });

                ui.separator();

                ui.vertical(|ui| {
                    ui.set_width(available_width / 2.0 - 4.0);
                    PreviewPanel::show(ui, self);
                });
            });
        });
    }
}

impl Drop for NotiqApp {
    fn drop(&mut self) {
        self.context.teardown();
        if let Err(e) = self.context.config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }
}
