//! Ctrl+K command palette

use eframe::egui;

use crate::app::NotiqApp;
use crate::core::format::Format;
use crate::core::theme::PREVIEW_THEMES;

/// Something the palette can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewFile,
    OpenFile,
    Save,
    SaveAs,
    ExportHtml,
    TogglePreview,
    ToggleSidebar,
    ToggleStatistics,
    ToggleToolbar,
    ImageManager,
    Theme(&'static str),
    Format(Format),
}

#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub command: Command,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub shortcut: Option<&'static str>,
}

impl CommandEntry {
    fn new(command: Command, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command,
            title: title.into(),
            description: description.into(),
            keywords: Vec::new(),
            shortcut: None,
        }
    }

    fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    fn shortcut(mut self, shortcut: &'static str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Case-insensitive match on title, description or any keyword
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.keywords.iter().any(|k| k.contains(&query))
    }
}

/// Every command, with titles reflecting the current view
pub fn commands(preview_visible: bool) -> Vec<CommandEntry> {
    let mut entries = vec![
        CommandEntry::new(Command::NewFile, "New File", "Create a new markdown file")
            .keywords(&["new", "create", "file"])
            .shortcut("Ctrl+N"),
        CommandEntry::new(Command::OpenFile, "Open File", "Open an existing markdown file")
            .keywords(&["open", "file", "load"])
            .shortcut("Ctrl+O"),
        CommandEntry::new(Command::Save, "Save File", "Save the current file")
            .keywords(&["save", "file"])
            .shortcut("Ctrl+S"),
        CommandEntry::new(Command::SaveAs, "Save As", "Save the file with a new name")
            .keywords(&["save", "as", "export"])
            .shortcut("Ctrl+Shift+S"),
        CommandEntry::new(Command::ExportHtml, "Export HTML", "Download the rendered document")
            .keywords(&["export", "html", "download"]),
        if preview_visible {
            CommandEntry::new(Command::TogglePreview, "Hide Preview", "Hide the markdown preview")
        } else {
            CommandEntry::new(Command::TogglePreview, "Show Preview", "Show the markdown preview")
        }
        .keywords(&["preview", "toggle", "view"])
        .shortcut("Ctrl+P"),
        CommandEntry::new(Command::ToggleSidebar, "Toggle Sidebar", "Show or hide the sidebar")
            .keywords(&["sidebar", "recent", "view"]),
        CommandEntry::new(Command::ToggleStatistics, "Toggle Statistics", "Show or hide document statistics")
            .keywords(&["stats", "statistics", "words"]),
        CommandEntry::new(Command::ToggleToolbar, "Toggle Formatting Toolbar", "Show or hide the formatting toolbar")
            .keywords(&["toolbar", "format"]),
        CommandEntry::new(Command::ImageManager, "Image Manager", "Browse, insert and delete images")
            .keywords(&["image", "images", "assets"]),
    ];

    entries.extend(PREVIEW_THEMES.iter().map(|theme| {
        CommandEntry::new(
            Command::Theme(theme.id),
            format!("Switch to {}", theme.name),
            format!("Change theme to {}", theme.name),
        )
        .keywords(&["theme", theme.name.to_lowercase().as_str(), "switch"])
    }));

    entries.extend(Format::ALL.iter().map(|&format| {
        CommandEntry::new(
            Command::Format(format),
            format!("Format: {}", format.title()),
            format!("Insert {} markdown", format.title().to_lowercase()),
        )
        .keywords(&["format", "insert"])
    }));

    entries
}

/// Entries matching `query`, in their original order
pub fn filter(entries: Vec<CommandEntry>, query: &str) -> Vec<CommandEntry> {
    entries.into_iter().filter(|e| e.matches(query)).collect()
}

/// Palette window state
#[derive(Debug, Default)]
pub struct CommandPalette {
    pub open: bool,
    query: String,
    selected: usize,
}

impl CommandPalette {
    pub fn toggle(&mut self) {
        self.open = !self.open;
        self.query.clear();
        self.selected = 0;
    }

    pub fn show(ctx: &egui::Context, app: &mut NotiqApp) {
        if !app.palette.open {
            return;
        }

        let entries = filter(commands(app.context.config.preview.visible), &app.palette.query);
        let palette = &mut app.palette;
        palette.selected = palette.selected.min(entries.len().saturating_sub(1));

        let (down, up, enter, escape) = ctx.input_mut(|i| {
            (
                i.consume_key(egui::Modifiers::NONE, egui::Key::ArrowDown),
                i.consume_key(egui::Modifiers::NONE, egui::Key::ArrowUp),
                i.consume_key(egui::Modifiers::NONE, egui::Key::Enter),
                i.consume_key(egui::Modifiers::NONE, egui::Key::Escape),
            )
        });
        if !entries.is_empty() {
            if down {
                palette.selected = (palette.selected + 1) % entries.len();
            }
            if up {
                palette.selected = (palette.selected + entries.len() - 1) % entries.len();
            }
        }

        let mut chosen = if enter {
            entries.get(palette.selected).map(|e| e.command)
        } else {
            None
        };

        egui::Window::new("Command Palette")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_TOP, [0.0, 60.0])
            .default_width(480.0)
            .show(ctx, |ui| {
                let before = palette.query.clone();
                ui.add(
                    egui::TextEdit::singleline(&mut palette.query)
                        .hint_text("Type a command or search...")
                        .desired_width(f32::INFINITY),
                )
                .request_focus();
                if palette.query != before {
                    palette.selected = 0;
                }
                ui.separator();

                if entries.is_empty() {
                    ui.weak("No commands found");
                    return;
                }

                egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    for (index, entry) in entries.iter().enumerate() {
                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(index == palette.selected, &entry.title)
                                .on_hover_text(&entry.description)
                                .clicked()
                            {
                                chosen = Some(entry.command);
                            }
                            if let Some(shortcut) = entry.shortcut {
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    ui.weak(shortcut);
                                });
                            }
                        });
                    }
                });
            });

        if escape {
            palette.open = false;
        }
        if let Some(command) = chosen {
            palette.open = false;
            app.run_command(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_lists_everything() {
        let all = commands(true);
        let count = all.len();
        assert_eq!(filter(all, "  ").len(), count);
        assert!(count >= 10 + PREVIEW_THEMES.len() + Format::ALL.len());
    }

    #[test]
    fn test_query_matches_title_description_and_keywords() {
        let titles = |query: &str| -> Vec<String> {
            filter(commands(true), query)
                .into_iter()
                .map(|e| e.title)
                .collect()
        };

        assert!(titles("SAVE").contains(&"Save File".to_string()));
        assert!(titles("load").contains(&"Open File".to_string()));
        assert!(titles("existing").contains(&"Open File".to_string()));
        assert_eq!(titles("dracula"), vec!["Switch to Dracula".to_string()]);
        assert!(titles("zzz-nothing").is_empty());
    }

    #[test]
    fn test_preview_title_follows_visibility() {
        let hide = filter(commands(true), "preview");
        assert_eq!(hide[0].title, "Hide Preview");
        let show = filter(commands(false), "preview");
        assert_eq!(show[0].title, "Show Preview");
        assert_eq!(show[0].shortcut, Some("Ctrl+P"));
    }
}
