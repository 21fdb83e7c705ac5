//! Markdown editor panel with formatting toolbar

use eframe::egui;

use crate::app::NotiqApp;
use crate::core::format::Format;

/// Markdown editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut NotiqApp) {
        if app.context.session.current().is_none() {
            Self::show_welcome(ui, app);
            return;
        }

        if app.context.config.editor.show_toolbar {
            Self::show_toolbar(ui, app);
            ui.separator();
        }

        let font_size = app.context.config.editor.font_size;
        let id = egui::Id::new("notiq_editor");

        if let Some(range) = app.pending_selection.take() {
            Self::select(ui.ctx(), id, range);
        }

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .show(ui, |ui| {
                let output = egui::TextEdit::multiline(&mut app.buffer)
                    .id(id)
                    .code_editor()
                    .font(egui::FontId::monospace(font_size))
                    .hint_text("Start writing your markdown here...")
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .show(ui);

                if let Some(range) = output.cursor_range {
                    let (a, b) = (range.primary.index, range.secondary.index);
                    app.selection = Some(a.min(b)..a.max(b));
                }
                if output.response.changed() {
                    app.on_content_change();
                }
            });
    }

    /// Move the editor selection to the character range `range` and focus it
    fn select(ctx: &egui::Context, id: egui::Id, range: std::ops::Range<usize>) {
        if let Some(mut state) = egui::TextEdit::load_state(ctx, id) {
            if let Some(mut current) = state.cursor.char_range() {
                current.secondary.index = range.start;
                current.primary.index = range.end;
                state.cursor.set_char_range(Some(current));
                state.store(ctx, id);
            }
        }
        ctx.memory_mut(|mem| mem.request_focus(id));
    }

    fn show_toolbar(ui: &mut egui::Ui, app: &mut NotiqApp) {
        let mut clicked = None;
        ui.horizontal_wrapped(|ui| {
            for (index, format) in Format::ALL.into_iter().enumerate() {
                // Separators between inline, heading, block and link groups
                if matches!(index, 4 | 7 | 10) {
                    ui.separator();
                }
                if ui
                    .small_button(format.label())
                    .on_hover_text(format.title())
                    .clicked()
                {
                    clicked = Some(format);
                }
            }
        });
        if let Some(format) = clicked {
            app.apply_format(format);
        }
    }

    /// Show welcome screen when no document is open
    fn show_welcome(ui: &mut egui::Ui, app: &mut NotiqApp) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading("Welcome to Notiq");
            ui.add_space(20.0);

            if ui.button("New document").clicked() {
                app.new_document();
            }
            if ui.button("Open...").clicked() {
                app.open();
            }
            ui.add_space(10.0);

            ui.label("Keyboard shortcuts:");
            ui.label("  Ctrl+N - New");
            ui.label("  Ctrl+O - Open");
            ui.label("  Ctrl+S - Save");
            ui.label("  Ctrl+Shift+S - Save As");
            ui.label("  Ctrl+P - Toggle preview");
            ui.label("  Ctrl+K - Command palette");
            ui.add_space(10.0);
            ui.label("Drop images onto the window to embed them.");
        });
    }
}
