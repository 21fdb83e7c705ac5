//! Sidebar with recent documents and document statistics

use eframe::egui;

use crate::app::NotiqApp;
use crate::core::stats::DocumentStats;

/// Sidebar with recent files and additional panels
pub struct Sidebar;

impl Sidebar {
    /// Show the sidebar
    pub fn show(ui: &mut egui::Ui, app: &mut NotiqApp) {
        egui::ScrollArea::vertical()
            .id_salt("sidebar_scroll")
            .show(ui, |ui| {
                Self::show_recent(ui, app);

                if app.context.config.preview.show_stats {
                    ui.separator();
                    Self::show_stats(ui, app);
                }
            });
    }

    fn show_recent(ui: &mut egui::Ui, app: &mut NotiqApp) {
        ui.heading("Recent Files");

        let entries = app.context.session.recent().entries().to_vec();
        if entries.is_empty() {
            ui.weak("No recent files");
            return;
        }

        let capability = app.context.session.has_capability_access();
        let current_path = app.context.session.current().map(|d| d.path.clone());

        for entry in entries {
            let can_reopen = capability && entry.handle.is_some();
            let is_current = current_path.as_deref() == Some(entry.path.as_str());

            ui.horizontal(|ui| {
                let clicked = ui
                    .add_enabled_ui(can_reopen, |ui| {
                        ui.selectable_label(is_current, &entry.name)
                            .on_hover_text(&entry.path)
                            .on_disabled_hover_text("Reopening needs native file access")
                            .clicked()
                    })
                    .inner;
                if clicked {
                    app.open_recent(&entry);
                }

                if ui.small_button("x").on_hover_text("Remove from list").clicked() {
                    app.remove_recent(&entry.path);
                }
            });
        }
    }

    fn show_stats(ui: &mut egui::Ui, app: &mut NotiqApp) {
        ui.heading("Statistics");

        let stats = DocumentStats::compute(app.context.session.content());
        let minutes = stats.reading_time_minutes;

        egui::Grid::new("stats_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                let rows = [
                    ("Words", stats.words),
                    ("Characters", stats.characters),
                    ("No spaces", stats.characters_no_spaces),
                    ("Lines", stats.lines),
                    ("Paragraphs", stats.paragraphs),
                    ("Headings", stats.headings),
                    ("Images", stats.images),
                    ("Links", stats.links),
                    ("Code blocks", stats.code_blocks),
                ];
                for (label, value) in rows {
                    ui.label(label);
                    ui.label(value.to_string());
                    ui.end_row();
                }
                ui.label("Reading time");
                ui.label(format!("{} min{}", minutes, if minutes == 1 { "" } else { "s" }));
                ui.end_row();
            });
    }
}
