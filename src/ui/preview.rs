//! Markdown preview panel using egui_commonmark

use eframe::egui;
use egui_commonmark::CommonMarkViewer;

use crate::app::NotiqApp;
use crate::core::document::strip_frontmatter;
use crate::core::theme::{PreviewTheme, Rgb};

fn color([r, g, b]: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

/// Markdown preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, app: &mut NotiqApp) {
        // Resolve image ids before borrowing the cache
        let content = app.context.session.current().map(|doc| {
            app.context
                .images
                .resolve_links(strip_frontmatter(&doc.content))
                .into_owned()
        });
        let theme = PreviewTheme::by_id(&app.context.config.preview.theme);

        egui::Frame::new()
            .fill(color(theme.background))
            .inner_margin(8.0)
            .show(ui, |ui| {
                Self::apply_theme(ui, theme);
                egui::ScrollArea::vertical()
                    .id_salt("preview_scroll")
                    .show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        if let Some(content) = content {
                            CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, &content);
                        } else {
                            Self::show_empty(ui);
                        }
                    });
            });
    }

    fn apply_theme(ui: &mut egui::Ui, theme: &PreviewTheme) {
        let visuals = ui.visuals_mut();
        visuals.dark_mode = theme.dark;
        visuals.override_text_color = Some(color(theme.text));
        visuals.hyperlink_color = color(theme.link);
        visuals.code_bg_color = color(theme.code_background);
        visuals.extreme_bg_color = color(theme.code_background);
        visuals.widgets.noninteractive.bg_stroke.color = color(theme.border);
        visuals.widgets.noninteractive.fg_stroke.color = color(theme.blockquote);
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("No document open");
            ui.label("Create or open a markdown file to see the preview");
        });
    }
}
