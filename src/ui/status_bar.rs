//! File status bar: path, access mode and save state

use eframe::egui;

use crate::app::NotiqApp;

pub struct StatusBar;

impl StatusBar {
    pub fn show(ui: &mut egui::Ui, app: &mut NotiqApp) {
        ui.horizontal(|ui| {
            let session = &app.context.session;
            if let Some(doc) = session.current() {
                ui.label(egui::RichText::new(&doc.path).monospace())
                    .on_hover_text(&doc.name);
            }

            if let Some(status) = &app.status {
                let color = if status.is_error {
                    ui.visuals().error_fg_color
                } else {
                    ui.visuals().weak_text_color()
                };
                ui.separator();
                ui.colored_label(color, &status.text);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if session.current().is_some() {
                    if session.is_modified() {
                        ui.label(egui::RichText::new("Modified").strong());
                    } else {
                        ui.label("Saved");
                    }
                }
                if !session.has_capability_access() {
                    ui.label(egui::RichText::new("Limited File Access").italics())
                        .on_hover_text("Files are imported once and saved as downloads");
                }
            });
        });
    }
}
