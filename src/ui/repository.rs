//! Repository autocomplete field.
//!
//! Searching hits the GitHub API, so it only runs when the user presses
//! Enter. The menu under the field shows either a status line or the
//! ranked results; picking one selects it on the form.

use crate::editor::PostEditor;
use eframe::egui::{self, Color32, Key, RichText, Ui};

/// Draw the field and its menu.
///
/// Returns the query to search for when the user pressed Enter.
pub fn show_repository_field(ui: &mut Ui, editor: &mut PostEditor, is_dark: bool) -> Option<String> {
    let mut search = None;

    let mut query = editor.repository_query().to_string();
    let response = ui.add(
        egui::TextEdit::singleline(&mut query)
            .id(egui::Id::new("repository_field"))
            .hint_text("Github repository")
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        editor.set_repository_query(query);
    }
    if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
        search = editor.begin_repository_search();
    }

    let selected = editor
        .repository()
        .is_some_and(|r| r.full_name == editor.repository_query());

    if selected {
        if let Some(repository) = editor.repository() {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("✔ {}", repository.full_name))
                        .color(Color32::from_rgb(46, 160, 67)),
                );
                ui.hyperlink_to(RichText::new("view").small(), &repository.html_url);
            });
        }
    } else if !editor.repository_query().is_empty() {
        let menu_bg = if is_dark {
            Color32::from_rgb(40, 40, 45)
        } else {
            Color32::from_rgb(250, 250, 250)
        };

        egui::Frame::none()
            .fill(menu_bg)
            .inner_margin(egui::Margin::same(6.0))
            .rounding(egui::Rounding::same(4.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());

                let has_results = !editor.repository_results().is_empty();
                if let Some(message) = editor.repository_search().menu_message(has_results) {
                    ui.label(RichText::new(message).italics().weak());
                }

                let mut picked = None;
                for repository in editor.repository_results() {
                    let mut label = repository.full_name.clone();
                    if repository.fork {
                        label.push_str("  (fork)");
                    }
                    if ui
                        .selectable_label(false, label)
                        .on_hover_text(&repository.html_url)
                        .clicked()
                    {
                        picked = Some(repository.clone());
                    }
                }
                if let Some(repository) = picked {
                    editor.select_repository(repository);
                }
            });
    }

    search
}
