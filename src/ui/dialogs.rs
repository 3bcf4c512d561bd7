//! Modal dialogs.
//!
//! The blocking alert shown when publishing fails, and the dialog that
//! loads a published post for editing.

use crate::post::parse_post_reference;
use crate::state::Alert;
use eframe::egui::{self, Color32, Key, RichText};

/// Show a blocking alert. Returns `true` once it is dismissed.
pub fn show_alert(ctx: &egui::Context, alert: &Alert) -> bool {
    let mut dismissed = false;

    if ctx.input(|i| i.key_pressed(Key::Escape) || i.key_pressed(Key::Enter)) {
        return true;
    }

    egui::Window::new(format!("⚠ {}", alert.title))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.label(&alert.message);
            ui.add_space(12.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

    dismissed
}

/// Result from showing the edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPostResult {
    /// No action taken (dialog still open)
    None,
    /// Dialog was cancelled
    Cancelled,
    /// Load the post at `author/permlink`
    Load { author: String, permlink: String },
}

/// Dialog asking for the URL of a published post.
#[derive(Debug, Clone, Default)]
pub struct EditPostDialog {
    url_input: String,
    error_message: Option<String>,
}

impl EditPostDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog and return the result.
    pub fn show(&mut self, ctx: &egui::Context, loading: bool) -> EditPostResult {
        let mut result = EditPostResult::None;

        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            return EditPostResult::Cancelled;
        }

        egui::Window::new("✏ Edit a Published Post")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .order(egui::Order::Foreground)
            .min_width(420.0)
            .show(ctx, |ui| {
                ui.label("Post URL or @author/permlink:");
                ui.add_space(4.0);

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.url_input)
                        .hint_text("https://utopian.io/utopian-io/@author/permlink")
                        .desired_width(f32::INFINITY),
                );
                if response.changed() {
                    self.error_message = None;
                }

                if let Some(error) = &self.error_message {
                    ui.add_space(4.0);
                    ui.label(RichText::new(error).color(Color32::from_rgb(220, 80, 80)));
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let submitted =
                            response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                        let label = if loading { "Loading..." } else { "Load" };
                        let clicked = ui
                            .add_enabled(!loading, egui::Button::new(label))
                            .clicked();

                        if (clicked || submitted) && !loading {
                            match parse_post_reference(&self.url_input) {
                                Some((author, permlink)) => {
                                    result = EditPostResult::Load { author, permlink };
                                }
                                None => {
                                    self.error_message =
                                        Some("Enter a post URL like .../@author/permlink".into());
                                }
                            }
                        }

                        if ui.button("Cancel").clicked() {
                            result = EditPostResult::Cancelled;
                        }
                    });
                });
            });

        result
    }

    /// Show an error under the input, e.g. when loading failed.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Clear the input for the next use.
    pub fn reset(&mut self) {
        self.url_input.clear();
        self.error_message = None;
    }
}
