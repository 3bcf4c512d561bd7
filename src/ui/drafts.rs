//! Drafts window.
//!
//! Lists saved drafts, newest first, with actions to open or discard each
//! one and to start a new post.

use crate::drafts::PostDraft;
use chrono::{Local, TimeZone};
use eframe::egui::{self, Key, RichText};

/// Action requested from the drafts window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftsAction {
    Open(String),
    Discard(String),
    NewPost,
    Close,
}

/// Show the drafts window.
pub fn show_drafts_window(
    ctx: &egui::Context,
    drafts: &[PostDraft],
    current_id: &str,
) -> Option<DraftsAction> {
    let mut action = None;

    if ctx.input(|i| i.key_pressed(Key::Escape)) {
        return Some(DraftsAction::Close);
    }

    let mut open = true;
    egui::Window::new("🗂 Drafts")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(460.0)
        .default_height(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if ui.button("📄 New post").clicked() {
                action = Some(DraftsAction::NewPost);
            }
            ui.separator();

            if drafts.is_empty() {
                ui.label(RichText::new("No drafts yet").italics().weak());
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for draft in drafts {
                    ui.horizontal(|ui| {
                        let is_current = draft.id == current_id;
                        let mut title = RichText::new(draft.display_title());
                        if is_current {
                            title = title.strong();
                        }
                        if ui
                            .selectable_label(is_current, title)
                            .on_hover_text(draft_summary(draft))
                            .clicked()
                        {
                            action = Some(DraftsAction::Open(draft.id.clone()));
                        }

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .small_button("🗑")
                                .on_hover_text("Discard draft")
                                .clicked()
                            {
                                action = Some(DraftsAction::Discard(draft.id.clone()));
                            }
                            ui.label(RichText::new(format_timestamp(draft.last_updated)).weak());
                            if draft.is_updating {
                                ui.label(RichText::new("edit").small().weak());
                            }
                        });
                    });
                }
            });
        });

    if !open {
        action = Some(DraftsAction::Close);
    }
    action
}

fn draft_summary(draft: &PostDraft) -> String {
    let mut summary = String::new();
    if !draft.topics.is_empty() {
        summary.push_str(&draft.topics.join(", "));
    }
    if let Some(repository) = &draft.repository {
        if !summary.is_empty() {
            summary.push_str(" · ");
        }
        summary.push_str(&repository.full_name);
    }
    if summary.is_empty() {
        summary.push_str("No tags or repository");
    }
    summary
}

/// Local time of a draft save, or an empty string for unsaved drafts.
fn format_timestamp(seconds: i64) -> String {
    if seconds <= 0 {
        return String::new();
    }
    Local
        .timestamp_opt(seconds, 0)
        .single()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
