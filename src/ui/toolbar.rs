//! Toolbar UI Component
//!
//! Icon buttons above the post form: post management on the left, the
//! markdown shortcuts in the middle and view/export actions on the right.

use crate::markdown::MarkdownShortcut;
use eframe::egui::{self, Color32, Response, RichText, Ui, Vec2};

/// Height of the toolbar.
const TOOLBAR_HEIGHT: f32 = 36.0;

/// Size of icon buttons.
const ICON_BUTTON_SIZE: Vec2 = Vec2::new(32.0, 28.0);

/// Actions that can be triggered from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    /// Start a new post
    NewPost,
    /// Show the drafts window
    OpenDrafts,
    /// Load a published post for editing
    EditExisting,
    /// Apply a markdown shortcut at the cursor
    Insert(MarkdownShortcut),
    /// Pick images from disk and upload them
    UploadImages,
    /// Upload an image from the clipboard
    PasteImage,
    /// Show or hide the preview pane
    TogglePreview,
    /// Open the rendered post in the browser
    OpenInBrowser,
    /// Copy the rendered post as HTML
    CopyAsHtml,
    /// Open the settings panel
    OpenSettings,
}

/// Render the toolbar and return any triggered action.
pub fn show_toolbar(
    ui: &mut Ui,
    is_dark: bool,
    show_preview: bool,
    image_uploading: bool,
) -> Option<ToolbarAction> {
    let mut action = None;

    let separator_color = if is_dark {
        Color32::from_rgb(70, 70, 70)
    } else {
        Color32::from_rgb(210, 210, 210)
    };

    ui.horizontal(|ui| {
        ui.set_height(TOOLBAR_HEIGHT);
        ui.spacing_mut().item_spacing.x = 2.0;

        if icon_button(ui, "📄", "New post", true, is_dark).clicked() {
            action = Some(ToolbarAction::NewPost);
        }
        if icon_button(ui, "🗂", "Drafts", true, is_dark).clicked() {
            action = Some(ToolbarAction::OpenDrafts);
        }
        if icon_button(ui, "✏", "Edit a published post", true, is_dark).clicked() {
            action = Some(ToolbarAction::EditExisting);
        }

        ui.add_space(4.0);
        vertical_separator(ui, separator_color, TOOLBAR_HEIGHT - 8.0);
        ui.add_space(4.0);

        for shortcut in MarkdownShortcut::ALL {
            if format_button(ui, shortcut.icon(), &shortcut.tooltip(), is_dark).clicked() {
                action = Some(ToolbarAction::Insert(shortcut));
            }
        }

        ui.add_space(4.0);
        vertical_separator(ui, separator_color, TOOLBAR_HEIGHT - 8.0);
        ui.add_space(4.0);

        let can_upload = !image_uploading;
        if icon_button(ui, "📤", "Upload images", can_upload, is_dark).clicked() {
            action = Some(ToolbarAction::UploadImages);
        }
        if icon_button(ui, "📋", "Paste image (Ctrl+Shift+V)", can_upload, is_dark).clicked() {
            action = Some(ToolbarAction::PasteImage);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if icon_button(ui, "⚙", "Settings (Ctrl+,)", true, is_dark).clicked() {
                action = Some(ToolbarAction::OpenSettings);
            }
            if icon_button(ui, "🌐", "Open in browser", true, is_dark).clicked() {
                action = Some(ToolbarAction::OpenInBrowser);
            }
            if icon_button(ui, "📑", "Copy as HTML", true, is_dark).clicked() {
                action = Some(ToolbarAction::CopyAsHtml);
            }
            let preview_tooltip = if show_preview {
                "Hide preview"
            } else {
                "Show preview"
            };
            if icon_button(ui, "👁", preview_tooltip, true, is_dark).clicked() {
                action = Some(ToolbarAction::TogglePreview);
            }
        });
    });

    action
}

fn text_color(enabled: bool, is_dark: bool) -> Color32 {
    if enabled {
        if is_dark {
            Color32::from_rgb(220, 220, 220)
        } else {
            Color32::from_rgb(50, 50, 50)
        }
    } else if is_dark {
        Color32::from_rgb(100, 100, 100)
    } else {
        Color32::from_rgb(160, 160, 160)
    }
}

fn hover_color(is_dark: bool) -> Color32 {
    if is_dark {
        Color32::from_rgb(60, 60, 60)
    } else {
        Color32::from_rgb(220, 220, 220)
    }
}

fn icon_button(ui: &mut Ui, icon: &str, tooltip: &str, enabled: bool, is_dark: bool) -> Response {
    let btn = ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(" ").size(16.0))
            .frame(false)
            .min_size(ICON_BUTTON_SIZE),
    );

    if btn.hovered() && enabled {
        ui.painter()
            .rect_filled(btn.rect, egui::Rounding::same(3.0), hover_color(is_dark));
    }

    // The gear renders higher than emoji
    let y_offset = if icon == "⚙" { 2.0 } else { 0.0 };
    let icon_pos = egui::pos2(btn.rect.center().x, btn.rect.center().y + y_offset);

    ui.painter().text(
        icon_pos,
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(16.0),
        text_color(enabled, is_dark),
    );

    btn.on_hover_text(tooltip)
}

fn format_button(ui: &mut Ui, icon: &str, tooltip: &str, is_dark: bool) -> Response {
    let text = RichText::new(icon)
        .size(12.0)
        .strong()
        .color(text_color(true, is_dark));

    let btn = ui.add(
        egui::Button::new(text)
            .frame(false)
            .min_size(Vec2::new(24.0, 22.0)),
    );

    if btn.hovered() {
        ui.painter()
            .rect_filled(btn.rect, egui::Rounding::same(3.0), hover_color(is_dark));
        // Repaint the label over the hover fill
        ui.painter().text(
            btn.rect.center(),
            egui::Align2::CENTER_CENTER,
            icon,
            egui::FontId::proportional(12.0),
            text_color(true, is_dark),
        );
    }

    btn.on_hover_text(tooltip)
}

fn vertical_separator(ui: &mut Ui, color: Color32, height: f32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(1.0, height), egui::Sense::hover());
    ui.painter().rect_filled(rect, 0.0, color);
}
