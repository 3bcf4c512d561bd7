//! Read-only markdown preview.
//!
//! Draws the `PreviewBlock` tree produced by the markdown module with
//! native egui widgets. Links open in the browser; images show as a link
//! to the uploaded file with their alt text.

use crate::config::Theme;
use crate::markdown::{PreviewBlock, Span};
use eframe::egui::{self, Color32, FontId, RichText, Ui, Vec2};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Theme-aware colors for the preview.
#[derive(Debug, Clone)]
pub struct PreviewColors {
    pub text: Color32,
    pub heading: Color32,
    pub code_bg: Color32,
    pub code_text: Color32,
    pub quote_border: Color32,
    pub quote_text: Color32,
    pub link: Color32,
    pub hr: Color32,
    pub list_marker: Color32,
    pub muted: Color32,
}

impl PreviewColors {
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color32::from_rgb(220, 220, 220),
            heading: Color32::from_rgb(100, 180, 255),
            code_bg: Color32::from_rgb(45, 45, 45),
            code_text: Color32::from_rgb(200, 200, 150),
            quote_border: Color32::from_rgb(80, 80, 80),
            quote_text: Color32::from_rgb(180, 180, 180),
            link: Color32::from_rgb(100, 180, 255),
            hr: Color32::from_rgb(80, 80, 80),
            list_marker: Color32::from_rgb(150, 150, 150),
            muted: Color32::from_rgb(130, 130, 130),
        }
    }

    pub fn light() -> Self {
        Self {
            text: Color32::from_rgb(30, 30, 30),
            heading: Color32::from_rgb(0, 100, 180),
            code_bg: Color32::from_rgb(245, 245, 245),
            code_text: Color32::from_rgb(80, 80, 80),
            quote_border: Color32::from_rgb(200, 200, 200),
            quote_text: Color32::from_rgb(100, 100, 100),
            link: Color32::from_rgb(0, 100, 180),
            hr: Color32::from_rgb(200, 200, 200),
            list_marker: Color32::from_rgb(100, 100, 100),
            muted: Color32::from_rgb(140, 140, 140),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Draw the preview of a post.
pub fn show_preview(
    ui: &mut Ui,
    title: &str,
    blocks: &[PreviewBlock],
    colors: &PreviewColors,
    font_size: f32,
) {
    egui::ScrollArea::vertical()
        .id_source("post_preview")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if !title.trim().is_empty() {
                ui.label(
                    RichText::new(title)
                        .size(font_size * 2.0)
                        .strong()
                        .color(colors.heading),
                );
                ui.add_space(8.0);
            }

            if blocks.is_empty() {
                ui.label(
                    RichText::new("Nothing to preview yet")
                        .italics()
                        .color(colors.muted),
                );
                return;
            }

            for block in blocks {
                render_block(ui, block, colors, font_size);
            }
        });
}

fn render_block(ui: &mut Ui, block: &PreviewBlock, colors: &PreviewColors, font_size: f32) {
    match block {
        PreviewBlock::Heading { level, spans } => {
            let size = match level {
                1 => font_size * 1.8,
                2 => font_size * 1.5,
                3 => font_size * 1.3,
                4 => font_size * 1.15,
                5 => font_size * 1.05,
                _ => font_size,
            };
            ui.add_space(if *level <= 2 { 8.0 } else { 4.0 });
            render_spans(ui, spans, colors, size, true, colors.heading);
            ui.add_space(4.0);
        }
        PreviewBlock::Paragraph(spans) => {
            render_spans(ui, spans, colors, font_size, false, colors.text);
            ui.add_space(6.0);
        }
        PreviewBlock::Quote(children) => {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(
                    Vec2::new(4.0, ui.available_height().max(font_size)),
                    egui::Sense::hover(),
                );
                ui.painter().rect_filled(rect, 0.0, colors.quote_border);
                ui.add_space(8.0);
                ui.vertical(|ui| {
                    let quoted = PreviewColors {
                        text: colors.quote_text,
                        ..colors.clone()
                    };
                    for child in children {
                        render_block(ui, child, &quoted, font_size);
                    }
                });
            });
        }
        PreviewBlock::List {
            ordered,
            start,
            items,
        } => {
            for (index, item) in items.iter().enumerate() {
                let marker = if *ordered {
                    format!("{}.", start + index)
                } else {
                    "•".to_string()
                };
                ui.horizontal_top(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(marker)
                            .size(font_size)
                            .color(colors.list_marker),
                    );
                    ui.vertical(|ui| {
                        for child in item {
                            render_block(ui, child, colors, font_size);
                        }
                    });
                });
            }
            ui.add_space(4.0);
        }
        PreviewBlock::Code { info, literal } => {
            egui::Frame::none()
                .fill(colors.code_bg)
                .inner_margin(egui::Margin::same(8.0))
                .rounding(egui::Rounding::same(4.0))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    if !info.is_empty() {
                        ui.label(RichText::new(info).small().color(colors.muted));
                    }
                    ui.label(
                        RichText::new(literal.trim_end_matches('\n'))
                            .font(FontId::monospace(font_size * 0.9))
                            .color(colors.code_text),
                    );
                });
            ui.add_space(6.0);
        }
        PreviewBlock::Html(html) => {
            ui.label(
                RichText::new(html.trim_end())
                    .font(FontId::monospace(font_size * 0.9))
                    .color(colors.muted),
            );
            ui.add_space(6.0);
        }
        PreviewBlock::Rule => {
            ui.add_space(4.0);
            let (rect, _) = ui.allocate_exact_size(
                Vec2::new(ui.available_width(), 1.0),
                egui::Sense::hover(),
            );
            ui.painter().rect_filled(rect, 0.0, colors.hr);
            ui.add_space(4.0);
        }
    }
}

fn render_spans(
    ui: &mut Ui,
    spans: &[Span],
    colors: &PreviewColors,
    font_size: f32,
    strong: bool,
    color: Color32,
) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            let style = &span.style;
            let text = if style.image {
                format!("🖼 {}", span.text)
            } else {
                span.text.clone()
            };

            let mut rich = RichText::new(text).size(font_size);
            if style.code {
                rich = rich
                    .font(FontId::monospace(font_size * 0.9))
                    .background_color(colors.code_bg)
                    .color(colors.code_text);
            } else {
                rich = rich.color(if style.link.is_some() {
                    colors.link
                } else {
                    color
                });
            }
            if strong || style.strong {
                rich = rich.strong();
            }
            if style.emphasis {
                rich = rich.italics();
            }
            if style.strikethrough {
                rich = rich.strikethrough();
            }

            match &style.link {
                Some(url) => {
                    ui.hyperlink_to(rich, url).on_hover_text(url);
                }
                None => {
                    ui.label(rich);
                }
            }
        }
    });
}
