//! Settings Panel Component
//!
//! This module implements a modal settings panel for the account, the
//! service endpoints, publishing options and editor appearance.

use crate::config::{BeneficiarySetting, Settings, Theme};
use eframe::egui::{self, Color32, RichText, Ui};

/// Settings panel sections for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Account,
    Publishing,
    Services,
    Appearance,
}

impl SettingsSection {
    /// Get the display label for the section.
    pub fn label(&self) -> &'static str {
        match self {
            SettingsSection::Account => "Account",
            SettingsSection::Publishing => "Publishing",
            SettingsSection::Services => "Services",
            SettingsSection::Appearance => "Appearance",
        }
    }

    /// Get the icon for the section.
    pub fn icon(&self) -> &'static str {
        match self {
            SettingsSection::Account => "👤",
            SettingsSection::Publishing => "📰",
            SettingsSection::Services => "🌐",
            SettingsSection::Appearance => "🎨",
        }
    }

    fn all() -> [SettingsSection; 4] {
        [
            SettingsSection::Account,
            SettingsSection::Publishing,
            SettingsSection::Services,
            SettingsSection::Appearance,
        ]
    }
}

/// Result of showing the settings panel.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanelOutput {
    /// Whether settings were modified.
    pub changed: bool,
    /// Whether the panel should be closed.
    pub close_requested: bool,
    /// Whether a reset to defaults was requested.
    pub reset_requested: bool,
}

/// Settings panel state and rendering.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    active_section: SettingsSection,
    show_token: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the settings panel as a modal window.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        settings: &mut Settings,
        is_dark: bool,
    ) -> SettingsPanelOutput {
        let mut output = SettingsPanelOutput::default();

        // Semi-transparent overlay
        let screen_rect = ctx.screen_rect();
        let overlay_color = if is_dark {
            Color32::from_rgba_unmultiplied(0, 0, 0, 180)
        } else {
            Color32::from_rgba_unmultiplied(0, 0, 0, 120)
        };

        egui::Area::new(egui::Id::new("settings_overlay"))
            .order(egui::Order::Middle)
            .fixed_pos(screen_rect.min)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter().rect_filled(screen_rect, 0.0, overlay_color);

                if response.clicked() {
                    output.close_requested = true;
                }
            });

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(560.0)
            .max_width(640.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.set_min_width(120.0);

                        for section in SettingsSection::all() {
                            let selected = self.active_section == section;
                            let text = format!("{} {}", section.icon(), section.label());
                            let btn = ui.add_sized(
                                [110.0, 32.0],
                                egui::SelectableLabel::new(
                                    selected,
                                    RichText::new(text).size(14.0),
                                ),
                            );
                            if btn.clicked() {
                                self.active_section = section;
                            }
                        }

                        ui.add_space((ui.available_height() - 40.0).max(0.0));

                        if ui
                            .add_sized([110.0, 28.0], egui::Button::new("↺ Reset All"))
                            .on_hover_text("Reset all settings to defaults")
                            .clicked()
                        {
                            output.reset_requested = true;
                        }
                    });

                    ui.separator();

                    ui.vertical(|ui| {
                        ui.set_min_width(400.0);
                        ui.set_min_height(340.0);

                        let changed = match self.active_section {
                            SettingsSection::Account => self.show_account_section(ui, settings),
                            SettingsSection::Publishing => show_publishing_section(ui, settings),
                            SettingsSection::Services => show_services_section(ui, settings),
                            SettingsSection::Appearance => show_appearance_section(ui, settings),
                        };
                        output.changed |= changed;
                    });
                });

                ui.separator();

                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.close_requested = true;
                        }
                        ui.label(
                            RichText::new("Settings are saved automatically")
                                .small()
                                .weak(),
                        );
                    });
                });
            });

        output
    }

    fn show_account_section(&mut self, ui: &mut Ui, settings: &mut Settings) -> bool {
        let mut changed = false;

        ui.heading("Account");
        ui.add_space(8.0);

        ui.label(RichText::new("Account name").strong());
        changed |= ui
            .add(egui::TextEdit::singleline(&mut settings.account).hint_text("username"))
            .changed();

        ui.add_space(8.0);
        ui.label(RichText::new("Access token").strong());
        ui.horizontal(|ui| {
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut settings.access_token)
                        .password(!self.show_token)
                        .desired_width(300.0),
                )
                .changed();
            ui.checkbox(&mut self.show_token, "Show");
        });
        ui.label(
            RichText::new("The token authorizes broadcasts on your behalf.")
                .small()
                .weak(),
        );

        ui.add_space(12.0);
        let status = if settings.has_credentials() {
            RichText::new(format!("✔ Publishing as @{}", settings.account))
                .color(Color32::from_rgb(46, 160, 67))
        } else {
            RichText::new("⚠ Enter an account and token to publish")
                .color(Color32::from_rgb(210, 153, 34))
        };
        ui.label(status);

        changed
    }
}

fn labeled_field(ui: &mut Ui, label: &str, value: &mut String) -> bool {
    ui.label(RichText::new(label).strong());
    let changed = ui
        .add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY))
        .changed();
    ui.add_space(6.0);
    changed
}

fn show_publishing_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Publishing");
    ui.add_space(8.0);

    changed |= labeled_field(ui, "Category", &mut settings.category);
    changed |= labeled_field(ui, "Site URL", &mut settings.site_url);
    changed |= labeled_field(ui, "Site name", &mut settings.site_name);
    changed |= labeled_field(ui, "App id", &mut settings.app_id);
    changed |= labeled_field(ui, "Community", &mut settings.community);

    ui.separator();
    ui.label(RichText::new("Beneficiaries").strong());
    ui.label(
        RichText::new("Weights are in basis points (1500 = 15%).")
            .small()
            .weak(),
    );

    let mut remove = None;
    for (index, beneficiary) in settings.beneficiaries.iter_mut().enumerate() {
        ui.horizontal(|ui| {
            changed |= ui
                .add(egui::TextEdit::singleline(&mut beneficiary.account).desired_width(180.0))
                .changed();
            changed |= ui
                .add(egui::DragValue::new(&mut beneficiary.weight).range(0..=10_000))
                .changed();
            if ui.small_button("✖").on_hover_text("Remove").clicked() {
                remove = Some(index);
            }
        });
    }
    if let Some(index) = remove {
        settings.beneficiaries.remove(index);
        changed = true;
    }
    if ui.small_button("➕ Add beneficiary").clicked() {
        settings.beneficiaries.push(BeneficiarySetting {
            account: String::new(),
            weight: 100,
        });
        changed = true;
    }

    changed
}

fn show_services_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Services");
    ui.add_space(8.0);

    changed |= labeled_field(ui, "Blockchain node", &mut settings.node_url);
    changed |= labeled_field(ui, "Broadcast API", &mut settings.broadcast_url);
    changed |= labeled_field(ui, "Contribution API", &mut settings.api_url);
    changed |= labeled_field(ui, "Image host", &mut settings.image_host_url);
    changed |= labeled_field(ui, "GitHub API", &mut settings.github_api_url);

    changed
}

fn show_appearance_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Appearance");
    ui.add_space(8.0);

    ui.label(RichText::new("Theme").strong());
    ui.horizontal(|ui| {
        for theme in Theme::all() {
            let label = match theme {
                Theme::Light => "☀ Light",
                Theme::Dark => "🌙 Dark",
            };
            changed |= ui
                .selectable_value(&mut settings.theme, *theme, label)
                .changed();
        }
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Font Size").strong());
        ui.label(format!("{}px", settings.font_size as u32));
    });
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.font_size,
                Settings::MIN_FONT_SIZE..=Settings::MAX_FONT_SIZE,
            )
            .show_value(false)
            .step_by(1.0),
        )
        .changed();

    ui.add_space(12.0);
    ui.label(RichText::new("Preview refresh (ms)").strong());
    changed |= ui
        .add(egui::DragValue::new(&mut settings.preview_throttle_ms).range(0..=Settings::MAX_TIMER_MS))
        .changed();

    ui.label(RichText::new("Draft save delay (ms)").strong());
    changed |= ui
        .add(egui::DragValue::new(&mut settings.draft_debounce_ms).range(0..=Settings::MAX_TIMER_MS))
        .changed();

    changed
}
