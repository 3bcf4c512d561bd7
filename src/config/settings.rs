//! User settings and preferences for the composer
//!
//! This module defines the `Settings` struct that holds the account,
//! service endpoints, and editor preferences, with serde support for JSON
//! persistence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Get a display label for the theme.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    /// Get all available themes.
    pub fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions and position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 900.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Beneficiaries
// ─────────────────────────────────────────────────────────────────────────────

/// A reward beneficiary attached to newly created posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiarySetting {
    /// Receiving account
    pub account: String,
    /// Share in basis points (10000 = 100%)
    pub weight: u16,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Color theme
    pub theme: Theme,

    /// Font size for the body editor (in points)
    pub font_size: f32,

    /// Window size
    pub window_size: WindowSize,

    // ─────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────
    /// Blockchain account the posts are published from
    pub account: String,

    /// SteemConnect access token used to authorize broadcasts
    pub access_token: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Endpoints
    // ─────────────────────────────────────────────────────────────────────────
    /// JSON-RPC node used for content lookups
    pub node_url: String,

    /// SteemConnect API base URL used for broadcasts
    pub broadcast_url: String,

    /// Contribution API base URL
    pub api_url: String,

    /// Image hosting base URL
    pub image_host_url: String,

    /// GitHub API base URL for repository search
    pub github_api_url: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Publishing
    // ─────────────────────────────────────────────────────────────────────────
    /// Public site the posts are read on (navigation target)
    pub site_url: String,

    /// Site name used in the post footer
    pub site_name: String,

    /// Category used as the parent permlink of top-level posts
    pub category: String,

    /// Application identifier written into the post metadata
    pub app_id: String,

    /// Community written into the post metadata
    pub community: String,

    /// Beneficiaries attached to newly created posts
    pub beneficiaries: Vec<BeneficiarySetting>,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Behavior
    // ─────────────────────────────────────────────────────────────────────────
    /// Minimum interval between keystroke-driven preview renders
    pub preview_throttle_ms: u64,

    /// Quiet period after the last change before a draft is written
    pub draft_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Appearance
            theme: Theme::default(),
            font_size: 14.0,
            window_size: WindowSize::default(),

            // Account
            account: String::new(),
            access_token: String::new(),

            // Endpoints
            node_url: String::from("https://api.steemit.com"),
            broadcast_url: String::from("https://v2.steemconnect.com"),
            api_url: String::from("https://api.utopian.io/api"),
            image_host_url: String::from("https://busy-img.herokuapp.com"),
            github_api_url: String::from("https://api.github.com"),

            // Publishing
            site_url: String::from("https://utopian.io"),
            site_name: String::from("Utopian.io"),
            category: String::from("utopian-io"),
            app_id: String::from("utopian/1.0.0"),
            community: String::from("utopian"),
            beneficiaries: vec![BeneficiarySetting {
                account: String::from("utopian.pay"),
                weight: 1500,
            }],

            // Editor Behavior
            preview_throttle_ms: 500,
            draft_debounce_ms: 400,
        }
    }
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 48.0;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 400.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;
    /// Upper bound for both editor timers.
    pub const MAX_TIMER_MS: u64 = 10_000;
    /// Total beneficiary weight cannot exceed 100%.
    pub const MAX_BENEFICIARY_WEIGHT: u32 = 10_000;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        self.preview_throttle_ms = self.preview_throttle_ms.min(Self::MAX_TIMER_MS);
        self.draft_debounce_ms = self.draft_debounce_ms.min(Self::MAX_TIMER_MS);

        // Account names are lowercase on chain; users often paste "@name"
        self.account = self.account.trim().trim_start_matches('@').to_lowercase();

        for url in [
            &mut self.node_url,
            &mut self.broadcast_url,
            &mut self.api_url,
            &mut self.image_host_url,
            &mut self.github_api_url,
            &mut self.site_url,
        ] {
            let trimmed = url.trim().trim_end_matches('/').to_string();
            *url = trimmed;
        }

        self.beneficiaries
            .retain(|b| !b.account.trim().is_empty() && b.weight > 0);
        let mut total = 0u32;
        self.beneficiaries.retain(|b| {
            total += u32::from(b.weight);
            total <= Self::MAX_BENEFICIARY_WEIGHT
        });
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Whether an account and token are configured, which publishing needs.
    pub fn has_credentials(&self) -> bool {
        !self.account.is_empty() && !self.access_token.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.category, "utopian-io");
        assert_eq!(settings.preview_throttle_ms, 500);
        assert_eq!(settings.draft_debounce_ms, 400);
        assert_eq!(settings.beneficiaries.len(), 1);
        assert_eq!(settings.beneficiaries[0].weight, 1500);
        assert!(!settings.has_credentials());
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let mut settings = Settings {
            font_size: 2.0,
            preview_throttle_ms: 1_000_000,
            window_size: WindowSize {
                width: 50.0,
                height: 50_000.0,
                maximized: false,
            },
            ..Default::default()
        };
        settings.sanitize();

        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);
        assert_eq!(settings.preview_throttle_ms, Settings::MAX_TIMER_MS);
        assert_eq!(settings.window_size.width, Settings::MIN_WINDOW_SIZE);
        assert_eq!(settings.window_size.height, Settings::MAX_WINDOW_SIZE);
    }

    #[test]
    fn test_sanitize_normalizes_account_and_urls() {
        let mut settings = Settings {
            account: " @Alice ".to_string(),
            site_url: "https://example.org/".to_string(),
            ..Default::default()
        };
        settings.sanitize();

        assert_eq!(settings.account, "alice");
        assert_eq!(settings.site_url, "https://example.org");
    }

    #[test]
    fn test_sanitize_caps_beneficiary_weight() {
        let mut settings = Settings {
            beneficiaries: vec![
                BeneficiarySetting {
                    account: "a".to_string(),
                    weight: 6000,
                },
                BeneficiarySetting {
                    account: "".to_string(),
                    weight: 100,
                },
                BeneficiarySetting {
                    account: "b".to_string(),
                    weight: 5000,
                },
            ],
            ..Default::default()
        };
        settings.sanitize();

        assert_eq!(settings.beneficiaries.len(), 1);
        assert_eq!(settings.beneficiaries[0].account, "a");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"account": "bob", "theme": "dark"}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();

        assert_eq!(settings.account, "bob");
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.category, "utopian-io");
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = Settings {
            account: "carol".to_string(),
            access_token: "token".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
        assert!(parsed.has_credentials());
    }
}
