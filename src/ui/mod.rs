//! UI components for the composer
//!
//! This module contains the widgets and windows drawn around the post form.

mod dialogs;
mod drafts;
mod preview;
mod repository;
mod settings;
mod toolbar;

pub use dialogs::{show_alert, EditPostDialog, EditPostResult};
pub use drafts::{show_drafts_window, DraftsAction};
pub use preview::{show_preview, PreviewColors};
pub use repository::show_repository_field;
pub use settings::{SettingsPanel, SettingsPanelOutput};
pub use toolbar::{show_toolbar, ToolbarAction};
