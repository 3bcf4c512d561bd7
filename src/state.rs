//! Application state management
//!
//! This module defines the central `AppState` struct that owns the settings,
//! the post form, the cached drafts list and the UI flags (windows, toasts,
//! the blocking alert and the submit indicator).

use crate::config::{save_config_silent, Settings};
use crate::drafts::{DraftStore, PostDraft, SaveDebouncer};
use crate::editor::{PostEditor, PostSubmission};
use crate::error::ResultExt;
use crate::post::PostData;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// A blocking message the user must dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// UI-related state flags.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether the settings panel is open
    pub show_settings: bool,
    /// Whether the drafts window is open
    pub show_drafts: bool,
    /// Whether the "edit existing post" dialog is open
    pub show_edit_dialog: bool,
    /// Whether the markdown preview pane is shown
    pub show_preview: bool,
    /// A publish is in flight
    pub submitting: bool,
    /// A published post is being loaded for editing
    pub loading_post: bool,
    /// Blocking alert, shown until dismissed
    pub alert: Option<Alert>,
    /// Temporary toast message (shown in the status bar)
    pub toast_message: Option<String>,
    /// When the toast message should expire (as seconds since app start)
    pub toast_expires_at: Option<f64>,
    /// URL of the last published post
    pub last_published_url: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state struct.
pub struct AppState {
    /// User settings (loaded from config)
    pub settings: Settings,
    /// UI-related state
    pub ui: UiState,
    /// The post form
    pub editor: PostEditor,
    drafts: Arc<dyn DraftStore>,
    /// Drafts as last read from the store, newest first
    draft_list: Vec<PostDraft>,
    save_debouncer: SaveDebouncer,
    settings_dirty: bool,
}

impl AppState {
    /// Create the state around loaded settings and a draft store.
    ///
    /// The editor starts on the most recently updated draft, or on a fresh
    /// one when there are none.
    pub fn new(settings: Settings, drafts: Arc<dyn DraftStore>) -> Self {
        let editor = PostEditor::new(Duration::from_millis(settings.preview_throttle_ms));
        let save_debouncer = SaveDebouncer::new(Duration::from_millis(settings.draft_debounce_ms));

        let mut state = Self {
            settings,
            ui: UiState {
                show_preview: true,
                ..Default::default()
            },
            editor,
            drafts,
            draft_list: Vec::new(),
            save_debouncer,
            settings_dirty: false,
        };

        state.refresh_drafts();
        match state.draft_list.first().cloned() {
            Some(draft) => {
                info!("Restoring draft {}", draft.id);
                state.editor.load(&draft);
            }
            None => state.new_post(),
        }

        state
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drafts
    // ─────────────────────────────────────────────────────────────────────────

    /// Drafts as last read from the store.
    pub fn drafts(&self) -> &[PostDraft] {
        &self.draft_list
    }

    /// Re-read the drafts list from the store.
    pub fn refresh_drafts(&mut self) {
        self.draft_list = self
            .drafts
            .load_all()
            .unwrap_or_warn_default(Vec::new(), "Failed to load drafts");
    }

    /// Start a new, empty post.
    pub fn new_post(&mut self) {
        self.flush_draft();
        self.editor.load(&PostDraft::new());
        self.save_debouncer.cancel();
        debug!("Started a new post {}", self.editor.draft_id());
    }

    /// Load a draft into the editor, saving the current one first.
    pub fn open_draft(&mut self, id: &str) {
        if id == self.editor.draft_id() {
            return;
        }
        self.flush_draft();
        match self.drafts.get(id) {
            Ok(Some(draft)) => {
                self.editor.load(&draft);
                self.save_debouncer.cancel();
            }
            Ok(None) => {
                warn!("Draft {} no longer exists", id);
                self.refresh_drafts();
            }
            Err(e) => warn!("Failed to open draft {}: {}", id, e),
        }
    }

    /// Load a draft produced elsewhere, such as a published post fetched
    /// for editing.
    pub fn open_loaded_draft(&mut self, draft: PostDraft) {
        self.flush_draft();
        self.editor.load(&draft);
        self.save_debouncer.cancel();
        self.refresh_drafts();
    }

    /// Delete a draft. Discarding the open one starts a new post.
    pub fn discard_draft(&mut self, id: &str) {
        if let Err(e) = self.drafts.delete(id) {
            warn!("Failed to delete draft {}: {}", id, e);
        }
        if id == self.editor.draft_id() {
            self.save_debouncer.cancel();
            self.editor.load(&PostDraft::new());
        }
        self.refresh_drafts();
    }

    /// Pick up form changes and push the save deadline out.
    pub fn note_changes(&mut self, now: Instant) {
        if self.editor.take_changed() {
            self.save_debouncer.touch(now);
        }
    }

    /// Save the draft once the user has been idle long enough.
    ///
    /// Returns `true` if a save happened.
    pub fn poll_draft_save(&mut self, now: Instant) -> bool {
        if self.save_debouncer.poll(now) {
            self.save_current_draft()
        } else {
            false
        }
    }

    /// Time until the pending draft save fires.
    pub fn next_draft_save_in(&self, now: Instant) -> Option<Duration> {
        self.save_debouncer.time_until_due(now)
    }

    /// A change is waiting for its debounced save.
    pub fn draft_save_pending(&self) -> bool {
        self.save_debouncer.is_pending()
    }

    /// Save a pending change right away.
    pub fn flush_draft(&mut self) {
        self.note_changes(Instant::now());
        if self.save_debouncer.is_pending() {
            self.save_debouncer.cancel();
            self.save_current_draft();
        }
    }

    fn save_current_draft(&mut self) -> bool {
        self.editor.ensure_draft_id();
        let draft = self.editor.draft_snapshot();
        if draft.is_blank() {
            return false;
        }
        match self.drafts.save(&draft) {
            Ok(()) => {
                debug!("Saved draft {}", draft.id);
                self.refresh_drafts();
                true
            }
            Err(e) => {
                warn!("Failed to save draft {}: {}", draft.id, e);
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate the form and assemble the post to publish.
    ///
    /// Returns `None` when validation fails or a publish is already running.
    /// The draft is saved first so a failed broadcast never loses work.
    pub fn prepare_submit(&mut self) -> Option<PostData> {
        if self.ui.submitting {
            return None;
        }
        let submission: PostSubmission = match self.editor.handle_submit() {
            Ok(submission) => submission,
            Err(errors) => {
                debug!("Submit blocked: {:?}", errors.messages());
                return None;
            }
        };

        self.save_debouncer.cancel();
        self.save_current_draft();

        let draft = self.editor.draft_snapshot();
        self.ui.submitting = true;
        Some(PostData::from_submission(submission, &draft, &self.settings))
    }

    /// The publish finished successfully: start over on a new post.
    pub fn finish_submit(&mut self, url: String) {
        self.ui.submitting = false;
        self.ui.last_published_url = Some(url);
        self.save_debouncer.cancel();
        self.editor.load(&PostDraft::new());
        self.refresh_drafts();
    }

    /// The publish failed: keep the form and tell the user.
    pub fn fail_submit(&mut self, error: &str) {
        self.ui.submitting = false;
        self.show_alert(
            "Could not publish",
            format!(
                "Could not connect to Steem. Your post may have been saved in Drafts.\n\n{}",
                error
            ),
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark settings as dirty (needing to be saved).
    pub fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Restore default settings, keeping the account credentials.
    pub fn reset_settings(&mut self) {
        let account = std::mem::take(&mut self.settings.account);
        let access_token = std::mem::take(&mut self.settings.access_token);
        self.settings = Settings {
            account,
            access_token,
            ..Settings::default()
        };
        self.settings_dirty = true;
    }

    /// Save settings to the config file if modified.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            self.settings.sanitize();
            self.save_debouncer =
                SaveDebouncer::new(Duration::from_millis(self.settings.draft_debounce_ms));
            if save_config_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Alerts and Toasts
    // ─────────────────────────────────────────────────────────────────────────

    /// Show a blocking alert.
    pub fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.ui.alert = Some(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.ui.alert = None;
    }

    /// Show a temporary toast message (disappears after duration).
    ///
    /// `current_time` should be the current app time in seconds.
    /// `duration` is how long to show the message in seconds.
    pub fn show_toast(&mut self, message: impl Into<String>, current_time: f64, duration: f64) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = Some(current_time + duration);
    }

    /// Update toast state - clears expired toasts.
    ///
    /// Call this each frame with the current time.
    pub fn update_toast(&mut self, current_time: f64) {
        if let Some(expires_at) = self.ui.toast_expires_at {
            if current_time >= expires_at {
                self.ui.toast_message = None;
                self.ui.toast_expires_at = None;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::JsonDraftStore;
    use crate::net::{Repository, RepositoryOwner};
    use tempfile::TempDir;

    fn state_in(temp_dir: &TempDir) -> (AppState, Arc<JsonDraftStore>) {
        let store = Arc::new(JsonDraftStore::new(temp_dir.path().join("drafts.json")));
        let settings = Settings {
            account: "alice".to_string(),
            access_token: "token".to_string(),
            draft_debounce_ms: 400,
            ..Settings::default()
        };
        (AppState::new(settings, store.clone()), store)
    }

    fn repository() -> Repository {
        Repository {
            id: 1,
            name: "crate".to_string(),
            full_name: "alice/crate".to_string(),
            html_url: "https://github.com/alice/crate".to_string(),
            owner: RepositoryOwner {
                login: "alice".to_string(),
            },
            fork: false,
        }
    }

    #[test]
    fn test_new_state_starts_on_fresh_post() {
        let temp_dir = TempDir::new().unwrap();
        let (state, _) = state_in(&temp_dir);
        assert!(!state.editor.draft_id().is_empty());
        assert!(state.drafts().is_empty());
        assert!(state.ui.show_preview);
    }

    #[test]
    fn test_draft_saved_after_quiet_period() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, store) = state_in(&temp_dir);
        let start = Instant::now();

        state.editor.set_title("Hello");
        state.note_changes(start);
        assert!(!state.poll_draft_save(start + Duration::from_millis(100)));

        // Another keystroke pushes the deadline out
        state.editor.set_body_at("Body", start + Duration::from_millis(300));
        state.note_changes(start + Duration::from_millis(300));
        assert!(!state.poll_draft_save(start + Duration::from_millis(500)));
        assert!(state.poll_draft_save(start + Duration::from_millis(700)));

        let saved = store.load_all().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Hello");
        assert_eq!(saved[0].body, "Body");
        assert_eq!(state.drafts().len(), 1);
    }

    #[test]
    fn test_blank_draft_is_not_saved() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, store) = state_in(&temp_dir);
        let start = Instant::now();

        state.editor.set_title("");
        state.note_changes(start);
        assert!(!state.poll_draft_save(start + Duration::from_secs(1)));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_restores_latest_draft() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonDraftStore::new(temp_dir.path().join("drafts.json")));
        let mut draft = PostDraft::new();
        draft.title = "Saved".to_string();
        draft.touch();
        store.save(&draft).unwrap();

        let state = AppState::new(Settings::default(), store);
        assert_eq!(state.editor.draft_id(), draft.id);
        assert_eq!(state.editor.title(), "Saved");
    }

    #[test]
    fn test_new_post_flushes_pending_changes() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, store) = state_in(&temp_dir);
        let first_id = state.editor.draft_id().to_string();

        state.editor.set_title("Work in progress");
        state.new_post();

        assert_ne!(state.editor.draft_id(), first_id);
        assert_eq!(state.editor.title(), "");
        let saved = store.get(&first_id).unwrap().unwrap();
        assert_eq!(saved.title, "Work in progress");
    }

    #[test]
    fn test_discard_open_draft_starts_new_post() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, store) = state_in(&temp_dir);
        state.editor.set_title("Throwaway");
        state.flush_draft();
        let id = state.editor.draft_id().to_string();
        assert!(store.get(&id).unwrap().is_some());

        state.discard_draft(&id);
        assert!(store.get(&id).unwrap().is_none());
        assert_ne!(state.editor.draft_id(), id);
        assert!(state.drafts().is_empty());
    }

    #[test]
    fn test_prepare_submit_rejects_invalid_form() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, _) = state_in(&temp_dir);
        assert!(state.prepare_submit().is_none());
        assert!(!state.ui.submitting);
        assert!(state.editor.no_content());
        assert!(state.editor.no_repository());
    }

    #[test]
    fn test_submit_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, store) = state_in(&temp_dir);
        state.editor.set_title("My post");
        state.editor.set_topics_input("utopian-io rust");
        state.editor.set_body("Some body");
        state.editor.select_repository(repository());

        let post = state.prepare_submit().unwrap();
        assert!(state.ui.submitting);
        assert_eq!(post.author, "alice");
        assert_eq!(post.title, "My post");
        assert_eq!(post.draft_id.as_deref(), Some(state.editor.draft_id()));
        // Saved before broadcasting
        assert_eq!(store.load_all().unwrap().len(), 1);

        // A second submit while publishing is ignored
        assert!(state.prepare_submit().is_none());

        state.fail_submit("timeout");
        assert!(!state.ui.submitting);
        let alert = state.ui.alert.clone().unwrap();
        assert!(alert.message.contains("saved in Drafts"));
        assert!(alert.message.contains("timeout"));
        assert_eq!(state.editor.title(), "My post");

        state.dismiss_alert();
        assert!(state.prepare_submit().is_some());
        state.finish_submit("https://utopian.io/utopian-io/@alice/my-post".to_string());
        assert!(!state.ui.submitting);
        assert_eq!(state.editor.title(), "");
        assert!(state.ui.last_published_url.is_some());
    }

    #[test]
    fn test_toast_expires() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, _) = state_in(&temp_dir);
        state.show_toast("Draft saved", 10.0, 2.0);
        state.update_toast(11.0);
        assert_eq!(state.ui.toast_message.as_deref(), Some("Draft saved"));
        state.update_toast(12.0);
        assert!(state.ui.toast_message.is_none());
    }

    #[test]
    fn test_reset_settings_keeps_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let (mut state, _) = state_in(&temp_dir);
        state.settings.category = "other".to_string();
        state.reset_settings();
        assert_eq!(state.settings.account, "alice");
        assert_eq!(state.settings.access_token, "token");
        assert_eq!(state.settings.category, Settings::default().category);
    }
}
