//! Post form view-model.
//!
//! `PostEditor` owns every value of the post form plus the ephemeral render
//! state (preview snapshot, upload and drop-zone flags, required-field
//! flags). The UI reads it and calls its setters; it never talks to the
//! network itself.

use super::upload::{BatchId, UploadProgress, UploadTracker};
use super::validation::{validate_fields, FormErrors, BODY_REQUIRED, REPOSITORY_REQUIRED};
use crate::drafts::PostDraft;
use crate::markdown::{
    insert_image, parse_preview, render_markdown, Insertion, MarkdownShortcut, PreviewBlock,
    PreviewThrottle, Selection,
};
use crate::net::Repository;
use crate::post::RewardOption;
use log::debug;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Submission
// ─────────────────────────────────────────────────────────────────────────────

/// Validated form values handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmission {
    pub title: String,
    pub topics: Vec<String>,
    pub body: String,
    pub upvote: bool,
    pub reward: RewardOption,
    pub repository: Repository,
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository Search State
// ─────────────────────────────────────────────────────────────────────────────

/// State of the repository autocomplete menu.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RepositorySearch {
    /// Nothing searched for the current query yet
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl RepositorySearch {
    /// Placeholder line shown instead of results, if any.
    pub fn menu_message(&self, has_results: bool) -> Option<String> {
        match self {
            RepositorySearch::Idle => Some("Press enter to see results".to_string()),
            RepositorySearch::Loading => Some("Loading...".to_string()),
            RepositorySearch::Loaded if !has_results => Some("No projects found".to_string()),
            RepositorySearch::Loaded => None,
            RepositorySearch::Failed(err) => Some(format!("Search failed: {}", err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

/// View-model of the post form.
#[derive(Debug)]
pub struct PostEditor {
    // Form values
    draft_id: String,
    title: String,
    topics: Vec<String>,
    topics_input: String,
    body: String,
    upvote: bool,
    reward: RewardOption,
    repository: Option<Repository>,

    // Identity of the post being edited
    is_updating: bool,
    permlink: Option<String>,
    original_body: Option<String>,
    parent_author: String,
    parent_permlink: String,

    // Render state
    content_html: String,
    preview: Vec<PreviewBlock>,
    image_uploading: bool,
    dropzone_active: bool,
    no_content: bool,
    no_repository: bool,
    errors: FormErrors,

    // Cursor
    selection: Selection,
    pending_selection: Option<Selection>,

    // Repository autocomplete
    repository_query: String,
    repository_results: Vec<Repository>,
    repository_search: RepositorySearch,

    uploads: UploadTracker,
    throttle: PreviewThrottle,
    changed: bool,
}

impl Default for PostEditor {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl PostEditor {
    /// Create an empty editor whose keystroke renders are throttled to
    /// `preview_interval`.
    pub fn new(preview_interval: Duration) -> Self {
        Self {
            draft_id: String::new(),
            title: String::new(),
            topics: Vec::new(),
            topics_input: String::new(),
            body: String::new(),
            upvote: true,
            reward: RewardOption::default(),
            repository: None,
            is_updating: false,
            permlink: None,
            original_body: None,
            parent_author: String::new(),
            parent_permlink: String::new(),
            content_html: String::new(),
            preview: Vec::new(),
            image_uploading: false,
            dropzone_active: false,
            no_content: false,
            no_repository: false,
            errors: FormErrors::default(),
            selection: Selection::cursor(0),
            pending_selection: None,
            repository_query: String::new(),
            repository_results: Vec::new(),
            repository_search: RepositorySearch::Idle,
            uploads: UploadTracker::new(),
            throttle: PreviewThrottle::new(preview_interval),
            changed: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn topics_input(&self) -> &str {
        &self.topics_input
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn upvote(&self) -> bool {
        self.upvote
    }

    pub fn reward(&self) -> RewardOption {
        self.reward
    }

    pub fn repository(&self) -> Option<&Repository> {
        self.repository.as_ref()
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    pub fn preview(&self) -> &[PreviewBlock] {
        &self.preview
    }

    pub fn image_uploading(&self) -> bool {
        self.image_uploading
    }

    pub fn dropzone_active(&self) -> bool {
        self.dropzone_active
    }

    pub fn no_content(&self) -> bool {
        self.no_content
    }

    pub fn no_repository(&self) -> bool {
        self.no_repository
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn repository_query(&self) -> &str {
        &self.repository_query
    }

    pub fn repository_results(&self) -> &[Repository] {
        &self.repository_results
    }

    pub fn repository_search(&self) -> &RepositorySearch {
        &self.repository_search
    }

    /// Completed and total uploads of the open batches.
    pub fn upload_progress(&self) -> (usize, usize) {
        self.uploads.progress()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace all values with a draft and render the preview immediately.
    pub fn load(&mut self, draft: &PostDraft) {
        self.draft_id = draft.id.clone();
        self.title = draft.title.clone();
        self.topics = draft.topics.clone();
        self.topics_input = draft.topics.join(" ");
        self.body = draft.body.clone();
        self.upvote = draft.upvote;
        self.reward = draft.reward;
        self.repository = draft.repository.clone();
        self.repository_query = draft
            .repository
            .as_ref()
            .map(|r| r.full_name.clone())
            .unwrap_or_default();
        self.repository_results.clear();
        self.repository_search = RepositorySearch::Idle;

        self.is_updating = draft.is_updating;
        self.permlink = draft.permlink.clone();
        self.original_body = draft.original_body.clone();
        self.parent_author = draft.parent_author.clone();
        self.parent_permlink = draft.parent_permlink.clone();

        self.errors = FormErrors::default();
        self.no_content = false;
        self.no_repository = false;
        self.dropzone_active = false;
        self.image_uploading = false;
        self.uploads.clear();

        let end = self.body.chars().count();
        self.selection = Selection::cursor(end);
        self.pending_selection = Some(self.selection);
        self.changed = false;
        self.render_now(Instant::now());
        debug!("Loaded draft {} into the editor", self.draft_id);
    }

    /// Values emitted to the debounced draft save.
    pub fn draft_snapshot(&self) -> PostDraft {
        let mut draft = PostDraft {
            id: self.draft_id.clone(),
            title: self.title.clone(),
            topics: self.topics.clone(),
            body: self.body.clone(),
            repository: self.repository.clone(),
            upvote: self.upvote,
            reward: self.reward,
            is_updating: self.is_updating,
            permlink: self.permlink.clone(),
            original_body: self.original_body.clone(),
            parent_author: self.parent_author.clone(),
            parent_permlink: self.parent_permlink.clone(),
            last_updated: 0,
        };
        draft.touch();
        draft
    }

    /// Give the editor a draft id if it has none yet.
    pub fn ensure_draft_id(&mut self) -> &str {
        if self.draft_id.is_empty() {
            self.draft_id = crate::drafts::new_draft_id();
        }
        &self.draft_id
    }

    /// Returns `true` once after any value changed.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Setters
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.changed = true;
    }

    /// Set the raw tags input; tags are split on spaces and commas.
    pub fn set_topics_input(&mut self, input: impl Into<String>) {
        self.topics_input = input.into();
        self.topics = parse_topics(&self.topics_input);
        self.changed = true;
    }

    pub fn set_topics(&mut self, topics: Vec<String>) {
        self.topics_input = topics.join(" ");
        self.topics = topics;
        self.changed = true;
    }

    /// Set the body from a keystroke; the preview render is throttled.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.set_body_at(body, Instant::now());
    }

    pub fn set_body_at(&mut self, body: impl Into<String>, now: Instant) {
        self.body = body.into();
        self.changed = true;
        if self.throttle.request(now) {
            self.render();
        }
    }

    pub fn set_upvote(&mut self, upvote: bool) {
        self.upvote = upvote;
        self.changed = true;
    }

    pub fn set_reward(&mut self, reward: RewardOption) {
        self.reward = reward;
        self.changed = true;
    }

    /// Pick a repository from the autocomplete results.
    pub fn select_repository(&mut self, repository: Repository) {
        self.repository_query = repository.full_name.clone();
        self.repository = Some(repository);
        self.no_repository = false;
        self.errors.repository = None;
        self.changed = true;
    }

    /// Edit the repository search text. Clearing it clears the selection.
    pub fn set_repository_query(&mut self, query: impl Into<String>) {
        self.repository_query = query.into();
        self.repository_search = RepositorySearch::Idle;
        if self.repository_query.is_empty() {
            self.repository = None;
            self.repository_results.clear();
            self.changed = true;
        }
    }

    /// Mark the search for the current query as started.
    ///
    /// Returns the query to search for, or `None` when it is blank.
    pub fn begin_repository_search(&mut self) -> Option<String> {
        let query = self.repository_query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.repository_search = RepositorySearch::Loading;
        Some(query)
    }

    /// Store search results. Results for a stale query are dropped.
    pub fn set_repository_results(&mut self, query: &str, results: Vec<Repository>) {
        if self.repository_query.trim() != query {
            debug!("Dropping stale repository results for '{}'", query);
            return;
        }
        self.repository_results = results;
        self.repository_search = RepositorySearch::Loaded;
    }

    pub fn set_repository_search_failed(&mut self, query: &str, error: impl Into<String>) {
        if self.repository_query.trim() == query {
            self.repository_search = RepositorySearch::Failed(error.into());
        }
    }

    /// Record the selection reported by the text widget.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.body.chars().count());
    }

    /// Selection the text widget should adopt, set after insertions.
    pub fn take_pending_selection(&mut self) -> Option<Selection> {
        self.pending_selection.take()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Insertions
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a markdown shortcut at the current selection.
    pub fn insert_code(&mut self, shortcut: MarkdownShortcut) {
        let insertion = shortcut.apply(&self.body, self.selection);
        self.apply_insertion(insertion);
    }

    /// Insert image markup at the current selection.
    pub fn insert_image(&mut self, url: &str, name: Option<&str>) {
        let insertion = insert_image(&self.body, self.selection, url, name);
        self.apply_insertion(insertion);
    }

    fn apply_insertion(&mut self, insertion: Insertion) {
        self.body = insertion.text;
        self.selection = insertion.selection;
        self.pending_selection = Some(insertion.selection);
        self.changed = true;
        self.render_now(Instant::now());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a due trailing render. Returns `true` if the preview changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.throttle.poll(now) {
            self.render();
            true
        } else {
            false
        }
    }

    /// Time until a throttled render is due.
    pub fn next_render_in(&self, now: Instant) -> Option<Duration> {
        self.throttle.time_until_due(now)
    }

    fn render_now(&mut self, now: Instant) {
        self.throttle.reset(now);
        self.render();
    }

    fn render(&mut self) {
        self.content_html = render_markdown(&self.body);
        self.preview = parse_preview(&self.body);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drop Zone and Uploads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_drag_enter(&mut self) {
        self.dropzone_active = true;
    }

    pub fn handle_drag_leave(&mut self) {
        self.dropzone_active = false;
    }

    /// Files were dropped. Opens an upload batch for `count` files.
    pub fn handle_drop(&mut self, count: usize) -> Option<BatchId> {
        self.dropzone_active = false;
        let batch = self.uploads.start(count)?;
        self.image_uploading = true;
        Some(batch)
    }

    /// A single image was picked or pasted.
    pub fn begin_single_upload(&mut self) -> BatchId {
        self.handle_drop(1).unwrap_or_default()
    }

    /// An upload finished. Successful uploads insert their image markup;
    /// the uploading flag drops once every open batch is complete.
    pub fn upload_finished(
        &mut self,
        batch: BatchId,
        result: Result<(String, String), String>,
    ) -> UploadProgress {
        let success = result.is_ok();
        let progress = self.uploads.complete(batch, success);
        if progress == UploadProgress::Ignored {
            return progress;
        }

        if let Ok((url, name)) = result {
            self.insert_image(&url, Some(&name));
        }

        if matches!(progress, UploadProgress::Finished { .. }) {
            self.image_uploading = self.uploads.is_uploading();
        }
        progress
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate the form.
    ///
    /// The repository-required and body-required errors are raised whenever
    /// they apply, independently of the field rules.
    pub fn handle_submit(&mut self) -> Result<PostSubmission, FormErrors> {
        self.no_content = false;
        self.no_repository = false;

        let mut errors = validate_fields(&self.title, &self.topics);

        if self.repository.is_none() {
            self.no_repository = true;
            errors.repository = Some(REPOSITORY_REQUIRED.to_string());
        }

        if self.body.is_empty() {
            self.no_content = true;
            errors.body = Some(BODY_REQUIRED.to_string());
        }

        self.errors = errors.clone();

        match (&self.repository, errors.is_empty()) {
            (Some(repository), true) => Ok(PostSubmission {
                title: self.title.clone(),
                topics: self.topics.clone(),
                body: self.body.clone(),
                upvote: self.upvote && !self.is_updating,
                reward: self.reward,
                repository: repository.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Split the tags input on spaces and commas, dropping empty and repeated
/// tokens.
pub fn parse_topics(input: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for token in input.split(|c: char| c.is_whitespace() || c == ',') {
        if !token.is_empty() && !topics.iter().any(|t| t == token) {
            topics.push(token.to_string());
        }
    }
    topics
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::validation::{TOPICS_COUNT, TITLE_REQUIRED};

    fn repository() -> Repository {
        Repository {
            id: 1,
            name: "repo".to_string(),
            full_name: "me/repo".to_string(),
            ..Default::default()
        }
    }

    fn filled_editor() -> PostEditor {
        let mut editor = PostEditor::default();
        editor.set_title("A post");
        editor.set_topics_input("rust, egui");
        editor.set_body("Body text");
        editor.select_repository(repository());
        editor
    }

    #[test]
    fn test_parse_topics() {
        assert_eq!(parse_topics("rust, egui  gui,,rust"), vec!["rust", "egui", "gui"]);
        assert!(parse_topics("  , ").is_empty());
        // Case is preserved so the validator can reject it
        assert_eq!(parse_topics("Rust"), vec!["Rust"]);
    }

    #[test]
    fn test_submit_valid_form() {
        let mut editor = filled_editor();
        let submission = editor.handle_submit().unwrap();
        assert_eq!(submission.title, "A post");
        assert_eq!(submission.topics, vec!["rust", "egui"]);
        assert_eq!(submission.repository.full_name, "me/repo");
        assert!(submission.upvote);
        assert!(editor.errors().is_empty());
    }

    #[test]
    fn test_submit_empty_body_always_flags_content() {
        let mut editor = PostEditor::default();
        let errors = editor.handle_submit().unwrap_err();
        assert!(editor.no_content());
        assert!(editor.no_repository());
        assert_eq!(errors.body.as_deref(), Some(BODY_REQUIRED));
        assert_eq!(errors.repository.as_deref(), Some(REPOSITORY_REQUIRED));
        assert_eq!(errors.title.as_deref(), Some(TITLE_REQUIRED));

        let mut editor = filled_editor();
        editor.set_body("");
        let errors = editor.handle_submit().unwrap_err();
        assert!(editor.no_content());
        assert!(!editor.no_repository());
        assert_eq!(errors.messages(), vec![BODY_REQUIRED]);
    }

    #[test]
    fn test_submit_without_repository() {
        let mut editor = filled_editor();
        editor.set_repository_query("");
        assert!(editor.repository().is_none());
        let errors = editor.handle_submit().unwrap_err();
        assert!(editor.no_repository());
        assert_eq!(errors.messages(), vec![REPOSITORY_REQUIRED]);
    }

    #[test]
    fn test_submit_clears_flags_when_fixed() {
        let mut editor = filled_editor();
        editor.set_body("");
        assert!(editor.handle_submit().is_err());
        editor.set_body("Now with content");
        assert!(editor.handle_submit().is_ok());
        assert!(!editor.no_content());
    }

    #[test]
    fn test_submit_tag_errors() {
        let mut editor = filled_editor();
        editor.set_topics_input("a b c d e");
        let errors = editor.handle_submit().unwrap_err();
        assert_eq!(errors.topics.as_deref(), Some(TOPICS_COUNT));
    }

    #[test]
    fn test_update_never_upvotes() {
        let mut editor = PostEditor::default();
        editor.load(&PostDraft {
            id: "d".to_string(),
            title: "T".to_string(),
            topics: vec!["rust".to_string()],
            body: "B".to_string(),
            repository: Some(repository()),
            upvote: true,
            is_updating: true,
            permlink: Some("t".to_string()),
            ..Default::default()
        });
        assert!(!editor.handle_submit().unwrap().upvote);
    }

    #[test]
    fn test_insert_code_moves_selection_and_renders() {
        let mut editor = PostEditor::default();
        editor.set_body("Hello world");
        editor.take_changed();
        editor.set_selection(Selection::cursor(5));
        editor.insert_code(MarkdownShortcut::Bold);

        assert_eq!(editor.body(), "Hello**** world");
        assert_eq!(editor.selection(), Selection::cursor(7));
        assert_eq!(editor.take_pending_selection(), Some(Selection::cursor(7)));
        assert!(editor.take_changed());
        assert!(editor.content_html().contains("Hello"));
    }

    #[test]
    fn test_body_renders_are_throttled() {
        let start = Instant::now();
        let mut editor = PostEditor::new(Duration::from_millis(500));
        editor.set_body_at("# One", start);
        assert!(editor.content_html().contains("One"));

        editor.set_body_at("# Two", start + Duration::from_millis(100));
        assert!(editor.content_html().contains("One"));
        assert!(editor.next_render_in(start + Duration::from_millis(100)).is_some());

        assert!(editor.tick(start + Duration::from_millis(600)));
        assert!(editor.content_html().contains("Two"));
    }

    #[test]
    fn test_load_renders_and_resets_state() {
        let mut editor = filled_editor();
        editor.handle_drop(2);
        editor.load(&PostDraft {
            id: "x".to_string(),
            body: "**hi**".to_string(),
            repository: Some(repository()),
            ..Default::default()
        });
        assert!(editor.content_html().contains("<strong>hi</strong>"));
        assert!(!editor.image_uploading());
        assert_eq!(editor.repository_query(), "me/repo");
        assert_eq!(editor.selection(), Selection::cursor(6));
        assert!(!editor.take_changed());
    }

    #[test]
    fn test_drop_zone_flags() {
        let mut editor = PostEditor::default();
        editor.handle_drag_enter();
        assert!(editor.dropzone_active());
        editor.handle_drag_leave();
        assert!(!editor.dropzone_active());

        editor.handle_drag_enter();
        assert_eq!(editor.handle_drop(0), None);
        assert!(!editor.dropzone_active());
        assert!(!editor.image_uploading());
    }

    #[test]
    fn test_multi_file_drop_clears_flag_after_last_callback() {
        let mut editor = PostEditor::default();
        let batch = editor.handle_drop(3).unwrap();
        assert!(editor.image_uploading());

        editor.upload_finished(batch, Ok(("https://i.io/1.png".to_string(), "one".to_string())));
        assert!(editor.image_uploading());
        editor.upload_finished(batch, Err("too large".to_string()));
        assert!(editor.image_uploading());
        let last =
            editor.upload_finished(batch, Ok(("https://i.io/3.png".to_string(), "three".to_string())));

        assert_eq!(
            last,
            UploadProgress::Finished {
                succeeded: 2,
                failed: 1
            }
        );
        assert!(!editor.image_uploading());
        assert!(editor.body().contains("![one](https://i.io/1.png)"));
        assert!(editor.body().contains("![three](https://i.io/3.png)"));

        // A late duplicate does not touch the body
        let body = editor.body().to_string();
        assert_eq!(
            editor.upload_finished(batch, Ok(("x".to_string(), "x".to_string()))),
            UploadProgress::Ignored
        );
        assert_eq!(editor.body(), body);
    }

    #[test]
    fn test_repository_search_states() {
        let mut editor = PostEditor::default();
        assert_eq!(
            editor.repository_search().menu_message(false).as_deref(),
            Some("Press enter to see results")
        );
        assert_eq!(editor.begin_repository_search(), None);

        editor.set_repository_query("utopian");
        assert_eq!(editor.begin_repository_search().as_deref(), Some("utopian"));
        assert_eq!(
            editor.repository_search().menu_message(false).as_deref(),
            Some("Loading...")
        );

        editor.set_repository_results("stale", vec![repository()]);
        assert!(editor.repository_results().is_empty());

        editor.set_repository_results("utopian", vec![]);
        assert_eq!(
            editor.repository_search().menu_message(false).as_deref(),
            Some("No projects found")
        );

        editor.set_repository_query("utopian-io");
        editor.begin_repository_search();
        editor.set_repository_results("utopian-io", vec![repository()]);
        assert_eq!(editor.repository_search().menu_message(true), None);
    }

    #[test]
    fn test_draft_snapshot_reflects_values() {
        let mut editor = filled_editor();
        editor.ensure_draft_id();
        editor.set_upvote(false);
        editor.set_reward(RewardOption::FullPower);
        let draft = editor.draft_snapshot();
        assert_eq!(draft.id, editor.draft_id());
        assert_eq!(draft.title, "A post");
        assert_eq!(draft.topics, vec!["rust", "egui"]);
        assert!(!draft.upvote);
        assert_eq!(draft.reward, RewardOption::FullPower);
        assert!(draft.last_updated > 0);
    }
}
