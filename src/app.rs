//! Main application module
//!
//! This module implements the eframe App trait for the composer, handling
//! the post form, keyboard shortcuts, image drops, backend events and the
//! windows drawn over the form.

use crate::backend::{BackendCommand, BackendEvent, BackendHandle};
use crate::config::{load_config, Theme, APP_NAME};
use crate::drafts::{DraftStore, JsonDraftStore, DRAFTS_FILE_NAME};
use crate::editor::UploadProgress;
use crate::export::{copy_html_to_clipboard, open_in_browser};
use crate::files::dialogs::open_images_dialog;
use crate::files::{clipboard_image, read_image_file, read_image_files};
use crate::markdown::{MarkdownShortcut, Selection};
use crate::net::{is_image_file, ImageFile};
use crate::post::RewardOption;
use crate::state::AppState;
use crate::ui::{
    show_alert, show_drafts_window, show_preview, show_repository_field, show_toolbar,
    DraftsAction, EditPostDialog, EditPostResult, PreviewColors, SettingsPanel, ToolbarAction,
};
use eframe::egui::{self, Color32, FontId, RichText};
use eframe::egui::text::{CCursor, CCursorRange};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Window title suffix.
const WINDOW_TITLE: &str = "Steem Composer";

/// How long toasts stay visible, in seconds.
const TOAST_DURATION: f64 = 3.0;

/// Shown under the title field.
const WRITING_TIPS: &[&str] = &[
    "Explain what the project does and why your contribution matters.",
    "Link the pull requests or commits your post is about.",
    "Add screenshots or diagrams. Drop images on the editor to upload them.",
    "Use headings to split the post into sections.",
];

/// Color of inline form errors.
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 80, 80);

/// Keyboard shortcut actions that need to be deferred.
///
/// These actions are detected in the input handling closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Markdown shortcut (Ctrl+Shift+1..6, Ctrl+B/I/Q/K/M)
    Insert(MarkdownShortcut),
    /// Submit the post (Ctrl+Enter)
    Submit,
    /// New post (Ctrl+N)
    NewPost,
    /// Show the drafts window (Ctrl+D)
    OpenDrafts,
    /// Paste an image from the clipboard (Ctrl+Shift+V)
    PasteImage,
    /// Toggle the preview pane (Ctrl+E)
    TogglePreview,
    /// Open settings panel (Ctrl+,)
    OpenSettings,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct ComposerApp {
    /// Central application state
    state: AppState,
    /// Worker thread running network calls
    backend: BackendHandle,
    /// Settings panel component
    settings_panel: SettingsPanel,
    /// "Edit a published post" dialog
    edit_dialog: EditPostDialog,
    /// Theme currently applied to the egui context
    applied_theme: Option<Theme>,
    /// Last title sent to the viewport
    last_title: String,
    /// Last known inner window size
    last_window_size: Option<egui::Vec2>,
    /// Whether files were hovering over the window last frame
    files_hovering: bool,
    /// Application start time for toast timing
    start_time: Instant,
}

impl ComposerApp {
    /// Create the app: load settings and drafts, start the backend worker.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        info!("Initializing {}", APP_NAME);

        let settings = load_config();
        let drafts: Arc<dyn DraftStore> = match JsonDraftStore::open_default() {
            Ok(store) => Arc::new(store),
            Err(e) => {
                let fallback = std::env::temp_dir().join(DRAFTS_FILE_NAME);
                warn!(
                    "Config directory unavailable ({}), keeping drafts in {}",
                    e,
                    fallback.display()
                );
                Arc::new(JsonDraftStore::new(fallback))
            }
        };

        let repaint_ctx = cc.egui_ctx.clone();
        let backend = BackendHandle::spawn(drafts.clone(), move || repaint_ctx.request_repaint());

        let state = AppState::new(settings, drafts);

        let mut app = Self {
            state,
            backend,
            settings_panel: SettingsPanel::new(),
            edit_dialog: EditPostDialog::new(),
            applied_theme: None,
            last_title: String::new(),
            last_window_size: None,
            files_hovering: false,
            start_time: Instant::now(),
        };
        app.apply_theme_if_needed(&cc.egui_ctx);
        app
    }

    /// Get elapsed time since app start in seconds.
    fn get_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn toast(&mut self, message: impl Into<String>) {
        let time = self.get_app_time();
        self.state.show_toast(message, time, TOAST_DURATION);
    }

    fn is_dark(&self) -> bool {
        self.state.settings.theme == Theme::Dark
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        let theme = self.state.settings.theme;
        if self.applied_theme != Some(theme) {
            ctx.set_visuals(match theme {
                Theme::Dark => egui::Visuals::dark(),
                Theme::Light => egui::Visuals::light(),
            });
            self.applied_theme = Some(theme);
            debug!("Applied theme {:?}", theme);
        }
    }

    /// Window title: the post title followed by the app name.
    fn window_title(&self) -> String {
        let title = self.state.editor.title().trim();
        if title.is_empty() {
            WINDOW_TITLE.to_string()
        } else {
            format!("{} - {}", title, WINDOW_TITLE)
        }
    }

    fn update_window_title(&mut self, ctx: &egui::Context) {
        let title = self.window_title();
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }
    }

    /// Track the window size for persistence.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (size, maximized) = ctx.input(|i| {
            (
                i.viewport().inner_rect.map(|r| r.size()),
                i.viewport().maximized.unwrap_or(false),
            )
        });
        let Some(size) = size else {
            return;
        };

        let changed = self
            .last_window_size
            .map(|s| (s - size).length() > 1.0)
            .unwrap_or(true);
        if changed || self.state.settings.window_size.maximized != maximized {
            self.last_window_size = Some(size);
            let window = &mut self.state.settings.window_size;
            if !maximized {
                window.width = size.x;
                window.height = size.y;
            }
            window.maximized = maximized;
            self.state.mark_settings_dirty();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Backend Events
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_backend_events(&mut self) {
        while let Some(event) = self.backend.try_recv() {
            self.handle_backend_event(event);
        }
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Published(outcome) => {
                info!("Published @{}/{}", outcome.author, outcome.permlink);
                match &outcome.contribution_error {
                    Some(error) => self.toast(format!(
                        "Post is live, but the contribution was not registered: {}",
                        error
                    )),
                    None if outcome.is_updating => self.toast("Post updated"),
                    None => self.toast("Post published"),
                }
                if let Err(e) = open::that(&outcome.url) {
                    warn!("Failed to open {}: {}", outcome.url, e);
                }
                self.state.finish_submit(outcome.url);
            }
            BackendEvent::PublishFailed(error) => {
                warn!("Publish failed: {}", error);
                self.state.fail_submit(&error);
            }
            BackendEvent::ImageUploaded { batch, url, name } => {
                let progress = self.state.editor.upload_finished(batch, Ok((url, name)));
                self.report_upload_progress(progress);
            }
            BackendEvent::ImageUploadFailed { batch, name, error } => {
                let progress = self.state.editor.upload_finished(batch, Err(error.clone()));
                if progress != UploadProgress::Ignored {
                    self.toast(format!("Could not upload {}: {}", name, error));
                }
                self.report_upload_progress(progress);
            }
            BackendEvent::RepositoriesFound { query, results } => {
                self.state.editor.set_repository_results(&query, results);
            }
            BackendEvent::RepositorySearchFailed { query, error } => {
                warn!("Repository search '{}' failed: {}", query, error);
                self.state.editor.set_repository_search_failed(&query, error);
            }
            BackendEvent::PostLoaded(draft) => {
                info!("Loaded published post {} for editing", draft.id);
                self.state.ui.loading_post = false;
                self.state.ui.show_edit_dialog = false;
                self.edit_dialog.reset();
                self.state.open_loaded_draft(draft);
                self.toast("Editing published post");
            }
            BackendEvent::PostLoadFailed(error) => {
                warn!("Loading post failed: {}", error);
                self.state.ui.loading_post = false;
                self.edit_dialog.set_error(error);
            }
        }
    }

    fn report_upload_progress(&mut self, progress: UploadProgress) {
        if let UploadProgress::Finished { succeeded, failed } = progress {
            if failed > 0 {
                self.toast(format!("{} of {} images uploaded", succeeded, succeeded + failed));
            } else if succeeded > 1 {
                self.toast(format!("{} images uploaded", succeeded));
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn require_credentials(&mut self) -> bool {
        if self.state.settings.has_credentials() {
            return true;
        }
        self.state.show_alert(
            "Account required",
            "Enter your account name and access token in Settings first.",
        );
        false
    }

    fn handle_submit(&mut self) {
        if !self.require_credentials() {
            return;
        }
        let Some(post) = self.state.prepare_submit() else {
            return;
        };
        info!("Submitting post '{}'", post.title);
        let sent = self.backend.send(BackendCommand::Publish {
            post: Box::new(post),
            settings: Box::new(self.state.settings.clone()),
        });
        if !sent {
            self.state.fail_submit("The network worker is not running.");
        }
    }

    fn handle_repository_search(&mut self, query: String) {
        debug!("Searching repositories for '{}'", query);
        let sent = self.backend.send(BackendCommand::SearchRepositories {
            query: query.clone(),
            api_url: self.state.settings.github_api_url.clone(),
        });
        if !sent {
            self.state
                .editor
                .set_repository_search_failed(&query, "The network worker is not running.");
        }
    }

    fn handle_load_post(&mut self, author: String, permlink: String) {
        info!("Loading @{}/{} for editing", author, permlink);
        self.state.ui.loading_post = true;
        let sent = self.backend.send(BackendCommand::LoadPostForEdit {
            author,
            permlink,
            settings: Box::new(self.state.settings.clone()),
        });
        if !sent {
            self.state.ui.loading_post = false;
            self.edit_dialog
                .set_error("The network worker is not running.");
        }
    }

    /// Queue an upload batch for `files`.
    fn start_uploads(&mut self, files: Vec<ImageFile>) {
        if files.is_empty() || !self.require_credentials() {
            return;
        }
        let Some(batch) = self.state.editor.handle_drop(files.len()) else {
            return;
        };
        info!("Uploading {} image(s) in batch {}", files.len(), batch);

        for file in files {
            let name = file.stem().to_string();
            let sent = self.backend.send(BackendCommand::UploadImage {
                batch,
                file,
                account: self.state.settings.account.clone(),
                host_url: self.state.settings.image_host_url.clone(),
            });
            if !sent {
                let progress = self
                    .state
                    .editor
                    .upload_finished(batch, Err("The network worker is not running.".into()));
                debug!("Upload of {} not queued: {:?}", name, progress);
            }
        }
    }

    fn handle_pick_images(&mut self) {
        let paths = open_images_dialog(None);
        if paths.is_empty() {
            return;
        }
        let files = read_image_files(&paths);
        if files.len() < paths.len() {
            self.toast("Some files are not images and were skipped");
        }
        self.start_uploads(files);
    }

    fn handle_paste_image(&mut self) {
        match clipboard_image() {
            Ok(Some(file)) => self.start_uploads(vec![file]),
            Ok(None) => self.toast("The clipboard holds no image"),
            Err(e) => {
                warn!("Clipboard paste failed: {}", e);
                self.toast(format!("Could not paste image: {}", e));
            }
        }
    }

    /// Handle files being dragged over and dropped on the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if hovering != self.files_hovering {
            if hovering {
                self.state.editor.handle_drag_enter();
            } else {
                self.state.editor.handle_drag_leave();
            }
            self.files_hovering = hovering;
        }

        let dropped: Vec<egui::DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let mut files = Vec::new();
        for dropped_file in dropped {
            match (&dropped_file.path, &dropped_file.bytes) {
                (Some(path), _) if is_image_file(path) => match read_image_file(path) {
                    Ok(file) => files.push(file),
                    Err(e) => warn!("Failed to read dropped file {}: {}", path.display(), e),
                },
                (None, Some(bytes))
                    if is_image_file(std::path::Path::new(&dropped_file.name)) =>
                {
                    files.push(ImageFile {
                        name: dropped_file.name.clone(),
                        bytes: bytes.to_vec(),
                    });
                }
                _ => debug!("Ignoring dropped non-image {}", dropped_file.name),
            }
        }

        if files.is_empty() {
            self.state.editor.handle_drag_leave();
            self.toast("Only images can be dropped here");
            return;
        }
        self.start_uploads(files);
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction, ctx: &egui::Context) {
        match action {
            ToolbarAction::NewPost => {
                self.state.new_post();
                self.toast("New post");
            }
            ToolbarAction::OpenDrafts => self.state.ui.show_drafts = true,
            ToolbarAction::EditExisting => self.state.ui.show_edit_dialog = true,
            ToolbarAction::Insert(shortcut) => self.handle_insert(shortcut, ctx),
            ToolbarAction::UploadImages => self.handle_pick_images(),
            ToolbarAction::PasteImage => self.handle_paste_image(),
            ToolbarAction::TogglePreview => {
                self.state.ui.show_preview = !self.state.ui.show_preview;
            }
            ToolbarAction::OpenInBrowser => {
                let title = self.state.editor.title().to_string();
                let body = self.state.editor.body().to_string();
                if let Err(e) = open_in_browser(&title, &body) {
                    warn!("Browser preview failed: {}", e);
                    self.toast(format!("Could not open browser: {}", e));
                }
            }
            ToolbarAction::CopyAsHtml => {
                match copy_html_to_clipboard(self.state.editor.body()) {
                    Ok(()) => self.toast("Copied as HTML"),
                    Err(e) => self.toast(format!("Copy failed: {}", e)),
                }
            }
            ToolbarAction::OpenSettings => self.state.ui.show_settings = true,
        }
    }

    fn handle_insert(&mut self, shortcut: MarkdownShortcut, ctx: &egui::Context) {
        debug!("Inserting {:?}", shortcut);
        self.state.editor.insert_code(shortcut);
        ctx.memory_mut(|m| m.request_focus(body_id()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard Shortcuts
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        if self.state.ui.alert.is_some() || self.state.ui.show_settings {
            return;
        }

        let action = ctx.input(|i| {
            // Ctrl+Shift+1..6: headings. Shifted digits may arrive as symbols,
            // so match the physical key.
            for event in &i.events {
                if let egui::Event::Key {
                    key,
                    physical_key,
                    pressed: true,
                    modifiers,
                    ..
                } = event
                {
                    if modifiers.command && modifiers.shift {
                        if let Some(level) = heading_level(physical_key.unwrap_or(*key)) {
                            return MarkdownShortcut::heading(level).map(KeyboardAction::Insert);
                        }
                    }
                }
            }

            if i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::V) {
                return Some(KeyboardAction::PasteImage);
            }

            if i.modifiers.command && !i.modifiers.shift {
                let shortcut = [
                    (egui::Key::B, MarkdownShortcut::Bold),
                    (egui::Key::I, MarkdownShortcut::Italic),
                    (egui::Key::Q, MarkdownShortcut::Quote),
                    (egui::Key::K, MarkdownShortcut::Link),
                    (egui::Key::M, MarkdownShortcut::Image),
                ]
                .into_iter()
                .find(|(key, _)| i.key_pressed(*key));
                if let Some((_, shortcut)) = shortcut {
                    return Some(KeyboardAction::Insert(shortcut));
                }

                if i.key_pressed(egui::Key::Enter) {
                    return Some(KeyboardAction::Submit);
                }
                if i.key_pressed(egui::Key::N) {
                    return Some(KeyboardAction::NewPost);
                }
                if i.key_pressed(egui::Key::D) {
                    return Some(KeyboardAction::OpenDrafts);
                }
                if i.key_pressed(egui::Key::E) {
                    return Some(KeyboardAction::TogglePreview);
                }
                if i.key_pressed(egui::Key::Comma) {
                    return Some(KeyboardAction::OpenSettings);
                }
            }

            None
        });

        let Some(action) = action else {
            return;
        };
        debug!("Keyboard shortcut: {:?}", action);

        match action {
            KeyboardAction::Insert(shortcut) => self.handle_insert(shortcut, ctx),
            KeyboardAction::Submit => self.handle_submit(),
            KeyboardAction::NewPost => self.handle_toolbar_action(ToolbarAction::NewPost, ctx),
            KeyboardAction::OpenDrafts => self.state.ui.show_drafts = true,
            KeyboardAction::PasteImage => self.handle_paste_image(),
            KeyboardAction::TogglePreview => {
                self.state.ui.show_preview = !self.state.ui.show_preview;
            }
            KeyboardAction::OpenSettings => self.state.ui.show_settings = true,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn render_ui(&mut self, ctx: &egui::Context) {
        let is_dark = self.is_dark();
        let font_size = self.state.settings.font_size;

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                show_toolbar(
                    ui,
                    is_dark,
                    self.state.ui.show_preview,
                    self.state.editor.image_uploading(),
                )
            })
            .inner;
        if let Some(action) = toolbar_action {
            self.handle_toolbar_action(action, ctx);
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        if self.state.ui.show_preview {
            egui::SidePanel::right("preview_panel")
                .resizable(true)
                .default_width(ctx.screen_rect().width() * 0.45)
                .min_width(240.0)
                .show(ctx, |ui| {
                    let colors = PreviewColors::from_theme(self.state.settings.theme);
                    show_preview(
                        ui,
                        self.state.editor.title(),
                        self.state.editor.preview(),
                        &colors,
                        font_size,
                    );
                });
        }

        let mut search = None;
        let mut submit = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_source("post_form")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    search = self.render_form_fields(ui, is_dark);
                    self.render_body(ui, font_size);
                    submit = self.render_footer(ui);
                });
        });

        if let Some(query) = search {
            self.handle_repository_search(query);
        }
        if submit {
            self.handle_submit();
        }
    }

    /// Title, tags and repository. Returns a repository query to search.
    fn render_form_fields(&mut self, ui: &mut egui::Ui, is_dark: bool) -> Option<String> {
        let editor = &mut self.state.editor;

        if editor.is_updating() {
            ui.label(
                RichText::new("✏ Updating a published post")
                    .strong()
                    .color(Color32::from_rgb(210, 153, 34)),
            );
            ui.add_space(4.0);
        }

        ui.label(RichText::new("Title").strong());
        let mut title = editor.title().to_string();
        if ui
            .add(
                egui::TextEdit::singleline(&mut title)
                    .hint_text("Title of your contribution")
                    .desired_width(f32::INFINITY),
            )
            .changed()
        {
            editor.set_title(title);
        }
        field_error(ui, editor.errors().title.as_deref());

        egui::CollapsingHeader::new("Writing tips")
            .id_source("writing_tips")
            .default_open(false)
            .show(ui, |ui| {
                for tip in WRITING_TIPS {
                    ui.label(RichText::new(format!("• {}", tip)).small());
                }
            });

        ui.add_space(6.0);
        ui.label(RichText::new("Tags").strong());
        let mut topics = editor.topics_input().to_string();
        if ui
            .add(
                egui::TextEdit::singleline(&mut topics)
                    .hint_text("Up to 4 tags, separated by spaces")
                    .desired_width(f32::INFINITY),
            )
            .changed()
        {
            editor.set_topics_input(topics);
        }
        field_error(ui, editor.errors().topics.as_deref());

        ui.add_space(6.0);
        ui.label(RichText::new("Repository").strong());
        let search = show_repository_field(ui, editor, is_dark);
        field_error(ui, editor.errors().repository.as_deref());

        ui.add_space(6.0);
        search
    }

    fn render_body(&mut self, ui: &mut egui::Ui, font_size: f32) {
        let now = Instant::now();
        let editor = &mut self.state.editor;
        let id = body_id();

        ui.label(RichText::new("Content").strong());

        // Move the cursor after an insertion
        if let Some(selection) = editor.take_pending_selection() {
            let mut text_state = egui::TextEdit::load_state(ui.ctx(), id).unwrap_or_default();
            text_state
                .cursor
                .set_char_range(Some(CCursorRange::two(
                    CCursor::new(selection.start),
                    CCursor::new(selection.end),
                )));
            text_state.store(ui.ctx(), id);
        }

        let mut body = editor.body().to_string();
        let output = egui::TextEdit::multiline(&mut body)
            .id(id)
            .font(FontId::monospace(font_size))
            .hint_text("Write your post in markdown. Drop images here to upload them.")
            .desired_width(f32::INFINITY)
            .desired_rows(20)
            .show(ui);

        if output.response.changed() {
            editor.set_body_at(body, now);
        }
        if let Some(range) = output.cursor_range {
            editor.set_selection(Selection::new(
                range.primary.ccursor.index,
                range.secondary.ccursor.index,
            ));
        }

        let rect = output.response.rect;
        if editor.dropzone_active() {
            let painter = ui.painter();
            painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(80, 140, 220, 40));
            painter.rect_stroke(rect, 4.0, egui::Stroke::new(2.0, Color32::from_rgb(80, 140, 220)));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Drop images to upload",
                FontId::proportional(18.0),
                Color32::from_rgb(80, 140, 220),
            );
        } else if editor.no_content() {
            ui.painter()
                .rect_stroke(rect, 4.0, egui::Stroke::new(1.0, ERROR_COLOR));
        }
        field_error(ui, editor.errors().body.as_deref());
    }

    /// Reward, vote and submit. Returns `true` if submit was clicked.
    fn render_footer(&mut self, ui: &mut egui::Ui) -> bool {
        let editor = &mut self.state.editor;
        let submitting = self.state.ui.submitting;
        let mut submit = false;

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Rewards:");
            let mut reward = editor.reward();
            egui::ComboBox::from_id_source("reward_option")
                .selected_text(reward.label())
                .show_ui(ui, |ui| {
                    for option in RewardOption::all() {
                        ui.selectable_value(&mut reward, *option, option.label());
                    }
                });
            if reward != editor.reward() {
                editor.set_reward(reward);
            }

            ui.add_space(12.0);
            let updating = editor.is_updating();
            let mut upvote = editor.upvote() && !updating;
            if ui
                .add_enabled(!updating, egui::Checkbox::new(&mut upvote, "Like this post"))
                .changed()
            {
                editor.set_upvote(upvote);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if submitting {
                    "Submitting"
                } else if updating {
                    "Update post"
                } else {
                    "Post"
                };
                let enabled = !submitting && !editor.image_uploading();
                if ui
                    .add_enabled(enabled, egui::Button::new(RichText::new(label).strong()))
                    .on_hover_text("Ctrl+Enter")
                    .clicked()
                {
                    submit = true;
                }
                if submitting {
                    ui.spinner();
                }
            });
        });

        submit
    }

    fn render_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let settings = &self.state.settings;
            if settings.has_credentials() {
                ui.label(RichText::new(format!("@{}", settings.account)).weak());
            } else {
                ui.label(RichText::new("Not signed in").weak());
            }

            let editor = &self.state.editor;
            if editor.image_uploading() {
                let (done, total) = editor.upload_progress();
                ui.spinner();
                ui.label(format!("Uploading images {}/{}", done, total));
            }

            if self.state.draft_save_pending() {
                ui.label(RichText::new("Saving draft...").weak());
            }

            if let Some(message) = &self.state.ui.toast_message {
                ui.separator();
                ui.label(message);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(url) = &self.state.ui.last_published_url {
                    ui.hyperlink_to("Last post", url);
                }
                let words = editor.body().split_whitespace().count();
                ui.label(RichText::new(format!("{} words", words)).weak());
            });
        });
    }

    fn render_windows(&mut self, ctx: &egui::Context) {
        if let Some(alert) = self.state.ui.alert.clone() {
            if show_alert(ctx, &alert) {
                self.state.dismiss_alert();
            }
            return;
        }

        if self.state.ui.show_settings {
            let is_dark = self.is_dark();
            let output = self
                .settings_panel
                .show(ctx, &mut self.state.settings, is_dark);
            if output.changed {
                self.state.mark_settings_dirty();
            }
            if output.reset_requested {
                self.state.reset_settings();
                self.toast("Settings reset to defaults");
            }
            if output.close_requested {
                self.state.ui.show_settings = false;
                self.state.save_settings_if_dirty();
            }
            self.apply_theme_if_needed(ctx);
            return;
        }

        if self.state.ui.show_edit_dialog {
            let loading = self.state.ui.loading_post;
            match self.edit_dialog.show(ctx, loading) {
                EditPostResult::None => {}
                EditPostResult::Cancelled => {
                    self.state.ui.show_edit_dialog = false;
                    self.edit_dialog.reset();
                }
                EditPostResult::Load { author, permlink } => {
                    self.handle_load_post(author, permlink);
                }
            }
            return;
        }

        if self.state.ui.show_drafts {
            let current_id = self.state.editor.draft_id().to_string();
            let action = show_drafts_window(ctx, self.state.drafts(), &current_id);
            match action {
                Some(DraftsAction::Open(id)) => {
                    self.state.open_draft(&id);
                    self.state.ui.show_drafts = false;
                }
                Some(DraftsAction::Discard(id)) => {
                    self.state.discard_draft(&id);
                    self.toast("Draft discarded");
                }
                Some(DraftsAction::NewPost) => {
                    self.state.new_post();
                    self.state.ui.show_drafts = false;
                }
                Some(DraftsAction::Close) => self.state.ui.show_drafts = false,
                None => {}
            }
        }
    }

    /// Run due preview renders and draft saves, and schedule the next frame
    /// for whichever is due first.
    fn run_timers(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.state.editor.tick(now);
        self.state.note_changes(now);
        if self.state.poll_draft_save(now) {
            debug!("Draft autosaved");
        }

        let next = [
            self.state.editor.next_render_in(now),
            self.state.next_draft_save_in(now),
            self.state
                .ui
                .toast_expires_at
                .map(|t| Duration::from_secs_f64((t - self.get_app_time()).max(0.0))),
        ]
        .into_iter()
        .flatten()
        .min();
        if let Some(delay) = next {
            ctx.request_repaint_after(delay);
        }
    }
}

impl eframe::App for ComposerApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme_if_needed(ctx);

        // Update toast message (clear if expired)
        let current_time = self.get_app_time();
        self.state.update_toast(current_time);

        self.handle_backend_events();
        self.update_window_title(ctx);
        self.update_window_state(ctx);
        self.handle_dropped_files(ctx);

        self.render_ui(ctx);
        self.render_windows(ctx);

        // Shortcuts run after render so the selection is up-to-date
        self.handle_keyboard_shortcuts(ctx);

        self.run_timers(ctx);
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.flush_draft();
        self.state.save_settings_if_dirty();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(30)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

fn body_id() -> egui::Id {
    egui::Id::new("post_body")
}

fn field_error(ui: &mut egui::Ui, error: Option<&str>) {
    if let Some(error) = error {
        ui.label(RichText::new(error).small().color(ERROR_COLOR));
    }
}

/// Heading level bound to a digit key.
fn heading_level(key: egui::Key) -> Option<u8> {
    match key {
        egui::Key::Num1 => Some(1),
        egui::Key::Num2 => Some(2),
        egui::Key::Num3 => Some(3),
        egui::Key::Num4 => Some(4),
        egui::Key::Num5 => Some(5),
        egui::Key::Num6 => Some(6),
        _ => None,
    }
}
