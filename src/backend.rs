//! Background worker for network calls.
//!
//! The UI thread never blocks on the network. A dedicated thread owns a
//! multi-threaded tokio runtime, receives `BackendCommand`s over a channel
//! and runs each one as its own task. Results come back as `BackendEvent`s,
//! which the app drains once per frame.

use crate::config::Settings;
use crate::drafts::{DraftStore, PostDraft};
use crate::editor::BatchId;
use crate::error::Result;
use crate::net::{
    http_client, GithubClient, ImageFile, ImageHostClient, ImageUploader, Repository,
    RepositorySearch, SteemConnectClient, UtopianApiClient,
};
use crate::post::{PostData, PublishOutcome, Publisher, SiteConfig};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread;

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Work queued by the UI.
#[derive(Debug)]
pub enum BackendCommand {
    /// Run the publish sequence for a validated post
    Publish {
        post: Box<PostData>,
        settings: Box<Settings>,
    },
    /// Upload one file of an upload batch
    UploadImage {
        batch: BatchId,
        file: ImageFile,
        account: String,
        host_url: String,
    },
    /// Search GitHub repositories for the autocomplete
    SearchRepositories { query: String, api_url: String },
    /// Load a published post into a draft for editing
    LoadPostForEdit {
        author: String,
        permlink: String,
        settings: Box<Settings>,
    },
}

/// Results reported back to the UI.
#[derive(Debug)]
pub enum BackendEvent {
    Published(PublishOutcome),
    PublishFailed(String),
    ImageUploaded {
        batch: BatchId,
        url: String,
        name: String,
    },
    ImageUploadFailed {
        batch: BatchId,
        name: String,
        error: String,
    },
    RepositoriesFound {
        query: String,
        results: Vec<Repository>,
    },
    RepositorySearchFailed {
        query: String,
        error: String,
    },
    PostLoaded(PostDraft),
    PostLoadFailed(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// UI side of the backend worker.
pub struct BackendHandle {
    cmd_tx: Sender<BackendCommand>,
    event_rx: Receiver<BackendEvent>,
}

impl BackendHandle {
    /// Start the worker thread.
    ///
    /// `on_event` runs after every event is queued; the app passes a
    /// closure that requests a repaint.
    pub fn spawn(
        drafts: Arc<dyn DraftStore>,
        on_event: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        spawn_backend_thread(cmd_rx, event_tx, drafts, Arc::new(on_event));
        Self { cmd_tx, event_rx }
    }

    /// Queue a command. Returns `false` if the worker is gone.
    pub fn send(&self, command: BackendCommand) -> bool {
        match self.cmd_tx.send(command) {
            Ok(()) => true,
            Err(e) => {
                error!("Backend worker is not running: {:?}", e.0);
                false
            }
        }
    }

    /// Next pending event, if any.
    pub fn try_recv(&self) -> Option<BackendEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────────────────────────────────────

type Notify = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
struct Services {
    http: reqwest::Client,
    drafts: Arc<dyn DraftStore>,
    events: Sender<BackendEvent>,
    notify: Notify,
}

impl Services {
    fn emit(&self, event: BackendEvent) {
        if self.events.send(event).is_ok() {
            (self.notify)();
        }
    }

    fn publisher(&self, settings: &Settings) -> Publisher {
        Publisher::new(
            Arc::new(SteemConnectClient::from_settings(self.http.clone(), settings)),
            Arc::new(UtopianApiClient::from_settings(self.http.clone(), settings)),
            self.drafts.clone(),
            SiteConfig::from_settings(settings),
        )
    }
}

fn spawn_backend_thread(
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<BackendEvent>,
    drafts: Arc<dyn DraftStore>,
    notify: Notify,
) {
    let spawned = thread::Builder::new()
        .name("backend".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("Failed to build backend runtime: {}", err);
                    return;
                }
            };

            let http = match http_client() {
                Ok(http) => http,
                Err(err) => {
                    error!("Failed to build HTTP client: {}", err);
                    return;
                }
            };

            let services = Services {
                http,
                drafts,
                events: event_tx,
                notify,
            };
            info!("Backend worker ready");

            while let Ok(command) = cmd_rx.recv() {
                let services = services.clone();
                runtime.spawn(async move { handle_command(command, services).await });
            }

            debug!("Backend command channel closed, shutting down");
        });

    if let Err(err) = spawned {
        error!("Failed to spawn backend thread: {}", err);
    }
}

async fn handle_command(command: BackendCommand, services: Services) {
    match command {
        BackendCommand::Publish { post, settings } => {
            let publisher = services.publisher(&settings);
            let event = match publisher.create_post(*post).await {
                Ok(outcome) => BackendEvent::Published(outcome),
                Err(err) => BackendEvent::PublishFailed(err.to_string()),
            };
            services.emit(event);
        }

        BackendCommand::UploadImage {
            batch,
            file,
            account,
            host_url,
        } => {
            let name = file.stem().to_string();
            let uploader = ImageHostClient::new(services.http.clone(), host_url);
            let event = match uploader.upload(&account, file).await {
                Ok(url) => BackendEvent::ImageUploaded { batch, url, name },
                Err(err) => {
                    warn!("Upload of {} failed: {}", name, err);
                    BackendEvent::ImageUploadFailed {
                        batch,
                        name,
                        error: err.to_string(),
                    }
                }
            };
            services.emit(event);
        }

        BackendCommand::SearchRepositories { query, api_url } => {
            let github = GithubClient::new(services.http.clone(), api_url);
            let result: Result<Vec<Repository>> = github.search(&query).await;
            let event = match result {
                Ok(results) => BackendEvent::RepositoriesFound { query, results },
                Err(err) => BackendEvent::RepositorySearchFailed {
                    query,
                    error: err.to_string(),
                },
            };
            services.emit(event);
        }

        BackendCommand::LoadPostForEdit {
            author,
            permlink,
            settings,
        } => {
            let publisher = services.publisher(&settings);
            let event = match publisher.edit_post(&author, &permlink).await {
                Ok(draft) => BackendEvent::PostLoaded(draft),
                Err(err) => BackendEvent::PostLoadFailed(err.to_string()),
            };
            services.emit(event);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
