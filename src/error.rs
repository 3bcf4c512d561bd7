//! Centralized error handling for the composer
//!
//! This module provides a unified error type that covers all error scenarios
//! in the application: configuration, draft persistence, and the network
//! collaborators used while publishing.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Draft Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to read or write the draft store
    DraftStore {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Publishing Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A field the publisher relies on was not provided
    MissingField(&'static str),

    /// Transport-level HTTP failure
    Http(reqwest::Error),

    /// The node or broadcast service answered with an error
    Rpc { method: String, message: String },

    /// The broadcast was rejected or could not be delivered
    Broadcast(String),

    /// The contribution API call failed
    ContributionApi(String),

    /// The image host rejected an upload
    Upload(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Desktop Integration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Reading or writing the system clipboard failed
    Clipboard(String),

    /// An image could not be decoded or encoded
    Image(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Error::Clipboard(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Draft Errors
            Error::DraftStore { path, source } => {
                write!(f, "Draft store '{}' failed: {}", path.display(), source)
            }

            // Publishing Errors
            Error::MissingField(field) => {
                write!(f, "Developer Error: Missing required field {}", field)
            }
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::Rpc { method, message } => write!(f, "{} failed: {}", method, message),
            Error::Broadcast(msg) => write!(f, "Broadcast failed: {}", msg),
            Error::ContributionApi(msg) => write!(f, "Contribution API error: {}", msg),
            Error::Upload(msg) => write!(f, "Image upload failed: {}", msg),

            // Desktop Integration Errors
            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            Error::Image(msg) => write!(f, "Image error: {}", msg),

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Http(err) => Some(err),
            Error::ConfigLoad { source, .. }
            | Error::ConfigSave { source, .. }
            | Error::DraftStore { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::ConfigDirNotFound
            | Error::MissingField(_)
            | Error::Rpc { .. }
            | Error::Broadcast(_)
            | Error::ContributionApi(_)
            | Error::Upload(_)
            | Error::Clipboard(_)
            | Error::Image(_)
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
