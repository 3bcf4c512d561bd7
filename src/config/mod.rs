//! Configuration module for the composer
//!
//! This module handles the account, service endpoints and editor
//! preferences, including serialization to/from JSON and persistent storage
//! in platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
pub(crate) use persistence::write_json_atomic;
