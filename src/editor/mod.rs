//! Post form state
//!
//! This module contains the view-model behind the post form:
//! - `state`: `PostEditor` with setters, insertions, drop zone and submit
//! - `validation`: the field rule table and inline `FormErrors`
//! - `upload`: counting completions of multi-file image uploads

mod state;
mod upload;
mod validation;

pub use state::{parse_topics, PostEditor, PostSubmission, RepositorySearch};
pub use upload::{BatchId, UploadProgress, UploadTracker};
pub use validation::{check_title, check_topics, is_valid_tag, validate_fields, FormErrors};
