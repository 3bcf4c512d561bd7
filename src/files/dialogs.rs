//! Native file dialog integration using the rfd crate
//!
//! This module provides the image picker behind the toolbar's image button.

use rfd::FileDialog;
use std::path::PathBuf;

/// File extension filter for images the host accepts.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Opens a native file dialog for selecting images to upload.
///
/// Returns the selected paths. Empty if the dialog was cancelled.
pub fn open_images_dialog(initial_dir: Option<&PathBuf>) -> Vec<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Insert Images")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_files().unwrap_or_default()
}
