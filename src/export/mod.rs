//! Post export
//!
//! The rendered post can be opened in the system browser as a standalone
//! HTML page, or copied to the clipboard as HTML with the markdown as the
//! plain-text fallback.

use crate::error::Result;
use crate::markdown::{generate_html_document, render_markdown};
use arboard::Clipboard;
use log::info;
use std::path::{Path, PathBuf};

/// File name of the browser preview inside the temp directory.
const PREVIEW_FILE_NAME: &str = "steem-composer-preview.html";

/// Write the post as a standalone HTML document to `output_path`.
pub fn export_to_html_file(title: &str, markdown: &str, output_path: &Path) -> Result<()> {
    let html = generate_html_document(title, markdown);
    std::fs::write(output_path, html)?;
    Ok(())
}

/// Render the post into the temp directory and open it in the browser.
///
/// Returns the path of the written file.
pub fn open_in_browser(title: &str, markdown: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(PREVIEW_FILE_NAME);
    export_to_html_file(title, markdown, &path)?;
    open::that(&path)?;
    info!("Opened browser preview {}", path.display());
    Ok(path)
}

/// Copy the rendered post to the clipboard.
pub fn copy_html_to_clipboard(markdown: &str) -> Result<()> {
    let html = render_markdown(markdown);
    let mut clipboard = Clipboard::new()?;
    clipboard.set_html(html.as_str(), Some(markdown))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_to_html_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("post.html");
        export_to_html_file("My <post>", "# Hello\n\n**bold**", &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("My &lt;post&gt;"));
        assert!(html.contains("<strong>bold</strong>"));
    }
}
