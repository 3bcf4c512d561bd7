//! Local image sources
//!
//! Images reach the upload queue three ways: the file picker, files dropped
//! on the window, and a bitmap pasted from the clipboard. This module turns
//! each of them into an `ImageFile`.

pub mod dialogs;

use crate::error::{Error, Result};
use crate::net::{is_image_file, ImageFile};
use arboard::Clipboard;
use image::{ImageFormat, RgbaImage};
use log::{debug, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Read an image from disk.
pub fn read_image_file(path: &Path) -> Result<ImageFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let bytes = std::fs::read(path)?;
    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(ImageFile { name, bytes })
}

/// Read every image among `paths`, skipping non-images and unreadable
/// files.
pub fn read_image_files(paths: &[PathBuf]) -> Vec<ImageFile> {
    paths
        .iter()
        .filter(|path| {
            let image = is_image_file(path);
            if !image {
                debug!("Ignoring non-image file {}", path.display());
            }
            image
        })
        .filter_map(|path| match read_image_file(path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Encode raw RGBA pixels as a PNG file.
pub fn encode_png(name: &str, width: usize, height: usize, rgba: Vec<u8>) -> Result<ImageFile> {
    let width = u32::try_from(width).map_err(|_| Error::Image("Image too wide".to_string()))?;
    let height = u32::try_from(height).map_err(|_| Error::Image("Image too tall".to_string()))?;
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| Error::Image("Pixel buffer does not match image size".to_string()))?;

    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(ImageFile {
        name: format!("{}.png", name),
        bytes: bytes.into_inner(),
    })
}

/// Take a bitmap from the system clipboard, if it holds one.
pub fn clipboard_image() -> Result<Option<ImageFile>> {
    let mut clipboard = Clipboard::new()?;
    let image = match clipboard.get_image() {
        Ok(image) => image,
        Err(arboard::Error::ContentNotAvailable) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let name = format!("pasted-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S"));
    encode_png(&name, image.width, image.height, image.bytes.into_owned()).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_encode_png() {
        let file = encode_png("pixel", 1, 1, vec![255, 0, 0, 255]).unwrap();
        assert_eq!(file.name, "pixel.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(&file.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        assert!(matches!(
            encode_png("broken", 2, 2, vec![0; 4]),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn test_read_image_files_skips_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let image = temp_dir.path().join("shot.png");
        let notes = temp_dir.path().join("notes.txt");
        let missing = temp_dir.path().join("gone.jpg");
        fs::write(&image, b"png-bytes").unwrap();
        fs::write(&notes, b"text").unwrap();

        let files = read_image_files(&[image, notes, missing]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "shot.png");
        assert_eq!(files[0].bytes, b"png-bytes");
    }
}
