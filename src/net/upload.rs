//! Image host client.

use super::{ImageFile, ImageUploader};
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

/// Extensions accepted for upload
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Whether a path looks like an image the host accepts.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Uploads images with a multipart POST to `{host}/@{account}/uploads`.
#[derive(Debug, Clone)]
pub struct ImageHostClient {
    http: reqwest::Client,
    host_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

impl ImageHostClient {
    pub fn new(http: reqwest::Client, host_url: impl Into<String>) -> Self {
        Self {
            http,
            host_url: host_url.into(),
        }
    }
}

#[async_trait]
impl ImageUploader for ImageHostClient {
    async fn upload(&self, account: &str, file: ImageFile) -> Result<String> {
        let size = file.bytes.len();
        let mime = file.mime_type();
        let name = file.name.clone();
        debug!("Uploading {} ({} bytes, {})", name, size, mime);

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(name.clone())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("files", part);

        let response: UploadResponse = self
            .http
            .post(format!("{}/@{}/uploads", self.host_url, account))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let url = response
            .secure_url
            .or(response.url)
            .ok_or_else(|| Error::Upload(format!("No URL returned for {}", name)))?;
        info!("Uploaded {} to {}", name, url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("/tmp/a.png")));
        assert!(is_image_file(Path::new("photo.JPEG")));
        assert!(!is_image_file(Path::new("notes.md")));
        assert!(!is_image_file(Path::new("no_extension")));
    }
}
