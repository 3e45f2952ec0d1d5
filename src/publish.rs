//! Upload of the composite and QR generation for its download URL.
//!
//! Publishing is a one-shot POST of the composite file followed by a locally
//! generated QR code encoding the deterministic viewer URL. There is no retry
//! loop here; a failed upload surfaces as a recoverable error and the user
//! decides whether to retry or skip.

use std::path::{Path, PathBuf};

use image::Luma;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server rejected upload: {0}")]
    Server(String),
    #[error("failed to read composite: {0}")]
    Io(#[from] std::io::Error),
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("failed to write QR image: {0}")]
    QrImage(#[from] image::ImageError),
}

/// Uploads composites to the booth server
#[derive(Clone)]
pub struct Publisher {
    client: reqwest::Client,
    base: String,
}

impl Publisher {
    pub fn new() -> Self {
        Self::with_base(config::SERVER_BASE.clone())
    }

    /// Publisher targeting an explicit server base URL
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into(),
        }
    }

    /// The viewer URL the composite with this timestamp is reachable at
    pub fn download_url(&self, timestamp: &str) -> String {
        config::download_url(&self.base, timestamp)
    }

    /// Upload the composite file and return its download URL.
    ///
    /// One POST, no retry. The server response body is not inspected beyond
    /// the status code; the download URL is derived from the timestamp.
    pub async fn upload(
        &self,
        composite_path: &Path,
        timestamp: &str,
    ) -> Result<String, PublishError> {
        let url = config::upload_url(&self.base);
        log::info!("Uploading {} to {}", composite_path.display(), url);

        let bytes = std::fs::read(composite_path)?;
        let file_name = composite_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config::composite_file_name(timestamp));
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Server(format!("{}: {}", status, body)));
        }

        let download = self.download_url(timestamp);
        log::info!("Upload complete, composite available at {}", download);
        Ok(download)
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `url` as a QR code image at `path`.
///
/// Error correction level M with a fixed module size and quiet zone, matching
/// what booth phone cameras scan reliably from the completion screen.
pub fn generate_qr(url: &str, path: &Path) -> Result<PathBuf, PublishError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(config::QR_MODULE_SIZE, config::QR_MODULE_SIZE)
        .quiet_zone(true)
        .build();
    image.save(path)?;
    log::info!("QR for {} written to {}", url, path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_derives_from_timestamp() {
        let publisher = Publisher::with_base("https://booth.example.com");
        assert_eq!(
            publisher.download_url("240601123000"),
            "https://booth.example.com/fourcut-240601123000"
        );
    }

    #[test]
    fn test_generate_qr_writes_square_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        generate_qr("https://booth.example.com/fourcut-240601123000", &path).unwrap();

        let img = image::open(&path).unwrap();
        assert!(img.width() > 0);
        assert_eq!(img.width(), img.height());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_recoverable_error() {
        // Nothing listens on this port; the upload must fail with an error
        // value instead of tearing anything down.
        let publisher = Publisher::with_base("http://127.0.0.1:1");

        let dir = tempfile::tempdir().unwrap();
        let composite = dir.path().join("fourcut-240601123000.png");
        std::fs::write(&composite, b"not a real png").unwrap();

        let result = publisher.upload(&composite, "240601123000").await;
        assert!(matches!(result, Err(PublishError::Request(_))));
    }

    #[tokio::test]
    async fn test_missing_composite_is_an_io_error() {
        let publisher = Publisher::with_base("http://127.0.0.1:1");
        let result = publisher
            .upload(Path::new("/nonexistent/fourcut.png"), "240601123000")
            .await;
        assert!(matches!(result, Err(PublishError::Io(_))));
    }
}
