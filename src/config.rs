//! Configuration constants for the four-cut booth.

use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Photos captured per session
pub const TOTAL_PHOTOS: usize = 8;

/// Photos the user must pick for the composite
pub const SELECTION_SIZE: usize = 4;

/// Seconds between captures
pub const COUNTDOWN_SECS: u32 = 10;

/// Attempts per photo before the camera is declared dead
pub const CAPTURE_RETRY_LIMIT: u32 = 3;

/// Snapshot pull timeout in milliseconds
pub const SNAPSHOT_TIMEOUT_MS: u64 = 500;

/// Notice/warning display duration in milliseconds
pub const NOTICE_DISPLAY_DURATION_MS: u64 = 5000;

/// File name prefix for composites and download URLs
pub const OUTPUT_PREFIX: &str = "fourcut";

/// QR module size in pixels
pub const QR_MODULE_SIZE: u32 = 8;

/// Base URL of the upload server
pub static SERVER_BASE: Lazy<String> = Lazy::new(|| {
    std::env::var("FOURCUT_SERVER").unwrap_or_else(|_| "http://localhost:8000".into())
});

/// V4L2 device for the booth camera
pub static CAMERA_DEVICE: Lazy<String> =
    Lazy::new(|| std::env::var("FOURCUT_CAMERA").unwrap_or_else(|_| "/dev/video0".into()));

/// Per-session scratch directory for captured photos and the QR image
pub static TEMP_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os("FOURCUT_TEMP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("temp"))
});

/// Directory composites are written to
pub static OUTPUT_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os("FOURCUT_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output"))
});

/// Directory holding the decorative frame overlays
pub static FRAME_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os("FOURCUT_FRAME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("resources/frame"))
});

/// Build the upload URL for a server base
pub fn upload_url(base: &str) -> String {
    format!("{}/upload", base.trim_end_matches('/'))
}

/// Build the viewer URL a composite is reachable at after upload.
///
/// Derived from the composite timestamp alone, so the URL can be
/// reconstructed without a server response body.
pub fn download_url(base: &str, timestamp: &str) -> String {
    format!(
        "{}/{}-{}",
        base.trim_end_matches('/'),
        OUTPUT_PREFIX,
        timestamp
    )
}

/// Build the composite file name for a timestamp
pub fn composite_file_name(timestamp: &str) -> String {
    format!("{}-{}.png", OUTPUT_PREFIX, timestamp)
}

/// Resolve a frame overlay name to its asset path
pub fn frame_asset_path(name: &str) -> PathBuf {
    FRAME_DIR.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url() {
        assert_eq!(
            upload_url("https://booth.example.com"),
            "https://booth.example.com/upload"
        );
        assert_eq!(
            upload_url("https://booth.example.com/"),
            "https://booth.example.com/upload"
        );
    }

    #[test]
    fn test_download_url_is_deterministic() {
        let a = download_url("https://booth.example.com", "240601123000");
        let b = download_url("https://booth.example.com", "240601123000");
        assert_eq!(a, b);
        assert_eq!(a, "https://booth.example.com/fourcut-240601123000");
    }

    #[test]
    fn test_composite_file_name() {
        assert_eq!(
            composite_file_name("240601123000"),
            "fourcut-240601123000.png"
        );
    }
}
