//! Filmstrip composition of the selected photos.
//!
//! The selected photos are stacked top-to-bottom on a canvas sized to the
//! tallest-needed height and tightest width (sum of heights, max of widths),
//! then the optional decorative frame is pasted over the stack at the canvas
//! origin using its own alpha channel. The result is saved once and never
//! mutated afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::{imageops, ImageError, Rgba, RgbaImage};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("failed to load photo {path}: {source}")]
    LoadPhoto {
        path: String,
        #[source]
        source: ImageError,
    },
    #[error("failed to load frame overlay {path}: {source}")]
    LoadFrame {
        path: String,
        #[source]
        source: ImageError,
    },
    #[error("no photos selected for composition")]
    Empty,
    #[error("failed to write composite {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: ImageError,
    },
    #[error("output directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished composite on disk
#[derive(Debug, Clone)]
pub struct Composite {
    pub path: PathBuf,
    /// `%y%m%d%H%M%S` timestamp the file name and download URL derive from
    pub timestamp: String,
}

/// Compose the selected photos into a single vertical filmstrip.
///
/// `photo_paths` must already be in ascending capture order; the composer
/// preserves that order top-to-bottom. Any unreadable source photo fails the
/// whole composition, leaving no partial output behind.
pub fn compose(
    photo_paths: &[PathBuf],
    frame_overlay: Option<&Path>,
    output_dir: &Path,
) -> Result<Composite, ComposeError> {
    if photo_paths.is_empty() {
        return Err(ComposeError::Empty);
    }

    let mut photos = Vec::with_capacity(photo_paths.len());
    for path in photo_paths {
        let img = image::open(path)
            .map_err(|source| ComposeError::LoadPhoto {
                path: path.display().to_string(),
                source,
            })?
            .to_rgba8();
        photos.push(img);
    }

    let width = photos.iter().map(|p| p.width()).max().unwrap_or(0);
    let height: u32 = photos.iter().map(|p| p.height()).sum();
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));

    let mut y_offset: i64 = 0;
    for photo in &photos {
        imageops::replace(&mut canvas, photo, 0, y_offset);
        y_offset += i64::from(photo.height());
    }

    // Frame goes on last so it overlays the photo stack
    if let Some(frame_path) = frame_overlay {
        let frame = image::open(frame_path)
            .map_err(|source| ComposeError::LoadFrame {
                path: frame_path.display().to_string(),
                source,
            })?
            .to_rgba8();
        imageops::overlay(&mut canvas, &frame, 0, 0);
    }

    let timestamp = Local::now().format("%y%m%d%H%M%S").to_string();
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(config::composite_file_name(&timestamp));
    canvas.save(&path).map_err(|source| ComposeError::Save {
        path: path.display().to_string(),
        source,
    })?;

    log::info!("Composite saved to {}", path.display());
    Ok(Composite { path, timestamp })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_solid(path: &Path, width: u32, height: u32, color: [u8; 4]) {
        RgbaImage::from_pixel(width, height, Rgba(color))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_filmstrip_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, (w, h)) in [(120, 90), (100, 80), (120, 90), (110, 70)].iter().enumerate() {
            let path = dir.path().join(format!("photo_{}.png", i + 1));
            write_solid(&path, *w, *h, [10 * (i as u8 + 1), 0, 0, 255]);
            paths.push(path);
        }

        let composite = compose(&paths, None, dir.path()).unwrap();
        let out = image::open(&composite.path).unwrap().to_rgba8();

        // Width is the max source width, height the sum of source heights
        assert_eq!(out.width(), 120);
        assert_eq!(out.height(), 90 + 80 + 90 + 70);
    }

    #[test]
    fn test_photos_stack_top_to_bottom_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let colors = [
            [200u8, 0, 0, 255],
            [0, 200, 0, 255],
            [0, 0, 200, 255],
            [200, 200, 0, 255],
        ];
        let mut paths = Vec::new();
        for (i, color) in colors.iter().enumerate() {
            let path = dir.path().join(format!("photo_{}.png", i + 1));
            write_solid(&path, 50, 40, *color);
            paths.push(path);
        }

        let composite = compose(&paths, None, dir.path()).unwrap();
        let out = image::open(&composite.path).unwrap().to_rgba8();

        // Sample the middle of each band
        for (i, color) in colors.iter().enumerate() {
            let y = (i as u32) * 40 + 20;
            assert_eq!(out.get_pixel(25, y), &Rgba(*color), "band {}", i);
        }
    }

    #[test]
    fn test_frame_overlay_respects_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo_1.png");
        write_solid(&photo, 60, 60, [0, 200, 0, 255]);

        // Frame: opaque white border pixel at origin, transparent elsewhere
        let mut frame = RgbaImage::from_pixel(60, 60, Rgba([0, 0, 0, 0]));
        frame.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let frame_path = dir.path().join("frame.png");
        frame.save(&frame_path).unwrap();

        let composite = compose(
            std::slice::from_ref(&photo),
            Some(frame_path.as_path()),
            dir.path(),
        )
        .unwrap();
        let out = image::open(&composite.path).unwrap().to_rgba8();

        // Frame pixel covers the photo, transparent region leaves it visible
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(30, 30), &Rgba([0, 200, 0, 255]));
    }

    #[test]
    fn test_output_name_carries_prefix_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo_1.png");
        write_solid(&photo, 10, 10, [1, 2, 3, 255]);

        let composite = compose(std::slice::from_ref(&photo), None, dir.path()).unwrap();
        let name = composite.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("fourcut-"));
        assert!(name.ends_with(".png"));
        assert_eq!(composite.timestamp.len(), 12);
        assert!(composite.timestamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_unreadable_photo_fails_without_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("photo_1.png");
        write_solid(&good, 10, 10, [1, 2, 3, 255]);
        let missing = dir.path().join("photo_2.png");

        let out_dir = dir.path().join("out");
        let err = compose(&[good, missing], None, &out_dir);
        assert!(matches!(err, Err(ComposeError::LoadPhoto { .. })));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_empty_selection_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(compose(&[], None, dir.path()), Err(ComposeError::Empty)));
    }
}
