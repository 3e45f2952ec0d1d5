//! Capture screen - live preview with countdown and shot counter.

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::config;

/// References to updateable widgets on the capture screen
pub struct CaptureWidgets {
    pub root: gtk::Box,
    countdown_label: gtk::Label,
    progress_label: gtk::Label,
}

/// Create the capture screen around the camera preview paintable
pub fn create_capture_screen(paintable: Option<&gtk::gdk::Paintable>) -> CaptureWidgets {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 16);
    root.add_css_class("capture-screen");

    let countdown_label = gtk::Label::new(Some(&format!(
        "Capturing in {} seconds",
        config::COUNTDOWN_SECS
    )));
    countdown_label.add_css_class("countdown-label");
    root.append(&countdown_label);

    let preview = gtk::Picture::new();
    preview.set_content_fit(gtk::ContentFit::Contain);
    preview.set_hexpand(true);
    preview.set_vexpand(true);
    preview.add_css_class("camera-preview");
    if let Some(paintable) = paintable {
        preview.set_paintable(Some(paintable));
    }
    root.append(&preview);

    let progress_label = gtk::Label::new(Some(&format!(
        "0/{} photos taken",
        config::TOTAL_PHOTOS
    )));
    progress_label.add_css_class("progress-label");
    root.append(&progress_label);

    CaptureWidgets {
        root,
        countdown_label,
        progress_label,
    }
}

impl CaptureWidgets {
    /// Update the countdown text; `capturing` flips to the shutter message
    pub fn set_countdown(&self, secs: u32, capturing: bool) {
        if capturing {
            self.countdown_label.set_text("Smile!");
        } else {
            self.countdown_label
                .set_text(&format!("Capturing in {} seconds", secs));
        }
    }

    /// Update the shot counter
    pub fn set_progress(&self, captured: usize) {
        self.progress_label
            .set_text(&format!("{}/{} photos taken", captured, config::TOTAL_PHOTOS));
    }
}
