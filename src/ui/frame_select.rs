//! Frame selection screen - pick a decorative overlay for the composite.

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::config;

/// Create the frame selection screen.
///
/// Lists the PNG overlays found in the frame asset directory. A missing or
/// unreadable asset gets a text placeholder instead of art; the session can
/// always proceed without a frame.
pub fn create_frame_select_screen(on_choose: impl Fn(Option<String>) + Clone + 'static) -> gtk::Box {
    let screen = gtk::Box::new(gtk::Orientation::Vertical, 24);
    screen.add_css_class("frame-select-screen");
    screen.set_halign(gtk::Align::Center);
    screen.set_valign(gtk::Align::Center);

    let title = gtk::Label::new(Some("Pick a frame"));
    title.add_css_class("screen-title");
    screen.append(&title);

    let row = gtk::Box::new(gtk::Orientation::Horizontal, 24);
    row.set_halign(gtk::Align::Center);

    for name in list_frame_assets() {
        let column = gtk::Box::new(gtk::Orientation::Vertical, 12);

        let path = config::frame_asset_path(&name);
        if path.is_file() {
            let preview = gtk::Picture::for_filename(&path);
            preview.set_size_request(180, 320);
            preview.set_content_fit(gtk::ContentFit::Contain);
            column.append(&preview);
        } else {
            let placeholder = gtk::Label::new(Some(&format!("{} failed to load", name)));
            placeholder.add_css_class("frame-placeholder");
            column.append(&placeholder);
        }

        let button = gtk::Button::with_label("Use this frame");
        let on_choose = on_choose.clone();
        let chosen = name.clone();
        button.connect_clicked(move |_| on_choose(Some(chosen.clone())));
        column.append(&button);

        row.append(&column);
    }

    screen.append(&row);

    let skip = gtk::Button::with_label("No frame");
    skip.set_halign(gtk::Align::Center);
    skip.connect_clicked(move |_| on_choose(None));
    screen.append(&skip);

    screen
}

/// PNG overlay names in the frame directory, sorted by name
fn list_frame_assets() -> Vec<String> {
    let entries = match std::fs::read_dir(&*config::FRAME_DIR) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!(
                "Frame directory {} unreadable: {}",
                config::FRAME_DIR.display(),
                e
            );
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.to_ascii_lowercase().ends_with(".png"))
        .collect();
    names.sort();
    names
}
