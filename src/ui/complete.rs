//! Completion screen - QR code for the uploaded composite.

use std::path::Path;

use gtk4 as gtk;
use gtk4::prelude::*;

/// Create the completion screen.
///
/// Shows the QR code when one was generated; when the user skipped the
/// upload (or the QR could not be rendered) the download URL or a plain
/// done message takes its place.
pub fn create_complete_screen(
    qr_path: Option<&Path>,
    download_url: Option<&str>,
    on_return: impl Fn() + 'static,
) -> gtk::Box {
    let screen = gtk::Box::new(gtk::Orientation::Vertical, 24);
    screen.add_css_class("complete-screen");
    screen.set_halign(gtk::Align::Center);
    screen.set_valign(gtk::Align::Center);

    let title = gtk::Label::new(Some("All done!"));
    title.add_css_class("screen-title");
    screen.append(&title);

    match (qr_path, download_url) {
        (Some(path), _) => {
            let hint = gtk::Label::new(Some("Scan the QR code to download your photos"));
            hint.add_css_class("complete-hint");
            screen.append(&hint);

            let qr = gtk::Picture::for_filename(path);
            qr.set_size_request(300, 300);
            qr.set_content_fit(gtk::ContentFit::Contain);
            screen.append(&qr);
        }
        (None, Some(url)) => {
            let hint = gtk::Label::new(Some("Your photos are available at:"));
            hint.add_css_class("complete-hint");
            screen.append(&hint);

            let link = gtk::Label::new(Some(url));
            link.add_css_class("complete-url");
            link.set_selectable(true);
            screen.append(&link);
        }
        (None, None) => {
            let hint = gtk::Label::new(Some("Your photos were saved at the booth"));
            hint.add_css_class("complete-hint");
            screen.append(&hint);
        }
    }

    let button = gtk::Button::with_label("Back to start");
    button.set_height_request(50);
    button.connect_clicked(move |_| on_return());
    screen.append(&button);

    screen
}
