//! Welcome screen - initial booth view with start button.

use gtk4 as gtk;
use gtk4::prelude::*;

/// Create the welcome screen
pub fn create_welcome_screen(on_start: impl Fn() + 'static) -> gtk::Box {
    let screen = gtk::Box::new(gtk::Orientation::Vertical, 24);
    screen.add_css_class("welcome-screen");
    screen.set_halign(gtk::Align::Center);
    screen.set_valign(gtk::Align::Center);

    let icon = gtk::Label::new(Some("\u{1F4F7}"));
    icon.add_css_class("welcome-icon");

    let title = gtk::Label::new(Some("Four-Cut Booth"));
    title.add_css_class("welcome-title");

    let subtitle = gtk::Label::new(Some("8 shots, pick your 4 favorites"));
    subtitle.add_css_class("welcome-subtitle");

    let button = gtk::Button::with_label("Start");
    button.add_css_class("start-button");
    button.set_height_request(50);
    button.connect_clicked(move |_| on_start());

    screen.append(&icon);
    screen.append(&title);
    screen.append(&subtitle);
    screen.append(&button);

    screen
}
