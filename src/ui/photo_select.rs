//! Photo selection screen - grid of captured photos with check buttons.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::config;
use crate::selection::SelectionGate;

/// References to updateable widgets on the photo selection screen
pub struct PhotoSelectWidgets {
    pub root: gtk::Box,
    /// Check buttons indexed by capture index minus one
    checks: Vec<gtk::CheckButton>,
    /// Set while the window writes check state programmatically, so the
    /// toggled handlers do not echo those writes back as user events
    syncing: Rc<Cell<bool>>,
}

/// Create the photo selection screen for the captured photos
pub fn create_photo_select_screen(
    photos: &[PathBuf],
    on_toggle: impl Fn(usize) + Clone + 'static,
    on_submit: impl Fn() + 'static,
) -> PhotoSelectWidgets {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 16);
    root.add_css_class("photo-select-screen");

    let title = gtk::Label::new(Some(&format!(
        "Pick {} of your {} photos",
        config::SELECTION_SIZE,
        config::TOTAL_PHOTOS
    )));
    title.add_css_class("screen-title");
    root.append(&title);

    let grid = gtk::Grid::new();
    grid.set_row_spacing(12);
    grid.set_column_spacing(12);
    grid.set_halign(gtk::Align::Center);
    grid.set_vexpand(true);

    let syncing = Rc::new(Cell::new(false));
    let mut checks = Vec::with_capacity(photos.len());

    for (i, path) in photos.iter().enumerate() {
        let cell = gtk::Box::new(gtk::Orientation::Vertical, 6);

        let thumb = gtk::Picture::for_filename(path);
        thumb.set_size_request(180, 135);
        thumb.set_content_fit(gtk::ContentFit::Contain);
        cell.append(&thumb);

        let check = gtk::CheckButton::new();
        check.set_halign(gtk::Align::Center);
        let index = i + 1;
        let on_toggle = on_toggle.clone();
        let syncing_flag = syncing.clone();
        check.connect_toggled(move |_| {
            if !syncing_flag.get() {
                on_toggle(index);
            }
        });
        cell.append(&check);
        checks.push(check);

        // Two rows of four, matching the capture order left to right
        let col = (i % 4) as i32;
        let row = (i / 4) as i32;
        grid.attach(&cell, col, row, 1, 1);
    }

    root.append(&grid);

    let submit = gtk::Button::with_label("Done picking");
    submit.add_css_class("submit-button");
    submit.set_halign(gtk::Align::Center);
    submit.connect_clicked(move |_| on_submit());
    root.append(&submit);

    PhotoSelectWidgets {
        root,
        checks,
        syncing,
    }
}

impl PhotoSelectWidgets {
    /// Force a rejected toggle back off without emitting a user event
    pub fn revert(&self, index: usize) {
        if let Some(check) = self.checks.get(index - 1) {
            self.syncing.set(true);
            check.set_active(false);
            self.syncing.set(false);
        }
    }

    /// Mirror the gate's selection into the check buttons
    pub fn sync(&self, gate: &SelectionGate) {
        self.syncing.set(true);
        for (i, check) in self.checks.iter().enumerate() {
            check.set_active(gate.is_selected(i + 1));
        }
        self.syncing.set(false);
    }
}
