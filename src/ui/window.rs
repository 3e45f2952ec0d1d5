//! Main application window - maps booth state onto the screen stack.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::app::{AppContext, AppMessage};
use crate::state::{BoothCommand, BoothEvent, BoothState};
use crate::ui::capture::{self, CaptureWidgets};
use crate::ui::complete;
use crate::ui::frame_select;
use crate::ui::photo_select::{self, PhotoSelectWidgets};
use crate::ui::welcome;

/// Main window containing the screen stack
pub struct MainWindow {
    pub window: gtk::ApplicationWindow,
    ctx: Rc<AppContext>,
    stack: gtk::Stack,
    notice_label: gtk::Label,
    capture: RefCell<Option<CaptureWidgets>>,
    photo_select: RefCell<Option<PhotoSelectWidgets>>,
}

impl MainWindow {
    pub fn new(app: &gtk::Application, ctx: Rc<AppContext>) -> Rc<Self> {
        let window = gtk::ApplicationWindow::builder()
            .application(app)
            .title("Four-Cut Booth")
            .default_width(540)
            .default_height(960)
            .build();

        // Kiosk mode: fullscreen once the window is mapped
        window.connect_map(|window| {
            let window = window.clone();
            glib::timeout_add_local_once(std::time::Duration::from_millis(100), move || {
                window.fullscreen();
            });
        });

        let root = gtk::Box::new(gtk::Orientation::Vertical, 0);

        let notice_label = gtk::Label::new(None);
        notice_label.add_css_class("notice-label");
        notice_label.set_visible(false);
        notice_label.set_wrap(true);
        root.append(&notice_label);

        let stack = gtk::Stack::new();
        stack.set_vexpand(true);
        stack.set_transition_type(gtk::StackTransitionType::Crossfade);
        root.append(&stack);

        // Static screens
        let ctx_start = ctx.clone();
        let welcome_screen = welcome::create_welcome_screen(move || {
            ctx_start.send_event(BoothEvent::StartPressed);
        });
        stack.add_named(&welcome_screen, Some("welcome"));

        let ctx_frame = ctx.clone();
        let frame_screen = frame_select::create_frame_select_screen(move |name| {
            ctx_frame.send_event(BoothEvent::FrameChosen { name });
        });
        stack.add_named(&frame_screen, Some("frame-select"));

        window.set_child(Some(&root));

        let main_window = Rc::new(Self {
            window,
            ctx,
            stack,
            notice_label,
            capture: RefCell::new(None),
            photo_select: RefCell::new(None),
        });

        main_window.load_css();
        main_window.update_ui();

        main_window
    }

    fn load_css(&self) {
        let provider = gtk::CssProvider::new();
        provider.load_from_string(include_str!("../../resources/style.css"));

        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }
    }

    /// Handle app messages - main entry point for state updates
    pub fn handle_message(self: &Rc<Self>, msg: AppMessage) {
        match msg {
            AppMessage::Event(ref event) => {
                let commands = self.ctx.process_event(event.clone());

                for cmd in &commands {
                    if let BoothCommand::RevertToggle { index } = cmd {
                        if let Some(widgets) = self.photo_select.borrow().as_ref() {
                            widgets.revert(*index);
                        }
                    }
                }

                if commands
                    .iter()
                    .any(|c| matches!(c, BoothCommand::UpdateUi))
                {
                    self.update_ui();
                }
            }
        }
    }

    /// Update the UI to reflect current state
    fn update_ui(self: &Rc<Self>) {
        let sm = self.ctx.state_machine.borrow();
        let state = sm.state;
        let countdown = sm.session.countdown;
        let capture_index = sm.session.capture_index;
        let photos = sm.session.photos.clone();
        let selection = sm.selection.clone();
        let qr_path = sm.qr_path.clone();
        let download_url = sm.download_url.clone();
        let notice = sm.notice.clone();
        let upload_failed = sm.upload_failed;
        drop(sm);

        match notice {
            Some(text) => {
                self.notice_label.set_text(&text);
                self.notice_label.set_visible(true);
            }
            None => self.notice_label.set_visible(false),
        }

        match state {
            BoothState::Welcome => {
                self.drop_session_screens();
                self.stack.set_visible_child_name("welcome");
            }

            BoothState::FrameSelect => {
                self.stack.set_visible_child_name("frame-select");
            }

            BoothState::Counting | BoothState::Capturing => {
                if self.capture.borrow().is_none() {
                    let paintable = self.ctx.preview_paintable();
                    let widgets = capture::create_capture_screen(paintable.as_ref());
                    self.replace_child("capture", &widgets.root);
                    *self.capture.borrow_mut() = Some(widgets);
                }
                if let Some(widgets) = self.capture.borrow().as_ref() {
                    widgets.set_countdown(countdown, state == BoothState::Capturing);
                    widgets.set_progress(capture_index);
                }
                self.stack.set_visible_child_name("capture");
            }

            BoothState::PhotoSelect => {
                if self.photo_select.borrow().is_none() {
                    let ctx_toggle = self.ctx.clone();
                    let ctx_submit = self.ctx.clone();
                    let widgets = photo_select::create_photo_select_screen(
                        &photos,
                        move |index| ctx_toggle.send_event(BoothEvent::ToggleSelect { index }),
                        move || ctx_submit.send_event(BoothEvent::SubmitSelection),
                    );
                    self.replace_child("photo-select", &widgets.root);
                    *self.photo_select.borrow_mut() = Some(widgets);
                }
                if let Some(widgets) = self.photo_select.borrow().as_ref() {
                    widgets.sync(&selection);
                }
                self.stack.set_visible_child_name("photo-select");
            }

            BoothState::Composing => {
                let status = self.status_screen("Assembling your photos...", false);
                self.replace_child("status", &status);
                self.stack.set_visible_child_name("status");
            }

            BoothState::Publishing => {
                let status = if upload_failed {
                    self.status_screen("Upload failed", true)
                } else {
                    self.status_screen("Uploading your photos...", false)
                };
                self.replace_child("status", &status);
                self.stack.set_visible_child_name("status");
            }

            BoothState::Complete => {
                let ctx = self.ctx.clone();
                let screen = complete::create_complete_screen(
                    qr_path.as_deref(),
                    download_url.as_deref(),
                    move || ctx.send_event(BoothEvent::ReturnToWelcome),
                );
                self.replace_child("complete", &screen);
                self.stack.set_visible_child_name("complete");
            }
        }
    }

    /// Build the composing/publishing status screen; `with_recovery` adds
    /// the retry and skip actions offered after an upload failure
    fn status_screen(&self, message: &str, with_recovery: bool) -> gtk::Box {
        let screen = gtk::Box::new(gtk::Orientation::Vertical, 24);
        screen.set_halign(gtk::Align::Center);
        screen.set_valign(gtk::Align::Center);

        let label = gtk::Label::new(Some(message));
        label.add_css_class("status-label");
        screen.append(&label);

        if with_recovery {
            let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 12);
            buttons.set_halign(gtk::Align::Center);

            let retry = gtk::Button::with_label("Retry upload");
            let ctx = self.ctx.clone();
            retry.connect_clicked(move |_| ctx.send_event(BoothEvent::RetryUpload));
            buttons.append(&retry);

            let skip = gtk::Button::with_label("Skip");
            let ctx = self.ctx.clone();
            skip.connect_clicked(move |_| ctx.send_event(BoothEvent::SkipPublish));
            buttons.append(&skip);

            screen.append(&buttons);
        } else {
            let spinner = gtk::Spinner::new();
            spinner.set_spinning(true);
            spinner.set_size_request(48, 48);
            spinner.set_halign(gtk::Align::Center);
            screen.append(&spinner);
        }

        screen
    }

    /// Swap the named stack child for a freshly built widget
    fn replace_child(&self, name: &str, child: &impl IsA<gtk::Widget>) {
        if let Some(old) = self.stack.child_by_name(name) {
            self.stack.remove(&old);
        }
        self.stack.add_named(child, Some(name));
    }

    /// Tear down the per-session screens when a session ends
    fn drop_session_screens(&self) {
        *self.capture.borrow_mut() = None;
        *self.photo_select.borrow_mut() = None;
        for name in ["capture", "photo-select", "status", "complete"] {
            if let Some(child) = self.stack.child_by_name(name) {
                self.stack.remove(&child);
            }
        }
    }
}
