//! Four-Cut Booth - GTK4 + GStreamer photo booth kiosk application.
//!
//! Architecture:
//! - `state` module: GTK-free state machine with business logic (testable)
//! - `selection` / `session` / `compose` / `publish` modules: the capture,
//!   selection, composition and upload pipeline behind the state machine
//! - `camera` module: GStreamer pipeline for preview and stills
//! - `app` module: bridges the state machine to GTK and async operations
//! - `ui` module: GTK4 screens

use std::sync::Arc;

use gtk4 as gtk;
use gtk4::prelude::*;

mod app;
mod camera;
mod compose;
mod config;
mod publish;
mod selection;
mod session;
mod state;
mod ui;

use app::AppContext;
use ui::MainWindow;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Four-Cut Booth");

    // Tokio runtime for uploads and blocking image work
    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime"),
    );

    let app = gtk::Application::builder()
        .application_id("com.fourcut.booth")
        .build();

    let runtime_clone = runtime.clone();

    app.connect_activate(move |app| {
        // Application context (includes the GTK-free state machine)
        let (ctx, mut rx) = AppContext::new(runtime_clone.clone());

        let main_window = MainWindow::new(app, ctx);

        // Poll the tokio channel from the GTK main loop
        let window = main_window.clone();
        glib::timeout_add_local(std::time::Duration::from_millis(16), move || {
            while let Ok(msg) = rx.try_recv() {
                window.handle_message(msg);
            }
            glib::ControlFlow::Continue
        });

        main_window.window.present();
    });

    app.run();

    log::info!("Four-Cut Booth shutting down");
}
