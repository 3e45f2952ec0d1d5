//! GTK4 screens for the booth.

mod capture;
mod complete;
mod frame_select;
mod photo_select;
mod welcome;
mod window;

pub use window::MainWindow;
