//! GStreamer capture pipeline: live preview plus on-demand stills.
//!
//! One `v4l2src` feeds a mirrored tee with two branches: a
//! `gtk4paintablesink` that keeps the on-screen preview refreshing on its
//! own, and an RGB appsink the controller pulls single frames from when the
//! countdown fires. The horizontal mirror sits before the tee so the preview
//! and the saved photos match.

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use gtk4 as gtk;
use image::RgbImage;
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("GStreamer error: {0}")]
    Gstreamer(#[from] glib::Error),
    #[error("GStreamer bool error: {0}")]
    GstreamerBool(#[from] glib::BoolError),
    #[error("Failed to create element: {0}")]
    ElementCreation(String),
    #[error("Failed to get paintable sink")]
    NoPaintable,
    #[error("State change failed")]
    StateChange,
    #[error("No frame available from device")]
    NoFrame,
    #[error("Unsupported frame layout from device")]
    BadFrame,
}

/// Camera pipeline for preview and stills
pub struct CameraPipeline {
    pipeline: gst::Pipeline,
    paintable: gtk::gdk::Paintable,
    snapshot_sink: gst_app::AppSink,
    released: bool,
}

impl CameraPipeline {
    /// Build the pipeline for the configured V4L2 device
    pub fn new() -> Result<Self, CameraError> {
        gst::init()?;

        let pipeline = gst::Pipeline::new();

        let source = gst::ElementFactory::make("v4l2src")
            .property("device", config::CAMERA_DEVICE.as_str())
            .build()
            .map_err(|_| CameraError::ElementCreation("v4l2src".into()))?;

        // Selfie mirror, applied before the tee so stills match the preview
        let flip = gst::ElementFactory::make("videoflip")
            .property_from_str("method", "horizontal-flip")
            .build()
            .map_err(|_| CameraError::ElementCreation("videoflip".into()))?;

        let tee = gst::ElementFactory::make("tee")
            .build()
            .map_err(|_| CameraError::ElementCreation("tee".into()))?;

        // Preview branch
        let preview_queue = gst::ElementFactory::make("queue")
            .build()
            .map_err(|_| CameraError::ElementCreation("queue".into()))?;
        let preview_convert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(|_| CameraError::ElementCreation("videoconvert".into()))?;
        let preview_sink = gst::ElementFactory::make("gtk4paintablesink")
            .build()
            .map_err(|_| CameraError::ElementCreation("gtk4paintablesink".into()))?;

        let paintable = preview_sink.property::<gtk::gdk::Paintable>("paintable");

        // Still branch: keep only the newest frame so a pull always gets
        // something close to "now"
        let still_queue = gst::ElementFactory::make("queue")
            .build()
            .map_err(|_| CameraError::ElementCreation("queue".into()))?;
        let still_convert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(|_| CameraError::ElementCreation("videoconvert".into()))?;
        let snapshot_sink = gst_app::AppSink::builder()
            .caps(
                &gst::Caps::builder("video/x-raw")
                    .field("format", "RGB")
                    .build(),
            )
            .max_buffers(1)
            .drop(true)
            .sync(false)
            .build();

        pipeline.add_many([
            &source,
            &flip,
            &tee,
            &preview_queue,
            &preview_convert,
            &preview_sink,
            &still_queue,
            &still_convert,
        ])?;
        pipeline.add(&snapshot_sink)?;

        gst::Element::link_many([&source, &flip, &tee])?;
        gst::Element::link_many([&tee, &preview_queue, &preview_convert, &preview_sink])?;
        gst::Element::link_many([&tee, &still_queue, &still_convert])?;
        still_convert.link(&snapshot_sink)?;

        Ok(Self {
            pipeline,
            paintable,
            snapshot_sink,
            released: false,
        })
    }

    /// Get the paintable for use in GTK widgets
    pub fn paintable(&self) -> &gtk::gdk::Paintable {
        &self.paintable
    }

    /// A clonable handle to the still branch, safe to hand to a worker thread
    pub fn snapshot_sink(&self) -> gst_app::AppSink {
        self.snapshot_sink.clone()
    }

    /// Start the pipeline
    pub fn play(&self) -> Result<(), CameraError> {
        log::info!("Starting camera pipeline on {}", config::CAMERA_DEVICE.as_str());
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|_| CameraError::StateChange)?;
        Ok(())
    }

    /// Release the device handle. Safe to call more than once; only the
    /// first call tears the pipeline down.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        log::info!("Releasing camera device");
        if self.pipeline.set_state(gst::State::Null).is_err() {
            log::warn!("Camera pipeline did not reach Null state");
        }
    }

    /// Log errors coming off the pipeline bus
    pub fn setup_bus_watch(&self) {
        if let Some(bus) = self.pipeline.bus() {
            let _ = bus.add_watch(move |_bus, msg| {
                if let gst::MessageView::Error(err) = msg.view() {
                    log::error!(
                        "Camera pipeline error from {:?}: {}",
                        err.src().map(|s| s.path_string()),
                        err.error()
                    );
                }
                glib::ControlFlow::Continue
            });
        }
    }
}

impl Drop for CameraPipeline {
    fn drop(&mut self) {
        self.release();
    }
}

/// Pull the newest frame from the still branch and decode it to an RGB image.
///
/// Returns [`CameraError::NoFrame`] when the device produces nothing within
/// the snapshot timeout; the caller decides how many times to retry.
pub fn pull_frame(sink: &gst_app::AppSink) -> Result<RgbImage, CameraError> {
    let sample = sink
        .try_pull_sample(gst::ClockTime::from_mseconds(config::SNAPSHOT_TIMEOUT_MS))
        .ok_or(CameraError::NoFrame)?;

    let caps = sample.caps().ok_or(CameraError::BadFrame)?;
    let info = gst_video::VideoInfo::from_caps(caps).map_err(|_| CameraError::BadFrame)?;
    let buffer = sample.buffer().ok_or(CameraError::BadFrame)?;
    let map = buffer.map_readable().map_err(|_| CameraError::BadFrame)?;

    let width = info.width();
    let height = info.height();
    let stride = info.stride()[0] as usize;
    let row_len = width as usize * 3;
    if map.len() < stride * height as usize || stride < row_len {
        return Err(CameraError::BadFrame);
    }

    // Rows can be padded to the stride; copy only the pixel bytes
    let mut data = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        data.extend_from_slice(&map[start..start + row_len]);
    }

    RgbImage::from_raw(width, height, data).ok_or(CameraError::BadFrame)
}
