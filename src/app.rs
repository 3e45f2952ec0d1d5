//! Application context - bridges the GTK-free state machine with GTK and tokio.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4 as gtk;
use tokio::sync::mpsc;

use crate::camera::{self, CameraError, CameraPipeline};
use crate::compose;
use crate::config;
use crate::publish::{self, Publisher};
use crate::session::SessionStorage;
use crate::state::{BoothCommand, BoothEvent, BoothStateMachine};

/// Messages sent from async tasks to the GTK main loop
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// Process a booth event through the state machine
    Event(BoothEvent),
}

/// Sender that can dispatch messages to the GTK main loop from any thread
#[derive(Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl MessageSender {
    pub fn send(&self, msg: AppMessage) {
        let _ = self.tx.send(msg);
    }
}

/// Application context - holds state and provides methods to interact with it
pub struct AppContext {
    /// The GTK-free state machine
    pub state_machine: RefCell<BoothStateMachine>,
    /// Upload client
    pub publisher: Publisher,
    /// Session temp storage
    pub storage: SessionStorage,
    /// Camera pipeline, present while a session holds the device
    pub camera: RefCell<Option<CameraPipeline>>,
    /// Tokio runtime for async operations
    pub runtime: Arc<tokio::runtime::Runtime>,
    /// Sender for dispatching messages to the GTK main loop
    pub message_tx: MessageSender,
    /// Countdown tick source (for cancellation)
    countdown_source: RefCell<Option<glib::SourceId>>,
    /// In-flight upload task (for cancellation on abort)
    upload_task: RefCell<Option<tokio::task::JoinHandle<()>>>,
}

impl AppContext {
    pub fn new(
        runtime: Arc<tokio::runtime::Runtime>,
    ) -> (Rc<Self>, mpsc::UnboundedReceiver<AppMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let ctx = Rc::new(Self {
            state_machine: RefCell::new(BoothStateMachine::new()),
            publisher: Publisher::new(),
            storage: SessionStorage::new(),
            camera: RefCell::new(None),
            runtime,
            message_tx: MessageSender { tx },
            countdown_source: RefCell::new(None),
            upload_task: RefCell::new(None),
        });

        (ctx, rx)
    }

    /// Acquire the camera and start the preview pipeline
    pub fn init_camera(&self) -> Result<gtk::gdk::Paintable, CameraError> {
        let pipeline = CameraPipeline::new()?;
        let paintable = pipeline.paintable().clone();
        pipeline.setup_bus_watch();
        pipeline.play()?;
        *self.camera.borrow_mut() = Some(pipeline);
        Ok(paintable)
    }

    /// The live preview paintable, if the camera is running
    pub fn preview_paintable(&self) -> Option<gtk::gdk::Paintable> {
        self.camera.borrow().as_ref().map(|c| c.paintable().clone())
    }

    /// Send an event to the state machine (from any thread)
    pub fn send_event(&self, event: BoothEvent) {
        self.message_tx.send(AppMessage::Event(event));
    }

    /// Process an event and execute resulting commands.
    /// This should be called from the GTK main loop.
    pub fn process_event(self: &Rc<Self>, event: BoothEvent) -> Vec<BoothCommand> {
        let commands = self.state_machine.borrow_mut().process(event);

        for cmd in &commands {
            self.execute_command(cmd.clone());
        }

        commands
    }

    /// Execute a command from the state machine
    fn execute_command(self: &Rc<Self>, cmd: BoothCommand) {
        match cmd {
            BoothCommand::ResetTempStorage => {
                if let Err(e) = self.storage.prepare() {
                    self.send_event(BoothEvent::SessionFault {
                        error: e.to_string(),
                    });
                }
            }

            BoothCommand::StartCamera => {
                if let Err(e) = self.init_camera() {
                    self.send_event(BoothEvent::SessionFault {
                        error: format!("camera startup failed: {}", e),
                    });
                }
            }

            BoothCommand::StartCountdown => {
                // Replace any previous tick source so at most one is live
                if let Some(source) = self.countdown_source.borrow_mut().take() {
                    source.remove();
                }
                let tx = self.message_tx.clone();
                let source = glib::timeout_add_local(std::time::Duration::from_secs(1), move || {
                    tx.send(AppMessage::Event(BoothEvent::TickSecond));
                    glib::ControlFlow::Continue
                });
                *self.countdown_source.borrow_mut() = Some(source);
            }

            BoothCommand::StopCountdown => {
                if let Some(source) = self.countdown_source.borrow_mut().take() {
                    source.remove();
                }
            }

            BoothCommand::CapturePhoto { index } => {
                let sink = self.camera.borrow().as_ref().map(|c| c.snapshot_sink());
                let Some(sink) = sink else {
                    self.send_event(BoothEvent::CaptureFailed {
                        error: "camera is not running".into(),
                    });
                    return;
                };

                let tx = self.message_tx.clone();
                let path = self.storage.photo_path(index);
                self.runtime.spawn_blocking(move || {
                    let result = camera::pull_frame(&sink)
                        .map_err(|e| e.to_string())
                        .and_then(|frame| frame.save(&path).map_err(|e| e.to_string()));
                    match result {
                        Ok(()) => {
                            log::info!("Saved {}", path.display());
                            tx.send(AppMessage::Event(BoothEvent::PhotoSaved { index, path }));
                        }
                        Err(error) => {
                            tx.send(AppMessage::Event(BoothEvent::CaptureFailed { error }));
                        }
                    }
                });
            }

            BoothCommand::ReleaseCamera => {
                if let Some(mut cam) = self.camera.borrow_mut().take() {
                    cam.release();
                }
            }

            BoothCommand::Compose {
                photos,
                frame_overlay,
            } => {
                let tx = self.message_tx.clone();
                let frame = frame_overlay.map(|name| config::frame_asset_path(&name));
                let output_dir = config::OUTPUT_DIR.clone();
                self.runtime.spawn_blocking(move || {
                    match compose::compose(&photos, frame.as_deref(), &output_dir) {
                        Ok(composite) => {
                            tx.send(AppMessage::Event(BoothEvent::Composed {
                                path: composite.path,
                                timestamp: composite.timestamp,
                            }));
                        }
                        Err(e) => {
                            tx.send(AppMessage::Event(BoothEvent::ComposeFailed {
                                error: e.to_string(),
                            }));
                        }
                    }
                });
            }

            BoothCommand::Upload {
                composite,
                timestamp,
            } => {
                let tx = self.message_tx.clone();
                let publisher = self.publisher.clone();

                let handle = self.runtime.spawn(async move {
                    match publisher.upload(&composite, &timestamp).await {
                        Ok(url) => {
                            tx.send(AppMessage::Event(BoothEvent::Uploaded { url }));
                        }
                        Err(e) => {
                            tx.send(AppMessage::Event(BoothEvent::UploadFailed {
                                error: e.to_string(),
                            }));
                        }
                    }
                });
                // A session has at most one upload in flight
                if let Some(previous) = self.upload_task.borrow_mut().replace(handle) {
                    previous.abort();
                }
            }

            BoothCommand::CancelUpload => {
                if let Some(handle) = self.upload_task.borrow_mut().take() {
                    handle.abort();
                }
            }

            BoothCommand::GenerateQr { url } => {
                let tx = self.message_tx.clone();
                let path = self.storage.qr_path();
                self.runtime.spawn_blocking(move || {
                    match publish::generate_qr(&url, &path) {
                        Ok(path) => {
                            tx.send(AppMessage::Event(BoothEvent::QrReady { path }));
                        }
                        Err(e) => {
                            tx.send(AppMessage::Event(BoothEvent::QrFailed {
                                error: e.to_string(),
                            }));
                        }
                    }
                });
            }

            BoothCommand::CleanupTemp => {
                if let Err(e) = self.storage.cleanup() {
                    log::warn!("Temp cleanup failed: {}", e);
                }
            }

            BoothCommand::ScheduleNoticeClear => {
                let tx = self.message_tx.clone();
                glib::timeout_add_local_once(
                    std::time::Duration::from_millis(config::NOTICE_DISPLAY_DURATION_MS),
                    move || {
                        tx.send(AppMessage::Event(BoothEvent::ClearNotice));
                    },
                );
            }

            BoothCommand::RevertToggle { .. } | BoothCommand::UpdateUi => {
                // Handled by the window after processing events
            }
        }
    }
}
