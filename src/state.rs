//! GTK-free state machine and business logic.
//!
//! This module contains the pure Rust state machine that can be tested
//! independently of GTK. UI callbacks and async tasks only enqueue events;
//! a single handler applies transitions and returns commands for the app
//! layer to execute.

use std::path::PathBuf;

use crate::config;
use crate::selection::{SelectionGate, ToggleOutcome};

/// Booth phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothState {
    /// Start screen - waiting for the user to begin a session
    Welcome,
    /// User is picking a decorative frame
    FrameSelect,
    /// Countdown ticking towards the next capture
    Counting,
    /// A still is being pulled from the camera
    Capturing,
    /// User is picking photos for the composite
    PhotoSelect,
    /// Composite is being rendered
    Composing,
    /// Composite is being uploaded / QR generated
    Publishing,
    /// Completion screen with the QR code
    Complete,
}

/// Session data (GTK-free)
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// File name of the chosen frame overlay, if any
    pub frame_overlay: Option<String>,
    /// Captured photo paths in capture order; `photos[i]` has index `i + 1`
    pub photos: Vec<PathBuf>,
    /// Seconds until the next capture
    pub countdown: u32,
    /// Photos captured so far; only ever increases within a session
    pub capture_index: usize,
    /// Failed pull attempts for the current capture
    pub retry_count: u32,
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum BoothEvent {
    // User actions
    StartPressed,
    FrameChosen { name: Option<String> },
    ToggleSelect { index: usize },
    SubmitSelection,
    RetryUpload,
    SkipPublish,
    ReturnToWelcome,

    // Countdown timer
    TickSecond,

    // Capture results
    PhotoSaved { index: usize, path: PathBuf },
    CaptureFailed { error: String },

    // Compose / publish results
    Composed { path: PathBuf, timestamp: String },
    ComposeFailed { error: String },
    Uploaded { url: String },
    UploadFailed { error: String },
    QrReady { path: PathBuf },
    QrFailed { error: String },

    /// Session-fatal fault outside the capture loop (temp storage, camera
    /// startup)
    SessionFault { error: String },

    // Internal
    ClearNotice,
}

/// Commands emitted by the state machine for the app/UI layer to execute
#[derive(Debug, Clone)]
pub enum BoothCommand {
    /// Wipe and recreate the session temp directory
    ResetTempStorage,
    /// Acquire the camera and start the preview
    StartCamera,
    /// Install the 1 Hz countdown tick
    StartCountdown,
    /// Remove the countdown tick
    StopCountdown,
    /// Pull one frame and persist it as the photo with this 1-based index
    CapturePhoto { index: usize },
    /// Release the camera device handle
    ReleaseCamera,
    /// Render the composite from these photos, in this order
    Compose {
        photos: Vec<PathBuf>,
        frame_overlay: Option<String>,
    },
    /// Upload the composite
    Upload {
        composite: PathBuf,
        timestamp: String,
    },
    /// Abort the in-flight upload task
    CancelUpload,
    /// Render the QR code for this URL
    GenerateQr { url: String },
    /// Delete the session temp directory
    CleanupTemp,
    /// Undo a rejected selection toggle in the UI
    RevertToggle { index: usize },
    /// Schedule notice clear after timeout
    ScheduleNoticeClear,
    /// Update UI to reflect new state
    UpdateUi,
}

/// The booth state machine
#[derive(Debug)]
pub struct BoothStateMachine {
    pub state: BoothState,
    pub session: SessionData,
    pub selection: SelectionGate,
    /// Composite path and timestamp once composed
    pub composite: Option<(PathBuf, String)>,
    pub download_url: Option<String>,
    pub qr_path: Option<PathBuf>,
    /// User-facing warning or error line
    pub notice: Option<String>,
    /// Whether the last upload attempt failed (retry/skip offered)
    pub upload_failed: bool,
    camera_active: bool,
}

impl Default for BoothStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl BoothStateMachine {
    pub fn new() -> Self {
        Self {
            state: BoothState::Welcome,
            session: SessionData::default(),
            selection: SelectionGate::new(),
            composite: None,
            download_url: None,
            qr_path: None,
            notice: None,
            upload_failed: false,
            camera_active: false,
        }
    }

    /// Process an event and return commands to execute
    pub fn process(&mut self, event: BoothEvent) -> Vec<BoothCommand> {
        let mut commands = Vec::new();

        match event {
            BoothEvent::StartPressed => {
                if self.state == BoothState::Welcome {
                    self.notice = None;
                    self.state = BoothState::FrameSelect;
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::FrameChosen { name } => {
                if self.state == BoothState::FrameSelect {
                    self.session = SessionData {
                        frame_overlay: name,
                        countdown: config::COUNTDOWN_SECS,
                        ..SessionData::default()
                    };
                    self.selection.clear();
                    self.camera_active = true;
                    self.state = BoothState::Counting;
                    commands.push(BoothCommand::ResetTempStorage);
                    commands.push(BoothCommand::StartCamera);
                    commands.push(BoothCommand::StartCountdown);
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::TickSecond => {
                // Ticks arriving while a capture is in flight are ignored;
                // the counter restarts once the photo lands.
                if self.state == BoothState::Counting {
                    self.session.countdown = self.session.countdown.saturating_sub(1);
                    if self.session.countdown == 0 {
                        self.state = BoothState::Capturing;
                        commands.push(BoothCommand::CapturePhoto {
                            index: self.session.capture_index + 1,
                        });
                    }
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::PhotoSaved { index, path } => {
                if self.state == BoothState::Capturing
                    && index == self.session.capture_index + 1
                {
                    self.session.photos.push(path);
                    self.session.capture_index += 1;
                    self.session.retry_count = 0;

                    if self.session.capture_index >= config::TOTAL_PHOTOS {
                        self.state = BoothState::PhotoSelect;
                        commands.push(BoothCommand::StopCountdown);
                        self.release_camera_once(&mut commands);
                    } else {
                        self.session.countdown = config::COUNTDOWN_SECS;
                        self.state = BoothState::Counting;
                    }
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::CaptureFailed { error } => {
                if self.state == BoothState::Capturing {
                    self.session.retry_count += 1;
                    if self.session.retry_count <= config::CAPTURE_RETRY_LIMIT {
                        log::warn!(
                            "Capture attempt {} failed, retrying: {}",
                            self.session.retry_count,
                            error
                        );
                        self.notice = Some("Camera hiccup, retrying...".into());
                        commands.push(BoothCommand::CapturePhoto {
                            index: self.session.capture_index + 1,
                        });
                        commands.push(BoothCommand::ScheduleNoticeClear);
                        commands.push(BoothCommand::UpdateUi);
                    } else {
                        log::error!("Camera gave up after retries: {}", error);
                        self.abort_session(
                            &mut commands,
                            "Camera unavailable - session cancelled".into(),
                        );
                    }
                }
            }

            BoothEvent::ToggleSelect { index } => {
                if self.state == BoothState::PhotoSelect
                    && index >= 1
                    && index <= self.session.capture_index
                {
                    match self.selection.toggle(index) {
                        ToggleOutcome::RejectedFull => {
                            self.notice = Some(format!(
                                "You can pick at most {} photos",
                                config::SELECTION_SIZE
                            ));
                            commands.push(BoothCommand::RevertToggle { index });
                            commands.push(BoothCommand::ScheduleNoticeClear);
                        }
                        ToggleOutcome::Added | ToggleOutcome::Removed => {}
                    }
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::SubmitSelection => {
                if self.state == BoothState::PhotoSelect {
                    if let Some(indices) = self.selection.submit() {
                        let photos = indices
                            .iter()
                            .map(|&i| self.session.photos[i - 1].clone())
                            .collect();
                        self.state = BoothState::Composing;
                        commands.push(BoothCommand::Compose {
                            photos,
                            frame_overlay: self.session.frame_overlay.clone(),
                        });
                    } else {
                        self.notice = Some(format!(
                            "Pick exactly {} photos to continue",
                            config::SELECTION_SIZE
                        ));
                        commands.push(BoothCommand::ScheduleNoticeClear);
                    }
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::Composed { path, timestamp } => {
                if self.state == BoothState::Composing {
                    self.composite = Some((path.clone(), timestamp.clone()));
                    self.state = BoothState::Publishing;
                    self.upload_failed = false;
                    commands.push(BoothCommand::Upload {
                        composite: path,
                        timestamp,
                    });
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::ComposeFailed { error } => {
                if self.state == BoothState::Composing {
                    log::error!("Composition failed: {}", error);
                    self.abort_session(
                        &mut commands,
                        "Could not assemble your photos - session cancelled".into(),
                    );
                }
            }

            BoothEvent::Uploaded { url } => {
                if self.state == BoothState::Publishing {
                    self.download_url = Some(url.clone());
                    self.upload_failed = false;
                    self.notice = None;
                    commands.push(BoothCommand::GenerateQr { url });
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::UploadFailed { error } => {
                if self.state == BoothState::Publishing {
                    log::error!("Upload failed: {}", error);
                    self.upload_failed = true;
                    self.notice = Some("Upload failed - retry or skip".into());
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::RetryUpload => {
                if self.state == BoothState::Publishing && self.upload_failed {
                    if let Some((path, timestamp)) = self.composite.clone() {
                        self.upload_failed = false;
                        self.notice = None;
                        commands.push(BoothCommand::Upload {
                            composite: path,
                            timestamp,
                        });
                        commands.push(BoothCommand::UpdateUi);
                    }
                }
            }

            BoothEvent::SkipPublish => {
                if self.state == BoothState::Publishing {
                    self.state = BoothState::Complete;
                    self.notice = None;
                    commands.push(BoothCommand::CancelUpload);
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::QrReady { path } => {
                if self.state == BoothState::Publishing {
                    self.qr_path = Some(path);
                    self.state = BoothState::Complete;
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::QrFailed { error } => {
                if self.state == BoothState::Publishing {
                    // The upload went through; finish without the code
                    log::error!("QR generation failed: {}", error);
                    self.notice = Some("Could not render the QR code".into());
                    self.state = BoothState::Complete;
                    commands.push(BoothCommand::ScheduleNoticeClear);
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::SessionFault { error } => {
                if self.state != BoothState::Welcome {
                    log::error!("Session fault: {}", error);
                    self.abort_session(
                        &mut commands,
                        "Something went wrong - session cancelled".into(),
                    );
                }
            }

            BoothEvent::ReturnToWelcome => {
                if self.state != BoothState::Welcome {
                    commands.push(BoothCommand::StopCountdown);
                    commands.push(BoothCommand::CancelUpload);
                    self.release_camera_once(&mut commands);
                    commands.push(BoothCommand::CleanupTemp);
                    self.reset();
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::ClearNotice => {
                self.notice = None;
                commands.push(BoothCommand::UpdateUi);
            }
        }

        commands
    }

    /// Emit `ReleaseCamera` exactly once per acquisition
    fn release_camera_once(&mut self, commands: &mut Vec<BoothCommand>) {
        if self.camera_active {
            self.camera_active = false;
            commands.push(BoothCommand::ReleaseCamera);
        }
    }

    /// Tear the session down and return to the welcome screen with a notice
    fn abort_session(&mut self, commands: &mut Vec<BoothCommand>, notice: String) {
        commands.push(BoothCommand::StopCountdown);
        commands.push(BoothCommand::CancelUpload);
        self.release_camera_once(commands);
        commands.push(BoothCommand::CleanupTemp);
        self.reset();
        self.notice = Some(notice);
        commands.push(BoothCommand::ScheduleNoticeClear);
        commands.push(BoothCommand::UpdateUi);
    }

    fn reset(&mut self) {
        self.state = BoothState::Welcome;
        self.session = SessionData::default();
        self.selection.clear();
        self.composite = None;
        self.download_url = None;
        self.qr_path = None;
        self.notice = None;
        self.upload_failed = false;
        self.camera_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_counting(sm: &mut BoothStateMachine) -> Vec<BoothCommand> {
        sm.process(BoothEvent::StartPressed);
        sm.process(BoothEvent::FrameChosen {
            name: Some("frame1.png".into()),
        })
    }

    /// Drive the machine through all N captures, asserting the cadence
    fn run_full_capture(sm: &mut BoothStateMachine) -> usize {
        let mut release_count = 0;
        for photo in 1..=config::TOTAL_PHOTOS {
            // Exactly 10 decrements precede each capture
            for tick in 1..config::COUNTDOWN_SECS {
                let cmds = sm.process(BoothEvent::TickSecond);
                assert_eq!(sm.state, BoothState::Counting, "photo {photo} tick {tick}");
                assert!(!cmds
                    .iter()
                    .any(|c| matches!(c, BoothCommand::CapturePhoto { .. })));
            }
            let cmds = sm.process(BoothEvent::TickSecond);
            assert_eq!(sm.state, BoothState::Capturing);
            assert!(cmds
                .iter()
                .any(|c| matches!(c, BoothCommand::CapturePhoto { index } if *index == photo)));

            let cmds = sm.process(BoothEvent::PhotoSaved {
                index: photo,
                path: PathBuf::from(format!("temp/photo_{photo}.png")),
            });
            release_count += cmds
                .iter()
                .filter(|c| matches!(c, BoothCommand::ReleaseCamera))
                .count();
            assert_eq!(sm.session.capture_index, photo);
        }
        release_count
    }

    #[test]
    fn test_initial_state() {
        let sm = BoothStateMachine::new();
        assert_eq!(sm.state, BoothState::Welcome);
        assert!(sm.session.photos.is_empty());
        assert!(sm.composite.is_none());
        assert!(sm.notice.is_none());
    }

    #[test]
    fn test_frame_chosen_starts_session() {
        let mut sm = BoothStateMachine::new();
        let cmds = start_counting(&mut sm);

        assert_eq!(sm.state, BoothState::Counting);
        assert_eq!(sm.session.countdown, config::COUNTDOWN_SECS);
        assert_eq!(sm.session.frame_overlay.as_deref(), Some("frame1.png"));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::ResetTempStorage)));
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::StartCamera)));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::StartCountdown)));
    }

    #[test]
    fn test_capture_cadence_and_single_finish() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);

        let releases = run_full_capture(&mut sm);

        // Exactly one Finished transition with exactly one camera release
        assert_eq!(sm.state, BoothState::PhotoSelect);
        assert_eq!(releases, 1);
        assert_eq!(sm.session.photos.len(), config::TOTAL_PHOTOS);

        // Stray ticks after the loop ended change nothing
        let cmds = sm.process(BoothEvent::TickSecond);
        assert!(cmds.is_empty());
        assert_eq!(sm.state, BoothState::PhotoSelect);
    }

    #[test]
    fn test_capture_retry_then_success() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        for _ in 0..config::COUNTDOWN_SECS {
            sm.process(BoothEvent::TickSecond);
        }
        assert_eq!(sm.state, BoothState::Capturing);

        // Two failed pulls trigger retries, not an abort
        for attempt in 1..=2 {
            let cmds = sm.process(BoothEvent::CaptureFailed {
                error: "device busy".into(),
            });
            assert_eq!(sm.session.retry_count, attempt);
            assert!(cmds
                .iter()
                .any(|c| matches!(c, BoothCommand::CapturePhoto { index: 1 })));
        }

        sm.process(BoothEvent::PhotoSaved {
            index: 1,
            path: PathBuf::from("temp/photo_1.png"),
        });
        assert_eq!(sm.state, BoothState::Counting);
        assert_eq!(sm.session.retry_count, 0);
        assert_eq!(sm.session.countdown, config::COUNTDOWN_SECS);
    }

    #[test]
    fn test_capture_retries_exhausted_aborts_session() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        for _ in 0..config::COUNTDOWN_SECS {
            sm.process(BoothEvent::TickSecond);
        }

        for _ in 0..config::CAPTURE_RETRY_LIMIT {
            sm.process(BoothEvent::CaptureFailed {
                error: "device busy".into(),
            });
            assert_eq!(sm.state, BoothState::Capturing);
        }
        let cmds = sm.process(BoothEvent::CaptureFailed {
            error: "device busy".into(),
        });

        assert_eq!(sm.state, BoothState::Welcome);
        assert!(sm.notice.is_some());
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::CleanupTemp)));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::ReleaseCamera)));
    }

    #[test]
    fn test_over_selection_is_reverted() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        run_full_capture(&mut sm);

        for i in 1..=config::SELECTION_SIZE {
            sm.process(BoothEvent::ToggleSelect { index: i });
        }
        assert_eq!(sm.selection.count(), config::SELECTION_SIZE);

        let cmds = sm.process(BoothEvent::ToggleSelect { index: 5 });
        assert_eq!(sm.selection.count(), config::SELECTION_SIZE);
        assert!(!sm.selection.is_selected(5));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::RevertToggle { index: 5 })));
        assert!(sm.notice.is_some());
    }

    #[test]
    fn test_submit_requires_exact_count() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        run_full_capture(&mut sm);

        sm.process(BoothEvent::ToggleSelect { index: 1 });
        sm.process(BoothEvent::ToggleSelect { index: 2 });
        let cmds = sm.process(BoothEvent::SubmitSelection);

        // Under-selection warns and stays put
        assert_eq!(sm.state, BoothState::PhotoSelect);
        assert!(sm.notice.is_some());
        assert!(!cmds.iter().any(|c| matches!(c, BoothCommand::Compose { .. })));
    }

    #[test]
    fn test_submit_composes_in_ascending_capture_order() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        run_full_capture(&mut sm);

        // Toggled out of order on purpose
        for i in [6, 2, 8, 5] {
            sm.process(BoothEvent::ToggleSelect { index: i });
        }
        let cmds = sm.process(BoothEvent::SubmitSelection);

        assert_eq!(sm.state, BoothState::Composing);
        let compose = cmds
            .iter()
            .find_map(|c| match c {
                BoothCommand::Compose {
                    photos,
                    frame_overlay,
                } => Some((photos.clone(), frame_overlay.clone())),
                _ => None,
            })
            .expect("compose command");
        let expected: Vec<PathBuf> = [2, 5, 6, 8]
            .iter()
            .map(|i| PathBuf::from(format!("temp/photo_{i}.png")))
            .collect();
        assert_eq!(compose.0, expected);
        assert_eq!(compose.1.as_deref(), Some("frame1.png"));
    }

    fn drive_to_publishing(sm: &mut BoothStateMachine) {
        start_counting(sm);
        run_full_capture(sm);
        for i in 1..=config::SELECTION_SIZE {
            sm.process(BoothEvent::ToggleSelect { index: i });
        }
        sm.process(BoothEvent::SubmitSelection);
        sm.process(BoothEvent::Composed {
            path: PathBuf::from("output/fourcut-240601123000.png"),
            timestamp: "240601123000".into(),
        });
    }

    #[test]
    fn test_composed_triggers_upload() {
        let mut sm = BoothStateMachine::new();
        drive_to_publishing(&mut sm);

        assert_eq!(sm.state, BoothState::Publishing);
        assert!(sm.composite.is_some());
    }

    #[test]
    fn test_compose_failure_is_fatal_to_session() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        run_full_capture(&mut sm);
        for i in 1..=config::SELECTION_SIZE {
            sm.process(BoothEvent::ToggleSelect { index: i });
        }
        sm.process(BoothEvent::SubmitSelection);

        let cmds = sm.process(BoothEvent::ComposeFailed {
            error: "photo_3.png unreadable".into(),
        });
        assert_eq!(sm.state, BoothState::Welcome);
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::CleanupTemp)));
        assert!(sm.session.photos.is_empty());
    }

    #[test]
    fn test_upload_failure_is_recoverable() {
        let mut sm = BoothStateMachine::new();
        drive_to_publishing(&mut sm);

        sm.process(BoothEvent::UploadFailed {
            error: "connection refused".into(),
        });
        // Still in Publishing with retry offered, not crashed or reset
        assert_eq!(sm.state, BoothState::Publishing);
        assert!(sm.upload_failed);
        assert!(sm.notice.is_some());

        let cmds = sm.process(BoothEvent::RetryUpload);
        assert!(cmds.iter().any(|c| matches!(
            c,
            BoothCommand::Upload { timestamp, .. } if timestamp.as_str() == "240601123000"
        )));
        assert!(!sm.upload_failed);
    }

    #[test]
    fn test_skip_publish_completes_without_qr() {
        let mut sm = BoothStateMachine::new();
        drive_to_publishing(&mut sm);
        sm.process(BoothEvent::UploadFailed {
            error: "connection refused".into(),
        });

        let cmds = sm.process(BoothEvent::SkipPublish);
        assert_eq!(sm.state, BoothState::Complete);
        assert!(sm.qr_path.is_none());
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::CancelUpload)));
    }

    #[test]
    fn test_upload_then_qr_completes() {
        let mut sm = BoothStateMachine::new();
        drive_to_publishing(&mut sm);

        let cmds = sm.process(BoothEvent::Uploaded {
            url: "https://booth.example.com/fourcut-240601123000".into(),
        });
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::GenerateQr { .. })));

        sm.process(BoothEvent::QrReady {
            path: PathBuf::from("temp/qr.png"),
        });
        assert_eq!(sm.state, BoothState::Complete);
        assert!(sm.qr_path.is_some());
        assert_eq!(
            sm.download_url.as_deref(),
            Some("https://booth.example.com/fourcut-240601123000")
        );
    }

    #[test]
    fn test_return_to_welcome_resets_everything() {
        let mut sm = BoothStateMachine::new();
        drive_to_publishing(&mut sm);
        sm.process(BoothEvent::Uploaded {
            url: "https://booth.example.com/fourcut-240601123000".into(),
        });
        sm.process(BoothEvent::QrReady {
            path: PathBuf::from("temp/qr.png"),
        });

        let cmds = sm.process(BoothEvent::ReturnToWelcome);
        assert_eq!(sm.state, BoothState::Welcome);
        assert!(sm.session.photos.is_empty());
        assert_eq!(sm.selection.count(), 0);
        assert!(sm.composite.is_none());
        assert!(sm.qr_path.is_none());
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::CleanupTemp)));
        // Camera was already released when capture finished
        assert!(!cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::ReleaseCamera)));
    }

    #[test]
    fn test_abort_mid_capture_releases_camera_and_cancels() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        sm.process(BoothEvent::TickSecond);

        let cmds = sm.process(BoothEvent::ReturnToWelcome);
        assert_eq!(sm.state, BoothState::Welcome);
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::StopCountdown)));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::ReleaseCamera)));
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::CancelUpload)));
    }

    #[test]
    fn test_rerun_starts_from_clean_temp() {
        let mut sm = BoothStateMachine::new();
        drive_to_publishing(&mut sm);
        sm.process(BoothEvent::SkipPublish);
        sm.process(BoothEvent::ReturnToWelcome);

        // Second run requests a temp reset before any capture
        let cmds = start_counting(&mut sm);
        assert!(cmds
            .iter()
            .any(|c| matches!(c, BoothCommand::ResetTempStorage)));
        assert!(sm.session.photos.is_empty());
        assert_eq!(sm.session.capture_index, 0);
    }

    #[test]
    fn test_session_fault_aborts() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);

        let cmds = sm.process(BoothEvent::SessionFault {
            error: "temp dir not writable".into(),
        });
        assert_eq!(sm.state, BoothState::Welcome);
        assert!(sm.notice.is_some());
        assert!(cmds.iter().any(|c| matches!(c, BoothCommand::CleanupTemp)));
    }

    #[test]
    fn test_capture_index_only_increases() {
        let mut sm = BoothStateMachine::new();
        start_counting(&mut sm);
        for _ in 0..config::COUNTDOWN_SECS {
            sm.process(BoothEvent::TickSecond);
        }
        sm.process(BoothEvent::PhotoSaved {
            index: 1,
            path: PathBuf::from("temp/photo_1.png"),
        });
        assert_eq!(sm.session.capture_index, 1);

        // A duplicate or out-of-order save is ignored
        sm.process(BoothEvent::PhotoSaved {
            index: 1,
            path: PathBuf::from("temp/photo_1.png"),
        });
        assert_eq!(sm.session.capture_index, 1);
        assert_eq!(sm.session.photos.len(), 1);
    }
}
