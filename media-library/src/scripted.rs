//! Scripted permission gate and capture service
//!
//! Stand-ins for the platform prompts and camera UI with predetermined answers.

use crate::capture::{CaptureCallback, CaptureOutcome, CaptureService};
use crate::models::MediaFilter;
use crate::permission::{PermissionCallback, PermissionGate, PermissionStatus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct GateState {
    camera: PermissionStatus,
    library: PermissionStatus,
    camera_answer: PermissionStatus,
    library_answer: PermissionStatus,
    camera_prompts: usize,
    library_prompts: usize,
    settings_opened: usize,
    limited_picker_presented: usize,
}

/// Permission gate with fixed statuses and fixed prompt answers
#[derive(Debug, Clone)]
pub struct FixedPermissionGate {
    state: Arc<Mutex<GateState>>,
}

impl FixedPermissionGate {
    /// Gate whose current statuses are already decided
    pub fn new(camera: PermissionStatus, library: PermissionStatus) -> Self {
        Self::with_answers(camera, library, camera, library)
    }

    /// Gate that reports `camera`/`library` and answers prompts with the given statuses
    pub fn with_answers(
        camera: PermissionStatus,
        library: PermissionStatus,
        camera_answer: PermissionStatus,
        library_answer: PermissionStatus,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(GateState {
                camera,
                library,
                camera_answer,
                library_answer,
                camera_prompts: 0,
                library_prompts: 0,
                settings_opened: 0,
                limited_picker_presented: 0,
            })),
        }
    }

    /// Everything granted
    pub fn granted() -> Self {
        Self::new(PermissionStatus::Granted, PermissionStatus::Granted)
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn camera_prompts(&self) -> usize {
        self.lock().camera_prompts
    }

    pub fn library_prompts(&self) -> usize {
        self.lock().library_prompts
    }

    pub fn settings_opened(&self) -> usize {
        self.lock().settings_opened
    }

    pub fn limited_picker_presented(&self) -> usize {
        self.lock().limited_picker_presented
    }
}

impl PermissionGate for FixedPermissionGate {
    fn camera_status(&self) -> PermissionStatus {
        self.lock().camera
    }

    fn request_camera(&self, done: PermissionCallback) {
        let answer = {
            let mut state = self.lock();
            state.camera_prompts += 1;
            state.camera = state.camera_answer;
            state.camera_answer
        };
        done(answer);
    }

    fn library_status(&self) -> PermissionStatus {
        self.lock().library
    }

    fn request_library(&self, done: PermissionCallback) {
        let answer = {
            let mut state = self.lock();
            state.library_prompts += 1;
            state.library = state.library_answer;
            state.library_answer
        };
        done(answer);
    }

    fn open_settings(&self) {
        self.lock().settings_opened += 1;
    }

    fn present_limited_library_picker(&self) {
        self.lock().limited_picker_presented += 1;
    }
}

#[derive(Debug, Default)]
struct CaptureState {
    outcomes: VecDeque<CaptureOutcome>,
    presentations: Vec<(MediaFilter, bool)>,
}

/// Capture service answering each presentation with the next queued outcome
///
/// An empty queue answers `Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCaptureService {
    state: Arc<Mutex<CaptureState>>,
}

impl ScriptedCaptureService {
    pub fn new(outcomes: impl IntoIterator<Item = CaptureOutcome>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CaptureState {
                outcomes: outcomes.into_iter().collect(),
                presentations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, outcome: CaptureOutcome) {
        self.lock().outcomes.push_back(outcome);
    }

    /// Filter and allow-editing flag of every presentation so far
    pub fn presentations(&self) -> Vec<(MediaFilter, bool)> {
        self.lock().presentations.clone()
    }
}

impl CaptureService for ScriptedCaptureService {
    fn present(&self, filter: MediaFilter, allow_editing: bool, done: CaptureCallback) {
        let outcome = {
            let mut state = self.lock();
            state.presentations.push((filter, allow_editing));
            state.outcomes.pop_front().unwrap_or(CaptureOutcome::Cancelled)
        };
        done(outcome);
    }
}
