//! In-memory mock implementation of `DeviceProvider` for testing.
//!
//! Tracks all calls and counts outstanding bindings so `CameraSession` can be
//! tested against the single-binding invariant without real hardware.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{CaptureDevice, DeviceError, DeviceProvider, LensDirection};

// A minimal JPEG SOI marker, enough to land a real file on disk.
const JPEG_STUB: &[u8] = &[0xff, 0xd8, 0xff, 0xd9];

// ---------------------------------------------------------------------------
// Call recording
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Acquire(LensDirection),
    Capture(PathBuf),
    Release,
}

// ---------------------------------------------------------------------------
// Mock state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct State {
    calls: Vec<ProviderCall>,
    outstanding: usize,
    acquires: usize,
    captures: usize,
    // Behavior overrides for testing edge cases
    fail_acquire: bool,
    fail_capture: bool,
}

#[derive(Clone)]
pub struct MockProvider {
    state: Arc<Mutex<State>>,
    acquire_delay: Option<Duration>,
    capture_delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            acquire_delay: None,
            capture_delay: None,
        }
    }

    /// Make `acquire` fail.
    pub fn fail_acquire(self) -> Self {
        self.state.lock().unwrap().fail_acquire = true;
        self
    }

    /// Make every device's `capture` fail.
    pub fn fail_capture(self) -> Self {
        self.state.lock().unwrap().fail_capture = true;
        self
    }

    /// Delay `acquire`, to let tests overlap it with `dispose`.
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = Some(delay);
        self
    }

    /// Delay `capture`, to let tests overlap it with `dispose`.
    pub fn with_capture_delay(mut self, delay: Duration) -> Self {
        self.capture_delay = Some(delay);
        self
    }

    /// How many bindings are currently held and unreleased.
    pub fn outstanding_bindings(&self) -> usize {
        self.state.lock().unwrap().outstanding
    }

    pub fn acquire_count(&self) -> usize {
        self.state.lock().unwrap().acquires
    }

    pub fn capture_count(&self) -> usize {
        self.state.lock().unwrap().captures
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Check if a specific call was made.
    pub fn was_called(&self, needle: &ProviderCall) -> bool {
        self.state.lock().unwrap().calls.iter().any(|c| c == needle)
    }

    /// The lens of the most recent acquisition, if any.
    pub fn last_lens(&self) -> Option<LensDirection> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ProviderCall::Acquire(lens) => Some(*lens),
                _ => None,
            })
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// DeviceProvider implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl DeviceProvider for MockProvider {
    async fn acquire(&self, lens: LensDirection) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        if let Some(delay) = self.acquire_delay {
            tokio::time::sleep(delay).await;
        }

        let fail_capture = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ProviderCall::Acquire(lens));
            state.acquires += 1;
            if state.fail_acquire {
                return Err(DeviceError("mock: acquisition failed".to_string()));
            }
            state.outstanding += 1;
            state.fail_capture
        };

        Ok(Box::new(MockDevice {
            state: Arc::clone(&self.state),
            bound: true,
            fail_capture,
            capture_delay: self.capture_delay,
        }))
    }
}

struct MockDevice {
    state: Arc<Mutex<State>>,
    bound: bool,
    fail_capture: bool,
    capture_delay: Option<Duration>,
}

#[async_trait]
impl CaptureDevice for MockDevice {
    async fn capture(&mut self, path: &Path) -> Result<(), DeviceError> {
        if let Some(delay) = self.capture_delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ProviderCall::Capture(path.to_path_buf()));
            state.captures += 1;
        }

        if self.fail_capture {
            return Err(DeviceError("mock: capture failed".to_string()));
        }
        std::fs::write(path, JPEG_STUB).map_err(|e| DeviceError(e.to_string()))
    }

    fn release(&mut self) {
        if self.bound {
            self.bound = false;
            let mut state = self.state.lock().unwrap();
            state.outstanding -= 1;
            state.calls.push(ProviderCall::Release);
        }
    }
}
