//! Camera session lifecycle: acquisition, selector resolution, capture,
//! teardown.
//!
//! The session owns the single device binding. All state transitions go
//! through one internal lock that is never held across a suspension point;
//! every in-flight acquisition or capture carries the generation counter
//! captured at issue time, and a completion whose generation no longer
//! matches the session's is discarded. That makes `dispose` safe to call
//! while a `start` or `capture` is still outstanding.

pub mod storage;

#[cfg(test)]
pub mod mock;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use self::storage::CaptureStorage;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by the device provider or the device itself.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DeviceError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("camera provider failed: {0}")]
    Provider(String),

    #[error("session was torn down while acquiring the camera")]
    Superseded,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera is not initialized")]
    NotBound,

    #[error("photo capture failed: {0}")]
    Device(String),

    #[error("could not prepare the output file: {0}")]
    Storage(#[from] std::io::Error),

    #[error("session was torn down while capturing")]
    Superseded,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which capture device to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LensDirection {
    Front,
    #[default]
    Back,
}

impl LensDirection {
    /// Resolve a caller-supplied selector. Anything that is not "front"
    /// (case-insensitive), including absence, normalizes to Back.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("front") => LensDirection::Front,
            _ => LensDirection::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Acquiring,
    Bound,
    Capturing,
    Disposed,
}

/// A successfully captured image. Ownership of the underlying file belongs to
/// the file-query collaborator from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub absolute_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Resolves a bindable capture device for a lens selector, asynchronously.
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    async fn acquire(&self, lens: LensDirection) -> Result<Box<dyn CaptureDevice>, DeviceError>;
}

/// A bound capture device.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Write one still image to `path`.
    async fn capture(&mut self, path: &Path) -> Result<(), DeviceError>;

    /// Release the underlying hardware binding. Idempotent.
    fn release(&mut self);
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct Inner {
    state: SessionState,
    generation: u64,
    device: Option<Box<dyn CaptureDevice>>,
}

/// Owns the lifecycle of a single capture device binding.
pub struct CameraSession {
    provider: Arc<dyn DeviceProvider>,
    storage: CaptureStorage,
    inner: Mutex<Inner>,
}

impl CameraSession {
    pub fn new(provider: Arc<dyn DeviceProvider>, storage: CaptureStorage) -> Self {
        Self {
            provider,
            storage,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                generation: 0,
                device: None,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().expect("session lock poisoned").state
    }

    pub fn storage(&self) -> &CaptureStorage {
        &self.storage
    }

    /// Acquire and bind a device for `lens`. Any existing binding is released
    /// first, so calling this repeatedly is safe. On failure the session is
    /// left in Idle and the caller may retry.
    pub async fn start(&self, lens: LensDirection) -> Result<(), StartError> {
        let generation = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            if let Some(mut device) = inner.device.take() {
                device.release();
            }
            inner.generation += 1;
            inner.state = SessionState::Acquiring;
            inner.generation
        };

        match self.provider.acquire(lens).await {
            Ok(mut device) => {
                let mut inner = self.inner.lock().expect("session lock poisoned");
                if inner.generation != generation {
                    // The session was disposed or restarted while we were
                    // acquiring. Discard the stale binding.
                    device.release();
                    return Err(StartError::Superseded);
                }
                inner.device = Some(device);
                inner.state = SessionState::Bound;
                log::debug!("camera bound with {:?} lens", lens);
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.lock().expect("session lock poisoned");
                if inner.generation == generation {
                    inner.state = SessionState::Idle;
                }
                log::error!("camera acquisition failed: {}", e);
                Err(StartError::Provider(e.to_string()))
            }
        }
    }

    /// Capture one image. Valid only while Bound; the session is Capturing
    /// for the duration of the call and back to Bound afterwards, whether the
    /// device succeeded or not.
    pub async fn capture(&self) -> Result<CapturedImage, CaptureError> {
        let path = self.storage.next_image_path("jpg")?;

        let (mut device, generation) = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            if inner.state != SessionState::Bound {
                return Err(CaptureError::NotBound);
            }
            let device = match inner.device.take() {
                Some(d) => d,
                None => return Err(CaptureError::NotBound),
            };
            inner.state = SessionState::Capturing;
            (device, inner.generation)
        };

        let outcome = device.capture(&path).await;

        let mut inner = self.inner.lock().expect("session lock poisoned");
        if inner.generation != generation {
            // Disposed while the device was capturing. The binding we hold is
            // stale; release it and leave the session alone.
            device.release();
            return Err(CaptureError::Superseded);
        }
        inner.device = Some(device);
        inner.state = SessionState::Bound;

        match outcome {
            Ok(()) => {
                log::debug!("photo capture succeeded: {}", path.display());
                Ok(CapturedImage {
                    absolute_path: path,
                })
            }
            Err(e) => Err(CaptureError::Device(e.to_string())),
        }
    }

    /// Tear down the session. Idempotent and callable from any state,
    /// including while a `start` or `capture` is outstanding.
    pub fn dispose(&self) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        inner.generation += 1;
        if let Some(mut device) = inner.device.take() {
            device.release();
        }
        inner.state = SessionState::Disposed;
        log::debug!("camera resources disposed");
    }
}
