//! Output file placement for captured images.

use std::path::{Path, PathBuf};

use chrono::Local;

/// Resolves where captured images are written.
///
/// A preferred media directory is used when it exists or can be created;
/// otherwise captures land in the private application directory. File names
/// carry a millisecond timestamp so repeated captures never collide.
pub struct CaptureStorage {
    preferred: Option<PathBuf>,
    fallback: PathBuf,
}

impl CaptureStorage {
    pub fn new(preferred: Option<PathBuf>, fallback: PathBuf) -> Self {
        Self {
            preferred,
            fallback,
        }
    }

    /// Platform defaults: the user pictures directory (with an app subfolder)
    /// preferred, the platform data directory as fallback.
    pub fn platform_default() -> Self {
        let preferred = dirs::picture_dir().map(|d| d.join("ConduitBridge"));
        let fallback = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("conduit-bridge");
        Self::new(preferred, fallback)
    }

    /// The directory listFiles defaults to when the caller passes no path.
    pub fn private_dir(&self) -> &Path {
        &self.fallback
    }

    fn output_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.preferred {
            if dir.is_dir() || std::fs::create_dir_all(dir).is_ok() {
                return dir.clone();
            }
        }
        self.fallback.clone()
    }

    /// Build a fresh `IMG_<yyyyMMdd_HHmmssSSS>.<extension>` path, creating the
    /// target directory if needed.
    pub fn next_image_path(&self, extension: &str) -> std::io::Result<PathBuf> {
        let dir = self.output_dir();
        std::fs::create_dir_all(&dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S%3f");
        Ok(dir.join(format!("IMG_{stamp}.{extension}")))
    }
}
