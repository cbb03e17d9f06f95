//! Reading an image off the system clipboard.

use super::backends::{BackendContext, BackendOutcome, ClipboardBackend, default_backends};
use super::search_path::SearchPath;
use crate::platform::Platform;
use crate::relocate::temp::TempAllocator;
use crate::types::GrabError;

/// Default cap on captured clipboard bytes (50 MiB).
pub const DEFAULT_MAX_PAYLOAD: u64 = 50 * 1024 * 1024;

/// Tries each backend in order and returns the first non-empty image.
pub struct ClipboardReader {
    backends: Vec<Box<dyn ClipboardBackend>>,
    search_path: SearchPath,
    scratch: TempAllocator,
    max_payload: u64,
}

impl ClipboardReader {
    /// Reader with the platform's backend chain and the process `PATH`.
    pub fn new(platform: Platform, scratch: TempAllocator, max_payload: u64) -> Self {
        Self::with_backends(
            default_backends(platform),
            SearchPath::from_env(),
            scratch,
            max_payload,
        )
    }

    pub fn with_backends(
        backends: Vec<Box<dyn ClipboardBackend>>,
        search_path: SearchPath,
        scratch: TempAllocator,
        max_payload: u64,
    ) -> Self {
        Self {
            backends,
            search_path,
            scratch,
            max_payload,
        }
    }

    /// Capture the clipboard image.
    ///
    /// Returns [`GrabError::NotFound`] when every backend is unavailable or
    /// fails; other errors abort the chain immediately.
    pub fn read(&self) -> Result<Vec<u8>, GrabError> {
        let ctx = BackendContext {
            search_path: &self.search_path,
            scratch: &self.scratch,
            max_payload: self.max_payload,
        };

        for backend in &self.backends {
            let program = backend.program();
            match backend.try_capture(&ctx)? {
                BackendOutcome::Captured(bytes) => {
                    log::info!("Read {} bytes from clipboard via {}", bytes.len(), program);
                    return Ok(bytes);
                }
                BackendOutcome::Unavailable => {
                    log::debug!("Clipboard backend {} not found on PATH", program);
                }
                BackendOutcome::Failed(reason) => {
                    log::debug!("Clipboard backend {} failed: {}", program, reason);
                }
            }
        }

        log::debug!("No clipboard backend produced an image");
        Err(GrabError::NotFound)
    }
}
