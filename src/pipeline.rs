use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use crate::{
    arbitrate::{DEFAULT_WINDOW, arbitrate},
    dependencies::{CandidateLocator, GrabDependencies},
    types::{FileCandidate, GrabError, GrabOutcome, Location, Winner},
};
use tokio::task;

/// What a single run should look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabRequest {
    /// Skip file lookup entirely and only consider the clipboard.
    pub clipboard_only: bool,
    /// Which folder the file lookup scans.
    pub location: Location,
    /// Arbitration window; files newer than this beat the clipboard.
    pub window: Duration,
}

impl Default for GrabRequest {
    fn default() -> Self {
        Self {
            clipboard_only: false,
            location: Location::Desktop,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Run capture, lookup, arbitration, and relocation once.
pub async fn perform_grab(
    request: GrabRequest,
    dependencies: Arc<GrabDependencies>,
) -> Result<GrabOutcome, GrabError> {
    log::info!("Starting grab: {:?}", request);

    // Step 1: clipboard and file lookup have no data dependency; run both
    let clipboard = dependencies.clipboard.capture();
    let file = async {
        if request.clipboard_only {
            log::debug!("Clipboard-only mode, skipping file lookup");
            None
        } else {
            Some(locate(Arc::clone(&dependencies.locator), request.location).await)
        }
    };
    let (clipboard, file) = tokio::join!(clipboard, file);

    match &clipboard {
        Ok(bytes) => log::debug!("Clipboard candidate: {} bytes", bytes.len()),
        Err(e) => log::debug!("Clipboard candidate: none ({})", e),
    }

    // Step 2: pick a winner
    let winner = arbitrate(clipboard, file, SystemTime::now(), request.window)?;

    // Step 3: move it into place
    relocate(dependencies, winner).await
}

async fn locate(
    locator: Arc<dyn CandidateLocator>,
    location: Location,
) -> Result<FileCandidate, GrabError> {
    task::spawn_blocking(move || locator.locate(location))
        .await
        .map_err(|e| GrabError::Task(format!("File lookup task failed: {}", e)))?
}

async fn relocate(
    dependencies: Arc<GrabDependencies>,
    winner: Winner,
) -> Result<GrabOutcome, GrabError> {
    task::spawn_blocking(move || {
        dependencies
            .relocator
            .relocate(winner, dependencies.trasher.as_ref())
    })
    .await
    .map_err(|e| GrabError::Task(format!("Relocation task failed: {}", e)))?
}
