use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;

use crate::capture::clipboard::ClipboardReader;
use crate::config::Config;
use crate::locate::{DirectoryResolver, FileLocator};
use crate::platform::Platform;
use crate::relocate::Relocator;
use crate::relocate::temp::TempAllocator;
use crate::relocate::trash::{TrashProtocol, Trasher};
use crate::types::{FileCandidate, GrabError, Location};

/// Abstraction over reading an image from the clipboard.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn capture(&self) -> Result<Vec<u8>, GrabError>;
}

/// Abstraction over finding the best file candidate for a location.
pub trait CandidateLocator: Send + Sync {
    fn locate(&self, location: Location) -> Result<FileCandidate, GrabError>;
}

/// Bundle of collaborators used by the grab pipeline. Each component can be mocked in tests.
#[derive(Clone)]
pub struct GrabDependencies {
    pub clipboard: Arc<dyn ClipboardSource>,
    pub locator: Arc<dyn CandidateLocator>,
    pub trasher: Arc<dyn Trasher>,
    pub relocator: Arc<Relocator>,
}

impl GrabDependencies {
    /// Real implementations for `platform`, tuned by `config`.
    pub fn for_platform(platform: Platform, config: &Config) -> Result<Self, GrabError> {
        let resolver = DirectoryResolver::for_platform(platform)?;
        let trasher = TrashProtocol::for_platform(platform, resolver.home());
        let prefix = &config.temp.prefix;

        let reader = ClipboardReader::new(
            platform,
            TempAllocator::new(format!("{prefix}-clip")),
            config.clipboard.max_payload_bytes(),
        );

        Ok(Self {
            clipboard: Arc::new(ReaderSource(Arc::new(reader))),
            locator: Arc::new(DirectoryLocator {
                resolver,
                locator: FileLocator::new(config.locator.markers.iter().cloned()),
            }),
            trasher: Arc::new(trasher),
            relocator: Arc::new(Relocator::new(TempAllocator::new(prefix.clone()))),
        })
    }
}

struct ReaderSource(Arc<ClipboardReader>);

#[async_trait]
impl ClipboardSource for ReaderSource {
    async fn capture(&self) -> Result<Vec<u8>, GrabError> {
        let reader = Arc::clone(&self.0);
        task::spawn_blocking(move || reader.read())
            .await
            .map_err(|e| GrabError::Task(format!("Clipboard task failed: {}", e)))?
    }
}

/// Resolves the directory for a location, then scans it.
pub struct DirectoryLocator {
    pub resolver: DirectoryResolver,
    pub locator: FileLocator,
}

impl CandidateLocator for DirectoryLocator {
    fn locate(&self, location: Location) -> Result<FileCandidate, GrabError> {
        let dir = self.resolver.resolve(location)?;
        self.locator.locate(&dir, location)
    }
}
