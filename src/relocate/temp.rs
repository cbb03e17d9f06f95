//! Collision-free file names inside the system temp directory.

use crate::types::{GrabError, ImageExtension};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// How many names are tried before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 20;

/// Produces the unique part of a temp file name.
pub type TokenSource = Box<dyn Fn() -> String + Send + Sync>;

/// Hands out paths that do not exist at the moment of allocation.
///
/// Nothing is reserved on disk, so two processes racing on the same directory
/// could in theory receive the same name; the time + random token makes this
/// practically impossible.
pub struct TempAllocator {
    dir: PathBuf,
    prefix: String,
    token: TokenSource,
}

impl fmt::Debug for TempAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempAllocator")
            .field("dir", &self.dir)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl TempAllocator {
    /// Allocator rooted at the system temp directory.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::in_dir(std::env::temp_dir(), prefix)
    }

    pub fn in_dir(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            token: Box::new(default_token),
        }
    }

    /// Replace the token generator (tests force collisions this way).
    pub fn with_token_source(mut self, token: TokenSource) -> Self {
        self.token = token;
        self
    }

    /// Return a fresh absolute path ending in `ext`.
    pub fn allocate(&self, ext: ImageExtension) -> Result<PathBuf, GrabError> {
        let dir = std::path::absolute(&self.dir)?;

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let name = format!("{}-{}.{}", self.prefix, (self.token)(), ext.as_str());
            let candidate = dir.join(name);
            match fs::symlink_metadata(&candidate) {
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("Allocated temp path {}", candidate.display());
                    return Ok(candidate);
                }
                Ok(_) => {
                    log::trace!(
                        "Temp path {} taken (attempt {}/{})",
                        candidate.display(),
                        attempt,
                        MAX_ALLOCATION_ATTEMPTS
                    );
                }
                Err(err) => {
                    return Err(GrabError::TempPath(format!(
                        "Cannot probe {}: {}",
                        candidate.display(),
                        err
                    )));
                }
            }
        }

        Err(GrabError::TempPath(format!(
            "No free name in {} after {} attempts",
            dir.display(),
            MAX_ALLOCATION_ATTEMPTS
        )))
    }
}

fn default_token() -> String {
    format!(
        "{}-{:08x}",
        Local::now().format("%Y%m%d-%H%M%S-%3f"),
        rand::random::<u32>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn counting_tokens() -> (TokenSource, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&counter);
        let source: TokenSource =
            Box::new(move || format!("t{}", handle.fetch_add(1, Ordering::SeqCst)));
        (source, counter)
    }

    #[test]
    fn default_names_carry_prefix_and_extension() {
        let temp = TempDir::new().unwrap();
        let allocator = TempAllocator::in_dir(temp.path(), "shotgrab");

        let path = allocator.allocate(ImageExtension::Jpeg).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("shotgrab-"));
        assert!(name.ends_with(".jpeg"));
        assert!(path.is_absolute());
        assert!(!path.exists());
    }

    #[test]
    fn skips_nineteen_forced_collisions() {
        let temp = TempDir::new().unwrap();
        for i in 0..19 {
            fs::write(temp.path().join(format!("grab-t{i}.png")), b"taken").unwrap();
        }
        let (tokens, counter) = counting_tokens();
        let allocator = TempAllocator::in_dir(temp.path(), "grab").with_token_source(tokens);

        let path = allocator.allocate(ImageExtension::Png).unwrap();
        assert_eq!(path, temp.path().join("grab-t19.png"));
        assert!(!path.exists());
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn gives_up_when_every_name_is_taken() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("grab-same.png"), b"taken").unwrap();
        let allocator = TempAllocator::in_dir(temp.path(), "grab")
            .with_token_source(Box::new(|| "same".to_string()));

        let err = allocator.allocate(ImageExtension::Png).unwrap_err();
        assert!(matches!(err, GrabError::TempPath(_)));
    }

    #[test]
    fn successive_allocations_differ() {
        let temp = TempDir::new().unwrap();
        let allocator = TempAllocator::in_dir(temp.path(), "grab");

        let first = allocator.allocate(ImageExtension::Png).unwrap();
        fs::write(&first, b"x").unwrap();
        let second = allocator.allocate(ImageExtension::Png).unwrap();
        assert_ne!(first, second);
    }
}
