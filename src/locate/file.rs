//! Picking the best screenshot file from a directory listing.

use crate::types::{FileCandidate, GrabError, ImageExtension, Location};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Default screenshot markers, compared case-insensitively against file names.
pub const DEFAULT_MARKERS: &[&str] = &["screenshot", "screen shot"];

/// Scans one directory (non-recursively) for image files.
#[derive(Debug, Clone)]
pub struct FileLocator {
    markers: Vec<String>,
}

impl Default for FileLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS.iter().map(|m| m.to_string()))
    }
}

impl FileLocator {
    pub fn new(markers: impl IntoIterator<Item = String>) -> Self {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Whether `file_name` contains one of the screenshot markers.
    pub fn is_tagged(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.markers.iter().any(|marker| lower.contains(marker))
    }

    /// Return the newest tagged image in `dir`, else the newest untagged one.
    ///
    /// Entries that vanish or cannot be stat'ed mid-listing are skipped.
    pub fn locate(&self, dir: &Path, location: Location) -> Result<FileCandidate, GrabError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(GrabError::NotFound),
            Err(e) => return Err(GrabError::Io(e)),
        };

        let mut newest_tagged: Option<(SystemTime, PathBuf)> = None;
        let mut newest_untagged: Option<(SystemTime, PathBuf)> = None;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::trace!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if ImageExtension::from_path(&path).is_none() {
                continue;
            }

            let modified = match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => match meta.modified() {
                    Ok(modified) => modified,
                    Err(e) => {
                        log::trace!("No mtime for {}: {}", path.display(), e);
                        continue;
                    }
                },
                Ok(_) => continue,
                Err(e) => {
                    log::trace!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let tagged = self.is_tagged(&entry.file_name().to_string_lossy());
            let slot = if tagged {
                &mut newest_tagged
            } else {
                &mut newest_untagged
            };
            if slot.as_ref().is_none_or(|(best, _)| modified > *best) {
                *slot = Some((modified, path));
            }
        }

        let (modified, path) = newest_tagged
            .or(newest_untagged)
            .ok_or(GrabError::NotFound)?;
        log::info!("Selected {} candidate {}", location, path.display());

        Ok(FileCandidate {
            path,
            modified,
            location,
        })
    }
}
