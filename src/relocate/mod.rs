//! Materialising the winning image at a temp path.
//!
//! - Clipboard bytes are written to a new `.png` temp file.
//! - Downloads files are moved out (rename, or copy + delete across devices).
//! - Desktop files are copied out and the original is sent to the trash; if
//!   trashing fails the temp copy is removed again.

pub mod temp;
pub mod trash;

use crate::types::{
    FileCandidate, GrabError, GrabOutcome, ImageExtension, Location, SourceLabel, Winner,
};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use temp::TempAllocator;
use trash::Trasher;

/// Moves or copies winners into the temp directory.
#[derive(Debug)]
pub struct Relocator {
    temp: TempAllocator,
}

impl Relocator {
    pub fn new(temp: TempAllocator) -> Self {
        Self { temp }
    }

    /// Finalise `winner`, trashing a Desktop original through `trasher`.
    pub fn relocate(
        &self,
        winner: Winner,
        trasher: &dyn Trasher,
    ) -> Result<GrabOutcome, GrabError> {
        match winner {
            Winner::Clipboard(bytes) => Ok(GrabOutcome {
                source: SourceLabel::Clipboard,
                temp_path: self.write_clipboard_image(&bytes)?,
            }),
            Winner::File(candidate) => {
                let temp_path = match candidate.location {
                    Location::Downloads => self.move_out(&candidate)?,
                    Location::Desktop => self.copy_out_and_trash(&candidate, trasher)?,
                };
                Ok(GrabOutcome {
                    source: SourceLabel::File(candidate.path),
                    temp_path,
                })
            }
        }
    }

    /// Write clipboard bytes to a fresh `.png` file readable only by the user.
    pub fn write_clipboard_image(&self, bytes: &[u8]) -> Result<PathBuf, GrabError> {
        if bytes.is_empty() {
            return Err(GrabError::Clipboard("clipboard image is empty".into()));
        }
        let target = self.temp.allocate(ImageExtension::Png)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let written = options
            .open(&target)
            .and_then(|mut file| file.write_all(bytes).and_then(|()| file.sync_all()));
        if let Err(e) = written {
            let _ = fs::remove_file(&target);
            return Err(GrabError::Relocate(format!(
                "Failed to write clipboard image to {}: {}",
                target.display(),
                e
            )));
        }

        log::info!(
            "Saved clipboard image to {} ({} bytes)",
            target.display(),
            bytes.len()
        );
        Ok(target)
    }

    /// Move a Downloads file into the temp directory.
    pub fn move_out(&self, candidate: &FileCandidate) -> Result<PathBuf, GrabError> {
        ensure_not_empty(&candidate.path)?;
        let target = self.temp.allocate(ImageExtension::normalized(&candidate.path))?;

        move_file(&candidate.path, &target).map_err(|e| {
            GrabError::Relocate(format!(
                "Failed to move {} to {}: {}",
                candidate.path.display(),
                target.display(),
                e
            ))
        })?;

        log::info!("Moved {} to {}", candidate.path.display(), target.display());
        Ok(target)
    }

    /// Copy a Desktop file into the temp directory, then trash the original.
    pub fn copy_out_and_trash(
        &self,
        candidate: &FileCandidate,
        trasher: &dyn Trasher,
    ) -> Result<PathBuf, GrabError> {
        ensure_not_empty(&candidate.path)?;
        let target = self.temp.allocate(ImageExtension::normalized(&candidate.path))?;

        if let Err(e) = fs::copy(&candidate.path, &target) {
            let _ = fs::remove_file(&target);
            return Err(GrabError::Relocate(format!(
                "Failed to copy {} to {}: {}",
                candidate.path.display(),
                target.display(),
                e
            )));
        }
        log::debug!("Copied {} to {}", candidate.path.display(), target.display());

        if let Err(err) = trasher.trash(&candidate.path) {
            log::debug!("Trash failed, removing temp copy {}", target.display());
            if let Err(e) = fs::remove_file(&target) {
                log::warn!(
                    "Failed to remove temp copy {}: {}",
                    target.display(),
                    e
                );
            }
            return Err(err);
        }

        Ok(target)
    }
}

fn ensure_not_empty(path: &Path) -> Result<(), GrabError> {
    let meta = fs::metadata(path).map_err(|e| {
        GrabError::Relocate(format!("Cannot stat {}: {}", path.display(), e))
    })?;
    if meta.len() == 0 {
        return Err(GrabError::Relocate(format!("{} is empty", path.display())));
    }
    Ok(())
}

/// Rename `src` to `dst`, falling back to copy + delete across filesystems.
///
/// On failure `src` is left in place and no `dst` is left behind.
pub(crate) fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            log::debug!(
                "{} and {} are on different filesystems, copying",
                src.display(),
                dst.display()
            );
            copy_then_remove(src, dst)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_remove(src: &Path, dst: &Path) -> io::Result<()> {
    if let Err(e) = fs::copy(src, dst) {
        let _ = fs::remove_file(dst);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(src) {
        let _ = fs::remove_file(dst);
        return Err(e);
    }
    Ok(())
}
