//! Recoverable removal of an original file through the OS trash.
//!
//! Two layouts are supported:
//! - a single flat directory (`~/.Trash` on macOS)
//! - the freedesktop.org pair of `files/` and `info/` directories, where each
//!   trashed file gets a `<name>.trashinfo` record

use super::move_file;
use crate::platform::Platform;
use crate::types::GrabError;
use chrono::{DateTime, Local};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Upper bound on `stem.N.ext` probes before giving up.
pub const MAX_TRASH_NAME_ATTEMPTS: usize = 1000;

/// Timestamp layout used in `.trashinfo` records.
pub const TRASHINFO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Moves a file into the trash and returns where it ended up.
pub trait Trasher: Send + Sync {
    fn trash(&self, path: &Path) -> Result<PathBuf, GrabError>;
}

/// The trash layout selected for this platform.
#[derive(Clone)]
pub enum TrashProtocol {
    Flat(FlatTrash),
    Freedesktop(FreedesktopTrash),
}

impl TrashProtocol {
    pub fn for_platform(platform: Platform, home: &Path) -> Self {
        match platform {
            Platform::MacOs => TrashProtocol::Flat(FlatTrash::new(home.join(".Trash"))),
            Platform::Freedesktop => {
                let data_dir = dirs::data_dir().unwrap_or_else(|| home.join(".local/share"));
                TrashProtocol::Freedesktop(FreedesktopTrash::new(data_dir.join("Trash")))
            }
        }
    }
}

impl Trasher for TrashProtocol {
    fn trash(&self, path: &Path) -> Result<PathBuf, GrabError> {
        match self {
            TrashProtocol::Flat(trash) => trash.trash(path),
            TrashProtocol::Freedesktop(trash) => trash.trash(path),
        }
    }
}

/// A single trash directory holding the files themselves.
#[derive(Debug, Clone)]
pub struct FlatTrash {
    dir: PathBuf,
}

impl FlatTrash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Trasher for FlatTrash {
    fn trash(&self, path: &Path) -> Result<PathBuf, GrabError> {
        ensure_private_dir(&self.dir)?;
        let name = free_name(path, |candidate| !exists(&self.dir.join(candidate)))?;
        let target = self.dir.join(&name);

        move_file(path, &target).map_err(|e| {
            GrabError::Trash(format!(
                "Failed to move {} to {}: {}",
                path.display(),
                target.display(),
                e
            ))
        })?;

        log::info!("Trashed {} as {}", path.display(), target.display());
        Ok(target)
    }
}

/// Writes `.trashinfo` records.
pub trait TrashInfoWriter: Send + Sync {
    fn write_info(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Creates the record exclusively and removes it again if the write fails.
#[derive(Debug, Default)]
pub struct FsInfoWriter;

impl TrashInfoWriter for FsInfoWriter {
    fn write_info(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        if let Err(e) = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(path);
            return Err(e);
        }
        Ok(())
    }
}

/// freedesktop.org trash: `<root>/files` plus `<root>/info`.
#[derive(Clone)]
pub struct FreedesktopTrash {
    files_dir: PathBuf,
    info_dir: PathBuf,
    writer: Arc<dyn TrashInfoWriter>,
}

impl FreedesktopTrash {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            files_dir: root.join("files"),
            info_dir: root.join("info"),
            writer: Arc::new(FsInfoWriter),
        }
    }

    /// Swap the record writer (used to simulate metadata failures).
    pub fn with_writer(mut self, writer: Arc<dyn TrashInfoWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn info_dir(&self) -> &Path {
        &self.info_dir
    }

    fn info_path(&self, name: &OsStr) -> PathBuf {
        let mut file_name = name.to_os_string();
        file_name.push(".trashinfo");
        self.info_dir.join(file_name)
    }
}

impl Trasher for FreedesktopTrash {
    fn trash(&self, path: &Path) -> Result<PathBuf, GrabError> {
        ensure_private_dir(&self.files_dir)?;
        ensure_private_dir(&self.info_dir)?;

        let original = std::path::absolute(path)?;
        let name = free_name(&original, |candidate| {
            !exists(&self.files_dir.join(candidate)) && !exists(&self.info_path(candidate))
        })?;
        let target = self.files_dir.join(&name);
        let info_path = self.info_path(&name);

        move_file(&original, &target).map_err(|e| {
            GrabError::Trash(format!(
                "Failed to move {} to {}: {}",
                original.display(),
                target.display(),
                e
            ))
        })?;

        let write_result = trash_info_contents(&original, Local::now()).and_then(|contents| {
            self.writer
                .write_info(&info_path, &contents)
                .map_err(|e| {
                    GrabError::Trash(format!(
                        "Failed to write {}: {}",
                        info_path.display(),
                        e
                    ))
                })
        });

        if let Err(err) = write_result {
            if let Err(restore_err) = move_file(&target, &original) {
                log::warn!(
                    "Could not restore {} from trash after metadata failure: {}",
                    original.display(),
                    restore_err
                );
            }
            return Err(err);
        }

        log::info!(
            "Trashed {} as {} ({})",
            original.display(),
            target.display(),
            info_path.display()
        );
        Ok(target)
    }
}

/// Render a `.trashinfo` record for `original` deleted at `deleted_at`.
pub fn trash_info_contents(
    original: &Path,
    deleted_at: DateTime<Local>,
) -> Result<String, GrabError> {
    let url = url::Url::from_file_path(original).map_err(|()| {
        GrabError::Trash(format!(
            "Cannot encode {} as a trash path",
            original.display()
        ))
    })?;

    Ok(format!(
        "[Trash Info]\nPath={}\nDeletionDate={}\n",
        url.path(),
        deleted_at.format(TRASHINFO_TIME_FORMAT)
    ))
}

/// First name for `original` accepted by `is_free`: the basename, then
/// `stem.1.ext`, `stem.2.ext`, ...
fn free_name(original: &Path, is_free: impl Fn(&OsStr) -> bool) -> Result<OsString, GrabError> {
    let file_name = original.file_name().ok_or_else(|| {
        GrabError::Trash(format!("{} has no file name", original.display()))
    })?;
    if is_free(file_name) {
        return Ok(file_name.to_os_string());
    }

    let stem = original.file_stem().unwrap_or(file_name);
    let ext = original.extension();
    for n in 1..MAX_TRASH_NAME_ATTEMPTS {
        let mut candidate = stem.to_os_string();
        candidate.push(format!(".{n}"));
        if let Some(ext) = ext {
            candidate.push(".");
            candidate.push(ext);
        }
        if is_free(candidate.as_os_str()) {
            log::debug!("Trash name collision, using {:?}", candidate);
            return Ok(candidate);
        }
    }

    Err(GrabError::Trash(format!(
        "No free trash name for {} after {} attempts",
        original.display(),
        MAX_TRASH_NAME_ATTEMPTS
    )))
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn ensure_private_dir(dir: &Path) -> Result<(), GrabError> {
    if dir.is_dir() {
        return Ok(());
    }
    log::info!("Creating trash directory: {}", dir.display());

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir).map_err(|e| {
        GrabError::Trash(format!("Failed to create {}: {}", dir.display(), e))
    })
}
