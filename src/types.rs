//! Data types shared by the capture, lookup, and relocation stages.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Logical directory a file candidate can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The user's Desktop. Winners are copied out and the original is trashed.
    Desktop,
    /// The user's Downloads folder. Winners are moved out, nothing is trashed.
    Downloads,
}

impl Location {
    /// Conventional directory name below `$HOME`.
    pub fn home_dir_name(self) -> &'static str {
        match self {
            Location::Desktop => "Desktop",
            Location::Downloads => "Downloads",
        }
    }

    /// Key used in `user-dirs.dirs` (`XDG_<KEY>_DIR`).
    pub fn xdg_key(self) -> &'static str {
        match self {
            Location::Desktop => "DESKTOP",
            Location::Downloads => "DOWNLOAD",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Desktop => f.write_str("desktop"),
            Location::Downloads => f.write_str("downloads"),
        }
    }
}

/// Image file extensions the tool recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
}

impl ImageExtension {
    /// Case-insensitive match on the path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageExtension::Png),
            "jpg" => Some(ImageExtension::Jpg),
            "jpeg" => Some(ImageExtension::Jpeg),
            _ => None,
        }
    }

    /// Like [`ImageExtension::from_path`] but falls back to PNG.
    pub fn normalized(path: &Path) -> Self {
        Self::from_path(path).unwrap_or(ImageExtension::Png)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageExtension::Png => "png",
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
        }
    }
}

/// An image file found on disk, not yet relocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Absolute path of the original file.
    pub path: PathBuf,
    /// Last modification time reported by the filesystem.
    pub modified: SystemTime,
    /// Which logical location produced this candidate.
    pub location: Location,
}

/// The candidate chosen by arbitration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    /// Raw image bytes read from the clipboard.
    Clipboard(Vec<u8>),
    /// A file found on disk.
    File(FileCandidate),
}

/// Where the relocated image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLabel {
    Clipboard,
    File(PathBuf),
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLabel::Clipboard => f.write_str("clipboard"),
            SourceLabel::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Final result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabOutcome {
    pub source: SourceLabel,
    /// Absolute path of the temp file now holding the image.
    pub temp_path: PathBuf,
}

/// Errors produced while grabbing an image.
///
/// [`GrabError::NotFound`] is not a failure in the usual sense: it means no
/// clipboard image and no qualifying file exist, and is reported silently.
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("no image found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard capture failed: {0}")]
    Clipboard(String),

    #[error("Home directory is not set")]
    HomeUnset,

    #[error("Temp path allocation failed: {0}")]
    TempPath(String),

    #[error("Relocation failed: {0}")]
    Relocate(String),

    #[error("Trash failed: {0}")]
    Trash(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl GrabError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GrabError::NotFound)
    }
}
