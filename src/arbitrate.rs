//! Choosing between a clipboard image and a file candidate.

use crate::types::{FileCandidate, GrabError, Winner};
use std::time::{Duration, SystemTime};

/// A file modified within this window beats the clipboard.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30);

/// Pick exactly one winner from the two lookups.
///
/// `file` is `None` in clipboard-only mode, where the file lookup never runs.
/// A file whose mtime is at or after `now - window` (including any future
/// timestamp) beats the clipboard; older files lose to it. When neither side
/// found anything, a file-lookup error outranks a clipboard error, and two
/// `NotFound`s give `NotFound`.
pub fn arbitrate(
    clipboard: Result<Vec<u8>, GrabError>,
    file: Option<Result<FileCandidate, GrabError>>,
    now: SystemTime,
    window: Duration,
) -> Result<Winner, GrabError> {
    let Some(file) = file else {
        return clipboard.map(Winner::Clipboard);
    };

    match (clipboard, file) {
        (Ok(bytes), Ok(candidate)) => {
            if is_recent(candidate.modified, now, window) {
                log::info!(
                    "File {} is within the {}s window, preferring it over the clipboard",
                    candidate.path.display(),
                    window.as_secs()
                );
                Ok(Winner::File(candidate))
            } else {
                log::info!(
                    "File {} is older than {}s, preferring the clipboard",
                    candidate.path.display(),
                    window.as_secs()
                );
                Ok(Winner::Clipboard(bytes))
            }
        }
        (Ok(bytes), Err(file_err)) => {
            if !file_err.is_not_found() {
                log::debug!("File lookup failed, using clipboard: {}", file_err);
            }
            Ok(Winner::Clipboard(bytes))
        }
        (Err(clip_err), Ok(candidate)) => {
            if !clip_err.is_not_found() {
                log::debug!("Clipboard capture failed, using file: {}", clip_err);
            }
            Ok(Winner::File(candidate))
        }
        (Err(clip_err), Err(file_err)) => {
            if !file_err.is_not_found() {
                Err(file_err)
            } else if !clip_err.is_not_found() {
                Err(clip_err)
            } else {
                Err(GrabError::NotFound)
            }
        }
    }
}

fn is_recent(modified: SystemTime, now: SystemTime, window: Duration) -> bool {
    match now.checked_sub(window) {
        Some(threshold) => modified >= threshold,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;
    use std::path::PathBuf;

    fn file_at(modified: SystemTime) -> FileCandidate {
        FileCandidate {
            path: PathBuf::from("/home/u/Desktop/Screenshot.png"),
            modified,
            location: Location::Desktop,
        }
    }

    fn decide(age: Option<i64>, clipboard: bool) -> Result<Winner, GrabError> {
        let now = SystemTime::now();
        let file = age.map(|secs| {
            let modified = if secs >= 0 {
                now - Duration::from_secs(secs as u64)
            } else {
                now + Duration::from_secs(secs.unsigned_abs())
            };
            Ok(file_at(modified))
        });
        let clip = if clipboard {
            Ok(b"clip".to_vec())
        } else {
            Err(GrabError::NotFound)
        };
        arbitrate(
            clip,
            Some(file.unwrap_or(Err(GrabError::NotFound))),
            now,
            DEFAULT_WINDOW,
        )
    }

    #[test]
    fn fresh_file_beats_clipboard() {
        assert!(matches!(decide(Some(0), true), Ok(Winner::File(_))));
        assert!(matches!(decide(Some(29), true), Ok(Winner::File(_))));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        assert!(matches!(decide(Some(30), true), Ok(Winner::File(_))));
    }

    #[test]
    fn stale_file_loses_to_clipboard() {
        assert!(matches!(decide(Some(31), true), Ok(Winner::Clipboard(_))));
    }

    #[test]
    fn future_timestamp_beats_clipboard() {
        assert!(matches!(decide(Some(-3600), true), Ok(Winner::File(_))));
    }

    #[test]
    fn single_success_wins_regardless_of_age() {
        assert!(matches!(decide(Some(86_400), false), Ok(Winner::File(_))));
        assert!(matches!(decide(None, true), Ok(Winner::Clipboard(_))));
    }

    #[test]
    fn clipboard_wins_over_file_lookup_error() {
        let result = arbitrate(
            Ok(b"clip".to_vec()),
            Some(Err(GrabError::Relocate("denied".into()))),
            SystemTime::now(),
            DEFAULT_WINDOW,
        );
        assert!(matches!(result, Ok(Winner::Clipboard(_))));
    }

    #[test]
    fn nothing_found_is_not_found() {
        assert!(decide(None, false).unwrap_err().is_not_found());
    }

    #[test]
    fn file_error_outranks_clipboard_error() {
        let result = arbitrate(
            Err(GrabError::Clipboard("too big".into())),
            Some(Err(GrabError::Io(std::io::Error::other("listing failed")))),
            SystemTime::now(),
            DEFAULT_WINDOW,
        );
        assert!(matches!(result, Err(GrabError::Io(_))));
    }

    #[test]
    fn clipboard_error_surfaces_when_file_not_found() {
        let result = arbitrate(
            Err(GrabError::Clipboard("too big".into())),
            Some(Err(GrabError::NotFound)),
            SystemTime::now(),
            DEFAULT_WINDOW,
        );
        assert!(matches!(result, Err(GrabError::Clipboard(_))));
    }

    #[test]
    fn clipboard_only_mode_ignores_files() {
        let now = SystemTime::now();
        assert!(matches!(
            arbitrate(Ok(b"x".to_vec()), None, now, DEFAULT_WINDOW),
            Ok(Winner::Clipboard(_))
        ));
        assert!(
            arbitrate(Err(GrabError::NotFound), None, now, DEFAULT_WINDOW)
                .unwrap_err()
                .is_not_found()
        );
        assert!(matches!(
            arbitrate(
                Err(GrabError::Clipboard("boom".into())),
                None,
                now,
                DEFAULT_WINDOW
            ),
            Err(GrabError::Clipboard(_))
        ));
    }
}
