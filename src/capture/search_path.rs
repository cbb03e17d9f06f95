//! Executable lookup on a `PATH`-style search path.
//!
//! The search path is passed in explicitly so lookups are repeatable and can be
//! pointed at a scratch directory in tests.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// A snapshot of an executable search path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    value: OsString,
}

impl SearchPath {
    pub fn new(value: impl Into<OsString>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Capture the current process `PATH` (empty when unset).
    pub fn from_env() -> Self {
        Self::new(env::var_os("PATH").unwrap_or_default())
    }

    /// Resolve `program` to the first executable entry on this search path.
    pub fn find(&self, program: &str) -> Option<PathBuf> {
        find_in_path(program, &self.value)
    }

    pub fn is_invokable(&self, program: &str) -> bool {
        self.find(program).is_some()
    }
}

/// Look up `program` in each directory of `search_path`.
pub fn find_in_path(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    for dir in env::split_paths(search_path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        for name in candidate_names(program) {
            let candidate = dir.join(&name);
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(windows)]
fn candidate_names(program: &str) -> Vec<OsString> {
    let mut names = vec![OsString::from(program)];
    if Path::new(program).extension().is_none() {
        let pathext = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
        for ext in pathext.split(';').filter(|ext| !ext.is_empty()) {
            names.push(OsString::from(format!("{program}{}", ext.to_ascii_lowercase())));
        }
    }
    names
}

#[cfg(not(windows))]
fn candidate_names(program: &str) -> Vec<OsString> {
    vec![OsString::from(program)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}
