//! Resolving the Desktop / Downloads directory for the current user.

use crate::platform::Platform;
use crate::types::{GrabError, Location};
use std::fs;
use std::path::{Path, PathBuf};

/// How folder locations may be overridden on this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirStrategy {
    /// Only `$HOME/Desktop` and `$HOME/Downloads`.
    HomeDefault,
    /// Home default first, then `XDG_*_DIR` entries from a `user-dirs.dirs` file.
    ConfigOverride { config_file: PathBuf },
}

/// Maps a [`Location`] to an existing absolute directory.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    home: PathBuf,
    strategy: DirStrategy,
}

impl DirectoryResolver {
    pub fn new(home: impl Into<PathBuf>, strategy: DirStrategy) -> Self {
        Self {
            home: home.into(),
            strategy,
        }
    }

    /// Resolver for the current user on `platform`.
    pub fn for_platform(platform: Platform) -> Result<Self, GrabError> {
        Self::for_home(dirs::home_dir(), platform)
    }

    fn for_home(home: Option<PathBuf>, platform: Platform) -> Result<Self, GrabError> {
        let home = home.ok_or(GrabError::HomeUnset)?;
        let strategy = if platform.supports_user_dirs() {
            DirStrategy::ConfigOverride {
                config_file: home.join(".config").join("user-dirs.dirs"),
            }
        } else {
            DirStrategy::HomeDefault
        };
        Ok(Self::new(home, strategy))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Return the directory for `location`, or [`GrabError::NotFound`].
    pub fn resolve(&self, location: Location) -> Result<PathBuf, GrabError> {
        let conventional = self.home.join(location.home_dir_name());
        if conventional.is_dir() {
            log::debug!("Using {} directory {}", location, conventional.display());
            return Ok(conventional);
        }

        if let DirStrategy::ConfigOverride { config_file } = &self.strategy {
            match fs::read_to_string(config_file) {
                Ok(contents) => {
                    if let Some(dir) = parse_user_dir(&contents, location.xdg_key(), &self.home)
                        && dir.is_dir()
                    {
                        log::debug!(
                            "Using {} directory {} from {}",
                            location,
                            dir.display(),
                            config_file.display()
                        );
                        return Ok(dir);
                    }
                }
                Err(e) => {
                    log::debug!("Skipping {}: {}", config_file.display(), e);
                }
            }
        }

        log::debug!("No {} directory found", location);
        Err(GrabError::NotFound)
    }
}

/// Find `XDG_<key>_DIR=...` in `user-dirs.dirs` content and expand it.
pub fn parse_user_dir(contents: &str, key: &str, home: &Path) -> Option<PathBuf> {
    let wanted = format!("XDG_{key}_DIR");

    contents.lines().find_map(|line| {
        let line = line.trim();
        if line.starts_with('#') {
            return None;
        }
        let (name, value) = line.split_once('=')?;
        if name.trim() != wanted {
            return None;
        }
        let value = strip_quotes(value.trim());
        if value.is_empty() {
            return None;
        }
        Some(expand_home(value, home))
    })
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Substitute `${HOME}` / `$HOME`, expand a leading `~`, and anchor relative
/// values at `home`.
pub fn expand_home(value: &str, home: &Path) -> PathBuf {
    let home_str = home.to_string_lossy();
    let substituted = value
        .replace("${HOME}", &home_str)
        .replace("$HOME", &home_str);

    let expanded = if substituted == "~" {
        home.to_path_buf()
    } else if let Some(stripped) = substituted.strip_prefix("~/") {
        home.join(stripped)
    } else {
        PathBuf::from(substituted)
    };

    if expanded.is_absolute() {
        expanded
    } else {
        home.join(expanded)
    }
}
