//! Runtime platform selection.
//!
//! The platform is inspected once at startup and drives which trash protocol,
//! directory-resolution strategy, and clipboard backend chain are used.

/// Desktop platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS: flat `~/.Trash`, home-relative folders, AppleScript available.
    MacOs,
    /// Everything else: freedesktop trash and `user-dirs.dirs` overrides.
    Freedesktop,
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            _ => Platform::Freedesktop,
        }
    }

    /// Whether `~/.config/user-dirs.dirs` is consulted for folder overrides.
    pub fn supports_user_dirs(self) -> bool {
        matches!(self, Platform::Freedesktop)
    }

    /// Whether the AppleScript clipboard backend belongs in the chain.
    pub fn has_desktop_scripting(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_os_identifiers() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Freedesktop);
        assert_eq!(Platform::from_os("freebsd"), Platform::Freedesktop);
        assert!(Platform::MacOs.has_desktop_scripting());
        assert!(!Platform::MacOs.supports_user_dirs());
    }
}
