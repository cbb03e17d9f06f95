//! Clipboard image capture for shotgrab.
//!
//! This module provides:
//! - Executable lookup on an injectable search path
//! - One backend per external clipboard tool (pngpaste, osascript, wl-paste, xclip)
//! - An ordered reader that returns the first non-empty image

pub mod backends;
pub mod clipboard;
pub mod search_path;

pub use clipboard::ClipboardReader;
pub use search_path::SearchPath;
