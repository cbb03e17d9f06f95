//! Finding recent screenshot files on disk.
//!
//! - [`dirs`] resolves the Desktop / Downloads folder per platform
//! - [`file`] picks the best image inside that folder

pub mod dirs;
pub mod file;

pub use dirs::{DirStrategy, DirectoryResolver};
pub use file::FileLocator;
