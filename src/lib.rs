//! Grab the most relevant recent image from the clipboard or the Desktop /
//! Downloads folder and materialise it at a temp path.
//!
//! The binary wires these modules together; they are exported so integration
//! tests can drive the pipeline with mocked collaborators.

pub mod arbitrate;
pub mod capture;
pub mod config;
pub mod dependencies;
pub mod locate;
pub mod pipeline;
pub mod platform;
pub mod relocate;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use dependencies::GrabDependencies;
pub use pipeline::{GrabRequest, perform_grab};
pub use platform::Platform;
pub use types::{GrabError, GrabOutcome, Location, SourceLabel};
