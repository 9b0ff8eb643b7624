//! CLI command implementations

pub mod build;
pub mod detect;

pub use build::execute as build;
pub use detect::{execute as detect, DetectOutcome};
