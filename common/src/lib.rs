//! Shared models and seams for the reachr workspace.
//!
//! Everything the engine and the command line agree on lives here: the
//! target and outcome models, the [`probing::Probe`] and
//! [`reporting::Reporter`] traits, run configuration and the CSV input loader.

pub mod config;
pub mod error;
pub mod network;
pub mod probing;
pub mod reporting;
pub mod source;

pub use error::ReachError;
