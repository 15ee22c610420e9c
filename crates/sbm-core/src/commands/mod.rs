//! High-level commands for sbm operations.
//!
//! This module provides the public API for building, deploying, listing and
//! removing binaries. Commands are designed to be called by frontends; they
//! take an [`SbmContext`](crate::context::SbmContext) and return reports.

pub mod bins;
pub mod build;
pub mod clean;
pub mod remove;
pub mod setup;

pub use bins::{BinsCommand, BinsOptions};
pub use build::{BuildCommand, BuildInvocation, BuildOptions, BuildReport, run_invocation};
pub use clean::{CleanCommand, CleanOptions, CleanReport};
pub use remove::{RemoveCommand, RemoveOptions, RemoveReport};
pub use setup::{SetupCommand, SetupOptions, SetupReport};
