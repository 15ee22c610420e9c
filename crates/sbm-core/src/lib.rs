//! sbm Core Library
//!
//! Builds Swift packages and manages the resulting binaries in a destination
//! directory, each paired with a plain-text provenance sidecar.

pub mod build;
pub mod commands;
pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod metadata;
pub mod registry;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{SbmError, SbmResult};

    // Core types
    pub use crate::types::{BuildMode, Target, TargetRole};

    // Build
    pub use crate::build::{BuildExecutor, BuildOutcome, BuildTool, OutputLine, OutputStream};

    // Deploy
    pub use crate::deploy::{
        ArtifactDeployer, DeployReport, DestinationOverrides, RemovalStatus, SelectionPolicy,
    };

    // Registry
    pub use crate::metadata::Metadata;
    pub use crate::registry::{Registry, RegistryEntry, RegistrySnapshot, SidecarState};

    // Context
    pub use crate::context::SbmContext;
}
