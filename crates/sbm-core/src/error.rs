//! Error taxonomy for build, deploy and registry operations.
//!
//! Fatal conditions surface as `Err(SbmError)`. Per-target and per-entry
//! problems are carried inside reports so that a batch never aborts on a
//! single bad artifact.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sbm operations
pub type SbmResult<T> = Result<T, SbmError>;

#[derive(Error, Debug)]
pub enum SbmError {
    /// The package manifest could not be read
    #[error("cannot read manifest {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest declares no executable targets
    #[error("no executable targets declared in {manifest}")]
    NoExecutableTargets { manifest: PathBuf },

    /// The build tool could not be started
    #[error("failed to spawn build tool '{program}': {source}")]
    BuildSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The build tool exited with a non-zero status (-1 when killed by a signal)
    #[error("build failed with exit code {exit_code}")]
    BuildFailed { exit_code: i32 },

    /// An artifact could not be placed at its destination
    #[error("failed to replace '{target}': {reason}")]
    ReplaceFailed { target: String, reason: String },

    /// The sidecar could not be written after a successful placement
    #[error("failed to write metadata for '{target}' at {path}: {reason}")]
    MetadataWriteFailed {
        target: String,
        path: PathBuf,
        reason: String,
    },

    /// A registry entry could not be inspected
    #[error("cannot read registry entry {entry}: {reason}")]
    RegistryRead { entry: PathBuf, reason: String },

    /// A sidecar exists but holds no usable Key=Value pairs
    #[error("unparsable metadata in {path}: {reason}")]
    MetadataParse { path: PathBuf, reason: String },

    /// A configuration file exists but could not be read
    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for the schema
    #[error("invalid config file {path}:\n{message}")]
    ConfigParse { path: PathBuf, message: String },

    /// The destination root could not be created
    #[error("destination {path} is unavailable: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine home directory")]
    HomeDirUnavailable,
}

impl SbmError {
    /// Whether the error aborts the whole operation rather than a single target.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SbmError::ReplaceFailed { .. }
                | SbmError::MetadataWriteFailed { .. }
                | SbmError::RegistryRead { .. }
                | SbmError::MetadataParse { .. }
        )
    }
}
