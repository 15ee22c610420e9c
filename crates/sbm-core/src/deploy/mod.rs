//! Deploy coordination: target selection, placement and removal.

pub mod executor;
pub mod removal;
pub mod selector;

pub use executor::{ArtifactDeployer, DeployFailure, DeployReport, DeployedArtifact};
pub use removal::{RemovalOutcome, RemovalReport, RemovalStatus, remove_artifacts};
pub use selector::{DestinationOverrides, Selection, SelectionPolicy, split_list};
