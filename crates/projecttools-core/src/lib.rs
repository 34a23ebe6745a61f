//! ProjectTools Core
//!
//! This crate provides the domain model and persistence for ProjectTools:
//! profiles containing workspaces containing projects, stored in a single
//! JSON configuration file.
//!
//! All managers share one [`ConfigStore`], which owns the file, its backup
//! and the in-process cache.

mod config_manager;
pub mod error;
pub mod model;
pub mod names;
pub mod paths;
mod profile_manager;
mod project_manager;
mod store;
mod workspace_manager;

pub use config_manager::{ConfigManager, ConfigSummary};
pub use error::{codes, Domain, ErrorCode, ErrorKind, PtError, Result};
pub use model::{Config, Profile, Project, ProjectMetadata, ProjectStatus, Settings, Workspace};
pub use paths::AppPaths;
pub use profile_manager::{AddProfileOutcome, ProfileManager, RemoveProfileOutcome};
pub use project_manager::{
    AddProjectOptions, AddProjectOutcome, ListProjectsOptions, ProjectListing, ProjectManager,
    ProjectScope,
};
pub use store::{ConfigStore, InitStatus, RestoreStatus};
pub use workspace_manager::{
    AddWorkspaceOptions, AddWorkspaceOutcome, WorkspaceListing, WorkspaceManager,
};
