//! Domain entities persisted in the configuration file.
//!
//! The tree is strictly owned: `Config` holds profiles, a profile holds its
//! workspaces, a workspace holds its projects. Mutations go through the owning
//! aggregate so modification timestamps propagate upward.

mod config;
mod profile;
mod project;
mod settings;
mod timestamps;
mod workspace;

pub use config::Config;
pub use profile::Profile;
pub use project::{Project, ProjectMetadata, ProjectStatus};
pub use settings::Settings;
pub use timestamps::Timestamps;
pub use workspace::Workspace;
