//! Workspace operations, scoped to a profile.

use crate::error::codes::{
    WORKSPACE_ALREADY_EXISTS, WORKSPACE_EMPTY_NAME, WORKSPACE_EMPTY_PATH, WORKSPACE_INVALID_PATH,
    WORKSPACE_NOT_FOUND,
};
use crate::error::{PtError, Result};
use crate::model::Workspace;
use crate::names::{is_blank, normalize_name};
use crate::paths::{ensure_dir, resolve_path};
use crate::profile_manager::resolve_profile;
use crate::store::ConfigStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Options for [`WorkspaceManager::add_workspace`]
#[derive(Debug, Clone, Default)]
pub struct AddWorkspaceOptions {
    /// Directory for the workspace; derived from settings when absent
    pub path: Option<String>,

    /// Target profile; the active profile when absent
    pub profile: Option<String>,
}

/// Result of [`WorkspaceManager::add_workspace`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWorkspaceOutcome {
    pub name: String,
    pub profile: String,
    pub path: PathBuf,
    pub normalized_from: Option<String>,
}

/// Workspaces of one profile
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceListing {
    pub profile: String,
    pub is_active: bool,
    pub workspaces: Vec<Workspace>,
}

/// Manages workspaces inside profiles
pub struct WorkspaceManager {
    store: Arc<ConfigStore>,
}

impl WorkspaceManager {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Create a workspace in the target profile and make sure its directory
    /// exists.
    pub async fn add_workspace(
        &self,
        name: &str,
        options: AddWorkspaceOptions,
    ) -> Result<AddWorkspaceOutcome> {
        if is_blank(name) {
            return Err(PtError::new(WORKSPACE_EMPTY_NAME));
        }
        if options.path.as_deref().is_some_and(is_blank) {
            return Err(PtError::new(WORKSPACE_EMPTY_PATH).context("field", "Workspace path"));
        }

        let normalized = normalize_name(name);
        if normalized.changed {
            tracing::info!(input = %name, name = %normalized.value, "Workspace name normalized");
        }

        let mut config = self.store.load_config(false).await?;
        let profile = resolve_profile(&config, options.profile.as_deref())?;

        let exists = config
            .profile(&profile)
            .is_some_and(|p| p.workspace(&normalized.value).is_some());
        if exists {
            return Err(PtError::new(WORKSPACE_ALREADY_EXISTS)
                .context("name", normalized.value)
                .context("profile", profile));
        }

        let path = match options.path.as_deref() {
            Some(explicit) => resolve_path(explicit),
            None => resolve_path(&config.settings.default_projects_path)
                .join(&profile)
                .join(&normalized.value),
        };

        ensure_dir(&path).await.map_err(|e| {
            PtError::new(WORKSPACE_INVALID_PATH)
                .context("field", "workspace path")
                .context("path", path.display().to_string())
                .caused_by(e)
        })?;

        let workspace = Workspace::new(normalized.value.clone(), path.to_string_lossy());
        config.add_workspace(&profile, workspace)?;
        self.store.save_config(&config).await?;

        tracing::info!(workspace = %normalized.value, profile = %profile, path = ?path, "Workspace added");

        Ok(AddWorkspaceOutcome {
            name: normalized.value,
            profile,
            path,
            normalized_from: normalized.changed.then(|| name.trim().to_string()),
        })
    }

    /// Workspaces of the active profile, or of every profile with `all`.
    pub async fn list_workspaces(&self, all: bool) -> Result<Vec<WorkspaceListing>> {
        let config = self.store.load_config(false).await?;

        Ok(config
            .profiles
            .into_iter()
            .filter(|p| all || p.is_active)
            .map(|p| WorkspaceListing {
                profile: p.name,
                is_active: p.is_active,
                workspaces: p.workspaces,
            })
            .collect())
    }

    /// Remove a workspace from the target profile. The directory is kept.
    pub async fn remove_workspace(&self, name: &str, profile: Option<&str>) -> Result<Workspace> {
        if is_blank(name) {
            return Err(PtError::new(WORKSPACE_EMPTY_NAME));
        }
        let name = normalize_name(name).value;

        let mut config = self.store.load_config(false).await?;
        let profile = resolve_profile(&config, profile)?;

        let exists = config
            .profile(&profile)
            .is_some_and(|p| p.workspace(&name).is_some());
        if !exists {
            return Err(PtError::new(WORKSPACE_NOT_FOUND)
                .context("name", name)
                .context("profile", profile));
        }

        let removed = config.remove_workspace(&profile, &name)?;
        self.store.save_config(&config).await?;

        tracing::info!(workspace = %name, profile = %profile, "Workspace removed");
        Ok(removed)
    }
}
