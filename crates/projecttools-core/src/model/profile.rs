use super::{Timestamps, Workspace};
use crate::error::codes::{
    PROFILE_EMPTY_NAME, PROFILE_INVALID_FORMAT, WORKSPACE_ALREADY_EXISTS, WORKSPACE_NOT_FOUND,
};
use crate::error::{PtError, Result};
use crate::names::{generate_id, is_normalized, normalize_name};
use serde::{Deserialize, Serialize};

/// A named top-level user context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default = "new_profile_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub workspaces: Vec<Workspace>,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

fn new_profile_id() -> String {
    generate_id("prof")
}

impl Profile {
    pub fn new(name: impl Into<String>, is_active: bool) -> Self {
        Self {
            id: new_profile_id(),
            name: name.into(),
            is_active,
            workspaces: Vec::new(),
            timestamps: Timestamps::now(),
        }
    }

    pub fn touch(&mut self) {
        self.timestamps.touch();
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        if self.is_active != active {
            self.is_active = active;
            self.touch();
        }
    }

    pub fn workspace(&self, name: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|ws| ws.name == name)
    }

    pub fn workspace_mut(&mut self, name: &str) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|ws| ws.name == name)
    }

    /// Add a workspace; names are unique within a profile.
    pub fn add_workspace(&mut self, workspace: Workspace) -> Result<()> {
        if self.workspace(&workspace.name).is_some() {
            return Err(PtError::new(WORKSPACE_ALREADY_EXISTS)
                .context("name", workspace.name)
                .context("profile", self.name.clone()));
        }
        self.workspaces.push(workspace);
        self.touch();
        Ok(())
    }

    pub fn remove_workspace(&mut self, name: &str) -> Result<Workspace> {
        let index = self
            .workspaces
            .iter()
            .position(|ws| ws.name == name)
            .ok_or_else(|| PtError::new(WORKSPACE_NOT_FOUND).context("name", name))?;
        let workspace = self.workspaces.remove(index);
        self.touch();
        Ok(workspace)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PtError::new(PROFILE_EMPTY_NAME).context("field", "Profile ID"));
        }
        if self.name.trim().is_empty() {
            return Err(PtError::new(PROFILE_EMPTY_NAME));
        }
        if !is_normalized(&self.name) {
            return Err(PtError::new(PROFILE_INVALID_FORMAT).context("name", self.name.clone()));
        }

        for (i, workspace) in self.workspaces.iter().enumerate() {
            workspace.validate()?;
            let key = normalize_name(&workspace.name).value;
            if self.workspaces[..i]
                .iter()
                .any(|ws| normalize_name(&ws.name).value == key)
            {
                return Err(PtError::new(WORKSPACE_ALREADY_EXISTS)
                    .context("name", workspace.name.clone())
                    .context("profile", self.name.clone()));
            }
        }
        Ok(())
    }
}
