use super::{Profile, Project, Settings, Timestamps, Workspace};
use crate::error::codes::{
    CONFIG_INVALID_EXISTING, CONFIG_INVALID_JSON, CONFIG_LOAD_ERROR, CONFIG_SAVE_ERROR,
    PROFILE_ALREADY_EXISTS, PROFILE_NOT_FOUND,
};
use crate::error::{Domain, ErrorCode, ErrorKind, PtError, Result};
use crate::names::normalize_name;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

/// Application configuration, the aggregate root of the persisted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_app_version")]
    pub app_version: String,

    #[serde(default = "default_first_time_setup")]
    pub first_time_setup: bool,

    #[serde(default)]
    pub settings: Settings,

    /// Profiles in insertion order
    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_first_time_setup() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_version: default_app_version(),
            first_time_setup: default_first_time_setup(),
            settings: Settings::default(),
            profiles: Vec::new(),
            timestamps: Timestamps::now(),
        }
    }
}

impl Config {
    pub fn touch(&mut self) {
        self.timestamps.touch();
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn profile_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.name == name)
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.is_active)
    }

    /// Add a profile; names are unique across the config.
    pub fn add_profile(&mut self, profile: Profile) -> Result<()> {
        if self.profile(&profile.name).is_some() {
            return Err(PtError::new(PROFILE_ALREADY_EXISTS).context("name", profile.name));
        }
        self.profiles.push(profile);
        self.touch();
        Ok(())
    }

    /// Remove a profile by name. If it was active, the first remaining
    /// profile becomes active.
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        let index = self.profiles.iter().position(|p| p.name == name)?;
        let removed = self.profiles.remove(index);

        if self.active_profile().is_none() {
            if let Some(first) = self.profiles.first_mut() {
                first.set_active(true);
            }
        }

        self.touch();
        Some(removed)
    }

    /// Make `name` the only active profile
    pub fn set_active_profile(&mut self, name: &str) -> Result<()> {
        if self.profile(name).is_none() {
            return Err(PtError::new(PROFILE_NOT_FOUND).context("name", name));
        }

        for profile in self.profiles.iter_mut() {
            profile.set_active(profile.name == name);
        }
        self.touch();
        Ok(())
    }

    /// Add a workspace to the named profile
    pub fn add_workspace(&mut self, profile_name: &str, workspace: Workspace) -> Result<()> {
        self.profile_entry(profile_name)?.add_workspace(workspace)?;
        self.touch();
        Ok(())
    }

    pub fn remove_workspace(&mut self, profile_name: &str, workspace_name: &str) -> Result<Workspace> {
        let removed = self
            .profile_entry(profile_name)?
            .remove_workspace(workspace_name)?;
        self.touch();
        Ok(removed)
    }

    /// Add a project to a workspace of the named profile
    pub fn add_project(
        &mut self,
        profile_name: &str,
        workspace_name: &str,
        project: Project,
    ) -> Result<()> {
        let profile = self.profile_entry(profile_name)?;
        workspace_entry(profile, workspace_name)?.add_project(project)?;
        profile.touch();
        self.touch();
        Ok(())
    }

    pub fn remove_project(
        &mut self,
        profile_name: &str,
        workspace_name: &str,
        project_name: &str,
    ) -> Result<Project> {
        let profile = self.profile_entry(profile_name)?;
        let removed = workspace_entry(profile, workspace_name)?.remove_project(project_name)?;
        profile.touch();
        self.touch();
        Ok(removed)
    }

    /// Apply `f` to a project; on success the owning workspace, profile and
    /// config are marked modified.
    pub fn update_project<R>(
        &mut self,
        profile_name: &str,
        workspace_name: &str,
        project_name: &str,
        f: impl FnOnce(&mut Project) -> Result<R>,
    ) -> Result<R> {
        let profile = self.profile_entry(profile_name)?;
        let workspace = workspace_entry(profile, workspace_name)?;
        let project = workspace.project_mut(project_name).ok_or_else(|| {
            PtError::new(crate::error::codes::PROJECT_NOT_FOUND).context("name", project_name)
        })?;

        let result = f(project)?;
        project.touch();
        workspace.touch();
        profile.touch();
        self.touch();
        Ok(result)
    }

    pub fn set_default_projects_path(&mut self, path: impl Into<String>) -> Result<()> {
        self.settings.set_default_projects_path(path)?;
        self.touch();
        Ok(())
    }

    pub fn complete_first_time_setup(&mut self) {
        self.first_time_setup = false;
        self.touch();
    }

    /// Check every invariant of the tree
    pub fn validate(&self) -> Result<()> {
        if self.app_version.trim().is_empty() {
            return Err(
                PtError::new(ErrorCode::new(Domain::Config, ErrorKind::EmptyRequiredField))
                    .context("field", "appVersion"),
            );
        }

        self.settings.validate()?;

        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            let key = normalize_name(&profile.name).value;
            if self.profiles[..i]
                .iter()
                .any(|p| normalize_name(&p.name).value == key)
            {
                return Err(
                    PtError::new(PROFILE_ALREADY_EXISTS).context("name", profile.name.clone())
                );
            }
        }

        let active = self.profiles.iter().filter(|p| p.is_active).count();
        let expected = self.profiles.len().min(1);
        if active != expected {
            return Err(PtError::with_message(
                ErrorCode::new(Domain::Profile, ErrorKind::ValidationFailed),
                format!(
                    "Expected {} active profile(s) for {} profile(s), found {}",
                    expected,
                    self.profiles.len(),
                    active
                ),
            ));
        }

        Ok(())
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PtError::new(CONFIG_SAVE_ERROR).caused_by(e))
    }

    /// Parse and validate a persisted configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json).map_err(|e| {
            let code = match e.classify() {
                Category::Syntax | Category::Eof => CONFIG_INVALID_JSON,
                Category::Data => CONFIG_INVALID_EXISTING,
                Category::Io => CONFIG_LOAD_ERROR,
            };
            PtError::new(code).caused_by(e)
        })?;

        config
            .validate()
            .map_err(|e| PtError::new(CONFIG_INVALID_EXISTING).caused_by(e))?;

        Ok(config)
    }

    fn profile_entry(&mut self, name: &str) -> Result<&mut Profile> {
        self.profile_mut(name)
            .ok_or_else(|| PtError::new(PROFILE_NOT_FOUND).context("name", name))
    }
}

fn workspace_entry<'a>(profile: &'a mut Profile, name: &str) -> Result<&'a mut Workspace> {
    profile.workspace_mut(name).ok_or_else(|| {
        PtError::new(crate::error::codes::WORKSPACE_NOT_FOUND).context("name", name)
    })
}
