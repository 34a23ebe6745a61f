use super::{Project, Timestamps};
use crate::error::codes::{
    PROJECT_ALREADY_EXISTS, PROJECT_NOT_FOUND, WORKSPACE_EMPTY_NAME, WORKSPACE_EMPTY_PATH,
    WORKSPACE_INVALID_FORMAT,
};
use crate::error::{PtError, Result};
use crate::names::{generate_id, is_normalized, normalize_name};
use serde::{Deserialize, Serialize};

/// A named directory grouping, owned by exactly one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default = "new_workspace_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

fn new_workspace_id() -> String {
    generate_id("ws")
}

impl Workspace {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: new_workspace_id(),
            name: name.into(),
            path: path.into(),
            projects: Vec::new(),
            timestamps: Timestamps::now(),
        }
    }

    pub fn touch(&mut self) {
        self.timestamps.touch();
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn project_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.name == name)
    }

    /// Add a project, linking it back to this workspace by id.
    pub fn add_project(&mut self, mut project: Project) -> Result<()> {
        if self.project(&project.name).is_some() {
            return Err(PtError::new(PROJECT_ALREADY_EXISTS).context("name", project.name));
        }
        project.workspace_id = Some(self.id.clone());
        self.projects.push(project);
        self.touch();
        Ok(())
    }

    pub fn remove_project(&mut self, name: &str) -> Result<Project> {
        let index = self
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| PtError::new(PROJECT_NOT_FOUND).context("name", name))?;
        let project = self.projects.remove(index);
        self.touch();
        Ok(project)
    }

    /// Check whether the workspace directory exists
    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(crate::paths::expand_home(&self.path))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PtError::new(WORKSPACE_EMPTY_NAME).context("field", "Workspace ID"));
        }
        if self.name.trim().is_empty() {
            return Err(PtError::new(WORKSPACE_EMPTY_NAME));
        }
        if !is_normalized(&self.name) {
            return Err(PtError::new(WORKSPACE_INVALID_FORMAT).context("name", self.name.clone()));
        }
        if self.path.trim().is_empty() {
            return Err(PtError::new(WORKSPACE_EMPTY_PATH).context("field", "Workspace path"));
        }

        for (i, project) in self.projects.iter().enumerate() {
            project.validate()?;
            let key = normalize_name(&project.name).value;
            if self.projects[..i]
                .iter()
                .any(|p| normalize_name(&p.name).value == key)
            {
                return Err(PtError::new(PROJECT_ALREADY_EXISTS)
                    .context("name", project.name.clone())
                    .context("workspace", self.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_project_links_back() {
        let mut workspace = Workspace::new("api", "/dev/api");
        workspace.add_project(Project::new("gateway", "/dev/api/gateway")).unwrap();

        let project = workspace.project("gateway").unwrap();
        assert_eq!(project.workspace_id.as_deref(), Some(workspace.id.as_str()));
    }

    #[test]
    fn test_duplicate_project_rejected() {
        let mut workspace = Workspace::new("api", "/dev/api");
        workspace.add_project(Project::new("gateway", "/a")).unwrap();

        let err = workspace.add_project(Project::new("gateway", "/b")).unwrap_err();
        assert!(err.is(PROJECT_ALREADY_EXISTS));
        assert_eq!(workspace.projects.len(), 1);
    }

    #[test]
    fn test_remove_missing_project() {
        let mut workspace = Workspace::new("api", "/dev/api");
        let err = workspace.remove_project("nope").unwrap_err();
        assert!(err.is(PROJECT_NOT_FOUND));
    }

    #[test]
    fn test_validate_empty_path() {
        let workspace = Workspace::new("api", "");
        let err = workspace.validate().unwrap_err();
        assert_eq!(err.to_string(), "Workspace path cannot be empty");
    }

    #[test]
    fn test_validate_rejects_unnormalized_name() {
        let workspace = Workspace::new("My API", "/dev/api");
        let err = workspace.validate().unwrap_err();
        assert!(err.is(WORKSPACE_INVALID_FORMAT));
        assert_eq!(err.context_value("name"), Some("My API"));
    }

    #[tokio::test]
    async fn test_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let present = Workspace::new("a", temp_dir.path().to_string_lossy());
        let missing = Workspace::new("b", temp_dir.path().join("nope").to_string_lossy());

        assert!(present.exists().await);
        assert!(!missing.exists().await);
    }
}
