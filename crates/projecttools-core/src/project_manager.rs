//! Project operations.
//!
//! Projects live inside a workspace of a profile. Most operations take a
//! [`ProjectScope`]; when the workspace is omitted the project name must be
//! unique across the profile's workspaces.

use crate::error::codes::{
    PROJECT_ALREADY_EXISTS, PROJECT_AMBIGUOUS, PROJECT_EMPTY_NAME, PROJECT_EMPTY_PATH,
    PROJECT_INVALID_PATH, PROJECT_NOT_FOUND, PROFILE_NOT_FOUND, WORKSPACE_EMPTY_NAME,
    WORKSPACE_NOT_FOUND,
};
use crate::error::{PtError, Result};
use crate::model::{Config, Project, ProjectStatus};
use crate::names::{is_blank, normalize_name};
use crate::paths::{ensure_dir, resolve_path};
use crate::profile_manager::resolve_profile;
use crate::store::ConfigStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Options for [`ProjectManager::add_project`]
#[derive(Debug, Clone, Default)]
pub struct AddProjectOptions {
    /// Owning workspace (required)
    pub workspace: String,

    /// Project directory; `<workspace path>/<name>` when absent
    pub path: Option<String>,

    /// Target profile; the active profile when absent
    pub profile: Option<String>,

    pub description: Option<String>,

    /// Free-form project type
    pub kind: Option<String>,

    pub tags: Vec<String>,
}

/// Where to look for an existing project
#[derive(Debug, Clone, Default)]
pub struct ProjectScope {
    pub profile: Option<String>,
    pub workspace: Option<String>,
}

/// Filters for [`ProjectManager::list_projects`]
#[derive(Debug, Clone, Default)]
pub struct ListProjectsOptions {
    pub profile: Option<String>,
    pub workspace: Option<String>,
    pub tag: Option<String>,

    /// Every profile instead of just the active (or named) one
    pub all: bool,
}

/// A project together with its location in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectListing {
    pub profile: String,
    pub workspace: String,
    pub project: Project,
}

/// Result of [`ProjectManager::add_project`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProjectOutcome {
    pub name: String,
    pub profile: String,
    pub workspace: String,
    pub path: PathBuf,
    pub normalized_from: Option<String>,
}

/// Manages projects inside workspaces
pub struct ProjectManager {
    store: Arc<ConfigStore>,
}

impl ProjectManager {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Register a project in a workspace and make sure its directory exists.
    pub async fn add_project(
        &self,
        name: &str,
        options: AddProjectOptions,
    ) -> Result<AddProjectOutcome> {
        if is_blank(name) {
            return Err(PtError::new(PROJECT_EMPTY_NAME));
        }
        if is_blank(&options.workspace) {
            return Err(PtError::new(WORKSPACE_EMPTY_NAME));
        }
        if options.path.as_deref().is_some_and(is_blank) {
            return Err(PtError::new(PROJECT_EMPTY_PATH).context("field", "Project path"));
        }

        let normalized = normalize_name(name);
        if normalized.changed {
            tracing::info!(input = %name, name = %normalized.value, "Project name normalized");
        }
        let workspace_name = normalize_name(&options.workspace).value;

        let mut config = self.store.load_config(false).await?;
        let profile = resolve_profile(&config, options.profile.as_deref())?;

        let workspace = config
            .profile(&profile)
            .and_then(|p| p.workspace(&workspace_name))
            .ok_or_else(|| {
                PtError::new(WORKSPACE_NOT_FOUND)
                    .context("name", workspace_name.clone())
                    .context("profile", profile.clone())
            })?;

        if workspace.project(&normalized.value).is_some() {
            return Err(PtError::new(PROJECT_ALREADY_EXISTS)
                .context("name", normalized.value)
                .context("workspace", workspace_name));
        }

        let path = match options.path.as_deref() {
            Some(explicit) => resolve_path(explicit),
            None => resolve_path(&workspace.path).join(&normalized.value),
        };

        let mut project = Project::new(normalized.value.clone(), path.to_string_lossy());
        if let Some(description) = options.description {
            project.description = description.trim().to_string();
        }
        if let Some(kind) = options.kind.filter(|k| !is_blank(k)) {
            project.kind = kind.trim().to_lowercase();
        }
        for tag in &options.tags {
            project.add_tag(tag)?;
        }
        project.validate()?;

        // Nothing touches the filesystem until the entry is known to be valid
        ensure_dir(&path).await.map_err(|e| {
            PtError::new(PROJECT_INVALID_PATH)
                .context("field", "project path")
                .context("path", path.display().to_string())
                .caused_by(e)
        })?;

        config.add_project(&profile, &workspace_name, project)?;
        self.store.save_config(&config).await?;

        tracing::info!(
            project = %normalized.value,
            workspace = %workspace_name,
            profile = %profile,
            "Project added"
        );

        Ok(AddProjectOutcome {
            name: normalized.value,
            profile,
            workspace: workspace_name,
            path,
            normalized_from: normalized.changed.then(|| name.trim().to_string()),
        })
    }

    /// Projects matching the filters, in tree order.
    pub async fn list_projects(&self, options: ListProjectsOptions) -> Result<Vec<ProjectListing>> {
        let config = self.store.load_config(false).await?;

        let profiles: Vec<String> = if options.all {
            config.profiles.iter().map(|p| p.name.clone()).collect()
        } else if options.profile.is_some() {
            vec![resolve_profile(&config, options.profile.as_deref())?]
        } else {
            config.active_profile().map(|p| p.name.clone()).into_iter().collect()
        };

        let workspace_filter = options.workspace.as_deref().map(|w| normalize_name(w).value);
        let tag_filter = options.tag.as_deref().map(str::trim);

        // A named workspace must exist when listing a single profile
        if let (Some(workspace), Some(profile)) = (workspace_filter.as_deref(), profiles.first()) {
            let known = config
                .profile(profile)
                .is_some_and(|p| p.workspace(workspace).is_some());
            if !options.all && !known {
                return Err(PtError::new(WORKSPACE_NOT_FOUND)
                    .context("name", workspace)
                    .context("profile", profile.as_str()));
            }
        }

        let mut listings = Vec::new();
        for profile in config.profiles.iter().filter(|p| profiles.contains(&p.name)) {
            for workspace in &profile.workspaces {
                if workspace_filter.as_deref().is_some_and(|w| w != workspace.name) {
                    continue;
                }
                for project in &workspace.projects {
                    if tag_filter.is_some_and(|t| !project.has_tag(t)) {
                        continue;
                    }
                    listings.push(ProjectListing {
                        profile: profile.name.clone(),
                        workspace: workspace.name.clone(),
                        project: project.clone(),
                    });
                }
            }
        }

        Ok(listings)
    }

    /// Unregister a project. Its directory is left untouched.
    pub async fn remove_project(&self, name: &str, scope: ProjectScope) -> Result<ProjectListing> {
        let mut config = self.store.load_config(false).await?;
        let (profile, workspace, name) = locate(&config, name, &scope)?;

        let project = config.remove_project(&profile, &workspace, &name)?;
        self.store.save_config(&config).await?;

        tracing::info!(project = %name, workspace = %workspace, profile = %profile, "Project removed");

        Ok(ProjectListing {
            profile,
            workspace,
            project,
        })
    }

    /// Add a tag. Returns false when the project already had it.
    pub async fn tag_project(&self, name: &str, tag: &str, scope: ProjectScope) -> Result<bool> {
        let mut config = self.store.load_config(false).await?;
        let (profile, workspace, name) = locate(&config, name, &scope)?;

        let added = config.update_project(&profile, &workspace, &name, |p| p.add_tag(tag))?;
        if added {
            self.store.save_config(&config).await?;
            tracing::info!(project = %name, tag = %tag.trim(), "Tag added");
        }
        Ok(added)
    }

    /// Remove a tag. Returns false when the project did not have it.
    pub async fn untag_project(&self, name: &str, tag: &str, scope: ProjectScope) -> Result<bool> {
        let mut config = self.store.load_config(false).await?;
        let (profile, workspace, name) = locate(&config, name, &scope)?;

        let removed = config.update_project(&profile, &workspace, &name, |p| Ok(p.remove_tag(tag)))?;
        if removed {
            self.store.save_config(&config).await?;
            tracing::info!(project = %name, tag = %tag.trim(), "Tag removed");
        }
        Ok(removed)
    }

    /// Move a project to another lifecycle state and return the updated entry.
    pub async fn set_project_status(
        &self,
        name: &str,
        status: ProjectStatus,
        scope: ProjectScope,
    ) -> Result<Project> {
        let mut config = self.store.load_config(false).await?;
        let (profile, workspace, name) = locate(&config, name, &scope)?;

        let project = config.update_project(&profile, &workspace, &name, |p| {
            p.set_status(status);
            Ok(p.clone())
        })?;
        self.store.save_config(&config).await?;

        tracing::info!(project = %name, status = %status, "Project status changed");
        Ok(project)
    }
}

/// Find `(profile, workspace, project)` names for an existing project.
fn locate(config: &Config, name: &str, scope: &ProjectScope) -> Result<(String, String, String)> {
    if is_blank(name) {
        return Err(PtError::new(PROJECT_EMPTY_NAME));
    }
    let name = normalize_name(name).value;
    let profile_name = resolve_profile(config, scope.profile.as_deref())?;
    let profile = config
        .profile(&profile_name)
        .ok_or_else(|| PtError::new(PROFILE_NOT_FOUND).context("name", profile_name.clone()))?;

    let not_found = || {
        PtError::new(PROJECT_NOT_FOUND)
            .context("name", name.clone())
            .context("profile", profile_name.clone())
    };

    match scope.workspace.as_deref() {
        Some(raw) => {
            if is_blank(raw) {
                return Err(PtError::new(WORKSPACE_EMPTY_NAME));
            }
            let workspace_name = normalize_name(raw).value;
            let workspace = profile.workspace(&workspace_name).ok_or_else(|| {
                PtError::new(WORKSPACE_NOT_FOUND)
                    .context("name", workspace_name.clone())
                    .context("profile", profile_name.clone())
            })?;
            if workspace.project(&name).is_none() {
                return Err(not_found());
            }
            Ok((profile_name.clone(), workspace_name, name.clone()))
        }
        None => {
            let matches: Vec<&str> = profile
                .workspaces
                .iter()
                .filter(|w| w.project(&name).is_some())
                .map(|w| w.name.as_str())
                .collect();

            match matches.as_slice() {
                [] => Err(not_found()),
                [workspace] => Ok((profile_name.clone(), workspace.to_string(), name.clone())),
                several => Err(PtError::with_message(
                    PROJECT_AMBIGUOUS,
                    format!(
                        "Project '{}' exists in several workspaces ({}); specify one with --workspace",
                        name,
                        several.join(", ")
                    ),
                )
                .context("name", name.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_manager::ProfileManager;
    use crate::workspace_manager::{AddWorkspaceOptions, WorkspaceManager};
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _temp_dir: TempDir,
        root: PathBuf,
        store: Arc<ConfigStore>,
        projects: ProjectManager,
    }

    /// Config with profile `work` (active) holding workspaces `api` and `web`,
    /// and profile `home` holding `garden`.
    async fn fixture() -> Fixture {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("dev");
        let store = Arc::new(ConfigStore::in_dir(temp_dir.path().join("app")));
        store.init_config().await.unwrap();

        let mut config = store.load_config(false).await.unwrap();
        config
            .set_default_projects_path(root.to_string_lossy())
            .unwrap();
        store.save_config(&config).await.unwrap();

        let profiles = ProfileManager::new(store.clone());
        profiles.add_profile("work").await.unwrap();
        profiles.add_profile("home").await.unwrap();

        let workspaces = WorkspaceManager::new(store.clone());
        for (name, profile) in [("api", None), ("web", None), ("garden", Some("home"))] {
            workspaces
                .add_workspace(
                    name,
                    AddWorkspaceOptions {
                        path: None,
                        profile: profile.map(str::to_string),
                    },
                )
                .await
                .unwrap();
        }

        Fixture {
            _temp_dir: temp_dir,
            root,
            projects: ProjectManager::new(store.clone()),
            store,
        }
    }

    fn in_workspace(workspace: &str) -> AddProjectOptions {
        AddProjectOptions {
            workspace: workspace.to_string(),
            ..Default::default()
        }
    }

    fn scope(workspace: Option<&str>) -> ProjectScope {
        ProjectScope {
            profile: None,
            workspace: workspace.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_project_defaults() {
        let f = fixture().await;

        let outcome = f
            .projects
            .add_project("Gateway Service", in_workspace("api"))
            .await
            .unwrap();

        assert_eq!(outcome.name, "gateway-service");
        assert_eq!(outcome.normalized_from.as_deref(), Some("Gateway Service"));
        assert_eq!(outcome.workspace, "api");
        assert_eq!(
            outcome.path,
            f.root.join("work").join("api").join("gateway-service")
        );
        assert!(outcome.path.is_dir());

        let config = f.store.load_config(true).await.unwrap();
        let workspace = config.profile("work").unwrap().workspace("api").unwrap();
        let project = workspace.project("gateway-service").unwrap();
        assert_eq!(project.workspace_id.as_deref(), Some(workspace.id.as_str()));
        assert_eq!(project.kind, "general");
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn test_add_project_with_details() {
        let f = fixture().await;
        let custom = f.root.join("checkout");

        f.projects
            .add_project(
                "cli",
                AddProjectOptions {
                    workspace: "web".to_string(),
                    path: Some(custom.to_string_lossy().into_owned()),
                    profile: None,
                    description: Some(" Command line ".to_string()),
                    kind: Some("Rust".to_string()),
                    tags: vec!["tools".to_string(), "tools".to_string()],
                },
            )
            .await
            .unwrap();

        let listed = f
            .projects
            .list_projects(ListProjectsOptions::default())
            .await
            .unwrap();
        let project = &listed[0].project;
        assert_eq!(project.path, custom.to_string_lossy());
        assert_eq!(project.description, "Command line");
        assert_eq!(project.kind, "rust");
        assert_eq!(project.tags, vec!["tools"]);
        assert!(custom.is_dir());
    }

    #[tokio::test]
    async fn test_add_project_validation() {
        let f = fixture().await;

        let err = f.projects.add_project("", in_workspace("api")).await.unwrap_err();
        assert!(err.is(PROJECT_EMPTY_NAME));

        let err = f.projects.add_project("cli", in_workspace(" ")).await.unwrap_err();
        assert!(err.is(WORKSPACE_EMPTY_NAME));

        let err = f
            .projects
            .add_project(
                "cli",
                AddProjectOptions {
                    path: Some(String::new()),
                    ..in_workspace("api")
                },
            )
            .await
            .unwrap_err();
        assert!(err.is(PROJECT_EMPTY_PATH));
        assert_eq!(err.to_string(), "Project path cannot be empty");

        // `garden` belongs to another profile
        let err = f
            .projects
            .add_project("cli", in_workspace("garden"))
            .await
            .unwrap_err();
        assert!(err.is(WORKSPACE_NOT_FOUND));

        f.projects.add_project("cli", in_workspace("api")).await.unwrap();
        let err = f
            .projects
            .add_project("CLI", in_workspace("api"))
            .await
            .unwrap_err();
        assert!(err.is(PROJECT_ALREADY_EXISTS));

        // Same name in a sibling workspace is fine
        f.projects.add_project("cli", in_workspace("web")).await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_tag_leaves_no_directory() {
        let f = fixture().await;
        let expected = f.root.join("work").join("api").join("gw");

        let err = f
            .projects
            .add_project(
                "gw",
                AddProjectOptions {
                    tags: vec!["rust".to_string(), "  ".to_string()],
                    ..in_workspace("api")
                },
            )
            .await
            .unwrap_err();

        assert!(err.is(PROJECT_EMPTY_NAME));
        assert_eq!(err.to_string(), "Tag cannot be empty");
        assert!(!expected.exists());

        let listed = f
            .projects
            .list_projects(ListProjectsOptions::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_add_to_explicit_profile() {
        let f = fixture().await;

        let outcome = f
            .projects
            .add_project(
                "beds",
                AddProjectOptions {
                    profile: Some("home".to_string()),
                    ..in_workspace("garden")
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.profile, "home");

        let err = f
            .projects
            .add_project(
                "beds",
                AddProjectOptions {
                    profile: Some("ghost".to_string()),
                    ..in_workspace("garden")
                },
            )
            .await
            .unwrap_err();
        assert!(err.is(PROFILE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let f = fixture().await;
        f.projects
            .add_project(
                "gateway",
                AddProjectOptions {
                    tags: vec!["rust".to_string()],
                    ..in_workspace("api")
                },
            )
            .await
            .unwrap();
        f.projects.add_project("site", in_workspace("web")).await.unwrap();
        f.projects
            .add_project(
                "beds",
                AddProjectOptions {
                    profile: Some("home".to_string()),
                    tags: vec!["rust".to_string()],
                    ..in_workspace("garden")
                },
            )
            .await
            .unwrap();

        let names = |listings: Vec<ProjectListing>| -> Vec<String> {
            listings.into_iter().map(|l| l.project.name).collect()
        };

        let active = f
            .projects
            .list_projects(ListProjectsOptions::default())
            .await
            .unwrap();
        assert_eq!(names(active), vec!["gateway", "site"]);

        let by_workspace = f
            .projects
            .list_projects(ListProjectsOptions {
                workspace: Some("web".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(by_workspace), vec!["site"]);

        let tagged_everywhere = f
            .projects
            .list_projects(ListProjectsOptions {
                tag: Some("rust".to_string()),
                all: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(tagged_everywhere), vec!["gateway", "beds"]);

        let err = f
            .projects
            .list_projects(ListProjectsOptions {
                workspace: Some("nope".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is(WORKSPACE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_remove_project() {
        let f = fixture().await;
        let outcome = f.projects.add_project("cli", in_workspace("api")).await.unwrap();

        let removed = f.projects.remove_project("cli", scope(None)).await.unwrap();
        assert_eq!(removed.workspace, "api");
        assert_eq!(removed.project.name, "cli");
        assert!(outcome.path.is_dir());

        let err = f
            .projects
            .remove_project("cli", scope(None))
            .await
            .unwrap_err();
        assert!(err.is(PROJECT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_ambiguous_name_needs_workspace() {
        let f = fixture().await;
        f.projects.add_project("cli", in_workspace("api")).await.unwrap();
        f.projects.add_project("cli", in_workspace("web")).await.unwrap();

        let err = f
            .projects
            .remove_project("cli", scope(None))
            .await
            .unwrap_err();
        assert!(err.is(PROJECT_AMBIGUOUS));
        assert!(err.to_string().contains("api, web"));

        let removed = f
            .projects
            .remove_project("cli", scope(Some("web")))
            .await
            .unwrap();
        assert_eq!(removed.workspace, "web");

        // Now unique again
        f.projects.remove_project("cli", scope(None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_tags() {
        let f = fixture().await;
        f.projects.add_project("cli", in_workspace("api")).await.unwrap();

        assert!(f.projects.tag_project("cli", "rust", scope(None)).await.unwrap());
        assert!(!f.projects.tag_project("cli", "rust", scope(None)).await.unwrap());

        let err = f
            .projects
            .tag_project("cli", " ", scope(None))
            .await
            .unwrap_err();
        assert!(err.is(PROJECT_EMPTY_NAME));

        let config = f.store.load_config(true).await.unwrap();
        let project = config
            .profile("work")
            .and_then(|p| p.workspace("api"))
            .and_then(|w| w.project("cli"))
            .unwrap();
        assert_eq!(project.tags, vec!["rust"]);

        assert!(f.projects.untag_project("cli", "rust", scope(None)).await.unwrap());
        assert!(!f.projects.untag_project("cli", "rust", scope(None)).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_status() {
        let f = fixture().await;
        f.projects.add_project("cli", in_workspace("api")).await.unwrap();

        let project = f
            .projects
            .set_project_status("cli", ProjectStatus::Archived, scope(Some("api")))
            .await
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Archived);

        let project = f
            .projects
            .set_project_status("cli", ProjectStatus::Active, scope(None))
            .await
            .unwrap();
        assert!(project.metadata.last_accessed.is_some());

        let err = f
            .projects
            .set_project_status("cli", ProjectStatus::Paused, scope(Some("missing")))
            .await
            .unwrap_err();
        assert!(err.is(WORKSPACE_NOT_FOUND));
    }
}
