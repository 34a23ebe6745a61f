//! Application-level configuration operations: setup, settings and recovery.

use crate::error::{Domain, ErrorKind, PtError, Result};
use crate::paths::{ensure_dir, resolve_path};
use crate::store::{ConfigStore, InitStatus, RestoreStatus};
use std::path::PathBuf;
use std::sync::Arc;

/// Overview of the current configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    pub config_path: PathBuf,
    pub backup_path: PathBuf,
    pub app_version: String,
    pub first_time_setup: bool,
    pub default_projects_path: String,
    pub active_profile: Option<String>,
    pub profiles: usize,
    pub workspaces: usize,
    pub projects: usize,
}

/// Manages the config file itself and global settings
pub struct ConfigManager {
    store: Arc<ConfigStore>,
}

impl ConfigManager {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Create the config if needed. A freshly created config also gets its
    /// default projects directory.
    pub async fn init(&self) -> Result<InitStatus> {
        let status = self.store.init_config().await?;

        if status == InitStatus::Created {
            let config = self.store.load_config(false).await?;
            let projects_dir = resolve_path(&config.settings.default_projects_path);
            if let Err(e) = ensure_dir(&projects_dir).await {
                tracing::warn!(path = ?projects_dir, error = %e, "Could not create default projects directory");
            }
        }

        Ok(status)
    }

    pub async fn show(&self) -> Result<ConfigSummary> {
        let config = self.store.load_config(false).await?;

        let workspaces = config.profiles.iter().map(|p| p.workspaces.len()).sum();
        let projects = config
            .profiles
            .iter()
            .flat_map(|p| &p.workspaces)
            .map(|w| w.projects.len())
            .sum();

        Ok(ConfigSummary {
            config_path: self.store.config_path(),
            backup_path: self.store.backup_path(),
            active_profile: config.active_profile().map(|p| p.name.clone()),
            profiles: config.profiles.len(),
            workspaces,
            projects,
            app_version: config.app_version,
            first_time_setup: config.first_time_setup,
            default_projects_path: config.settings.default_projects_path,
        })
    }

    pub async fn default_projects_path(&self) -> Result<String> {
        let config = self.store.load_config(false).await?;
        Ok(config.settings.default_projects_path)
    }

    /// Resolve, create and persist a new default projects path.
    pub async fn set_default_projects_path(&self, path: &str) -> Result<PathBuf> {
        let mut config = self.store.load_config(false).await?;
        // Rejects blank input before anything touches the filesystem
        config.set_default_projects_path(path)?;

        let resolved = resolve_path(path);
        ensure_dir(&resolved).await.map_err(|e| {
            PtError::from_io(Domain::Config, ErrorKind::WriteError, e)
                .context("resource", "default projects directory")
        })?;

        config.set_default_projects_path(resolved.to_string_lossy())?;
        self.store.save_config(&config).await?;

        tracing::info!(path = ?resolved, "Default projects path updated");
        Ok(resolved)
    }

    pub async fn complete_first_time_setup(&self) -> Result<()> {
        let mut config = self.store.load_config(false).await?;
        if !config.first_time_setup {
            return Ok(());
        }
        config.complete_first_time_setup();
        self.store.save_config(&config).await
    }

    pub async fn restore(&self) -> Result<RestoreStatus> {
        self.store.restore_from_backup().await
    }

    pub fn config_path(&self) -> PathBuf {
        self.store.config_path()
    }

    pub fn backup_path(&self) -> PathBuf {
        self.store.backup_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes::CONFIG_NOT_FOUND;
    use crate::profile_manager::ProfileManager;
    use tempfile::tempdir;

    fn manager(dir: &std::path::Path) -> (Arc<ConfigStore>, ConfigManager) {
        let store = Arc::new(ConfigStore::in_dir(dir));
        (store.clone(), ConfigManager::new(store))
    }

    #[tokio::test]
    async fn test_init_then_existing() {
        let temp_dir = tempdir().unwrap();
        let (_, manager) = manager(temp_dir.path());

        assert_eq!(manager.init().await.unwrap(), InitStatus::Created);
        assert_eq!(manager.init().await.unwrap(), InitStatus::Existing);
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn test_show_counts() {
        let temp_dir = tempdir().unwrap();
        let (store, manager) = manager(temp_dir.path());
        store.init_config().await.unwrap();

        let profiles = ProfileManager::new(store.clone());
        profiles.add_profile("work").await.unwrap();
        profiles.add_profile("home").await.unwrap();

        let summary = manager.show().await.unwrap();
        assert_eq!(summary.active_profile.as_deref(), Some("work"));
        assert_eq!(summary.profiles, 2);
        assert_eq!(summary.workspaces, 0);
        assert_eq!(summary.projects, 0);
        assert!(summary.first_time_setup);
        assert_eq!(summary.config_path, temp_dir.path().join("config.json"));
    }

    #[tokio::test]
    async fn test_set_default_projects_path() {
        let temp_dir = tempdir().unwrap();
        let (store, manager) = manager(temp_dir.path());
        store.init_config().await.unwrap();
        let target = temp_dir.path().join("code").join("src");

        let resolved = manager
            .set_default_projects_path(&target.to_string_lossy())
            .await
            .unwrap();

        assert_eq!(resolved, target);
        assert!(target.is_dir());
        assert_eq!(
            manager.default_projects_path().await.unwrap(),
            target.to_string_lossy()
        );

        let err = manager.set_default_projects_path("  ").await.unwrap_err();
        assert_eq!(err.to_string(), "Default projects path cannot be empty");
    }

    #[tokio::test]
    async fn test_complete_first_time_setup() {
        let temp_dir = tempdir().unwrap();
        let (store, manager) = manager(temp_dir.path());
        store.init_config().await.unwrap();

        manager.complete_first_time_setup().await.unwrap();
        manager.complete_first_time_setup().await.unwrap();

        let config = store.load_config(true).await.unwrap();
        assert!(!config.first_time_setup);
    }

    #[tokio::test]
    async fn test_restore_after_change() {
        let temp_dir = tempdir().unwrap();
        let (store, manager) = manager(temp_dir.path());
        store.init_config().await.unwrap();
        assert_eq!(manager.restore().await.unwrap(), RestoreStatus::NoBackup);

        // Second save backs up the first
        ProfileManager::new(store.clone())
            .add_profile("work")
            .await
            .unwrap();
        assert_eq!(manager.restore().await.unwrap(), RestoreStatus::Restored);

        let config = store.load_config(false).await.unwrap();
        assert!(config.profiles.is_empty());
    }

    #[tokio::test]
    async fn test_show_requires_config() {
        let temp_dir = tempdir().unwrap();
        let (_, manager) = manager(temp_dir.path());

        let err = manager.show().await.unwrap_err();
        assert!(err.is(CONFIG_NOT_FOUND));
    }
}
