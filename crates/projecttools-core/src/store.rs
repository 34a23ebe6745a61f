//! Configuration persistence.
//!
//! Reads and writes the [`Config`] aggregate to a single JSON file with an
//! mtime-keyed in-memory cache, a best-effort backup sibling, and atomic
//! temp-file-then-rename writes.

use crate::error::codes::{
    CONFIG_INIT_ERROR, CONFIG_INVALID_CONFIG, CONFIG_INVALID_EXISTING, CONFIG_NOT_FOUND,
    CONFIG_RESTORE_ERROR,
};
use crate::error::{Domain, ErrorKind, PtError, Result};
use crate::model::Config;
use crate::paths::AppPaths;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Outcome of [`ConfigStore::init_config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// A default configuration was written
    Created,
    /// A valid configuration already existed
    Existing,
}

/// Outcome of [`ConfigStore::restore_from_backup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStatus {
    Restored,
    NoBackup,
}

/// Cached config and the moment it was known to match the file
#[derive(Debug)]
struct CacheEntry {
    config: Config,
    timestamp: SystemTime,
}

/// Owns the config file, its backup, and the in-process cache
#[derive(Debug)]
pub struct ConfigStore {
    paths: AppPaths,
    cache: Mutex<Option<CacheEntry>>,
}

impl ConfigStore {
    /// Create a store over the given locations
    pub fn new(paths: AppPaths) -> Self {
        Self {
            paths,
            cache: Mutex::new(None),
        }
    }

    /// Create a store rooted at a specific directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(AppPaths::in_dir(dir))
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        self.paths.config_file()
    }

    pub fn backup_path(&self) -> PathBuf {
        self.paths.backup_file()
    }

    /// Whether a config is currently cached
    pub fn is_cached(&self) -> bool {
        self.cache.lock().is_some()
    }

    /// Load the configuration, serving from cache while the file has not
    /// been modified since the cached copy was taken.
    pub async fn load_config(&self, force_reload: bool) -> Result<Config> {
        let path = self.config_path();

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PtError::new(CONFIG_NOT_FOUND)
                    .context("path", path.display().to_string())
                    .caused_by(e));
            }
            Err(e) => return Err(PtError::from_io(Domain::Config, ErrorKind::ReadError, e)),
        };

        if !force_reload {
            if let Ok(mtime) = metadata.modified() {
                let cache = self.cache.lock();
                if let Some(entry) = cache.as_ref() {
                    if entry.timestamp >= mtime {
                        debug!(path = ?path, "Config served from cache");
                        return Ok(entry.config.clone());
                    }
                }
            }
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::ReadError, e))?;
        let config = Config::from_json(&content)?;

        *self.cache.lock() = Some(CacheEntry {
            config: config.clone(),
            timestamp: SystemTime::now(),
        });

        debug!(path = ?path, profiles = config.profiles.len(), "Config loaded from disk");

        Ok(config)
    }

    /// Persist the configuration atomically, keeping the previous version as
    /// a backup.
    pub async fn save_config(&self, config: &Config) -> Result<()> {
        config
            .validate()
            .map_err(|e| PtError::new(CONFIG_INVALID_CONFIG).caused_by(e))?;

        let path = self.config_path();
        let json = config.to_json()?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::WriteError, e))?;
        }

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let backup = self.backup_path();
            if let Err(e) = tokio::fs::copy(&path, &backup).await {
                warn!(backup = ?backup, error = %e, "Failed to back up config, continuing");
            }
        }

        let temp_path = self.paths.temp_file();
        if let Err(e) = write_private(&temp_path, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(PtError::from_io(Domain::Config, ErrorKind::WriteError, e));
        }

        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::WriteError, e))?;
        restrict_permissions(&path)
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::WriteError, e))?;

        *self.cache.lock() = Some(CacheEntry {
            config: config.clone(),
            timestamp: SystemTime::now(),
        });

        debug!(path = ?path, size = json.len(), "Saved config");

        Ok(())
    }

    /// Write a default configuration if none exists, otherwise check that
    /// the existing one is valid.
    pub async fn init_config(&self) -> Result<InitStatus> {
        let path = self.config_path();

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| PtError::new(CONFIG_INIT_ERROR).caused_by(e))?;

        if !exists {
            self.save_config(&Config::default())
                .await
                .map_err(|e| PtError::new(CONFIG_INIT_ERROR).caused_by(e))?;
            info!(path = ?path, "Created default configuration");
            return Ok(InitStatus::Created);
        }

        self.load_config(true)
            .await
            .map_err(|e| PtError::new(CONFIG_INVALID_EXISTING).caused_by(e))?;

        Ok(InitStatus::Existing)
    }

    /// Replace the live config with the validated backup.
    pub async fn restore_from_backup(&self) -> Result<RestoreStatus> {
        let backup = self.backup_path();

        let exists = tokio::fs::try_exists(&backup)
            .await
            .map_err(|e| PtError::new(CONFIG_RESTORE_ERROR).caused_by(e))?;
        if !exists {
            debug!(backup = ?backup, "No backup to restore");
            return Ok(RestoreStatus::NoBackup);
        }

        self.restore_inner(&backup)
            .await
            .map_err(|e| PtError::new(CONFIG_RESTORE_ERROR).caused_by(e))?;

        self.clear_cache();
        info!(backup = ?backup, "Restored configuration from backup");

        Ok(RestoreStatus::Restored)
    }

    async fn restore_inner(&self, backup: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(backup)
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::ReadError, e))?;
        Config::from_json(&content)?;

        let path = self.config_path();
        let temp_path = self.paths.temp_file();
        write_private(&temp_path, content.as_bytes())
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::WriteError, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::WriteError, e))?;
        restrict_permissions(&path)
            .await
            .map_err(|e| PtError::from_io(Domain::Config, ErrorKind::WriteError, e))
    }

    /// Drop the cached config so the next load reads the file
    pub fn clear_cache(&self) {
        *self.cache.lock() = None;
    }
}

/// Write a file readable and writable by the owner only, flushed to disk.
async fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
