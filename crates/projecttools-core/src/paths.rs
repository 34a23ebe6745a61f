//! Filesystem locations and path helpers.

use std::path::{Path, PathBuf};

/// Name of the directory holding the configuration, under the home directory
pub const APP_DIR: &str = ".projecttools";

/// Configuration file name
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the application directory
pub const HOME_ENV: &str = "PT_HOME";

/// Locations of the on-disk state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding the config file and its siblings
    pub app_dir: PathBuf,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_app_dir() -> PathBuf {
    match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join(APP_DIR),
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
        }
    }
}

impl AppPaths {
    /// Use a specific application directory
    pub fn in_dir(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.app_dir.join(CONFIG_FILE)
    }

    /// Sibling holding the last successfully saved version
    pub fn backup_file(&self) -> PathBuf {
        self.app_dir.join(format!("{CONFIG_FILE}.backup"))
    }

    /// Sibling written before the atomic rename
    pub fn temp_file(&self) -> PathBuf {
        self.app_dir.join(format!("{CONFIG_FILE}.tmp"))
    }
}

/// Default location for new workspaces: `~/Dev`
pub fn default_projects_path() -> String {
    home_dir().join("Dev").to_string_lossy().into_owned()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

/// Expand `~` and make relative paths absolute against the working directory.
pub fn resolve_path(path: &str) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        return expanded;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&expanded))
        .unwrap_or(expanded)
}

/// Create a directory and its parents if missing.
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}
