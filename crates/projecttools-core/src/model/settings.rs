use super::Timestamps;
use crate::error::{Domain, ErrorCode, ErrorKind, PtError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};

/// User settings and preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Root under which derived workspace paths are created; may use `~`
    #[serde(default = "paths::default_projects_path")]
    pub default_projects_path: String,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_projects_path: paths::default_projects_path(),
            timestamps: Timestamps::now(),
        }
    }
}

impl Settings {
    pub fn set_default_projects_path(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(empty_path_error());
        }
        self.default_projects_path = path;
        self.timestamps.touch();
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_projects_path.trim().is_empty() {
            return Err(empty_path_error());
        }
        Ok(())
    }
}

fn empty_path_error() -> PtError {
    PtError::new(ErrorCode::new(Domain::Config, ErrorKind::EmptyRequiredField))
        .context("field", "Default projects path")
}
