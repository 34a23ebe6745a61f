use super::Timestamps;
use crate::error::codes::{PROJECT_EMPTY_NAME, PROJECT_EMPTY_PATH, PROJECT_INVALID_FORMAT};
use crate::error::{PtError, Result};
use crate::names::{generate_id, is_normalized};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Paused,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = PtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "archived" => Ok(ProjectStatus::Archived),
            "paused" => Ok(ProjectStatus::Paused),
            _ => Err(PtError::with_message(
                PROJECT_INVALID_FORMAT,
                format!("Project status must be one of: active, archived, paused (got '{s}')"),
            )),
        }
    }
}

/// Detected or user-supplied facts about a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    pub git_remote: Option<String>,
    pub package_manager: Option<String>,
    pub framework: Option<String>,
    pub language: Option<String>,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// An individual codebase entry owned by a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "new_project_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub path: String,

    /// Free-form kind, e.g. `rust`, `nodejs`, `general`
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub status: ProjectStatus,

    /// Id of the owning workspace; lookup only
    #[serde(default)]
    pub workspace_id: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub metadata: ProjectMetadata,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

fn new_project_id() -> String {
    generate_id("proj")
}

fn default_kind() -> String {
    "general".to_string()
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: new_project_id(),
            name: name.into(),
            description: String::new(),
            path: path.into(),
            kind: default_kind(),
            status: ProjectStatus::Active,
            workspace_id: None,
            tags: Vec::new(),
            metadata: ProjectMetadata::default(),
            timestamps: Timestamps::now(),
        }
    }

    pub fn touch(&mut self) {
        self.timestamps.touch();
    }

    /// Add a tag; returns false if it was already present.
    pub fn add_tag(&mut self, tag: &str) -> Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(PtError::new(PROJECT_EMPTY_NAME).context("field", "Tag"));
        }
        if self.tags.iter().any(|t| t == tag) {
            return Ok(false);
        }
        self.tags.push(tag.to_string());
        self.touch();
        Ok(true)
    }

    /// Remove a tag; returns false if it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        if status == ProjectStatus::Active {
            self.metadata.last_accessed = Some(Utc::now());
        }
        self.touch();
    }

    pub fn archive(&mut self) {
        self.set_status(ProjectStatus::Archived);
    }

    pub fn pause(&mut self) {
        self.set_status(ProjectStatus::Paused);
    }

    /// Reactivate and record the access time
    pub fn activate(&mut self) {
        self.set_status(ProjectStatus::Active);
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PtError::new(PROJECT_EMPTY_NAME).context("field", "Project ID"));
        }
        if self.name.trim().is_empty() {
            return Err(PtError::new(PROJECT_EMPTY_NAME));
        }
        if !is_normalized(&self.name) {
            return Err(PtError::new(PROJECT_INVALID_FORMAT).context("name", self.name.clone()));
        }
        if self.path.trim().is_empty() {
            return Err(PtError::new(PROJECT_EMPTY_PATH).context("field", "Project path"));
        }
        if self.kind.trim().is_empty() {
            return Err(PtError::new(PROJECT_EMPTY_NAME).context("field", "Project type"));
        }
        Ok(())
    }
}
