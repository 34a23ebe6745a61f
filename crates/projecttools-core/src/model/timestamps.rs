use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation and modification dates shared by every entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(default = "Utc::now")]
    pub modified_date: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            modified_date: now,
            created_date: now,
        }
    }

    /// Mark as modified now
    pub fn touch(&mut self) {
        self.modified_date = Utc::now();
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}
