//! Profile operations: add, list, switch, remove.

use crate::error::codes::{
    PROFILE_ALREADY_ACTIVE, PROFILE_ALREADY_EXISTS, PROFILE_EMPTY_NAME, PROFILE_NOT_FOUND,
};
use crate::error::{PtError, Result};
use crate::model::{Config, Profile};
use crate::names::{is_blank, normalize_name, NormalizedName};
use crate::store::ConfigStore;
use std::sync::Arc;

/// Result of [`ProfileManager::add_profile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProfileOutcome {
    /// Stored (normalized) name
    pub name: String,

    /// True when this is the first profile, which makes it active
    pub is_first: bool,

    /// Original input, set when normalization replaced characters
    pub normalized_from: Option<String>,
}

/// Result of [`ProfileManager::remove_profile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveProfileOutcome {
    pub removed: String,

    /// Whether the removed profile was the active one
    pub was_active: bool,

    /// Profile promoted to active in its place, if any
    pub new_active: Option<String>,
}

/// Manages profiles in the configuration
pub struct ProfileManager {
    store: Arc<ConfigStore>,
}

impl ProfileManager {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Create a profile. The first profile becomes active.
    pub async fn add_profile(&self, name: &str) -> Result<AddProfileOutcome> {
        let normalized = required_name(name)?;
        if normalized.changed {
            tracing::info!(input = %name, name = %normalized.value, "Profile name normalized");
        }

        let mut config = self.store.load_config(false).await?;

        if config.profile(&normalized.value).is_some() {
            return Err(PtError::new(PROFILE_ALREADY_EXISTS).context("name", normalized.value));
        }

        let is_first = config.profiles.is_empty();
        config.add_profile(Profile::new(normalized.value.clone(), is_first))?;
        self.store.save_config(&config).await?;

        tracing::info!(profile = %normalized.value, active = is_first, "Profile added");

        Ok(AddProfileOutcome {
            name: normalized.value,
            is_first,
            normalized_from: normalized.changed.then(|| name.trim().to_string()),
        })
    }

    /// All profiles in insertion order
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let config = self.store.load_config(false).await?;
        Ok(config.profiles)
    }

    /// The active profile, if any
    pub async fn active_profile(&self) -> Result<Option<Profile>> {
        let config = self.store.load_config(false).await?;
        Ok(config.active_profile().cloned())
    }

    /// Make another profile active. Returns the normalized name.
    pub async fn switch_profile(&self, name: &str) -> Result<String> {
        let name = required_name(name)?.value;
        let mut config = self.store.load_config(false).await?;

        if config.active_profile().is_some_and(|p| p.name == name) {
            return Err(PtError::new(PROFILE_ALREADY_ACTIVE).context("name", name));
        }
        if config.profile(&name).is_none() {
            return Err(PtError::new(PROFILE_NOT_FOUND).context("name", name));
        }

        config.set_active_profile(&name)?;
        self.store.save_config(&config).await?;

        tracing::info!(profile = %name, "Switched active profile");
        Ok(name)
    }

    /// Remove a profile, promoting the first remaining one if it was active.
    pub async fn remove_profile(&self, name: &str) -> Result<RemoveProfileOutcome> {
        let name = required_name(name)?.value;
        let mut config = self.store.load_config(false).await?;

        let removed = config
            .remove_profile(&name)
            .ok_or_else(|| PtError::new(PROFILE_NOT_FOUND).context("name", name.clone()))?;

        let new_active = if removed.is_active {
            config.active_profile().map(|p| p.name.clone())
        } else {
            None
        };

        self.store.save_config(&config).await?;

        tracing::info!(profile = %name, new_active = ?new_active, "Profile removed");

        Ok(RemoveProfileOutcome {
            removed: removed.name,
            was_active: removed.is_active,
            new_active,
        })
    }
}

fn required_name(raw: &str) -> Result<NormalizedName> {
    if is_blank(raw) {
        return Err(PtError::new(PROFILE_EMPTY_NAME));
    }
    Ok(normalize_name(raw))
}

/// Resolve the profile an operation targets: the explicitly named one, or the
/// active profile.
pub(crate) fn resolve_profile(config: &Config, explicit: Option<&str>) -> Result<String> {
    match explicit {
        Some(raw) => {
            let name = required_name(raw)?.value;
            if config.profile(&name).is_none() {
                return Err(PtError::new(PROFILE_NOT_FOUND).context("name", name));
            }
            Ok(name)
        }
        None => config
            .active_profile()
            .map(|p| p.name.clone())
            .ok_or_else(|| {
                PtError::with_message(
                    PROFILE_NOT_FOUND,
                    "No active profile. Create one with: pt profile add <name>",
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes::CONFIG_NOT_FOUND;
    use std::path::Path;
    use tempfile::tempdir;

    async fn test_manager(dir: &Path) -> ProfileManager {
        let store = Arc::new(ConfigStore::in_dir(dir));
        store.init_config().await.unwrap();
        ProfileManager::new(store)
    }

    fn active_count(profiles: &[Profile]) -> usize {
        profiles.iter().filter(|p| p.is_active).count()
    }

    #[tokio::test]
    async fn test_first_profile_is_active() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;

        let first = manager.add_profile("work").await.unwrap();
        assert!(first.is_first);
        assert!(first.normalized_from.is_none());

        let second = manager.add_profile("home").await.unwrap();
        assert!(!second.is_first);

        let profiles = manager.list_profiles().await.unwrap();
        assert_eq!(profiles[0].name, "work");
        assert!(profiles[0].is_active);
        assert!(!profiles[1].is_active);
    }

    #[tokio::test]
    async fn test_add_reports_normalization() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;

        let outcome = manager.add_profile("Team Alpha").await.unwrap();
        assert_eq!(outcome.name, "team-alpha");
        assert_eq!(outcome.normalized_from.as_deref(), Some("Team Alpha"));

        // Case-only differences are not worth reporting
        let outcome = manager.add_profile("HOME").await.unwrap();
        assert_eq!(outcome.name, "home");
        assert!(outcome.normalized_from.is_none());
    }

    #[tokio::test]
    async fn test_add_duplicate_after_normalization() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;

        manager.add_profile("Team Alpha").await.unwrap();
        let err = manager.add_profile("team-alpha").await.unwrap_err();
        assert!(err.is(PROFILE_ALREADY_EXISTS));
    }

    #[tokio::test]
    async fn test_blank_names_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;

        for result in [
            manager.add_profile("  ").await.map(|_| ()),
            manager.switch_profile("").await.map(|_| ()),
            manager.remove_profile("\t").await.map(|_| ()),
        ] {
            assert!(result.unwrap_err().is(PROFILE_EMPTY_NAME));
        }
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;

        for name in ["zeta", "alpha", "mid"] {
            manager.add_profile(name).await.unwrap();
        }

        let names: Vec<_> = manager
            .list_profiles()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_switch_profile() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;
        manager.add_profile("work").await.unwrap();
        manager.add_profile("home").await.unwrap();

        assert_eq!(manager.switch_profile("Home").await.unwrap(), "home");
        let active = manager.active_profile().await.unwrap().unwrap();
        assert_eq!(active.name, "home");
        assert_eq!(active_count(&manager.list_profiles().await.unwrap()), 1);

        let err = manager.switch_profile("home").await.unwrap_err();
        assert!(err.is(PROFILE_ALREADY_ACTIVE));

        let err = manager.switch_profile("missing").await.unwrap_err();
        assert!(err.is(PROFILE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_remove_active_promotes_first_remaining() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;
        manager.add_profile("work").await.unwrap();
        manager.add_profile("home").await.unwrap();
        manager.add_profile("oss").await.unwrap();

        let outcome = manager.remove_profile("work").await.unwrap();
        assert!(outcome.was_active);
        assert_eq!(outcome.new_active.as_deref(), Some("home"));

        let outcome = manager.remove_profile("oss").await.unwrap();
        assert!(!outcome.was_active);
        assert!(outcome.new_active.is_none());

        let err = manager.remove_profile("oss").await.unwrap_err();
        assert!(err.is(PROFILE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_active_count_invariant() {
        let temp_dir = tempdir().unwrap();
        let manager = test_manager(temp_dir.path()).await;

        let steps: &[(&str, &str)] = &[
            ("add", "a"),
            ("add", "b"),
            ("switch", "b"),
            ("add", "c"),
            ("remove", "b"),
            ("switch", "c"),
            ("remove", "a"),
            ("remove", "c"),
            ("add", "d"),
        ];

        for (op, name) in steps {
            match *op {
                "add" => drop(manager.add_profile(name).await.unwrap()),
                "switch" => drop(manager.switch_profile(name).await.unwrap()),
                _ => drop(manager.remove_profile(name).await.unwrap()),
            }
            let profiles = manager.list_profiles().await.unwrap();
            assert_eq!(active_count(&profiles), profiles.len().min(1), "after {op} {name}");
        }
    }

    #[tokio::test]
    async fn test_requires_initialized_config() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(ConfigStore::in_dir(temp_dir.path()));
        let manager = ProfileManager::new(store);

        let err = manager.add_profile("work").await.unwrap_err();
        assert!(err.is(CONFIG_NOT_FOUND));
    }
}
