use serde::{Deserialize, Serialize};

use crate::core::Storage;
use crate::utils::error::{FarmError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

pub const PROFILE_FILENAME: &str = "profile.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: String,
    pub farm_name: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            full_name: "Farmer".to_string(),
            farm_name: "My Farm".to_string(),
        }
    }
}

impl Validate for UserProfile {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("full_name", &self.full_name)
            .and_then(|_| validate_non_empty_string("farm_name", &self.farm_name))
            .map_err(|e| FarmError::validation(e.to_string()))
    }
}

/// Holds the profile in memory. Changes are only written by [`ProfileStore::persist`].
pub struct ProfileStore<S: Storage> {
    storage: S,
    profile: UserProfile,
    dirty: bool,
}

impl<S: Storage> ProfileStore<S> {
    /// Loads the saved profile, or the default one on first launch.
    pub async fn load(storage: S) -> Result<Self> {
        let profile = if storage.exists(PROFILE_FILENAME).await {
            let data = storage.read_file(PROFILE_FILENAME).await?;
            serde_json::from_slice(&data)?
        } else {
            tracing::info!("No saved profile, starting with defaults");
            UserProfile::default()
        };

        Ok(Self {
            storage,
            profile,
            dirty: false,
        })
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn update<F: FnOnce(&mut UserProfile)>(&mut self, f: F) {
        f(&mut self.profile);
        self.dirty = true;
    }

    pub async fn persist(&mut self) -> Result<()> {
        self.profile.validate()?;
        let data = serde_json::to_vec_pretty(&self.profile)?;
        self.storage.write_file(PROFILE_FILENAME, &data).await?;
        self.dirty = false;
        tracing::debug!("Profile saved for {}", self.profile.full_name);
        Ok(())
    }

    pub async fn update_and_persist<F: FnOnce(&mut UserProfile)>(&mut self, f: F) -> Result<()> {
        self.update(f);
        self.persist().await
    }
}
