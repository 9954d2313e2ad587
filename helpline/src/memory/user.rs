//! Caller profile storage keyed by a stable user id (phone, email or
//! session id, in that preference order).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HelplineResult;
use crate::memory::store::JsonFileStore;
use crate::models::UserInfo;

/// A remembered caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            name: None,
            email: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// JSON-file-backed user memory.
pub struct UserMemory {
    store: JsonFileStore,
    entries: Mutex<HashMap<String, UserProfile>>,
}

impl UserMemory {
    pub fn new(file_path: impl AsRef<Path>) -> HelplineResult<Self> {
        let store = JsonFileStore::new(file_path)?;
        let entries = store.load();
        Ok(Self {
            store,
            entries: Mutex::new(entries),
        })
    }

    pub fn save_user(&self, profile: UserProfile) {
        let mut entries = self.entries.lock().expect("user memory poisoned");
        let mut profile = profile;
        profile.updated_at = Utc::now();
        entries.insert(profile.user_id.clone(), profile);
        self.store.save(&entries);
    }

    pub fn get_user(&self, user_id: &str) -> Option<UserProfile> {
        let entries = self.entries.lock().expect("user memory poisoned");
        entries.get(user_id).cloned()
    }

    pub fn user_exists(&self, user_id: &str) -> bool {
        let entries = self.entries.lock().expect("user memory poisoned");
        entries.contains_key(user_id)
    }

    /// Merge freshly captured caller info into the stored profile, creating
    /// it if needed. Only non-empty fields overwrite.
    pub fn merge_info(&self, user_id: &str, info: &UserInfo) {
        let mut entries = self.entries.lock().expect("user memory poisoned");
        let profile = entries
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));

        if let Some(name) = &info.name {
            profile.name = Some(name.clone());
        }
        if let Some(email) = &info.email {
            profile.email = Some(email.clone());
        }
        if let Some(phone) = &info.phone {
            profile.phone = Some(phone.clone());
        }
        profile.updated_at = Utc::now();

        self.store.save(&entries);
        debug!("Updated user profile for {}", user_id);
    }

    pub fn delete_user(&self, user_id: &str) {
        let mut entries = self.entries.lock().expect("user memory poisoned");
        if entries.remove(user_id).is_some() {
            self.store.save(&entries);
            info!("Deleted user {}", user_id);
        }
    }

    /// All profiles matching a predicate.
    pub fn search(&self, filter: impl Fn(&UserProfile) -> bool) -> Vec<UserProfile> {
        let entries = self.entries.lock().expect("user memory poisoned");
        entries.values().filter(|p| filter(p)).cloned().collect()
    }
}
