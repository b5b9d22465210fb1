//! In-memory store — useful for testing and embedding.

use async_trait::async_trait;
use chimera_core::error::{ResolutionError, SinkError};
use chimera_core::profile::{MergedProfile, Profile};
use chimera_core::store::{ProfileSink, ProfileSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps source and merged profiles in hash maps.
/// Useful for testing and for callers that already hold parsed profiles.
pub struct InMemoryStore {
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
    merged: Arc<RwLock<HashMap<String, MergedProfile>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
            merged: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add or replace a source profile.
    pub async fn insert_profile(&self, id: impl Into<String>, profile: Profile) {
        self.profiles.write().await.insert(id.into(), profile);
    }

    /// The merged profile persisted under `id`, if any.
    pub async fn merged(&self, id: &str) -> Option<MergedProfile> {
        self.merged.read().await.get(id).cloned()
    }

    pub async fn merged_count(&self) -> usize {
        self.merged.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileSource for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn resolve(&self, id: &str) -> Result<Profile, ResolutionError> {
        self.profiles
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound {
                id: id.to_string(),
                location: format!("memory://{id}"),
            })
    }

    async fn list(&self) -> Result<Vec<String>, ResolutionError> {
        let mut ids: Vec<String> = self.profiles.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl ProfileSink for InMemoryStore {
    async fn persist(&self, id: &str, profile: &MergedProfile) -> Result<String, SinkError> {
        self.merged
            .write()
            .await
            .insert(id.to_string(), profile.clone());
        Ok(format!("memory://{id}"))
    }
}
