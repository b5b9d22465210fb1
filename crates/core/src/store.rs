//! Store traits — where source profiles come from and merged profiles go.
//!
//! Both sides are key-value address spaces keyed by a persona identifier
//! (lowercase, no extension). Implementations: directory of JSON files,
//! in-memory (for testing).

use async_trait::async_trait;

use crate::error::{ResolutionError, SinkError};
use crate::profile::{MergedProfile, Profile};

/// Read side: resolves persona identifiers to profile documents.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// The store name (e.g., "directory", "in_memory").
    fn name(&self) -> &str;

    /// Load and parse the profile stored under `id`.
    async fn resolve(&self, id: &str) -> std::result::Result<Profile, ResolutionError>;

    /// All identifiers available in this store, in priority order.
    ///
    /// Used when a merge request asks for every available profile; the order
    /// returned here becomes the tie-break order of the merge.
    async fn list(&self) -> std::result::Result<Vec<String>, ResolutionError>;
}

/// Write side: persists merged profiles.
#[async_trait]
pub trait ProfileSink: Send + Sync {
    /// Persist `profile` under `id`, replacing any previous document.
    ///
    /// Returns a human-readable location of what was written.
    async fn persist(
        &self,
        id: &str,
        profile: &MergedProfile,
    ) -> std::result::Result<String, SinkError>;
}
