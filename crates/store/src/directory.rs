//! Directory-backed profile store — one JSON document per persona.
//!
//! Source profiles live at `<profiles_dir>/<id>.json`; merged profiles are
//! written to `<output_dir>/<id>.json`. Identifiers are plain names: an id
//! that is empty or contains a path separator or `..` is rejected before any
//! path is built.
//!
//! Writes go to a temporary sibling file first and are renamed over the
//! target, so a reader never sees a half-written merged profile. The staging
//! file is removed whenever the write does not complete.

use async_trait::async_trait;
use chimera_core::error::{ResolutionError, SinkError};
use chimera_core::profile::{MergedProfile, Profile};
use chimera_core::store::{ProfileSink, ProfileSource};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROFILE_EXTENSION: &str = "json";

/// A profile store rooted at two directories.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    profiles_dir: PathBuf,
    output_dir: PathBuf,
}

impl DirectoryStore {
    /// Create a store reading from `profiles_dir` and writing to `output_dir`.
    ///
    /// Neither directory has to exist yet; the output directory is created on
    /// first write.
    pub fn new(profiles_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the source profile `id`. Does not check `id`.
    pub fn profile_path(&self, id: &str) -> PathBuf {
        self.profiles_dir.join(format!("{id}.{PROFILE_EXTENSION}"))
    }

    /// Path a merged profile `id` is written to. Does not check `id`.
    pub fn output_path(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{id}.{PROFILE_EXTENSION}"))
    }
}

/// Why `id` cannot name a file directly inside a store directory, if it can't.
fn invalid_id_reason(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("identifier is empty")
    } else if id.contains(['/', '\\']) {
        Some("identifier contains a path separator")
    } else if id.contains("..") {
        Some("identifier contains '..'")
    } else {
        None
    }
}

#[async_trait]
impl ProfileSource for DirectoryStore {
    fn name(&self) -> &str {
        "directory"
    }

    async fn resolve(&self, id: &str) -> Result<Profile, ResolutionError> {
        if let Some(reason) = invalid_id_reason(id) {
            return Err(ResolutionError::InvalidId {
                id: id.to_string(),
                reason: reason.into(),
            });
        }

        let path = self.profile_path(id);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ResolutionError::NotFound {
                    id: id.to_string(),
                    location: path.display().to_string(),
                },
                _ => ResolutionError::Io {
                    id: id.to_string(),
                    reason: e.to_string(),
                },
            })?;

        let profile = serde_json::from_str(&content).map_err(|e| ResolutionError::Parse {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded profile");
        Ok(profile)
    }

    /// Stems of all `*.json` files in the profiles directory, sorted.
    async fn list(&self) -> Result<Vec<String>, ResolutionError> {
        let listing_error = |e: std::io::Error| {
            ResolutionError::Listing(format!("{}: {e}", self.profiles_dir.display()))
        };

        let mut entries = tokio::fs::read_dir(&self.profiles_dir)
            .await
            .map_err(listing_error)?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(listing_error)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if invalid_id_reason(stem).is_none() => ids.push(stem.to_string()),
                _ => warn!(path = %path.display(), "Skipping profile with unusable file name"),
            }
        }

        // Sort for deterministic ordering
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl ProfileSink for DirectoryStore {
    async fn persist(&self, id: &str, profile: &MergedProfile) -> Result<String, SinkError> {
        if let Some(reason) = invalid_id_reason(id) {
            return Err(SinkError::Write {
                id: id.to_string(),
                reason: reason.into(),
            });
        }

        let content = profile.to_pretty_json().map_err(|e| SinkError::Serialize {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        let bytes = content.len();

        let output_dir = self.output_dir.clone();
        let target = self.output_path(id);
        let staging_prefix = format!(".{id}.");
        let written = target.clone();

        // The staging file is a `NamedTempFile`: dropping it on any early
        // return deletes it.
        let outcome = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&output_dir)?;
            let mut staging = tempfile::Builder::new()
                .prefix(&staging_prefix)
                .suffix(".tmp")
                .tempfile_in(&output_dir)?;
            staging.write_all(content.as_bytes())?;
            staging.as_file().sync_all()?;
            staging.persist(&written).map_err(|e| e.error)?;
            Ok(())
        })
        .await;

        let write_error = |reason: String| SinkError::Write {
            id: id.to_string(),
            reason,
        };
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(write_error(e.to_string())),
            Err(e) => return Err(write_error(format!("write task failed: {e}"))),
        }

        debug!(path = %target.display(), bytes, "Wrote merged profile");
        Ok(target.display().to_string())
    }
}
