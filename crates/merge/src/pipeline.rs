//! Merge pipeline — resolve sources, merge, persist.
//!
//! One [`MergeRequest`] is all-or-nothing: every source must resolve before
//! anything is merged, and nothing is persisted unless the whole merge
//! succeeded.

use chimera_core::error::{Error, Result};
use chimera_core::profile::{MergedProfile, SourceProfile};
use chimera_core::store::{ProfileSink, ProfileSource};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::ProfileMerger;

/// Which source profiles a request merges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Every profile the source can list, in its listing order
    All,
    /// These identifiers, in this priority order
    Named(Vec<String>),
}

/// A request to merge some source profiles into one output profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Output identifier (lowercased when persisted)
    pub output: String,
    pub sources: SourceSelection,
}

impl MergeRequest {
    /// Build a request; an empty `sources` list selects every available profile.
    pub fn new(output: impl Into<String>, sources: Vec<String>) -> Self {
        let sources = if sources.is_empty() {
            SourceSelection::All
        } else {
            SourceSelection::Named(sources)
        };
        Self {
            output: output.into(),
            sources,
        }
    }

    /// A request that merges every available profile.
    pub fn all(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            sources: SourceSelection::All,
        }
    }

    /// The identifier the merged profile is persisted under.
    pub fn output_id(&self) -> String {
        self.output.to_lowercase()
    }
}

/// Outcome of a persisted merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Lowercased output identifier
    pub output: String,
    /// Where the sink wrote the document
    pub location: String,
    /// Source identifiers, in the order they were merged
    pub sources: Vec<String>,
    pub topics: usize,
    pub post_examples: usize,
}

/// A merged profile that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMerge {
    /// Source identifiers, in the order they were merged
    pub sources: Vec<String>,
    pub profile: MergedProfile,
}

/// Wires a source, a merger, and a sink together.
#[derive(Clone)]
pub struct MergePipeline {
    source: Arc<dyn ProfileSource>,
    sink: Arc<dyn ProfileSink>,
    merger: ProfileMerger,
}

impl MergePipeline {
    pub fn new(
        source: Arc<dyn ProfileSource>,
        sink: Arc<dyn ProfileSink>,
        merger: ProfileMerger,
    ) -> Self {
        Self {
            source,
            sink,
            merger,
        }
    }

    /// Identifiers available from the source, in priority order.
    pub async fn discover(&self) -> Result<Vec<String>> {
        Ok(self.source.list().await?)
    }

    /// Turn a selection into a concrete, non-empty list of identifiers.
    pub async fn source_ids(&self, request: &MergeRequest) -> Result<Vec<String>> {
        if request.output.trim().is_empty() {
            return Err(Error::InvalidRequest("output name is empty".into()));
        }

        let ids = match &request.sources {
            SourceSelection::Named(ids) => ids.clone(),
            SourceSelection::All => {
                let ids = self.discover().await?;
                debug!(
                    source = self.source.name(),
                    count = ids.len(),
                    "Discovered source profiles"
                );
                ids
            }
        };

        if ids.is_empty() {
            return Err(Error::InvalidRequest(format!(
                "no source profiles to merge into '{}'",
                request.output
            )));
        }
        Ok(ids)
    }

    /// Resolve every identifier concurrently.
    ///
    /// Results keep the order of `ids`, not completion order. The first
    /// failure fails the whole call.
    pub async fn resolve_all(&self, ids: &[String]) -> Result<Vec<SourceProfile>> {
        let loads = ids.iter().map(|id| async move {
            let profile = self.source.resolve(id).await?;
            debug!(id = %id, "Resolved source profile");
            Ok::<_, Error>(SourceProfile::new(id.clone(), profile))
        });
        try_join_all(loads).await
    }

    /// Resolve and merge one request, without persisting.
    pub async fn prepare(&self, request: &MergeRequest) -> Result<PreparedMerge> {
        let ids = self.source_ids(request).await?;
        let sources = self.resolve_all(&ids).await?;
        Ok(PreparedMerge {
            profile: self.merger.merge(&request.output, &sources),
            sources: ids,
        })
    }

    /// Resolve and merge without persisting.
    pub async fn preview(&self, request: &MergeRequest) -> Result<MergedProfile> {
        Ok(self.prepare(request).await?.profile)
    }

    /// Persist a prepared merge under its lowercased name.
    pub async fn commit(&self, prepared: PreparedMerge) -> Result<MergeReport> {
        let PreparedMerge { sources, profile } = prepared;
        let location = self.sink.persist(&profile.name, &profile).await?;

        let report = MergeReport {
            output: profile.name,
            location,
            sources,
            topics: profile.topics.len(),
            post_examples: profile.post_examples.len(),
        };
        info!(
            output = %report.output,
            location = %report.location,
            sources = report.sources.len(),
            topics = report.topics,
            post_examples = report.post_examples,
            "Merged profiles"
        );
        Ok(report)
    }

    /// Resolve, merge, and persist one request.
    pub async fn run(&self, request: &MergeRequest) -> Result<MergeReport> {
        let prepared = self.prepare(request).await?;
        self.commit(prepared).await
    }
}
