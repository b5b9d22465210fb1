//! Batch runner — several independent merge requests, one after another.
//!
//! A failed request is logged and recorded, and the runner moves on to the
//! next one. Cancellation is driven by a [`CancellationToken`] the caller
//! owns. Once it fires, a request that is still resolving is abandoned and
//! the remaining requests are skipped. A request whose merged profile is
//! already being written is allowed to finish, so the output is either the
//! complete new document or untouched.

use chimera_core::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::pipeline::{MergePipeline, MergeReport, MergeRequest};

/// A request that failed, with the reason.
#[derive(Debug)]
pub struct BatchFailure {
    pub output: String,
    pub error: Error,
}

/// What happened to each request of a batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<MergeReport>,
    pub failed: Vec<BatchFailure>,
    /// Outputs of requests that were not completed because of cancellation
    pub skipped: Vec<String>,
    pub cancelled: bool,
}

impl BatchSummary {
    /// True when every request ran and succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}

/// Runs merge requests sequentially through one pipeline.
pub struct BatchRunner {
    pipeline: MergePipeline,
    shutdown: CancellationToken,
}

impl BatchRunner {
    pub fn new(pipeline: MergePipeline, shutdown: CancellationToken) -> Self {
        Self { pipeline, shutdown }
    }

    /// Process `requests` in order.
    pub async fn run(&self, requests: Vec<MergeRequest>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut pending = requests.into_iter();

        for request in pending.by_ref() {
            if self.shutdown.is_cancelled() {
                summary.skipped.push(request.output);
                break;
            }

            info!(output = %request.output, "Processing merge request");
            let prepared = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                result = self.pipeline.prepare(&request) => Some(result),
            };

            let outcome = match prepared {
                // The write itself is never raced against the token.
                Some(Ok(prepared)) if !self.shutdown.is_cancelled() => {
                    Some(self.pipeline.commit(prepared).await)
                }
                Some(Ok(_)) | None => None,
                Some(Err(error)) => Some(Err(error)),
            };

            match outcome {
                Some(Ok(report)) => summary.succeeded.push(report),
                Some(Err(error)) => {
                    warn!(output = %request.output, error = %error, "Merge request failed, continuing");
                    summary.failed.push(BatchFailure {
                        output: request.output,
                        error,
                    });
                }
                None => {
                    summary.skipped.push(request.output);
                    break;
                }
            }
        }

        if self.shutdown.is_cancelled() {
            summary.cancelled = true;
            summary.skipped.extend(pending.map(|r| r.output));
            warn!(skipped = summary.skipped.len(), "Batch cancelled");
        }

        info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            "Batch finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProfileMerger;
    use async_trait::async_trait;
    use chimera_core::error::SinkError;
    use chimera_core::profile::{MergedProfile, Profile};
    use chimera_core::store::ProfileSink;
    use chimera_store::InMemoryStore;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// A sink that holds every write until released.
    struct GatedSink {
        inner: Arc<InMemoryStore>,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ProfileSink for GatedSink {
        async fn persist(
            &self,
            id: &str,
            profile: &MergedProfile,
        ) -> std::result::Result<String, SinkError> {
            self.started.notify_one();
            self.release.notified().await;
            self.inner.persist(id, profile).await
        }
    }

    async fn store_with(ids: &[&str]) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for id in ids {
            let profile = Profile {
                topics: vec![format!("{id}-topic")],
                ..Profile::default()
            };
            store.insert_profile(*id, profile).await;
        }
        store
    }

    fn runner(store: &Arc<InMemoryStore>, token: CancellationToken) -> BatchRunner {
        let pipeline = MergePipeline::new(store.clone(), store.clone(), ProfileMerger::default());
        BatchRunner::new(pipeline, token)
    }

    #[tokio::test]
    async fn failure_does_not_stop_later_requests() {
        let store = store_with(&["a", "b", "c"]).await;
        let requests = vec![
            MergeRequest::new("first", vec!["a".into(), "b".into()]),
            MergeRequest::new("broken", vec!["a".into(), "missing".into()]),
            MergeRequest::new("last", vec!["c".into()]),
        ];

        let summary = runner(&store, CancellationToken::new()).run(requests).await;

        assert_eq!(summary.succeeded.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].output, "broken");
        assert!(!summary.is_success());
        assert!(!summary.cancelled);

        assert!(store.merged("first").await.is_some());
        assert!(store.merged("broken").await.is_none());
        assert!(store.merged("last").await.is_some());
    }

    #[tokio::test]
    async fn all_succeeding_batch_is_success() {
        let store = store_with(&["a", "b"]).await;
        let requests = vec![
            MergeRequest::new("one", vec!["a".into()]),
            MergeRequest::all("everyone"),
        ];

        let summary = runner(&store, CancellationToken::new()).run(requests).await;
        assert!(summary.is_success());
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.succeeded[1].sources, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn cancelled_token_skips_everything() {
        let store = store_with(&["a"]).await;
        let token = CancellationToken::new();
        token.cancel();

        let requests = vec![
            MergeRequest::new("one", vec!["a".into()]),
            MergeRequest::new("two", vec!["a".into()]),
        ];
        let summary = runner(&store, token).run(requests).await;

        assert!(summary.cancelled);
        assert!(summary.succeeded.is_empty());
        assert_eq!(summary.skipped, vec!["one", "two"]);
        assert_eq!(store.merged_count().await, 0);
    }

    #[tokio::test]
    async fn empty_batch_is_trivially_successful() {
        let store = store_with(&[]).await;
        let summary = runner(&store, CancellationToken::new()).run(vec![]).await;
        assert!(summary.is_success());
        assert_eq!(summary.total(), 0);
    }

    #[tokio::test]
    async fn cancellation_during_write_lets_the_write_finish() {
        let store = store_with(&["a"]).await;
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let sink = Arc::new(GatedSink {
            inner: store.clone(),
            started: started.clone(),
            release: release.clone(),
        });
        let token = CancellationToken::new();
        let pipeline = MergePipeline::new(store.clone(), sink, ProfileMerger::default());
        let runner = BatchRunner::new(pipeline, token.clone());

        let batch = tokio::spawn(async move {
            runner
                .run(vec![
                    MergeRequest::new("one", vec!["a".into()]),
                    MergeRequest::new("two", vec!["a".into()]),
                ])
                .await
        });

        started.notified().await;
        token.cancel();
        release.notify_one();
        let summary = batch.await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.succeeded.len(), 1);
        assert_eq!(summary.succeeded[0].output, "one");
        assert_eq!(summary.skipped, vec!["two"]);
        assert!(summary.failed.is_empty());
        assert!(store.merged("one").await.is_some());
        assert!(store.merged("two").await.is_none());
    }
}
