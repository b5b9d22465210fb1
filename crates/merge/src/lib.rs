//! Profile merging — combine several persona profiles into one.
//!
//! The merge is a pure, deterministic function of the ordered source profiles
//! and the output name:
//!
//! - **List fields** (bio, lore, topics, examples, plugins, ...) are unioned in
//!   first-seen order across the sources, with exact-value deduplication.
//! - **Style directives** are unioned per channel, then any directive whose
//!   negation-stripped form appears inside another directive is dropped.
//! - **Scalars** (model provider, voice) come from the first source that
//!   defines them, falling back to fixed defaults.
//! - **Secrets** are never carried over.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ProfileSource│───▶│ MergePipeline│───▶│  ProfileSink │
//! │  (resolve)   │    │ ProfileMerger│    │  (persist)   │
//! └──────────────┘    └──────────────┘    └──────────────┘
//!                            ▲
//!                     ┌──────┴──────┐
//!                     │ BatchRunner │  sequential, cancellable
//!                     └─────────────┘
//! ```

mod batch;
mod engine;
mod pipeline;
mod style;
mod union;

pub use batch::{BatchFailure, BatchRunner, BatchSummary};
pub use engine::{DEFAULT_MODEL_PROVIDER, DEFAULT_VOICE_MODEL, MergeDefaults, ProfileMerger};
pub use pipeline::{MergePipeline, MergeReport, MergeRequest, PreparedMerge, SourceSelection};
pub use style::{reconcile_style_rules, strip_negations};
pub use union::{union_unique, union_values};
