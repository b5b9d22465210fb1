//! # Chimera Core
//!
//! Domain types, traits, and error definitions for the Chimera persona merger.
//! This crate has **no I/O** of its own — it defines the profile model and the
//! store seams that the merge engine and store implementations build on.
//!
//! ## Design Philosophy
//!
//! Profile storage is defined as a pair of traits here. Implementations live
//! in `chimera-store`. This enables:
//! - Swapping the directory store for an in-memory one in tests
//! - Keeping the merge algorithm a pure function over in-memory profiles
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod profile;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ResolutionError, Result, SinkError};
pub use profile::{MergedProfile, MergedSettings, NoSecrets, Profile, Settings, SourceProfile, Style};
pub use store::{ProfileSink, ProfileSource};
