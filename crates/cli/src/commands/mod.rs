pub mod batch;
pub mod config_cmd;
pub mod list;
pub mod merge;

use chimera_config::AppConfig;
use chimera_merge::{MergePipeline, ProfileMerger};
use chimera_store::DirectoryStore;
use std::path::Path;
use std::sync::Arc;

/// Load the config, reporting failures the way every command does.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?)
}

/// A pipeline reading and writing through the configured directories.
pub fn build_pipeline(config: &AppConfig) -> MergePipeline {
    let store = Arc::new(DirectoryStore::new(
        &config.store.profiles_dir,
        &config.store.output_dir,
    ));
    let merger = ProfileMerger::new(config.merge.merge_defaults());
    MergePipeline::new(store.clone(), store, merger)
}
