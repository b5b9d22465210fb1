//! `chimera list` — Show the source profiles available for merging.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let pipeline = super::build_pipeline(&config);

    let ids = pipeline.discover().await?;
    println!(
        "📂 Profiles in {} ({}):",
        config.store.profiles_dir.display(),
        ids.len()
    );
    if ids.is_empty() {
        println!("   (none)");
    }
    for id in &ids {
        println!("   • {id}");
    }
    Ok(())
}
