//! `chimera merge` — Merge source profiles into one output profile.

use chimera_merge::MergeRequest;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    sources: Vec<String>,
    output: Option<String>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let pipeline = super::build_pipeline(&config);

    let output = output.unwrap_or_else(|| config.merge.default_output.clone());
    let request = MergeRequest::new(output, sources);

    if dry_run {
        let merged = pipeline.preview(&request).await?;
        println!("{}", merged.to_pretty_json()?);
        return Ok(());
    }

    match pipeline.run(&request).await {
        Ok(report) => {
            println!(
                "✅ Successfully merged characters into {}",
                report.location
            );
            println!(
                "📝 Combined {} characters: {}",
                report.sources.len(),
                report.sources.join(", ")
            );
            println!("📝 Total topics: {}", report.topics);
            println!("📝 Total post examples: {}", report.post_examples);
            Ok(())
        }
        Err(e) => {
            println!("❌ Error merging characters: {e}");
            Err(e.into())
        }
    }
}
