//! `chimera config` — Configuration management commands.

use chimera_config::AppConfig;
use std::path::Path;

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if !config.store.profiles_dir.is_dir() {
                warnings.push(format!(
                    "Profiles directory {} does not exist",
                    config.store.profiles_dir.display()
                ));
            }

            if config.store.profiles_dir == config.store.output_dir {
                warnings.push(
                    "Output directory is the profiles directory; merged profiles will be picked up as sources"
                        .to_string(),
                );
            }

            for job in config.jobs.iter().filter(|j| j.sources.is_empty()) {
                warnings.push(format!("Job '{}' merges every available profile", job.output));
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Profiles:  {}", config.store.profiles_dir.display());
            println!("   Output:    {}", config.store.output_dir.display());
            println!("   Provider:  {}", config.merge.default_model_provider);
            println!("   Voice:     {}", config.merge.default_voice);
            println!("   Jobs:      {}", config.jobs.len());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(p) => p.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    };
    println!("{}", config_path.display());
    Ok(())
}
