//! `chimera batch` — Run every `[[jobs]]` entry from the config file.
//!
//! Ctrl+C (or SIGTERM on Unix) stops the batch: a job still loading its
//! sources is abandoned, a job already writing its output finishes, and the
//! rest are skipped.

use chimera_merge::BatchRunner;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let requests = config.job_requests();
    if requests.is_empty() {
        println!("⚠️  No [[jobs]] configured, nothing to do");
        return Ok(());
    }

    println!("🧬 Running {} merge job(s)...", requests.len());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("Shutdown signal received, cancelling batch");
        signal_token.cancel();
    });

    let runner = BatchRunner::new(super::build_pipeline(&config), shutdown);
    let summary = runner.run(requests).await;

    for report in &summary.succeeded {
        println!(
            "   ✅ {} ← {} ({} topics)",
            report.location,
            report.sources.join(", "),
            report.topics
        );
    }
    for failure in &summary.failed {
        println!("   ❌ {}: {}", failure.output, failure.error);
    }
    for output in &summary.skipped {
        println!("   ⏭️  {output} (skipped)");
    }

    println!();
    println!(
        "   Succeeded: {}  Failed: {}  Skipped: {}",
        summary.succeeded.len(),
        summary.failed.len(),
        summary.skipped.len()
    );

    if summary.cancelled {
        return Err("batch cancelled".into());
    }
    if !summary.is_success() {
        return Err(format!("{} merge job(s) failed", summary.failed.len()).into());
    }
    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
