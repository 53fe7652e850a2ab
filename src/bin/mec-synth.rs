// Copyright (c) 2025 - Cowboy AI, Inc.
//! MEC Stack Synthesizer
//!
//! Builds every selected stack, writes its template to the output directory
//! and, in dry-run mode, previews the provisioned identifiers.
//!
//! Run with: cargo run --bin mec-synth
//!
//! Environment:
//! - `MEC_PROFILES` - comma separated profile names (default: all)
//! - `MEC_PARAMS_FILE` - extra stack parameters as JSON
//! - `MEC_OUT_DIR` - template directory (default: cdk.out)
//! - `MEC_DRY_RUN` - apply to the in-memory engine (default: true)

use anyhow::{bail, Context, Result};
use mec_infrastructure::{
    engine::{DryRunEngine, ProvisioningEngine},
    stack::{NetworkStackBuilder, StackParameters},
    template::synthesize,
    SynthConfig,
};
use std::path::Path;
use tracing::{debug, error, info};

async fn synth_stack(
    builder: &NetworkStackBuilder,
    params: &StackParameters,
    out_dir: &Path,
    engine: Option<&mut DryRunEngine>,
) -> Result<()> {
    let graph = builder
        .build(params)
        .with_context(|| format!("Failed to build stack {}", params.stack_name))?;
    info!(
        "🧱 Built {} ({} resources, region {})",
        graph.stack_name(),
        graph.len(),
        graph.region()
    );

    let template = synthesize(&graph)?;
    let path = out_dir.join(template.file_name());
    tokio::fs::write(&path, template.to_json_pretty()?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("📝 Wrote {}", path.display());

    if let Some(engine) = engine {
        let state = engine
            .apply(&graph)
            .await
            .with_context(|| format!("Dry run of {} failed", graph.stack_name()))?;
        for (name, value) in &state.outputs {
            info!("  {}.{} = {}", state.stack_name, name, value);
        }
        debug!("{} physical ids assigned", state.physical_ids.len());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting MEC stack synthesis");

    // Load configuration
    let config = SynthConfig::from_env().context("Failed to load configuration")?;
    info!("📋 Configuration loaded:");
    info!("  - Output directory: {}", config.out_dir.display());
    info!("  - Dry run: {}", config.dry_run);

    let stacks = config
        .stack_parameters()
        .context("Failed to resolve stack parameters")?;

    tokio::fs::create_dir_all(&config.out_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;

    let builder = NetworkStackBuilder::new();
    let mut engine = config.dry_run.then(DryRunEngine::new);
    let mut failures = 0usize;

    for params in &stacks {
        if let Err(e) = synth_stack(&builder, params, &config.out_dir, engine.as_mut()).await {
            failures += 1;
            error!("❌ {:#}", e);
        }
    }

    if failures > 0 {
        bail!("{} of {} stacks failed", failures, stacks.len());
    }

    info!("✅ Synthesized {} stacks", stacks.len());
    Ok(())
}
