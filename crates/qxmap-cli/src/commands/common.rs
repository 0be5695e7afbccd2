//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use qxmap_compile::{EngineConfig, RoutingEngine};
use qxmap_ir::Circuit;

/// Where the device comes from: a built-in name, an architecture file or a
/// table cache.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct DeviceArgs {
    /// Built-in architecture (qx2, qx3, qx4, qx5, qx20)
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Architecture file: N, then N rows of N 0/1 entries
    #[arg(short, long)]
    pub graph: Option<PathBuf>,

    /// Routing table cache written by `qxmap table --write-cache`
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

/// Load the engine configuration: file if given, then `QXMAP_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = EngineConfig::load(path).context("Failed to load configuration")?;
    debug!("Engine configuration: {config:?}");
    Ok(config)
}

/// Create an engine with the device loaded and its table ready.
pub fn open_engine(config: EngineConfig, device: &DeviceArgs) -> Result<RoutingEngine> {
    let mut engine = RoutingEngine::new(config);

    if let Some(cache) = &device.cache {
        engine
            .read_cache(cache)
            .with_context(|| format!("Failed to read table cache: {}", cache.display()))?;
        return Ok(engine);
    }

    match (&device.arch, &device.graph) {
        (Some(name), _) => {
            engine.load_architecture(name)?;
        }
        (None, Some(path)) => {
            engine
                .load(path)
                .with_context(|| format!("Failed to load architecture: {}", path.display()))?;
        }
        (None, None) => anyhow::bail!("No device given: use --arch, --graph or --cache"),
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Building routing table...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let built = engine.build().map(|_| ());
    spinner.finish_and_clear();
    built?;

    Ok(engine)
}

/// Load a circuit from a JSON file, checking every gate against the line
/// count.
pub fn load_circuit(path: &Path) -> Result<Circuit> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let raw: Circuit = serde_json::from_str(&source)
        .with_context(|| format!("Invalid circuit JSON: {}", path.display()))?;

    let mut circuit = raw.empty_like();
    circuit.extend(raw.into_gates())?;
    Ok(circuit)
}

/// Write `value` as pretty JSON to `output`, or to stdout.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
