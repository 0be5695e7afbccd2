//! Table command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qxmap_ir::QubitId;

use super::common::{DeviceArgs, load_config, open_engine};

/// Execute the table command.
pub fn execute(
    config: Option<&Path>,
    device: &DeviceArgs,
    write_cache: Option<&Path>,
    paths: bool,
) -> Result<()> {
    let engine = open_engine(load_config(config)?, device)?;
    let table = engine.table().context("Routing table missing after build")?;

    println!(
        "{} Routing table for {} qubits",
        style("✓").green().bold(),
        table.size()
    );
    println!();
    print!("{table}");

    if paths {
        println!();
        for v in (0..table.size()).map(QubitId::from) {
            for w in (0..table.size()).map(QubitId::from) {
                if let Some(entry) = table.entry(v, w) {
                    println!(
                        "  {} -> {} [{}] {}",
                        v,
                        w,
                        style(entry.cost).yellow(),
                        entry.path
                    );
                }
            }
        }
    }

    if let Some(path) = write_cache {
        engine.write_cache(path)?;
        println!();
        println!("  Cache: {}", style(path.display()).green());
    }

    Ok(())
}
