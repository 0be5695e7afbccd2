//! Route command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qxmap_compile::{PlacementOutcome, remove_duplicates};

use super::common::{DeviceArgs, load_circuit, load_config, open_engine, write_json};

/// Execute the route command.
///
/// Status goes to stderr so the routed circuit can be piped from stdout.
pub fn execute(
    config: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    device: &DeviceArgs,
    place: bool,
    cleanup: bool,
) -> Result<()> {
    let circuit = load_circuit(input)?;
    eprintln!(
        "{} Routing {} ({} lines, {} gates)",
        style("→").cyan().bold(),
        style(input.display()).green(),
        circuit.num_lines(),
        circuit.gate_count()
    );

    let engine = open_engine(load_config(config)?, device)?;

    let routed = if place {
        match engine.search_placement(&circuit)? {
            PlacementOutcome::Placed(placement) => {
                eprintln!(
                    "  Layout: {} ({:?}, {} candidates, estimate {})",
                    style(&placement.layout).yellow(),
                    placement.strategy,
                    placement.candidates,
                    placement.estimate
                );
                placement.routed.circuit
            }
            PlacementOutcome::Skipped { circuit, reason } => {
                eprintln!("  {} {reason}", style("!").yellow().bold());
                circuit
            }
        }
    } else {
        let routed = engine.expand(&circuit)?;
        if let Some(reason) = &routed.skipped {
            eprintln!("  {} {reason}", style("!").yellow().bold());
            routed.circuit
        } else if cleanup {
            remove_duplicates(&routed.circuit)?
        } else {
            routed.circuit
        }
    };

    eprintln!(
        "{} Routed: {} gates, depth {}",
        style("✓").green().bold(),
        routed.gate_count(),
        routed.depth()
    );
    write_json(&routed, output)?;
    if let Some(path) = output {
        eprintln!("  Output: {}", style(path.display()).green());
    }

    Ok(())
}
