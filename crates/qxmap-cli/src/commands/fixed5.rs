//! Fixed5 command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qxmap_compile::{PlacementOutcome, RoutingEngine, Variant};

use super::common::{load_circuit, load_config, write_json};

/// Execute the fixed5 command.
pub fn execute(
    config: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    device: &str,
    variant: Option<Variant>,
    place: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(variant) = variant {
        config.fixed5_variant = variant;
    }
    let variant = config.fixed5_variant;
    let engine = RoutingEngine::new(config);

    let circuit = load_circuit(input)?;
    eprintln!(
        "{} Fixed {:?} transform of {} for {}",
        style("→").cyan().bold(),
        variant,
        style(input.display()).green(),
        style(device).yellow()
    );

    let (routed, depth) = if place {
        match engine.fixed5_placement(&circuit, device)? {
            PlacementOutcome::Placed(placement) => {
                eprintln!(
                    "  Layout: {} ({} candidates, estimate {})",
                    style(&placement.layout).yellow(),
                    placement.candidates,
                    placement.estimate
                );
                (placement.routed.circuit, placement.routed.depth)
            }
            PlacementOutcome::Skipped { circuit, reason } => {
                eprintln!("  {} {reason}", style("!").yellow().bold());
                let depth = circuit.depth();
                (circuit, depth)
            }
        }
    } else {
        let routed = engine.fixed5(&circuit, device)?;
        if let Some(reason) = &routed.skipped {
            eprintln!("  {} {reason}", style("!").yellow().bold());
        }
        (routed.circuit, routed.depth)
    };

    eprintln!(
        "{} Routed: {} gates, depth {}",
        style("✓").green().bold(),
        routed.gate_count(),
        depth
    );
    write_json(&routed, output)?;
    if let Some(path) = output {
        eprintln!("  Output: {}", style(path.display()).green());
    }

    Ok(())
}
