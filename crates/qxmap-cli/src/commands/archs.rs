//! Archs command implementation.

use console::style;

use qxmap_compile::Architecture;

/// Execute the archs command.
pub fn execute() {
    println!("{} Built-in architectures:\n", style("qxmap").cyan().bold());

    for arch in Architecture::ALL {
        let graph = arch.graph();
        println!(
            "  {} {}",
            style("●").green(),
            style(arch.name).bold(),
        );
        println!("    Device: {}", arch.description);
        println!("    Qubits: {}", arch.num_qubits);
        println!(
            "    Couplings: {}{}",
            graph.edge_count(),
            if arch.bidirectional {
                " (bidirectional)"
            } else {
                ""
            }
        );
        println!();
    }
}
