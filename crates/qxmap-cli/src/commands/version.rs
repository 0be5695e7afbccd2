//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - architecture-aware CNOT routing",
        style("qxmap").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qxmap-ir       Circuit model and state-vector simulator");
    println!("  qxmap-compile  Routing tables, circuit expansion and placement");
    println!("  qxmap-cli      Command-line interface");
}
