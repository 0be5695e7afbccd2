//! qxmap Command-Line Interface
//!
//! Routes circuits onto IBM-Q style devices from the shell.
//!
//! ```text
//! qxmap archs
//! qxmap table --arch qx4 --write-cache qx4.cache
//! qxmap route --input adder.json --cache qx4.cache --place
//! qxmap fixed5 --input adder.json --device qx2 --variant swap
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::DeviceArgs;
use commands::{archs, fixed5, route, table, version};
use qxmap_compile::Variant;

/// qxmap - architecture-aware CNOT routing for IBM-Q devices
#[derive(Parser)]
#[command(name = "qxmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration file (YAML)
    #[arg(short, long, global = true, env = "QXMAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in architectures
    Archs,

    /// Build or load a routing table and print its cost matrix
    Table {
        #[command(flatten)]
        device: DeviceArgs,

        /// Write the table to a cache file
        #[arg(long)]
        write_cache: Option<PathBuf>,

        /// Print every routing path, not just the costs
        #[arg(long)]
        paths: bool,
    },

    /// Route a circuit (JSON) with the routing table of a device
    Route {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        device: DeviceArgs,

        /// Search for the best qubit placement first
        #[arg(long)]
        place: bool,

        /// Remove cancelling gate pairs after routing
        #[arg(long)]
        cleanup: bool,
    },

    /// Route a circuit with the fixed 5-qubit templates
    Fixed5 {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Device (qx2, qx4)
        #[arg(short, long, default_value = "qx4")]
        device: String,

        /// Rewrite style (swap, template); defaults to the configured one
        #[arg(long)]
        variant: Option<Variant>,

        /// Search for the best qubit placement first
        #[arg(long)]
        place: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Archs => {
            archs::execute();
            Ok(())
        }

        Commands::Table {
            device,
            write_cache,
            paths,
        } => table::execute(config, &device, write_cache.as_deref(), paths),

        Commands::Route {
            input,
            output,
            device,
            place,
            cleanup,
        } => route::execute(config, &input, output.as_deref(), &device, place, cleanup),

        Commands::Fixed5 {
            input,
            output,
            device,
            variant,
            place,
        } => fixed5::execute(config, &input, output.as_deref(), &device, variant, place),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_with_arch() {
        let cli = Cli::try_parse_from(["qxmap", "table", "--arch", "qx4"]).unwrap();
        match cli.command {
            Commands::Table { device, paths, .. } => {
                assert_eq!(device.arch.as_deref(), Some("qx4"));
                assert!(!paths);
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn test_device_sources_are_exclusive() {
        assert!(
            Cli::try_parse_from(["qxmap", "table", "--arch", "qx4", "--graph", "g.txt"]).is_err()
        );
        assert!(Cli::try_parse_from(["qxmap", "table"]).is_err());
    }

    #[test]
    fn test_parse_route() {
        let cli = Cli::try_parse_from([
            "qxmap", "-vv", "route", "-i", "c.json", "--cache", "qx4.cache", "--place",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Route {
                input,
                device,
                place,
                cleanup,
                ..
            } => {
                assert_eq!(input, PathBuf::from("c.json"));
                assert_eq!(device.cache, Some(PathBuf::from("qx4.cache")));
                assert!(place);
                assert!(!cleanup);
            }
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn test_parse_fixed5_variant() {
        let cli = Cli::try_parse_from([
            "qxmap", "fixed5", "-i", "c.json", "--device", "qx2", "--variant", "swap",
        ])
        .unwrap();
        match cli.command {
            Commands::Fixed5 {
                device, variant, ..
            } => {
                assert_eq!(device, "qx2");
                assert_eq!(variant, Some(Variant::Swap));
            }
            _ => panic!("expected fixed5 command"),
        }
        assert!(
            Cli::try_parse_from(["qxmap", "fixed5", "-i", "c.json", "--variant", "bridge"])
                .is_err()
        );
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["qxmap", "archs", "--config", "qxmap.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("qxmap.yaml")));
    }
}
