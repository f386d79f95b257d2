//! simswap-network CLI - SIM Swap Network Visualizer
//!
//! Loads a `;`-delimited SIM-swap transaction export, builds the
//! account network, and writes an interactive HTML visualization.
//!
//! Usage:
//!   simswap-network [OPTIONS] [INPUT]

use std::env;
use std::io::stdout;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use thiserror::Error;

use simswap_network::{
    RenderOptions, SimSwapConfig, build_graph, generate_summary, layout, load_config,
    load_transactions, render_network,
};

/// Environment variable consulted when no input path is given on the
/// command line.
const INPUT_ENV: &str = "SIMSWAP_INPUT";

/// simswap-network - Visualize SIM-swap and PIN-reset transaction networks
#[derive(Parser, Debug)]
#[command(name = "simswap-network")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the `;`-delimited transaction export
    /// (falls back to $SIMSWAP_INPUT, then to the config file)
    input: Option<PathBuf>,

    /// Config file directory (default: search for .simswap.toml from
    /// the current directory upward)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for the force-directed layout
    #[arg(long)]
    seed: Option<u64>,

    /// Number of layout iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Print a text summary of the network to stdout
    #[arg(short, long)]
    summary: bool,

    /// Open the generated HTML in the default browser
    #[arg(long)]
    open: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show timing information
    #[arg(long)]
    timing: bool,
}

/// Invocation errors detected before the pipeline starts
#[derive(Error, Debug)]
enum CliError {
    #[error(
        "no input CSV given. Pass a file path, set SIMSWAP_INPUT, or add [input] path to .simswap.toml"
    )]
    MissingInput,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let total_start = Instant::now();

    // Load configuration file
    let config_start = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let config = match load_config(&config_start) {
        Ok(config) => config,
        Err(e) => {
            if cli.verbose {
                eprintln!("Note: No config file loaded: {}", e);
            }
            SimSwapConfig::default()
        }
    };

    // Resolve the input path: CLI, then environment, then config.
    let input = cli
        .input
        .clone()
        .or_else(|| env::var_os(INPUT_ENV).map(PathBuf::from))
        .or_else(|| config.input.path.clone())
        .ok_or(CliError::MissingInput)?;

    // CLI args override config, which overrides defaults.
    let options = RenderOptions {
        seed: cli
            .seed
            .or(config.layout.seed)
            .unwrap_or(layout::DEFAULT_SEED),
        iterations: cli
            .iterations
            .or(config.layout.iterations)
            .unwrap_or(layout::DEFAULT_ITERATIONS),
    };

    if cli.verbose {
        eprintln!(
            "Layout: seed={}, iterations={}",
            options.seed, options.iterations
        );
    }

    eprintln!("Loading transactions from '{}'...", input.display());

    let load_start = Instant::now();
    let table = load_transactions(&input)?;
    if cli.timing {
        eprintln!(
            "Loaded {} transactions (took {:.2?})",
            table.len(),
            load_start.elapsed()
        );
    } else {
        eprintln!("Loaded {} transactions", table.len());
    }

    let graph = build_graph(&table)?;
    eprintln!(
        "Network: {} accounts, {} transactions\n",
        graph.node_count(),
        graph.edge_count()
    );

    if cli.summary {
        generate_summary(&graph, &mut stdout())?;
    }

    let render_start = Instant::now();
    let output = render_network(&graph, &options)?;
    if cli.timing {
        eprintln!(
            "Network written to: {} (took {:.2?})",
            output.display(),
            render_start.elapsed()
        );
    } else {
        eprintln!("Network written to: {}", output.display());
    }

    if cli.open {
        if let Err(e) = open::that(&output) {
            eprintln!("Warning: Could not open browser: {}", e);
            eprintln!("Please open {} manually", output.display());
        }
    }

    if cli.timing {
        eprintln!("Total time: {:.2?}", total_start.elapsed());
    }

    Ok(())
}
