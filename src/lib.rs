//! # simswap-network - SIM Swap Transaction Network Builder
//!
//! A tool for turning telecom SIM-swap / PIN-reset transaction exports
//! into an interactive network visualization.
//!
//! ## Overview
//!
//! The pipeline runs in three stages:
//!
//! 1. **Loader** - reads the `;`-delimited export, selects the analysis
//!    columns, and derives the before/after-reset indicator per row
//! 2. **Graph builder** - assembles an undirected multigraph with one
//!    node per account and one edge per transaction
//! 3. **Renderer** - computes a seeded force-directed layout and writes
//!    a self-contained interactive HTML file
//!
//! ## Usage
//!
//! ```bash
//! # Visualize an export
//! simswap-network exports/TZ_28_Aug.csv
//!
//! # Print a text summary alongside the HTML output
//! simswap-network --summary exports/TZ_28_Aug.csv
//!
//! # Reproducible layout with an explicit seed
//! simswap-network --seed 7 exports/TZ_28_Aug.csv
//! ```
//!
//! The output file is always `TZ_SimSwap_Network.html` in the working
//! directory.

pub mod config;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod render;
pub mod report;

pub use config::{ConfigError, SimSwapConfig, load_config};
pub use graph::{GraphError, TransactionEdge, TransactionGraph, build_graph};
pub use layout::{DEFAULT_ITERATIONS, DEFAULT_SEED, Position, spring_layout};
pub use loader::{
    LoaderError, SchemaError, TransactionRecord, TransactionTable, load_transactions,
};
pub use render::{
    NodeCategory, OUTPUT_FILE, PLOT_TITLE, RenderError, RenderOptions, render_network, render_to,
};
pub use report::generate_summary;
