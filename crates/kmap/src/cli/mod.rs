//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for kmap using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `check`: Load a dataset and report counts and skipped edges
//! - `topo`: Print the topological order
//! - `path`: Test reachability between two concepts
//! - `transitive`: List redundant edges
//! - `ancestors`: List every prerequisite of a concept
//! - `unique-deps`: List a concept's minimal prerequisites
//! - `subgraph`: Extract the ancestor closure of a concept
//! - `export`: Re-classify and write the normalized export
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--allow-cycles`: Keep cycle-inducing edges instead of skipping them
//! - `--config`: Use this config file instead of searching for `kmap.yaml`
//!
//! # Example
//!
//! ```bash
//! kmap check concepts.json
//! kmap --json topo concepts.json
//! kmap path concepts.json limits derivatives
//! kmap subgraph concepts.json chain-rule -o chain-rule.json
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Re-export argument structs
pub use args::{
    AncestorsArgs, CheckArgs, ExportArgs, PathArgs, SubgraphArgs, TopoArgs, TransitiveArgs,
    UniqueDepsArgs,
};

// Re-export validators for external use
pub use validators::{validate_id_length, validate_node_id};

use crate::app::Settings;
use crate::output::OutputMode;

/// Kmap - a concept-dependency graph engine
///
/// Load a dataset of concepts and their prerequisites, then query ordering,
/// reachability and redundancy.
#[derive(Parser, Debug)]
#[command(name = "kmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Accept cycle-inducing edges (flagged) instead of skipping them
    #[arg(long, global = true)]
    pub allow_cycles: bool,

    /// Config file (default: nearest kmap.yaml above the dataset)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Length of generated ids for concepts and edges without one
    #[arg(long, global = true, value_parser = validate_id_length)]
    pub id_length: Option<usize>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load a dataset and report what it contains
    ///
    /// Prints concept and dependency counts, how many edges are transitive,
    /// and every edge skipped as a self-loop or cycle.
    Check(CheckArgs),

    /// Print concepts in dependency order
    ///
    /// Every concept appears after all of its direct prerequisites.
    Topo(TopoArgs),

    /// Test whether one concept leads to another
    Path(PathArgs),

    /// List dependencies made redundant by another path
    Transitive(TransitiveArgs),

    /// List every prerequisite of a concept, direct or not
    Ancestors(AncestorsArgs),

    /// List a concept's minimal set of prerequisites
    ///
    /// Drops any direct prerequisite that another direct prerequisite
    /// already depends on.
    UniqueDeps(UniqueDepsArgs),

    /// Extract the ancestor closure of a concept
    ///
    /// Only the target and the concepts it transitively depends on are
    /// loaded; the result is written in the export format.
    Subgraph(SubgraphArgs),

    /// Normalize a dataset into the export format
    ///
    /// Re-derives every transitive and cycle flag, assigns missing ids and
    /// writes concepts plus a flat dependency list.
    Export(ExportArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Overrides for configuration resolution
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            config_path: self.config.clone(),
            allow_cycles: self.allow_cycles,
            id_length: self.id_length,
        }
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any load, query or output error.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };
        let settings = self.settings();

        match &self.command {
            Some(Commands::Check(args)) => execute::execute_check(args, &settings, output_mode).await,
            Some(Commands::Topo(args)) => execute::execute_topo(args, &settings, output_mode).await,
            Some(Commands::Path(args)) => execute::execute_path(args, &settings, output_mode).await,
            Some(Commands::Transitive(args)) => {
                execute::execute_transitive(args, &settings, output_mode).await
            }
            Some(Commands::Ancestors(args)) => {
                execute::execute_ancestors(args, &settings, output_mode).await
            }
            Some(Commands::UniqueDeps(args)) => {
                execute::execute_unique_deps(args, &settings, output_mode).await
            }
            Some(Commands::Subgraph(args)) => execute::execute_subgraph(args, &settings).await,
            Some(Commands::Export(args)) => execute::execute_export(args, &settings).await,
            None => {
                println!("Kmap concept-dependency graph engine");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
