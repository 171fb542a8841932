//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use super::validators::validate_node_id;

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,
}

/// Arguments for the `topo` command
#[derive(Parser, Debug, Clone)]
pub struct TopoArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,
}

/// Arguments for the `path` command
#[derive(Parser, Debug, Clone)]
pub struct PathArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,

    /// Starting concept (the prerequisite side)
    #[arg(value_parser = validate_node_id)]
    pub from: String,

    /// Destination concept (the dependent side)
    #[arg(value_parser = validate_node_id)]
    pub to: String,
}

/// Arguments for the `transitive` command
#[derive(Parser, Debug, Clone)]
pub struct TransitiveArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,
}

/// Arguments for the `ancestors` command
#[derive(Parser, Debug, Clone)]
pub struct AncestorsArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,

    /// Concept whose ancestors to list
    #[arg(value_parser = validate_node_id)]
    pub id: String,
}

/// Arguments for the `unique-deps` command
#[derive(Parser, Debug, Clone)]
pub struct UniqueDepsArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,

    /// Concept whose minimal prerequisites to list
    #[arg(value_parser = validate_node_id)]
    pub id: String,

    /// Treat these concepts as already satisfied (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

/// Arguments for the `subgraph` command
#[derive(Parser, Debug, Clone)]
pub struct SubgraphArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,

    /// Concept whose ancestor closure to extract
    #[arg(value_parser = validate_node_id)]
    pub target: String,

    /// Write the export here instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `export` command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Dataset file (node-record array or export object)
    pub file: PathBuf,

    /// Write the export here instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
