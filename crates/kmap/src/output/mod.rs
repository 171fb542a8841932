//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - `json`: JSON serialization for programmatic output

pub mod color;
mod json;

use crate::domain::{Edge, Node, NodeId};
use crate::graph::Graph;
use crate::loader::LoadWarning;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{arrow, bold, colorize_id, dimmed, edge_flags};
use json::{write_edges_json, write_nodes_json, write_path_json, write_summary_json};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only glyphs instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `KMAP_ASCII`: Set to "1" or "true" for ASCII-only glyphs (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `KMAP_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("KMAP_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "KMAP_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR (https://no-color.org/), with KMAP_COLOR for explicit control
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("KMAP_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Counts describing a loaded graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    /// Graph title, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of concepts
    pub concepts: usize,
    /// Number of dependency edges
    pub dependencies: usize,
    /// Edges made redundant by another path
    pub transitive: usize,
    /// Edges that closed a cycle
    pub cyclic: usize,
}

impl GraphSummary {
    /// Summarize `graph`.
    #[must_use]
    pub fn of(graph: &Graph) -> Self {
        let edges = graph.edges();
        Self {
            title: graph.meta().title.clone(),
            concepts: graph.node_count(),
            dependencies: edges.len(),
            transitive: edges.iter().filter(|edge| edge.is_transitive).count(),
            cyclic: edges.iter().filter(|edge| edge.causes_cycle).count(),
        }
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print the summary of a loaded graph
pub fn print_summary(
    summary: &GraphSummary,
    warnings: &[LoadWarning],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_summary_text(&mut handle, summary, warnings, &config),
        OutputMode::Json => write_summary_json(&mut handle, summary, warnings),
    }
}

/// Print an ordered list of concepts
pub fn print_nodes(heading: &str, nodes: &[&Node], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_nodes_text(&mut handle, heading, nodes, &config),
        OutputMode::Json => write_nodes_json(&mut handle, nodes),
    }
}

/// Print a list of dependency edges
pub fn print_edges(heading: &str, edges: &[&Edge], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_edges_text(&mut handle, heading, edges, &config),
        OutputMode::Json => write_edges_json(&mut handle, edges),
    }
}

/// Print a reachability answer
pub fn print_path(from: &NodeId, to: &NodeId, reachable: bool, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_path_text(&mut handle, from, to, reachable, &config),
        OutputMode::Json => write_path_json(&mut handle, from, to, reachable),
    }
}

/// Print load warnings to stderr (text mode only; JSON carries them inline)
pub fn print_warnings(warnings: &[LoadWarning]) -> io::Result<()> {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let config = OutputConfig::from_env();
    write_warnings_text(&mut handle, warnings, &config)
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_summary_text<W: Write>(
    w: &mut W,
    summary: &GraphSummary,
    warnings: &[LoadWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    if let Some(title) = &summary.title {
        writeln!(w, "{}", bold(title, config))?;
    }
    writeln!(
        w,
        "{} {}",
        dimmed("Concepts:    ", config),
        summary.concepts
    )?;
    writeln!(
        w,
        "{} {} ({} transitive, {} cyclic)",
        dimmed("Dependencies:", config),
        summary.dependencies,
        summary.transitive,
        summary.cyclic
    )?;

    if warnings.is_empty() {
        writeln!(w, "{}", success("No edges skipped.", config))?;
    } else {
        write_warnings_text(w, warnings, config)?;
    }
    Ok(())
}

fn write_nodes_text<W: Write>(
    w: &mut W,
    heading: &str,
    nodes: &[&Node],
    config: &OutputConfig,
) -> io::Result<()> {
    if nodes.is_empty() {
        writeln!(w, "No concepts found.")?;
        return Ok(());
    }

    writeln!(w, "{} ({}):", bold(heading, config), nodes.len())?;
    for (position, node) in nodes.iter().enumerate() {
        writeln!(
            w,
            "{:>4}. {}  {}",
            position + 1,
            colorize_id(node.id.as_str(), config),
            node.title
        )?;
    }
    Ok(())
}

fn write_edges_text<W: Write>(
    w: &mut W,
    heading: &str,
    edges: &[&Edge],
    config: &OutputConfig,
) -> io::Result<()> {
    if edges.is_empty() {
        writeln!(w, "No dependencies found.")?;
        return Ok(());
    }

    writeln!(w, "{} ({}):", bold(heading, config), edges.len())?;
    for edge in edges {
        let flags = edge_flags(edge.is_transitive, edge.causes_cycle, config);
        let line = format!(
            "  {} {} {}  {}",
            colorize_id(edge.source.as_str(), config),
            arrow(config),
            colorize_id(edge.target.as_str(), config),
            flags
        );
        writeln!(w, "{}", line.trim_end())?;
        if let Some(reason) = &edge.reason {
            writeln!(w, "      {} {reason}", dimmed("reason:", config))?;
        }
    }
    Ok(())
}

fn write_path_text<W: Write>(
    w: &mut W,
    from: &NodeId,
    to: &NodeId,
    reachable: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    let verdict = if reachable {
        success("reachable", config)
    } else {
        error("not reachable", config)
    };
    writeln!(
        w,
        "{} {} {}: {verdict}",
        colorize_id(from.as_str(), config),
        arrow(config),
        colorize_id(to.as_str(), config)
    )
}

fn write_warnings_text<W: Write>(
    w: &mut W,
    warnings: &[LoadWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    for item in warnings {
        writeln!(w, "{} {item}", warning("warning:", config))?;
    }
    Ok(())
}
