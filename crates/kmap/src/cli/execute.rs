//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Each one
//! loads its dataset through [`App`] and hands results to [`crate::output`].

use anyhow::Result;
use std::path::Path;

use super::args::{
    AncestorsArgs, CheckArgs, ExportArgs, PathArgs, SubgraphArgs, TopoArgs, TransitiveArgs,
    UniqueDepsArgs,
};
use crate::app::{App, Settings};
use crate::domain::{Node, NodeId};
use crate::loader::{export, write_export};
use crate::output::{self, GraphSummary, OutputConfig, OutputMode};

/// Load the dataset and surface skipped edges on stderr.
async fn load_app(file: &Path, settings: &Settings, output_mode: OutputMode) -> Result<App> {
    let app = App::load(file, settings).await?;
    if output_mode == OutputMode::Text {
        output::print_warnings(&app.report().warnings)?;
    }
    Ok(app)
}

/// Resolve ids to nodes, preserving order and skipping unknown ids.
fn resolve<'a>(app: &'a App, ids: &[NodeId]) -> Vec<&'a Node> {
    ids.iter().filter_map(|id| app.graph().node(id)).collect()
}

/// Execute the check command
pub async fn execute_check(args: &CheckArgs, settings: &Settings, output_mode: OutputMode) -> Result<()> {
    let app = App::load(&args.file, settings).await?;
    let summary = GraphSummary::of(app.graph());
    output::print_summary(&summary, &app.report().warnings, output_mode)?;
    Ok(())
}

/// Execute the topo command
pub async fn execute_topo(args: &TopoArgs, settings: &Settings, output_mode: OutputMode) -> Result<()> {
    let app = load_app(&args.file, settings, output_mode).await?;
    let nodes = resolve(&app, app.graph().topo_sort());
    output::print_nodes("Dependency order", &nodes, output_mode)?;
    Ok(())
}

/// Execute the path command
pub async fn execute_path(args: &PathArgs, settings: &Settings, output_mode: OutputMode) -> Result<()> {
    let app = load_app(&args.file, settings, output_mode).await?;
    let from = NodeId::new(&args.from);
    let to = NodeId::new(&args.to);

    let reachable = app.graph().is_path_between(&from, &to)?;
    output::print_path(&from, &to, reachable, output_mode)?;
    Ok(())
}

/// Execute the transitive command
pub async fn execute_transitive(
    args: &TransitiveArgs,
    settings: &Settings,
    output_mode: OutputMode,
) -> Result<()> {
    let app = load_app(&args.file, settings, output_mode).await?;
    let transitive: Vec<_> = app
        .graph()
        .edges()
        .into_iter()
        .filter(|edge| edge.is_transitive)
        .collect();
    output::print_edges("Transitive dependencies", &transitive, output_mode)?;
    Ok(())
}

/// Execute the ancestors command
///
/// Ancestors are listed in dependency order.
pub async fn execute_ancestors(
    args: &AncestorsArgs,
    settings: &Settings,
    output_mode: OutputMode,
) -> Result<()> {
    let app = load_app(&args.file, settings, output_mode).await?;
    let id = NodeId::new(&args.id);

    let ancestors = app.graph().ancestors(&id)?;
    let ordered: Vec<NodeId> = app
        .graph()
        .topo_sort()
        .iter()
        .filter(|candidate| ancestors.contains(*candidate))
        .cloned()
        .collect();

    let heading = format!("Ancestors of {id}");
    output::print_nodes(&heading, &resolve(&app, &ordered), output_mode)?;
    Ok(())
}

/// Execute the unique-deps command
pub async fn execute_unique_deps(
    args: &UniqueDepsArgs,
    settings: &Settings,
    output_mode: OutputMode,
) -> Result<()> {
    let app = load_app(&args.file, settings, output_mode).await?;
    let id = NodeId::new(&args.id);

    let not_excluded = |node: &Node| !args.exclude.iter().any(|ex| ex == node.id.as_str());
    let unique = app.graph().unique_deps(&id, &not_excluded)?;

    let heading = format!("Minimal prerequisites of {id}");
    output::print_nodes(&heading, &resolve(&app, &unique), output_mode)?;
    Ok(())
}

/// Execute the subgraph command
///
/// The export always goes to stdout or the output file as JSON.
pub async fn execute_subgraph(args: &SubgraphArgs, settings: &Settings) -> Result<()> {
    let target = NodeId::new(&args.target);
    let app = App::load_subgraph(&args.file, &target, settings).await?;
    output::print_warnings(&app.report().warnings)?;

    emit_export(&app, args.output.as_deref()).await
}

/// Execute the export command
pub async fn execute_export(args: &ExportArgs, settings: &Settings) -> Result<()> {
    let app = App::load(&args.file, settings).await?;
    output::print_warnings(&app.report().warnings)?;

    emit_export(&app, args.output.as_deref()).await
}

async fn emit_export(app: &App, output_path: Option<&Path>) -> Result<()> {
    let exported = export(app.graph());
    match output_path {
        Some(path) => {
            write_export(path, &exported).await?;
            let config = OutputConfig::from_env();
            eprintln!(
                "{} {} concepts to {}",
                output::success("Wrote", &config),
                exported.concepts.len(),
                path.display()
            );
        }
        None => output::print_json(&exported)?,
    }
    Ok(())
}
