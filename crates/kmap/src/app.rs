//! Application context for CLI command execution.
//!
//! `App` resolves configuration, builds the graph and loads one dataset
//! file into it. Commands then query the loaded graph.
//!
//! # Example
//!
//! ```no_run
//! use kmap::app::{App, Settings};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::load(Path::new("concepts.json"), &Settings::default()).await?;
//!     println!("{} concepts", app.graph().node_count());
//!     Ok(())
//! }
//! ```

use crate::config::{KmapConfig, find_config, validate_id_length};
use crate::domain::NodeId;
use crate::error::Result;
use crate::graph::{Graph, GraphMeta};
use crate::loader::{LoadReport, load_dataset, load_subgraph, read_dataset};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Explicit config file; otherwise `kmap.yaml` is searched for
    pub config_path: Option<PathBuf>,

    /// Force cycle acceptance on
    pub allow_cycles: bool,

    /// Override the generated id length
    pub id_length: Option<usize>,
}

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    graph: Graph,
    report: LoadReport,
    config: KmapConfig,
}

impl App {
    /// Load `dataset_path` into a graph configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file can't be read or is invalid
    /// - The dataset can't be read or parsed
    /// - The dataset holds duplicate ids or dangling dependency sources
    pub async fn load(dataset_path: &Path, settings: &Settings) -> Result<Self> {
        let config = resolve_config(dataset_path, settings).await?;

        let mut graph = Graph::new(config.graph_config());
        let dataset = read_dataset(dataset_path).await?;
        let report = load_dataset(&mut graph, dataset)?;

        // Config metadata fills in what the dataset didn't carry
        if graph.meta().id.is_none() && graph.meta().title.is_none() {
            graph.set_meta(config.graph_meta());
        }

        Ok(Self {
            graph,
            report,
            config,
        })
    }

    /// Load only `target` and its ancestor closure from `dataset_path`.
    ///
    /// # Errors
    ///
    /// Same as [`App::load`], plus `Error::UnknownNode` if `target` is not
    /// in the dataset.
    pub async fn load_subgraph(
        dataset_path: &Path,
        target: &NodeId,
        settings: &Settings,
    ) -> Result<Self> {
        let config = resolve_config(dataset_path, settings).await?;

        let mut graph = Graph::new(config.graph_config());
        let (meta, records) = read_dataset(dataset_path).await?.into_parts();
        let report = load_subgraph(&mut graph, &records, target)?;

        graph.set_meta(GraphMeta {
            id: None,
            title: meta.title.or_else(|| config.graph_meta().title),
        });

        Ok(Self {
            graph,
            report,
            config,
        })
    }

    /// The loaded graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// What the load inserted and skipped.
    #[must_use]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &KmapConfig {
        &self.config
    }
}

async fn resolve_config(dataset_path: &Path, settings: &Settings) -> Result<KmapConfig> {
    let discovered = match &settings.config_path {
        Some(path) => Some(path.clone()),
        None => {
            // The upward walk needs an absolute start
            let dataset_path = std::env::current_dir()?.join(dataset_path);
            dataset_path.parent().and_then(find_config)
        }
    };

    let mut config = match discovered {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            KmapConfig::load(&path).await?
        }
        None => KmapConfig::default(),
    };

    if settings.allow_cycles {
        config.allow_cycles = true;
    }
    if let Some(length) = settings.id_length {
        validate_id_length(length)?;
        config.id_length = length;
    }
    Ok(config)
}
