//! Kmap CLI binary.

use anyhow::Result;
use kmap::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the kmap CLI.
///
/// Uses tokio's `current_thread` runtime; the engine is single-threaded and
/// the only I/O is reading and writing dataset files.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Example: RUST_LOG=kmap=debug kmap topo concepts.json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kmap=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting kmap CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Kmap CLI completed successfully");
    Ok(())
}
