use anyhow::Result;
use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use hindsight_mcp::config::{self, Cli};
use hindsight_mcp::RecallService;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // stdout carries the MCP protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hindsight=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = config::resolve_projects_root(cli.projects_dir.as_deref());
    tracing::info!(root = %root.display(), "starting hindsight MCP server");

    let service = RecallService::new(root);
    let server = service.serve(stdio()).await?;
    server.waiting().await?;
    Ok(())
}
