use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crosspost::Poster;
use crosspost_server::{cli::Cli, logging, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = cli.poster_config();
    info!(
        target = "crosspostd",
        base_dir = %config.base_dir.display(),
        headless = config.headless,
        "starting"
    );

    let poster = Arc::new(Poster::new(config));
    let app = routes::router(poster);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(target = "crosspostd", %addr, "listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
