use anyhow::Context;
use clap::Parser;

use quill::config::{Cli, Config};
use quill::server;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level()?)
        .init();

    tracing::info!(
        workers = cfg.server.workers,
        root = %cfg.static_files.root.display(),
        "Starting quill"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.server.workers)
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(server::run(&cfg))?;

    tracing::info!("Server stopped");
    Ok(())
}
