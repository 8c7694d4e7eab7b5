//! # Search Server - Entry Point
//! src/main.rs
//!
//! Indexa el directorio raíz y atiende consultas hasta que se mata el
//! proceso. El nivel de log se controla con `RUST_LOG` (por defecto `info`).

use anyhow::Context;
use clap::Parser;
use search_server::config::Config;
use search_server::server::Server;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let config = Config::parse();
    config.print_summary();

    let root = config.root.display().to_string();
    let mut server =
        Server::new(config).with_context(|| format!("no se pudo iniciar el servidor sobre {}", root))?;

    server.run().context("el accept loop terminó con error")?;
    Ok(())
}
