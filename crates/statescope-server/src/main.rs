//! statescope server binary
//!
//! Web front end for browsing Terraform state backends.
//!
//! ## Usage
//!
//! ```bash
//! statescope-server [--listen ADDR] [--config PATH]
//! ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use statescope_server::app::build_router;
use statescope_server::config::{build_backends, parse_backend_configs};

const DEFAULT_LISTEN: &str = "127.0.0.1:6060";
const DEFAULT_CONFIG: &str = "backends.json";

fn print_usage() {
    eprintln!(
        r#"statescope-server - web front end for browsing Terraform state backends

USAGE:
    statescope-server [OPTIONS]

OPTIONS:
    --listen <ADDR>               Listen address (default: {DEFAULT_LISTEN})
    --config <PATH>               Backend config file (default: {DEFAULT_CONFIG})
    --help, -h                    Show this help

CONFIG:
    A JSON array of named backends. Each entry has a "name", a "type"
    ("local" or "s3"), and type-specific "connection_info":

    [
      {{"name": "local_1", "type": "local", "connection_info": {{"root": "/srv/state"}}}},
      {{"name": "aws1", "type": "s3", "connection_info": {{"bucket_name": "team-tfstate"}}}}
    ]
"#
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut listen = DEFAULT_LISTEN.to_string();
    let mut config = DEFAULT_CONFIG.to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "--listen" => match args.next() {
                Some(addr) => listen = addr,
                None => {
                    eprintln!("--listen requires an address");
                    return ExitCode::FAILURE;
                }
            },
            "--config" => match args.next() {
                Some(path) => config = path,
                None => {
                    eprintln!("--config requires a path");
                    return ExitCode::FAILURE;
                }
            },
            other => {
                eprintln!("unknown argument: {other}");
                print_usage();
                return ExitCode::FAILURE;
            }
        }
    }

    match run(&config, &listen).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("statescope-server: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: &str, listen: &str) -> anyhow::Result<()> {
    let raw = tokio::fs::read(config_path)
        .await
        .with_context(|| format!("could not read backend config {config_path}"))?;
    let configs = parse_backend_configs(&raw)?;
    let backends = build_backends(configs).await?;
    info!(backends = ?backends.names(), "loaded backends");

    let router = build_router(Arc::new(backends));
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("could not bind {listen}"))?;
    info!(addr = %listen, "listening");

    axum::serve(listener, router)
        .await
        .context("server exited")?;
    Ok(())
}
