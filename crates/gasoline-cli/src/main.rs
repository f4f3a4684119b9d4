//! `gasoline` binary: the CLI surface from spec §6, dispatching to
//! `gasoline_bridge::run` (stdio bridge), `gasoline_server::serve` (HTTP
//! daemon), or the local `--check`/`--stop` commands. Structured like
//! `turbomcp_cli::run_cli` (parse, build a `Runtime`, `block_on` the
//! chosen mode) rather than `#[tokio::main]`, since `--check`/`--stop`
//! have no need for an async runtime at all.

mod cli;
mod commands;
mod pidfile;

use clap::Parser;
use cli::Cli;
use gasoline_server::ServerConfig;
use tokio::runtime::Runtime;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.check {
        commands::check(cli.port, cli.json);
        return;
    }

    if cli.stop {
        std::process::exit(commands::stop(cli.port));
    }

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("gasoline: failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    let result =
        if cli.bridge { rt.block_on(run_bridge(cli.port)) } else { rt.block_on(run_daemon(&cli)) };

    if let Err(err) = result {
        eprintln!("gasoline: {err}");
        std::process::exit(1);
    }
}

async fn run_bridge(port: u16) -> std::io::Result<()> {
    gasoline_bridge::run(gasoline_bridge::BridgeConfig::new(port)).await
}

async fn run_daemon(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = pidfile::write(cli.port) {
        tracing::warn!(%err, "failed to write pid file; --stop/--check won't see this daemon");
    }

    let config = ServerConfig {
        port: cli.port,
        project_root: cli.project_root.clone(),
        screenshot_dir: cli.screenshot_dir.clone(),
        ..ServerConfig::default()
    };

    let result = gasoline_server::serve(config).await;
    pidfile::remove(cli.port);
    result.map_err(Into::into)
}
