//! CLI argument parsing (spec §6: "Flags include `--port N`, `--bridge`,
//! `--stop`, `--check`, `--daemon`"), `clap`-derived the way
//! `turbomcp-cli::cli`/`turbomcp-proxy::cli::args` structure theirs.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gasoline", version, about = "Local developer-console observability daemon")]
pub struct Cli {
    /// Port the daemon listens on (and the bridge forwards to).
    #[arg(long, default_value_t = gasoline_server::config::DEFAULT_PORT)]
    pub port: u16,

    /// Run as the stdio<->HTTP bridge instead of the HTTP daemon.
    #[arg(long)]
    pub bridge: bool,

    /// Stop a daemon already running on `--port`.
    #[arg(long)]
    pub stop: bool,

    /// Report whether `--port` is already in use, without starting anything.
    #[arg(long)]
    pub check: bool,

    /// Run as the HTTP daemon (also the default when no other mode flag is given).
    #[arg(long)]
    pub daemon: bool,

    /// Emit `--check`'s report as JSON instead of a one-line human message.
    #[arg(long)]
    pub json: bool,

    /// Directory the temporal event graph and, if enabled, screenshots are written under.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Enable the `/screenshots` ingest endpoint, writing captures under this directory.
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_matches_the_daemon_default() {
        let cli = Cli::parse_from(["gasoline"]);
        assert_eq!(cli.port, gasoline_server::config::DEFAULT_PORT);
        assert!(!cli.bridge && !cli.stop && !cli.check && !cli.daemon);
    }

    #[test]
    fn flags_parse_independently() {
        let cli = Cli::parse_from(["gasoline", "--port", "9000", "--check", "--json"]);
        assert_eq!(cli.port, 9000);
        assert!(cli.check);
        assert!(cli.json);
        assert!(!cli.bridge);
    }
}
