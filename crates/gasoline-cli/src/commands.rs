//! `--check`/`--stop` implementations (spec §6). `--bridge`/`--daemon`
//! are driven straight from `main.rs` since they just hand off to
//! `gasoline_bridge::run`/`gasoline_server::serve`.

use crate::pidfile;
use serde::Serialize;
use std::net::TcpListener;

#[derive(Debug, Serialize)]
pub struct PortReport {
    pub port: u16,
    pub in_use: bool,
    pub pid: Option<u32>,
}

#[must_use]
pub fn port_in_use(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_err()
}

/// `--check`: report whether `port` is already bound, in a dual
/// text/JSON shape (spec §6 port-conflict report).
pub fn check(port: u16, json: bool) -> PortReport {
    let report = PortReport { port, in_use: port_in_use(port), pid: pidfile::read(port) };
    if json {
        println!("{}", serde_json::to_string(&report).unwrap_or_default());
    } else if report.in_use {
        match report.pid {
            Some(pid) => println!("port {port} is in use (pid {pid})"),
            None => println!("port {port} is in use"),
        }
    } else {
        println!("port {port} is available");
    }
    report
}

/// `--stop`: send `SIGTERM` to the pid recorded for `port`. Exits 0
/// whether or not a daemon was actually found — a missing daemon is
/// already the state `--stop` wants (spec §6 "exit code 0 on graceful
/// shutdown").
pub fn stop(port: u16) -> i32 {
    let Some(pid) = pidfile::read(port) else {
        println!("no daemon recorded for port {port}");
        return 0;
    };

    #[cfg(unix)]
    {
        let status = std::process::Command::new("kill").arg("-TERM").arg(pid.to_string()).status();
        match status {
            Ok(status) if status.success() => println!("stopped daemon on port {port} (pid {pid})"),
            _ => println!("daemon on port {port} (pid {pid}) was already gone"),
        }
    }
    #[cfg(not(unix))]
    {
        println!("--stop needs a signal-capable OS; remove the stale pid file manually");
    }

    pidfile::remove(port);
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_zero_lets_the_os_pick_so_it_is_never_in_use() {
        let report = check(0, true);
        assert!(!report.in_use);
    }

    #[test]
    fn a_bound_port_is_reported_in_use() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(port_in_use(port));
        drop(listener);
    }

    #[test]
    fn stopping_an_unknown_port_still_exits_clean() {
        assert_eq!(stop(51_999), 0);
    }
}
