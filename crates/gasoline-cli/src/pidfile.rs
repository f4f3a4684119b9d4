//! Tracks which process owns a port: `--daemon` writes its pid here on
//! start and removes it on a graceful exit; `--stop`/`--check` read it.
//! Not part of spec.md's data model (which excludes "persistence beyond
//! append-only event log and checkpoint store") — this file is process
//! bookkeeping, not daemon state, the way a dev-server lockfile is.

use std::io;
use std::path::PathBuf;

fn path(port: u16) -> PathBuf {
    std::env::temp_dir().join(format!("gasoline-{port}.pid"))
}

pub fn write(port: u16) -> io::Result<()> {
    std::fs::write(path(port), std::process::id().to_string())
}

pub fn read(port: u16) -> Option<u32> {
    std::fs::read_to_string(path(port)).ok().and_then(|s| s.trim().parse().ok())
}

pub fn remove(port: u16) {
    let _ = std::fs::remove_file(path(port));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_write_read_remove() {
        let port = 51_234;
        remove(port);
        assert_eq!(read(port), None);
        write(port).unwrap();
        assert_eq!(read(port), Some(std::process::id()));
        remove(port);
        assert_eq!(read(port), None);
    }
}
