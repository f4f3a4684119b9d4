//! Message normalization for dedup fingerprints.
//!
//! Two independent normalization schemes are used in the spec: the
//! checkpoint/diff engine's (§4.4) and verification's (§4.5). They
//! replace similar-but-not-identical token classes, so they are kept
//! as two small functions rather than one parameterized one — merging
//! them would blur the distinction spec.md draws between the two
//! consumers.

use std::sync::LazyLock;
use regex::Regex;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});
static ISO_TS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?").unwrap()
});
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4,}").unwrap());
static FILE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w./-]+:\d+").unwrap());

/// Checkpoint/diff engine fingerprint (spec §4.4): UUIDs -> `{uuid}`,
/// ISO timestamps -> `{ts}`, 4+-digit runs -> `{n}`, then truncated at
/// 200 bytes on a valid UTF-8 boundary.
#[must_use]
pub fn checkpoint_fingerprint(message: &str) -> String {
    let normalized = ISO_TS_RE.replace_all(message, "{ts}");
    let normalized = UUID_RE.replace_all(&normalized, "{uuid}");
    let normalized = DIGIT_RUN_RE.replace_all(&normalized, "{n}");
    truncate_utf8(&normalized, 200)
}

/// Verification session fingerprint (spec §4.5): UUIDs -> `[uuid]`,
/// long digit runs -> `[id]`, `file:line` -> `[file]`, ISO timestamps
/// -> `[timestamp]`.
#[must_use]
pub fn verify_fingerprint(message: &str) -> String {
    let normalized = ISO_TS_RE.replace_all(message, "[timestamp]");
    let normalized = UUID_RE.replace_all(&normalized, "[uuid]");
    let normalized = FILE_LINE_RE.replace_all(&normalized, "[file]");
    let normalized = DIGIT_RUN_RE.replace_all(&normalized, "[id]");
    normalized.into_owned()
}

/// Truncate a string at `max_bytes`, backing off to the nearest valid
/// UTF-8 char boundary rather than splitting a multi-byte character.
#[must_use]
pub fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_fingerprint_replaces_uuid_ts_and_digits() {
        let msg = "Request a3f2c1d4-5678-90ab-cdef-1234567890ab failed at 2024-01-02T03:04:05Z with code 123456";
        let fp = checkpoint_fingerprint(msg);
        assert!(fp.contains("{uuid}"));
        assert!(fp.contains("{ts}"));
        assert!(fp.contains("{n}"));
        assert!(!fp.contains("123456"));
    }

    #[test]
    fn checkpoint_fingerprint_truncates_at_char_boundary() {
        let msg = "é".repeat(150); // 2 bytes each = 300 bytes
        let fp = checkpoint_fingerprint(&msg);
        assert!(fp.len() <= 200);
        assert!(fp.is_char_boundary(fp.len()));
    }

    #[test]
    fn verify_fingerprint_replaces_file_line_and_ids() {
        let msg = "panic at src/main.rs:42 for user a3f2c1d4-5678-90ab-cdef-1234567890ab id 98765";
        let fp = verify_fingerprint(msg);
        assert!(fp.contains("[file]"));
        assert!(fp.contains("[uuid]"));
        assert!(fp.contains("[id]"));
    }
}
