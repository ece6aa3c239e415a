//! Shared test utilities for the asterix workspace.
//!
//! This crate provides common helpers for loading XML fixtures and for
//! assembling ASTERIX wire frames byte-by-byte in tests.

use std::fs;
use std::path::PathBuf;

/// Returns the path to the workspace-level testdata directory.
///
/// This resolves the path relative to the workspace root, not the
/// individual crate.
pub fn testdata_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR points to the crate using this library, so we
    // need to find the workspace root by looking for testdata/.
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let candidates = [
        manifest_dir.join("../testdata"),
        manifest_dir.join("../../testdata"),
        manifest_dir.join("testdata"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return candidate.canonicalize().unwrap_or_else(|_| candidate.clone());
        }
    }

    manifest_dir.join("../testdata")
}

/// Returns the path to a fixture file.
///
/// # Arguments
///
/// * `kind` - "valid" or "invalid"
/// * `filename` - Name of the XML file (e.g., "cat048.xml")
pub fn fixture_path(kind: &str, filename: &str) -> PathBuf {
    testdata_dir().join(kind).join(filename)
}

/// Loads an XML fixture file from the testdata directory.
///
/// # Panics
///
/// Panics if the file cannot be read.
pub fn load_fixture(kind: &str, filename: &str) -> String {
    let path = fixture_path(kind, filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Assembles one ASTERIX data block: CAT, big-endian LEN (header
/// inclusive), then the record payload.
pub fn data_block(cat: u8, payload: &[u8]) -> Vec<u8> {
    let len = (payload.len() + 3) as u16;
    let mut out = Vec::with_capacity(payload.len() + 3);
    out.push(cat);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Concatenates several frames into one buffer.
pub fn concat(frames: &[Vec<u8>]) -> Vec<u8> {
    frames.iter().flatten().copied().collect()
}

/// Parses a whitespace-separated hex string (`"30 00 09"`) into bytes.
///
/// # Panics
///
/// Panics on non-hex input; fixtures are spelled out in tests.
pub fn hex(s: &str) -> Vec<u8> {
    s.split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap_or_else(|e| panic!("bad hex byte '{b}': {e}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_block_header() {
        let block = data_block(48, &[0x80, 0x01, 0x02]);
        assert_eq!(block, vec![0x30, 0x00, 0x06, 0x80, 0x01, 0x02]);
    }

    #[test]
    fn data_block_empty_payload() {
        assert_eq!(data_block(34, &[]), vec![0x22, 0x00, 0x03]);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(hex("30 00 09 ab"), vec![0x30, 0x00, 0x09, 0xAB]);
        assert_eq!(hex(""), Vec::<u8>::new());
    }

    #[test]
    fn concat_frames() {
        let a = vec![1, 2];
        let b = vec![3];
        assert_eq!(concat(&[a, b]), vec![1, 2, 3]);
    }
}
