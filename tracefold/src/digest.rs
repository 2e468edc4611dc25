//! Stable digests of reduced traces, for de-duplicating paths that reduce
//! to the same shape.

use sha2::{Digest, Sha256};

/// Returns the lowercase-hex SHA-256 of a reduced trace's text.
///
/// Reduction is deterministic, so equal digests mean equal reduced traces.
#[must_use]
pub fn trace_digest(reduced: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(reduced.as_bytes());
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            use std::fmt::Write;
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
