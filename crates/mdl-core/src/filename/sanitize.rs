//! Synthesized fallback names for downloads with no usable filename.

use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum extension length (without the dot) carried into a synthesized name.
const MAX_EXT_LEN: usize = 6;

/// Builds a `download_<8-hex>` name from the wall clock, carrying over a
/// sanitized extension from `original` when one survives sanitization.
pub fn synthesize_filename(original: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32)
        .unwrap_or(0);
    let ext = sanitize_extension(original).unwrap_or_else(|| ".file".to_string());
    format!("download_{:08x}{}", nanos, ext)
}

/// Extracts and sanitizes an extension (with leading dot) from a basename.
///
/// The extension must be 1 to 6 characters of `[A-Za-z0-9_-]` after dropping
/// everything else; reserved URL/path characters never survive.
pub fn sanitize_extension(basename: &str) -> Option<String> {
    let (_, raw) = basename.rsplit_once('.')?;
    let clean: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if clean.is_empty() || clean.len() > MAX_EXT_LEN {
        return None;
    }
    Some(format!(".{}", clean))
}
