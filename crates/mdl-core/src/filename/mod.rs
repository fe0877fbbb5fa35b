//! Destination filename resolution.
//!
//! Derives a repo-relative file path from a URL plus an optional preferred
//! name. Preferred names may carry subdirectories (`BF16/model-00001.gguf`),
//! but the result never escapes the download root: absolute paths and
//! parent-directory traversal are rejected and fall back to the basename.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::{sanitize_extension, synthesize_filename};

/// Resolves the relative path a download should be written to.
///
/// Joined with any download root, the result stays inside that root.
pub fn resolve(url: &str, preferred: Option<&str>) -> String {
    let candidate = match preferred {
        Some(p) if !p.is_empty() => resolve_preferred(p),
        _ => filename_from_url_path(url).unwrap_or_default(),
    };

    if candidate.is_empty()
        || candidate == "."
        || candidate == "/"
        || candidate.starts_with('?')
    {
        let hint = preferred
            .filter(|p| !p.is_empty())
            .map(basename)
            .unwrap_or_else(|| basename(url));
        return synthesize_filename(hint);
    }
    candidate
}

/// Normalizes a caller-preferred name, rejecting anything that would escape
/// the download root. On rejection the basename is used instead.
fn resolve_preferred(preferred: &str) -> String {
    let absolute = preferred.starts_with('/');
    let normalized = normalize_segments(preferred);

    let escapes = absolute || normalized.first().map(|s| s.as_str()) == Some("..");
    if escapes {
        let base = basename(preferred);
        if base.is_empty() || base == "." || base == ".." {
            return String::new();
        }
        return base.to_string();
    }
    normalized.join("/")
}

/// Collapses `.` and `..` segments where syntactically possible. A `..` that
/// cannot pop a prior real segment is kept, marking an escaping path.
fn normalize_segments(p: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for seg in p.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(out.last(), Some(s) if s != "..") {
                    out.pop();
                } else {
                    out.push("..".to_string());
                }
            }
            s => out.push(s.to_string()),
        }
    }
    out
}

fn basename(p: &str) -> &str {
    p.rsplit('/').next().unwrap_or("")
}
