//! Download failure classification.
//!
//! Every failure a worker can hit collapses to one of these variants; the
//! rendered string becomes the task's `error_msg` and is shown in its row.

use thiserror::Error;

use crate::format::shorten;

/// Maximum length of a detail fragment inside an error row.
const DETAIL_MAX: usize = 22;
/// Error bodies at or above this size are not quoted in the message.
pub const SNIPPET_BODY_LIMIT: usize = 1024;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Dir create '{path}': {detail}")]
    CreateDir { path: String, detail: String },

    #[error("Stat file '{path}': {detail}")]
    StatFile { path: String, detail: String },

    #[error("Req create: {detail}")]
    Request { detail: String },

    #[error("GET: {detail}")]
    Get { detail: String },

    /// `status` keeps the server's reason phrase ("404 Not Found");
    /// `snippet` is pre-formatted as ` (<body>)` or empty.
    #[error("HTTP {status}{snippet}")]
    Http { status: String, snippet: String },

    #[error("Open file '{path}': {detail}")]
    OpenFile { path: String, detail: String },

    #[error("Copy: {detail}")]
    Copy { detail: String },

    #[error("Truncate failed: {detail}")]
    Truncate { detail: String },
}

impl DownloadError {
    pub fn dir_create(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::CreateDir {
            path: path.display().to_string(),
            detail: shorten(&err.to_string(), DETAIL_MAX),
        }
    }

    pub fn stat_file(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::StatFile {
            path: path.display().to_string(),
            detail: shorten(&err.to_string(), DETAIL_MAX),
        }
    }

    pub fn request(err: &curl::Error) -> Self {
        Self::Request {
            detail: shorten(&err.to_string(), DETAIL_MAX),
        }
    }

    pub fn get(err: &curl::Error) -> Self {
        Self::Get {
            detail: shorten(&err.to_string(), DETAIL_MAX),
        }
    }

    /// Builds the HTTP-status error, quoting the body only when the whole
    /// body stayed under [`SNIPPET_BODY_LIMIT`].
    pub fn http(status: &str, body: &[u8], body_total_len: usize) -> Self {
        let snippet = if body.is_empty() || body_total_len >= SNIPPET_BODY_LIMIT {
            String::new()
        } else {
            let text = String::from_utf8_lossy(body);
            let flat: String = text
                .chars()
                .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                .collect();
            format!(" ({})", shorten(flat.trim(), 80))
        };
        Self::Http {
            status: if status.is_empty() {
                "error".to_string()
            } else {
                status.to_string()
            },
            snippet,
        }
    }

    pub fn open_file(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::OpenFile {
            path: path.display().to_string(),
            detail: shorten(&err.to_string(), DETAIL_MAX),
        }
    }

    pub fn copy(detail: &str) -> Self {
        Self::Copy {
            detail: shorten(detail, DETAIL_MAX),
        }
    }

    pub fn truncate(err: &std::io::Error) -> Self {
        Self::Truncate {
            detail: shorten(&err.to_string(), DETAIL_MAX),
        }
    }
}
