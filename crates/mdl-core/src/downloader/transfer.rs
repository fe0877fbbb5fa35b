//! Response-driven transfer state for one GET.
//!
//! curl delivers the final response's headers and body through callbacks;
//! this type turns them into the resume/restart dispatch, tees body bytes
//! through the task's byte accounting, and captures error bodies for the
//! HTTP-status message.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str;

use super::error::{DownloadError, SNIPPET_BODY_LIMIT};
use crate::progress::TaskState;

pub(super) struct TransferState<'a> {
    task: &'a TaskState,
    dest: PathBuf,
    resume_from: u64,
    status_code: u32,
    status_text: String,
    content_length: Option<u64>,
    dispatched: bool,
    resume_mode: bool,
    file: Option<File>,
    error_body: Vec<u8>,
    error_body_len: usize,
    pub(super) failure: Option<DownloadError>,
}

impl<'a> TransferState<'a> {
    pub(super) fn new(task: &'a TaskState, dest: &Path, resume_from: u64) -> Self {
        Self {
            task,
            dest: dest.to_path_buf(),
            resume_from,
            status_code: 0,
            status_text: String::new(),
            content_length: None,
            dispatched: false,
            resume_mode: false,
            file: None,
            error_body: Vec::new(),
            error_body_len: 0,
            failure: None,
        }
    }

    pub(super) fn is_success(&self) -> bool {
        matches!(self.status_code, 200 | 206)
    }

    pub(super) fn dispatched(&self) -> bool {
        self.dispatched
    }

    pub(super) fn status_text(&self) -> &str {
        &self.status_text
    }

    pub(super) fn into_http_error(self) -> DownloadError {
        DownloadError::http(&self.status_text, &self.error_body, self.error_body_len)
    }

    /// Feeds one raw header line. Each redirect hop starts with a new status
    /// line, which resets the header state; only the final hop produces body
    /// callbacks, so whatever state is current when the body starts wins.
    pub(super) fn on_header(&mut self, data: &[u8]) {
        let Ok(line) = str::from_utf8(data) else {
            return;
        };
        let line = line.trim_end();
        if let Some(rest) = line.strip_prefix("HTTP/") {
            self.status_text = rest
                .split_once(' ')
                .map(|(_, t)| t.trim().to_string())
                .unwrap_or_default();
            self.status_code = self
                .status_text
                .split_whitespace()
                .next()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            self.content_length = None;
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse().ok();
            }
        }
    }

    /// Feeds one body chunk. Returns the number of bytes consumed; 0 aborts
    /// the transfer (task finished externally, or a recorded local failure).
    pub(super) fn on_body(&mut self, data: &[u8]) -> usize {
        if !self.dispatched {
            self.dispatch();
            if self.failure.is_some() {
                return 0;
            }
        }

        if !self.is_success() {
            // Keep a bounded copy for the HTTP-status snippet.
            let room = SNIPPET_BODY_LIMIT.saturating_sub(self.error_body.len());
            self.error_body
                .extend_from_slice(&data[..data.len().min(room)]);
            self.error_body_len += data.len();
            return data.len();
        }

        if !self.task.record_bytes(data.len()) {
            return 0;
        }
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        if let Err(e) = file.write_all(data) {
            self.failure = Some(DownloadError::copy(&e.to_string()));
            return 0;
        }
        data.len()
    }

    /// Decides resume vs restart from the final status line, fixes up the
    /// expected total, and opens the destination. Runs once, on the first
    /// body byte (or after the transfer for empty bodies).
    pub(super) fn dispatch(&mut self) {
        self.dispatched = true;
        if !self.is_success() {
            return;
        }

        let effective_total = if self.status_code == 206 && self.resume_from > 0 {
            self.resume_mode = true;
            self.content_length.map(|cl| self.resume_from + cl)
        } else {
            if self.resume_from > 0 {
                // Server ignored our Range: start accounting over.
                self.task.reset_current();
            }
            self.content_length
        };
        if let Some(total) = effective_total {
            if total > 0 {
                self.task.set_total(total as i64);
            }
        }

        match open_dest(&self.dest, self.resume_mode) {
            Ok(f) => self.file = Some(f),
            Err(e) => self.failure = Some(DownloadError::open_file(&self.dest, &e)),
        }
    }
}

fn open_dest(path: &Path, resume: bool) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    if resume {
        opts.append(true).create(true);
    } else {
        opts.write(true).create(true).truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o644);
    }
    opts.open(path)
}
