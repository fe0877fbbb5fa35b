//! Single-file download worker.
//!
//! One worker per task: HTTP GET with byte-range resume, streaming the body
//! to `download_root/actual_path` while accounting every chunk through the
//! task's progress state. Blocking (curl); the scheduler runs workers on
//! `spawn_blocking` threads.

mod error;
mod transfer;

pub use error::DownloadError;

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;

use crate::http;
use crate::progress::TaskState;
use transfer::TransferState;

/// Runs one download to completion and moves the task to its terminal state.
/// Never panics past the scheduler; every failure lands in the task's
/// `error_msg`.
pub fn run(task: &TaskState, download_root: &Path, token: Option<&str>) {
    tracing::debug!(url = %task.url, path = %task.actual_path, "worker start");
    match execute(task, download_root, token) {
        Ok(()) => task.mark_finished(""),
        Err(e) => {
            // A task finished under us (shutdown) keeps its state.
            if !task.is_finished() {
                tracing::warn!(url = %task.url, error = %e, "download failed");
                task.mark_finished(&e.to_string());
            }
        }
    }
}

fn execute(task: &TaskState, download_root: &Path, token: Option<&str>) -> Result<(), DownloadError> {
    let dest = download_root.join(&task.actual_path);
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DownloadError::dir_create(parent, &e))?;
        }
    }

    let resume_from = match fs::metadata(&dest) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
        Err(e) => return Err(DownloadError::stat_file(&dest, &e)),
    };

    // Already complete (or oversize) from an earlier run.
    let total = task.total();
    if total > 0 && resume_from as i64 >= total {
        if resume_from as i64 > total {
            let file = fs::OpenOptions::new()
                .write(true)
                .open(&dest)
                .map_err(|e| DownloadError::truncate(&e))?;
            file.set_len(total as u64)
                .map_err(|e| DownloadError::truncate(&e))?;
        }
        return Ok(());
    }

    if resume_from > 0 {
        // The resumed prefix counts as already-downloaded bytes.
        task.record_bytes(resume_from as usize);
    }

    let mut easy = curl::easy::Easy::new();
    easy.url(&task.url).map_err(|e| DownloadError::request(&e))?;
    easy.useragent(http::USER_AGENT)
        .map_err(|e| DownloadError::request(&e))?;
    easy.follow_location(true)
        .map_err(|e| DownloadError::request(&e))?;
    easy.max_redirections(http::MAX_REDIRECTS)
        .map_err(|e| DownloadError::request(&e))?;
    easy.connect_timeout(http::CONNECT_TIMEOUT)
        .map_err(|e| DownloadError::request(&e))?;
    easy.timeout(http::TRANSFER_TIMEOUT)
        .map_err(|e| DownloadError::request(&e))?;
    let mut headers = curl::easy::List::new();
    if resume_from > 0 {
        // A manual Range header (not CURLOPT_RESUME_FROM) so a server that
        // ignores it and replies 200 reaches our restart dispatch instead of
        // failing inside libcurl. Custom headers follow every redirect hop.
        headers
            .append(&format!("Range: bytes={}-", resume_from))
            .map_err(|e| DownloadError::request(&e))?;
    }
    if let Some(auth) = http::bearer_header(&task.url, token) {
        headers
            .append(&auth)
            .map_err(|e| DownloadError::request(&e))?;
        // The gated host redirects to its CDN; the token must follow.
        easy.unrestricted_auth(true)
            .map_err(|e| DownloadError::request(&e))?;
    }
    easy.http_headers(headers)
        .map_err(|e| DownloadError::request(&e))?;

    let state = RefCell::new(TransferState::new(task, &dest, resume_from));
    let perform_result = {
        let mut xfer = easy.transfer();
        xfer.header_function(|data| {
            state.borrow_mut().on_header(data);
            true
        })
        .map_err(|e| DownloadError::request(&e))?;
        xfer.write_function(|data| Ok(state.borrow_mut().on_body(data)))
            .map_err(|e| DownloadError::request(&e))?;
        xfer.perform()
    };
    let mut state = state.into_inner();

    if let Some(failure) = state.failure.take() {
        return Err(failure);
    }
    if let Err(e) = perform_result {
        if task.is_finished() {
            // Cancellation aborted the stream; not a failure.
            return Ok(());
        }
        if state.dispatched() && state.is_success() {
            return Err(DownloadError::copy(&e.to_string()));
        }
        return Err(DownloadError::get(&e));
    }
    if !state.is_success() {
        return Err(state.into_http_error());
    }
    if !state.dispatched() {
        // Empty body: still open/truncate the destination and fix the total.
        state.dispatch();
        if let Some(failure) = state.failure.take() {
            return Err(failure);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::TaskState;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn task(path: &str, known: Option<u64>) -> Arc<TaskState> {
        TaskState::new(
            0,
            "http://h/f".into(),
            path.into(),
            known,
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn complete_file_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), vec![0u8; 100]).unwrap();
        let t = task("a.bin", Some(100));
        run(&t, dir.path(), None);
        let s = t.snapshot();
        assert!(s.finished);
        assert!(s.error_msg.is_empty());
        assert_eq!(s.current, 100);
    }

    #[test]
    fn oversize_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), vec![0u8; 150]).unwrap();
        let t = task("a.bin", Some(100));
        run(&t, dir.path(), None);
        assert!(t.snapshot().error_msg.is_empty());
        assert_eq!(
            std::fs::metadata(dir.path().join("a.bin")).unwrap().len(),
            100
        );
    }

    #[test]
    fn unreachable_host_classifies_as_get() {
        let dir = tempfile::tempdir().unwrap();
        let t = TaskState::new(
            0,
            // nothing listens on port 1; connect fails immediately
            "http://127.0.0.1:1/f.bin".into(),
            "f.bin".into(),
            None,
            Arc::new(AtomicBool::new(false)),
        );
        run(&t, dir.path(), None);
        let s = t.snapshot();
        assert!(s.finished);
        assert!(s.error_msg.starts_with("GET: "), "got {:?}", s.error_msg);
    }

    #[test]
    fn subdirectories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let t = task("BF16/w.gguf", Some(10));
        std::fs::create_dir_all(dir.path().join("BF16")).unwrap();
        std::fs::write(dir.path().join("BF16/w.gguf"), vec![1u8; 10]).unwrap();
        run(&t, dir.path(), None);
        assert!(t.snapshot().error_msg.is_empty());
    }
}
