//! Batch orchestration.
//!
//! Runs the HEAD pre-scan, registers a task per file with the progress
//! manager, then drives the bounded download pool. A pool permit is acquired
//! before each worker is spawned, so the permit count is a hard cap on
//! simultaneously open HTTP connections. SIGINT/SIGTERM stop the renderer
//! (restoring the cursor) and leave partial files for the next run to
//! resume.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::downloader;
use crate::filename;
use crate::prescan;
use crate::progress::{ProgressManager, TaskState};

/// One download to schedule: a URL, an optional repo-relative preferred name
/// (may contain subdirectories), and a size when the source already knows it.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub preferred_name: Option<String>,
    pub known_size: Option<u64>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            preferred_name: None,
            known_size: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.preferred_name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.known_size = Some(size);
        self
    }
}

/// Caller-facing knobs for one batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Base directory every `actual_path` is joined under.
    pub download_root: PathBuf,
    /// Download pool size (pre-scan has its own fixed cap).
    pub concurrency: usize,
    /// Visible per-task rows; clamped to at least 1.
    pub display_slots: usize,
    /// Bearer token, applied only to gated-host requests.
    pub token: Option<String>,
}

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed { total: usize, failed: usize },
    Interrupted,
}

/// Downloads every request, rendering progress until completion or signal.
pub async fn run_batch(mut requests: Vec<DownloadRequest>, opts: BatchOptions) -> Result<BatchOutcome> {
    if requests.is_empty() {
        anyhow::bail!("no downloads requested");
    }
    tracing::info!(
        count = requests.len(),
        root = %opts.download_root.display(),
        concurrency = opts.concurrency,
        "starting batch"
    );

    prescan::scan_sizes(&mut requests, opts.token.as_deref()).await;

    let manager = ProgressManager::new(opts.display_slots);
    let mut tasks: Vec<Arc<TaskState>> = Vec::with_capacity(requests.len());
    for (id, req) in requests.iter().enumerate() {
        let rel = filename::resolve(&req.url, req.preferred_name.as_deref());
        let task = TaskState::new(
            id,
            req.url.clone(),
            rel,
            req.known_size,
            manager.redraw_flag(),
        );
        manager.register(Arc::clone(&task));
        tasks.push(task);
    }
    let render_handle = manager.spawn();

    let root = Arc::new(opts.download_root.clone());
    let token = Arc::new(opts.token.clone());
    let pool = Arc::new(Semaphore::new(opts.concurrency.max(1)));

    let downloads = async {
        let mut join_set = JoinSet::new();
        for task in &tasks {
            // Hard connection cap: hold the permit before the worker exists.
            let permit = Arc::clone(&pool).acquire_owned().await?;
            let task = Arc::clone(task);
            let root = Arc::clone(&root);
            let token = Arc::clone(&token);
            join_set.spawn_blocking(move || {
                downloader::run(&task, &root, token.as_deref());
                drop(permit);
            });
        }
        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("worker task join: {}", e);
            }
        }
        anyhow::Ok(())
    };

    let interrupted = tokio::select! {
        res = downloads => {
            res?;
            false
        }
        _ = shutdown_signal() => {
            tracing::info!("interrupt received; stopping renderer, partial files remain");
            true
        }
    };

    manager.stop();
    let _ = render_handle.await;

    if interrupted {
        return Ok(BatchOutcome::Interrupted);
    }
    let failed = tasks
        .iter()
        .filter(|t| !t.snapshot().error_msg.is_empty())
        .count();
    tracing::info!(total = tasks.len(), failed, "batch finished");
    Ok(BatchOutcome::Completed {
        total: tasks.len(),
        failed,
    })
}

/// Resolves on SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builders() {
        let req = DownloadRequest::new("http://h/a.bin")
            .with_name("sub/a.bin")
            .with_size(42);
        assert_eq!(req.url, "http://h/a.bin");
        assert_eq!(req.preferred_name.as_deref(), Some("sub/a.bin"));
        assert_eq!(req.known_size, Some(42));
    }

    #[tokio::test]
    async fn empty_batch_is_an_error() {
        let outcome = run_batch(
            Vec::new(),
            BatchOptions {
                download_root: PathBuf::from("."),
                concurrency: 1,
                display_slots: 1,
                token: None,
            },
        )
        .await;
        assert!(outcome.is_err());
    }
}
