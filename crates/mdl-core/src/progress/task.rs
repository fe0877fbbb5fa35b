//! Per-download progress state.
//!
//! One `TaskState` per file. The owning download worker is the only mutator;
//! the renderer locks briefly to snapshot the fields into a row. The redraw
//! flag is shared with the render model so byte arrivals coalesce into the
//! next render tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Minimum interval between speed samples, unless the task is near done.
const SPEED_SAMPLE_INTERVAL_MS: u128 = 750;
/// Absolute floor below which a sample window is too noisy to use.
const SPEED_SAMPLE_FLOOR_MS: u128 = 50;

/// State for one download task. Identity fields are immutable; progress is
/// guarded by a single lock held only for short read/update sections.
pub struct TaskState {
    pub id: usize,
    pub url: String,
    /// Repo-relative destination path (never absolute, never escaping).
    pub actual_path: String,
    /// Basename truncated for the progress row.
    pub display_name: String,
    redraw: Arc<AtomicBool>,
    inner: Mutex<ProgressInner>,
}

struct ProgressInner {
    total: i64,
    current: i64,
    finished: bool,
    error_msg: String,
    speed_bps: f64,
    anchor_time: Instant,
    anchor_bytes: i64,
}

/// Point-in-time copy of a task's progress, read under the task lock.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub total: i64,
    pub current: i64,
    pub finished: bool,
    pub error_msg: String,
    pub speed_bps: f64,
}

impl ProgressSnapshot {
    /// Bytes are flowing but the total is still unknown.
    pub fn is_indeterminate(&self) -> bool {
        !self.finished && self.current > 0 && self.total <= 0
    }

    /// Download has observable progress and is not done.
    pub fn is_active(&self) -> bool {
        !self.finished && self.current > 0
    }
}

impl TaskState {
    /// Creates a task. `known_size` comes from the pre-scan (or source
    /// metadata); absent means unknown until the GET response headers arrive.
    pub fn new(
        id: usize,
        url: String,
        actual_path: String,
        known_size: Option<u64>,
        redraw: Arc<AtomicBool>,
    ) -> Arc<Self> {
        let display_name = truncate_name(basename(&actual_path), 30);
        Arc::new(Self {
            id,
            url,
            display_name,
            actual_path,
            redraw,
            inner: Mutex::new(ProgressInner {
                total: known_size.map(|s| s as i64).unwrap_or(-1),
                current: 0,
                finished: false,
                error_msg: String::new(),
                speed_bps: 0.0,
                anchor_time: Instant::now(),
                anchor_bytes: 0,
            }),
        })
    }

    /// Accounts `n` freshly received bytes. Returns `false` once the task is
    /// finished so the producing stream stops feeding it.
    pub fn record_bytes(&self, n: usize) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.finished {
            return false;
        }
        inner.current += n as i64;
        drop(inner);
        self.request_redraw();
        true
    }

    /// Re-derives `speed_bps` from the bytes accumulated since the last
    /// anchor. Rate-limited to one sample per 750 ms except near completion;
    /// windows under 50 ms are always skipped.
    pub fn refresh_speed(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.finished {
            return;
        }
        let elapsed = inner.anchor_time.elapsed();
        let ms = elapsed.as_millis();
        if ms < SPEED_SAMPLE_FLOOR_MS {
            return;
        }
        let near_done =
            inner.total > 0 && inner.current * 100 >= inner.total * 99;
        if ms < SPEED_SAMPLE_INTERVAL_MS && !near_done {
            return;
        }
        let gained = (inner.current - inner.anchor_bytes).max(0);
        inner.speed_bps = gained as f64 / elapsed.as_secs_f64();
        inner.anchor_time = Instant::now();
        inner.anchor_bytes = inner.current;
    }

    /// Moves the task to its terminal state. Empty `err` means success, which
    /// applies the total fixups: a known total snaps `current` up to it, an
    /// unknown total becomes the byte count actually received. Finished tasks
    /// are immutable; later calls are ignored.
    pub fn mark_finished(&self, err: &str) {
        let mut inner = self.inner.lock().unwrap();
        if inner.finished {
            return;
        }
        inner.finished = true;
        inner.speed_bps = 0.0;
        inner.error_msg = err.to_string();
        if err.is_empty() {
            if inner.total > 0 {
                inner.current = inner.total;
            } else if inner.current > 0 {
                inner.total = inner.current;
            }
        }
        drop(inner);
        self.request_redraw();
    }

    /// Restart mode: the server ignored our Range, so accounting starts over.
    pub fn reset_current(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.current = 0;
        inner.anchor_bytes = 0;
        inner.anchor_time = Instant::now();
        drop(inner);
        self.request_redraw();
    }

    /// Updates the expected total (from response headers).
    pub fn set_total(&self, total: i64) {
        let mut inner = self.inner.lock().unwrap();
        if inner.total != total {
            inner.total = total;
            drop(inner);
            self.request_redraw();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().unwrap().finished
    }

    pub fn current(&self) -> i64 {
        self.inner.lock().unwrap().current
    }

    pub fn total(&self) -> i64 {
        self.inner.lock().unwrap().total
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.inner.lock().unwrap();
        ProgressSnapshot {
            total: inner.total,
            current: inner.current,
            finished: inner.finished,
            error_msg: inner.error_msg.clone(),
            speed_bps: inner.speed_bps,
        }
    }

    fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Relaxed);
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Truncates a filename to `max` characters, keeping the extension and the
/// tail of the stem (`...ium-instruct-v3.gguf`).
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) if !s.is_empty() && e.len() <= 6 => (s, format!(".{}", e)),
        _ => (name, String::new()),
    };
    let keep = max.saturating_sub(ext.chars().count() + 3);
    let stem_chars: Vec<char> = stem.chars().collect();
    let tail: String = stem_chars[stem_chars.len().saturating_sub(keep)..]
        .iter()
        .collect();
    format!("...{}{}", tail, ext)
}
