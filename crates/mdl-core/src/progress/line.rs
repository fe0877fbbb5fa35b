//! Per-task progress row rendering.

use std::time::{SystemTime, UNIX_EPOCH};

use super::task::{ProgressSnapshot, TaskState};
use crate::format::{format_eta, format_speed, Eta};

/// Width of a per-task progress bar (characters between the brackets).
pub const PROGRESS_BAR_WIDTH: usize = 25;
/// Width the filename column is padded to.
pub const NAME_WIDTH: usize = 30;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const MB: f64 = 1024.0 * 1024.0;

impl TaskState {
    /// Renders this task's single progress row (no trailing newline).
    pub fn render_line(&self) -> String {
        let snap = self.snapshot();
        format!(
            "{:<width$}: {}",
            self.display_name,
            render_progress_cell(&snap),
            width = NAME_WIDTH
        )
    }
}

fn render_progress_cell(snap: &ProgressSnapshot) -> String {
    if snap.finished {
        if !snap.error_msg.is_empty() {
            let err = crate::format::shorten(&snap.error_msg, PROGRESS_BAR_WIDTH + 20);
            return format!("[ERROR: {}]", err);
        }
        return format!(
            "[{}] 100.00% ({:.2} MB) @ Done    ",
            "=".repeat(PROGRESS_BAR_WIDTH),
            snap.current as f64 / MB
        );
    }

    if snap.current == 0 {
        let state = if snap.total > 0 { "@ Waiting" } else { "@ Pending" };
        return format!("[{}] {}", "?".repeat(PROGRESS_BAR_WIDTH), state);
    }

    if snap.total <= 0 {
        // Unknown size: spinner mid-bar until the stream ends.
        let mut bar = vec![' '; PROGRESS_BAR_WIDTH];
        bar[PROGRESS_BAR_WIDTH / 2] = spinner_char();
        return format!(
            "[{}] ({:.2} MB / unknown)",
            bar.into_iter().collect::<String>(),
            snap.current as f64 / MB
        );
    }

    let pct = (snap.current as f64 / snap.total as f64 * 100.0).min(100.0);
    format!(
        "[{}] {:6.2}% ({:.2} / {:.2} MB) @ {} ETA: {}",
        fill_bar(pct, PROGRESS_BAR_WIDTH),
        pct,
        snap.current as f64 / MB,
        snap.total as f64 / MB,
        format_speed(snap.speed_bps),
        format_eta(snap.speed_bps, snap.total, snap.current, Eta::Fine)
    )
}

/// `=`-filled bar with a single `>` head while the transfer is in flight.
pub fn fill_bar(pct: f64, width: usize) -> String {
    let filled = ((width as f64) * pct / 100.0).round() as usize;
    let filled = filled.min(width);
    if pct <= 0.0 {
        return " ".repeat(width);
    }
    if pct >= 100.0 || filled == width {
        return "=".repeat(width);
    }
    let eq = filled.min(width - 1);
    format!("{}{}{}", "=".repeat(eq), ">", " ".repeat(width - eq - 1))
}

/// Spinner frame cycled by wall clock so all indeterminate rows animate in
/// step even though they redraw at different moments.
pub fn spinner_char() -> char {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    SPINNER[(millis / 150) as usize % SPINNER.len()]
}
