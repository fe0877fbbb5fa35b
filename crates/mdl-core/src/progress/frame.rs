//! Full-frame assembly: header, display window, overflow line, aggregate.
//!
//! Pure over a snapshot of the task list so the frame shape is testable
//! without a terminal.

use std::sync::Arc;

use super::line::{fill_bar, PROGRESS_BAR_WIDTH};
use super::task::{ProgressSnapshot, TaskState};
use crate::format::{format_eta, format_speed, Eta};

const RULE_WIDTH: usize = 80;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Aggregate figures computed over every task in the batch.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub current_bytes: i64,
    pub expected_bytes: i64,
    pub speed_bps: f64,
    pub finished: usize,
    pub total_tasks: usize,
    pub any_started: bool,
}

impl Aggregate {
    pub fn compute(snaps: &[ProgressSnapshot]) -> Self {
        let mut agg = Aggregate {
            total_tasks: snaps.len(),
            ..Default::default()
        };
        for s in snaps {
            agg.current_bytes += s.current;
            if s.total > 0 {
                agg.expected_bytes += s.total;
            } else if s.finished {
                // Unknown-size task: its final byte count is the best total.
                agg.expected_bytes += s.current;
            }
            if s.finished {
                agg.finished += 1;
            } else if s.current > 0 || s.total > 0 {
                agg.speed_bps += s.speed_bps;
            }
            if s.current > 0 {
                agg.any_started = true;
            }
        }
        agg
    }

    pub fn all_done(&self) -> bool {
        self.finished == self.total_tasks
    }

    pub fn percent(&self) -> f64 {
        if self.expected_bytes > 0 {
            (self.current_bytes as f64 / self.expected_bytes as f64 * 100.0).min(100.0)
        } else if self.all_done() {
            100.0
        } else {
            0.0
        }
    }
}

/// Builds the complete progress block (no cursor escapes; the manager owns
/// those). `final_draw` lifts the display-slot cap so every row is shown.
pub fn build_frame(tasks: &[Arc<TaskState>], slots: usize, final_draw: bool) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("Download Progress:\n");
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let chosen = choose_display(tasks, slots, final_draw);
    for task in &chosen {
        out.push_str(&task.render_line());
        out.push('\n');
    }
    let omitted = tasks.len() - chosen.len();
    if omitted > 0 {
        out.push_str(&format!("... and {} more downloads ...\n", omitted));
    }

    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let snaps: Vec<ProgressSnapshot> = tasks.iter().map(|t| t.snapshot()).collect();
    let agg = Aggregate::compute(&snaps);
    out.push_str(&aggregate_line(&agg));
    out.push('\n');
    out.push_str(&format!("  ({}/{} files)\n", agg.finished, agg.total_tasks));
    out
}

/// Picks up to `slots` rows: transferring tasks first (insertion order), then
/// pending ones, then finished ones by id. The final draw shows everything.
fn choose_display(
    tasks: &[Arc<TaskState>],
    slots: usize,
    final_draw: bool,
) -> Vec<Arc<TaskState>> {
    if final_draw || tasks.len() <= slots {
        return tasks.to_vec();
    }
    let mut chosen: Vec<Arc<TaskState>> = Vec::with_capacity(slots);
    let snaps: Vec<(usize, ProgressSnapshot)> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (i, t.snapshot()))
        .collect();

    for (i, s) in &snaps {
        if chosen.len() == slots {
            return chosen;
        }
        if !s.finished && s.current > 0 {
            chosen.push(Arc::clone(&tasks[*i]));
        }
    }
    for (i, s) in &snaps {
        if chosen.len() == slots {
            return chosen;
        }
        if !s.finished && s.current == 0 {
            chosen.push(Arc::clone(&tasks[*i]));
        }
    }
    for (i, s) in &snaps {
        if chosen.len() == slots {
            return chosen;
        }
        if s.finished {
            chosen.push(Arc::clone(&tasks[*i]));
        }
    }
    chosen
}

fn aggregate_line(agg: &Aggregate) -> String {
    let width = PROGRESS_BAR_WIDTH + 10;
    let pct = agg.percent();
    let bar = if agg.all_done() {
        "=".repeat(width)
    } else {
        fill_bar(pct, width)
    };

    // GB once the expected batch size reaches 1 GiB, else MB.
    let (cur, exp, unit) = if agg.expected_bytes as f64 >= GIB {
        (
            agg.current_bytes as f64 / GIB,
            agg.expected_bytes as f64 / GIB,
            "GB",
        )
    } else {
        (
            agg.current_bytes as f64 / MIB,
            agg.expected_bytes as f64 / MIB,
            "MB",
        )
    };

    let (speed, eta) = if agg.all_done() {
        ("Completed".to_string(), "Done".to_string())
    } else if !agg.any_started {
        ("Pending...".to_string(), "N/A".to_string())
    } else {
        (
            format_speed(agg.speed_bps),
            format_eta(
                agg.speed_bps,
                agg.expected_bytes,
                agg.current_bytes,
                Eta::Coarse,
            ),
        )
    };

    format!(
        "Total: [{}] {:6.2}% ({:.2} / {:.2} {}) @ {} ETA: {}",
        bar, pct, cur, exp, unit, speed, eta
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn task(id: usize, known: Option<u64>) -> Arc<TaskState> {
        TaskState::new(
            id,
            format!("http://h/{}.bin", id),
            format!("{}.bin", id),
            known,
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn aggregate_conserves_bytes() {
        let tasks = [task(0, Some(1000)), task(1, Some(2000)), task(2, None)];
        tasks[0].record_bytes(400);
        tasks[1].record_bytes(100);
        tasks[2].record_bytes(50);
        let snaps: Vec<_> = tasks.iter().map(|t| t.snapshot()).collect();
        let agg = Aggregate::compute(&snaps);
        assert_eq!(agg.current_bytes, 550);
        assert_eq!(agg.expected_bytes, 3000);
    }

    #[test]
    fn unknown_total_contributes_after_finish() {
        let t = task(0, None);
        t.record_bytes(1234);
        let before = Aggregate::compute(&[t.snapshot()]);
        assert_eq!(before.expected_bytes, 0);
        t.mark_finished("");
        let after = Aggregate::compute(&[t.snapshot()]);
        assert_eq!(after.expected_bytes, 1234);
        assert_eq!(after.percent(), 100.0);
    }

    #[test]
    fn all_done_with_zero_expected_is_100() {
        let t = task(0, None);
        t.mark_finished("HTTP 404");
        let agg = Aggregate::compute(&[t.snapshot()]);
        assert!(agg.all_done());
        assert_eq!(agg.percent(), 100.0);
    }

    #[test]
    fn failed_tasks_count_as_finished() {
        let ok = task(0, Some(100));
        ok.record_bytes(100);
        ok.mark_finished("");
        let bad = task(1, Some(100));
        bad.mark_finished("HTTP 404");
        let agg = Aggregate::compute(&[ok.snapshot(), bad.snapshot()]);
        assert_eq!(agg.finished, 2);
        assert!(agg.all_done());
    }

    #[test]
    fn frame_shape_and_overflow() {
        let tasks: Vec<_> = (0..6).map(|i| task(i, Some(100))).collect();
        // make tasks 4 and 5 active so they win display slots
        tasks[4].record_bytes(10);
        tasks[5].record_bytes(10);
        let frame = build_frame(&tasks, 3, false);
        assert!(frame.starts_with("Download Progress:\n"));
        assert!(frame.contains(&"-".repeat(80)));
        assert!(frame.contains("... and 3 more downloads ..."));
        assert!(frame.contains("(0/6 files)"));
        // active tasks are listed before pending ones
        let pos4 = frame.find("4.bin").expect("active row shown");
        let pos0 = frame.find("0.bin").expect("pending row shown");
        assert!(pos4 < pos0);
    }

    #[test]
    fn final_draw_shows_all_rows() {
        let tasks: Vec<_> = (0..6).map(|i| task(i, Some(100))).collect();
        let frame = build_frame(&tasks, 3, true);
        assert!(!frame.contains("more downloads"));
        for i in 0..6 {
            assert!(frame.contains(&format!("{}.bin", i)));
        }
    }

    #[test]
    fn aggregate_line_states() {
        // nothing started
        let pending = [task(0, Some(100))];
        let frame = build_frame(&pending, 5, false);
        assert!(frame.contains("@ Pending..."));
        assert!(frame.contains("ETA: N/A"));

        // all done
        let t = task(0, Some(100));
        t.record_bytes(100);
        t.mark_finished("");
        let frame = build_frame(&[t], 5, true);
        assert!(frame.contains("@ Completed"));
        assert!(frame.contains("ETA: Done"));
        assert!(frame.contains("100.00%"));
    }

    #[test]
    fn gb_unit_switch() {
        let t = task(0, Some(2 * 1024 * 1024 * 1024));
        t.record_bytes(1024 * 1024 * 1024);
        let frame = build_frame(&[t], 5, false);
        assert!(frame.contains("(1.00 / 2.00 GB)"), "frame: {}", frame);
    }
}
