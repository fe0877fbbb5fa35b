//! The live progress view.
//!
//! A single tokio task owns the terminal for the whole batch: it hides the
//! cursor up front, redraws the block on a fixed tick whenever there is
//! something new to show, and restores the cursor on stop. Everything else
//! in the process writes to stderr or the log sink, never stdout.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::frame::build_frame;
use super::task::TaskState;

const RENDER_TICK: Duration = Duration::from_millis(150);

const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const HOME_AND_CLEAR: &str = "\x1b[H\x1b[2J";

/// Owns the ordered task list, the coalesced redraw flag, and the terminal
/// cursor state. Workers only ever touch it through their shared redraw flag.
pub struct ProgressManager {
    tasks: Mutex<Vec<Arc<TaskState>>>,
    redraw: Arc<AtomicBool>,
    display_slots: usize,
    had_bars: AtomicBool,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl ProgressManager {
    pub fn new(display_slots: usize) -> Arc<Self> {
        let (stop_tx, stop_rx) = watch::channel(false);
        Arc::new(Self {
            tasks: Mutex::new(Vec::new()),
            redraw: Arc::new(AtomicBool::new(false)),
            display_slots: display_slots.max(1),
            had_bars: AtomicBool::new(false),
            stop_tx,
            stop_rx,
        })
    }

    /// The flag tasks set when bytes arrive; hand a clone to every TaskState.
    pub fn redraw_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.redraw)
    }

    /// Appends a task to the render sequence (insertion order is display
    /// order within each priority class).
    pub fn register(&self, task: Arc<TaskState>) {
        self.tasks.lock().unwrap().push(task);
        self.had_bars.store(true, Ordering::Relaxed);
        self.request_redraw();
    }

    pub fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Relaxed);
    }

    /// Spawns the render loop. Await the handle after calling [`stop`] so the
    /// final frame and cursor restore happen before the process moves on.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let mgr = Arc::clone(self);
        tokio::spawn(async move { mgr.render_loop().await })
    }

    /// Signals the render loop to emit its final frame and restore the
    /// terminal. Idempotent.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    async fn render_loop(&self) {
        {
            let mut out = io::stdout().lock();
            let _ = out.write_all(CURSOR_HIDE.as_bytes());
            let _ = out.flush();
        }

        let mut stop_rx = self.stop_rx.clone();
        let mut tick = tokio::time::interval(RENDER_TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => self.tick_draw(),
                _ = stop_rx.changed() => break,
            }
        }

        self.finalize_tasks();
        self.emit(true);

        let mut out = io::stdout().lock();
        let _ = out.write_all(CURSOR_SHOW.as_bytes());
        if self.had_bars.load(Ordering::Relaxed) {
            let _ = out.write_all(b"\n");
        }
        let _ = out.flush();
    }

    /// One render tick: refresh speed samples, then redraw if a redraw was
    /// requested or any task is mid-transfer.
    fn tick_draw(&self) {
        let tasks = self.tasks.lock().unwrap().clone();
        let mut any_active = false;
        for task in &tasks {
            let snap = task.snapshot();
            if snap.is_active() {
                any_active = true;
                task.refresh_speed();
            }
        }
        if self.redraw.swap(false, Ordering::Relaxed) || any_active {
            self.emit(false);
        }
    }

    /// Coerces every task that never reached a terminal state (interrupt
    /// path) so the final frame shows a consistent picture.
    fn finalize_tasks(&self) {
        for task in self.tasks.lock().unwrap().iter() {
            if !task.is_finished() {
                task.mark_finished("");
            }
        }
    }

    fn emit(&self, final_draw: bool) {
        let tasks = self.tasks.lock().unwrap().clone();
        let frame = build_frame(&tasks, self.display_slots, final_draw);
        let mut out = io::stdout().lock();
        let _ = out.write_all(HOME_AND_CLEAR.as_bytes());
        let _ = out.write_all(frame.as_bytes());
        let _ = out.flush();
    }
}
