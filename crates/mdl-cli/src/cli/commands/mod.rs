mod get;
mod hf;
mod llama;
mod model;
mod models;

pub use get::run_get;
pub use hf::run_hf;
pub use llama::run_llama;
pub use model::run_model;
pub use models::run_models;

use mdl_core::config::MdlConfig;
use mdl_core::scheduler::{BatchOptions, BatchOutcome};
use std::path::PathBuf;

/// Assembles batch options from config plus per-command overrides.
pub(crate) fn batch_options(
    cfg: &MdlConfig,
    output: Option<PathBuf>,
    concurrency: usize,
) -> BatchOptions {
    BatchOptions {
        download_root: output.unwrap_or_else(|| cfg.download_root.clone()),
        concurrency,
        display_slots: cfg.display_slots,
        token: cfg.resolve_token(),
    }
}

/// Exit code for a finished batch: interrupts and per-file failures are
/// operational failures.
pub(crate) fn exit_code(outcome: BatchOutcome) -> i32 {
    match outcome {
        BatchOutcome::Completed { failed: 0, .. } => 0,
        BatchOutcome::Completed { .. } | BatchOutcome::Interrupted => 1,
    }
}
