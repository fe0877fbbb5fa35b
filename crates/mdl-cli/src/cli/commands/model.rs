//! `mdl model` – download one catalog model by alias.

use anyhow::Result;
use std::path::PathBuf;

use mdl_core::catalog;
use mdl_core::config::MdlConfig;
use mdl_core::scheduler::run_batch;

use super::{batch_options, exit_code};

pub async fn run_model(cfg: &MdlConfig, alias: &str, output: Option<PathBuf>) -> Result<i32> {
    let Some(model) = catalog::find(alias) else {
        eprintln!("Unknown model alias '{}'. Known aliases:", alias);
        for m in catalog::MODELS {
            eprintln!("  {:<16} {}", m.alias, m.about);
        }
        anyhow::bail!("unknown model alias '{}'", alias);
    };

    eprintln!("Downloading {} ({})", model.alias, model.about);
    // Single-model downloads run one connection.
    let opts = batch_options(cfg, output, 1);
    let outcome = run_batch(vec![catalog::to_request(model)], opts).await?;
    Ok(exit_code(outcome))
}
