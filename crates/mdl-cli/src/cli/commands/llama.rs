//! `mdl llama` – download the latest llama.cpp release build.

use anyhow::{Context, Result};
use std::path::PathBuf;

use mdl_core::config::MdlConfig;
use mdl_core::github::{self, LLAMA_CPP_REPO, VARIANTS};
use mdl_core::scheduler::run_batch;

use super::{batch_options, exit_code};

pub async fn run_llama(cfg: &MdlConfig, variant: &str, output: Option<PathBuf>) -> Result<i32> {
    if !VARIANTS.contains(&variant) {
        anyhow::bail!(
            "unknown variant '{}' (expected one of: {})",
            variant,
            VARIANTS.join(", ")
        );
    }

    let release = tokio::task::spawn_blocking(|| github::latest_release(LLAMA_CPP_REPO))
        .await
        .context("release lookup task")??;
    let Some(asset) = github::pick_asset_for_host(&release.assets, variant) else {
        anyhow::bail!(
            "release {} has no '{}' build for this OS/architecture",
            release.tag_name,
            variant
        );
    };
    eprintln!(
        "Latest llama.cpp release {}: {}",
        release.tag_name, asset.name
    );

    // Asset metadata carries the size, so the pre-scan is skipped.
    let opts = batch_options(cfg, output, 1);
    let outcome = run_batch(vec![github::to_request(asset)], opts).await?;
    Ok(exit_code(outcome))
}
