//! `mdl get` – download a list of URLs.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use mdl_core::config::MdlConfig;
use mdl_core::scheduler::{run_batch, DownloadRequest};

use super::{batch_options, exit_code};

/// Hard cap on parallel downloads for arbitrary URL lists.
const MAX_CONCURRENCY: usize = 100;

pub async fn run_get(
    cfg: &MdlConfig,
    mut urls: Vec<String>,
    file: Option<&Path>,
    output: Option<PathBuf>,
    concurrency: usize,
) -> Result<i32> {
    if let Some(path) = file {
        let listing = fs::read_to_string(path)
            .with_context(|| format!("read URL list '{}'", path.display()))?;
        urls.extend(
            listing
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        );
    }
    if urls.is_empty() {
        anyhow::bail!("no URLs given (pass them as arguments or via --file)");
    }

    let requests: Vec<DownloadRequest> = urls.into_iter().map(DownloadRequest::new).collect();
    let opts = batch_options(cfg, output, concurrency.clamp(1, MAX_CONCURRENCY));
    eprintln!(
        "Downloading {} file(s) to '{}'",
        requests.len(),
        opts.download_root.display()
    );
    let outcome = run_batch(requests, opts).await?;
    Ok(exit_code(outcome))
}
