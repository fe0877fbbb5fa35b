//! `mdl hf` – download a Hugging Face repository, optionally selecting GGUFs.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use mdl_core::config::MdlConfig;
use mdl_core::hf::{self, GgufItem, HfFile};
use mdl_core::scheduler::run_batch;

use super::{batch_options, exit_code};

/// Repo downloads stay gentle on the gated host.
const MAX_CONCURRENCY: usize = 4;

pub async fn run_hf(
    cfg: &MdlConfig,
    repo: &str,
    gguf: bool,
    output: Option<PathBuf>,
    concurrency: usize,
) -> Result<i32> {
    let token = cfg.resolve_token();
    let files = {
        let repo = repo.to_string();
        let token = token.clone();
        tokio::task::spawn_blocking(move || hf::repo_files(&repo, token.as_deref()))
            .await
            .context("repo listing task")??
    };
    eprintln!("Repository '{}' lists {} file(s).", repo, files.len());

    let files = if gguf { select_gguf(files)? } else { files };
    if files.is_empty() {
        eprintln!("Nothing selected.");
        return Ok(0);
    }

    let requests = hf::to_requests(files);
    let opts = batch_options(cfg, output, concurrency.clamp(1, MAX_CONCURRENCY));
    let outcome = run_batch(requests, opts).await?;
    Ok(exit_code(outcome))
}

/// Interactive GGUF selection: lists shard series and standalone files, then
/// reads numbers / `all` / `none` from stdin. Incomplete series are skipped.
fn select_gguf(files: Vec<HfFile>) -> Result<Vec<HfFile>> {
    let items = hf::group_gguf(files);
    if items.is_empty() {
        eprintln!("No GGUF files found in the repository.");
        return Ok(Vec::new());
    }

    eprintln!("\nAvailable GGUF files/series:");
    for (i, item) in items.iter().enumerate() {
        eprintln!("{:3}. {}", i + 1, item.label());
    }
    eprintln!("---");

    let stdin = std::io::stdin();
    loop {
        eprint!("Enter numbers (e.g. 1,3), 'all', or 'none': ");
        std::io::stderr().flush()?;
        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;

        let choice = input.trim().to_lowercase();
        if choice == "none" {
            return Ok(Vec::new());
        }
        if choice == "all" {
            return Ok(items
                .iter()
                .filter(|item| {
                    if !item.is_complete() {
                        eprintln!("Skipping incomplete series: {}", item.label());
                        false
                    } else {
                        true
                    }
                })
                .cloned()
                .flat_map(GgufItem::into_files)
                .collect());
        }

        let mut picked: Vec<HfFile> = Vec::new();
        let mut valid = true;
        for part in choice.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match part.parse::<usize>() {
                Ok(n) if n >= 1 && n <= items.len() => {
                    let item = &items[n - 1];
                    if !item.is_complete() {
                        eprintln!("Skipping incomplete series: {}", item.label());
                        continue;
                    }
                    picked.extend(item.clone().into_files());
                }
                _ => {
                    eprintln!(
                        "Invalid input '{}'; enter numbers from 1 to {}.",
                        part,
                        items.len()
                    );
                    valid = false;
                    break;
                }
            }
        }
        if valid {
            picked.dedup_by(|a, b| a.filename == b.filename);
            return Ok(picked);
        }
    }
}
