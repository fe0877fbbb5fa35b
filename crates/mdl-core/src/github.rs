//! GitHub source: llama.cpp release asset selection.
//!
//! The release API reports asset sizes up front, so batches built from here
//! skip the HEAD pre-scan entirely.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http;
use crate::scheduler::DownloadRequest;

pub const LLAMA_CPP_REPO: &str = "ggml-org/llama.cpp";

#[derive(Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

/// Fetches the latest release of `owner/repo`. Blocking; call via
/// `spawn_blocking`.
pub fn latest_release(repo: &str) -> Result<Release> {
    let url = format!("https://api.github.com/repos/{}/releases/latest", repo);
    let body = http::fetch_body(&url, None)
        .with_context(|| format!("fetch latest release of '{}'", repo))?;
    serde_json::from_slice(&body).with_context(|| format!("parse release of '{}'", repo))
}

/// Build flavors the llama.cpp release matrix publishes.
pub const VARIANTS: &[&str] = &["cpu", "cuda", "vulkan"];

/// Picks the best binary asset for this machine's OS/arch and the requested
/// variant.
pub fn pick_asset_for_host<'a>(
    assets: &'a [ReleaseAsset],
    variant: &str,
) -> Option<&'a ReleaseAsset> {
    let os = if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "win"
    } else {
        "ubuntu"
    };
    let arch = if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        "x64"
    };
    pick_asset(assets, os, arch, variant)
}

/// Asset selection against the known naming scheme
/// (`llama-<tag>-bin-<os>[-<accel>]-<arch>.zip`). `cpu` means "no
/// accelerator tag"; accelerated variants must name their tag.
pub fn pick_asset<'a>(
    assets: &'a [ReleaseAsset],
    os: &str,
    arch: &str,
    variant: &str,
) -> Option<&'a ReleaseAsset> {
    const ACCELERATORS: &[&str] = &["cuda", "vulkan", "hip", "sycl", "kompute"];

    let mut best: Option<(&ReleaseAsset, usize)> = None;
    for asset in assets {
        let name = asset.name.to_lowercase();
        if !name.contains("-bin-") || !name.contains(os) || !name.contains(arch) {
            continue;
        }
        let accelerated: Vec<&str> = ACCELERATORS
            .iter()
            .copied()
            .filter(|a| name.contains(a))
            .collect();
        let score = if variant == "cpu" {
            if !accelerated.is_empty() {
                continue;
            }
            1
        } else {
            if !name.contains(variant) {
                continue;
            }
            // Prefer the asset naming only the requested accelerator.
            if accelerated.len() == 1 {
                2
            } else {
                1
            }
        };
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((asset, score));
        }
    }
    best.map(|(a, _)| a)
}

/// Converts an asset to a request carrying its known size.
pub fn to_request(asset: &ReleaseAsset) -> DownloadRequest {
    DownloadRequest::new(asset.browser_download_url.clone())
        .with_name(asset.name.clone())
        .with_size(asset.size)
}
