//! Hugging Face source: repo file enumeration and GGUF shard grouping.
//!
//! The model API lists sibling files; each becomes a `resolve/main` download
//! URL with the repo-relative filename preserved (quant subdirectories like
//! `BF16/` land on disk as-is). Sharded GGUFs (`-00001-of-00004.gguf`) group
//! into series so a whole model can be selected in one go.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::http;
use crate::scheduler::DownloadRequest;

/// One downloadable file in a Hugging Face repo.
#[derive(Debug, Clone)]
pub struct HfFile {
    /// Repo-relative filename, possibly with subdirectories.
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    #[serde(default)]
    siblings: Vec<ApiSibling>,
}

#[derive(Debug, Deserialize)]
struct ApiSibling {
    rfilename: String,
}

/// Lists every file in `owner/repo`. Blocking; call via `spawn_blocking`.
pub fn repo_files(repo: &str, token: Option<&str>) -> Result<Vec<HfFile>> {
    let api_url = format!("https://huggingface.co/api/models/{}", repo);
    let body = http::fetch_body(&api_url, token)
        .with_context(|| format!("list repo '{}'", repo))?;
    let model: ApiModel =
        serde_json::from_slice(&body).with_context(|| format!("parse listing for '{}'", repo))?;
    if model.siblings.is_empty() {
        anyhow::bail!("repo '{}' lists no files", repo);
    }
    Ok(model
        .siblings
        .into_iter()
        .map(|s| HfFile {
            url: resolve_url(repo, &s.rfilename),
            filename: s.rfilename,
        })
        .collect())
}

/// Download URL for one file of a repo.
pub fn resolve_url(repo: &str, rfilename: &str) -> String {
    format!("https://huggingface.co/{}/resolve/main/{}", repo, rfilename)
}

/// Converts files to download requests, keeping repo-relative names.
pub fn to_requests(files: Vec<HfFile>) -> Vec<DownloadRequest> {
    files
        .into_iter()
        .map(|f| DownloadRequest::new(f.url).with_name(f.filename))
        .collect()
}

static GGUF_SERIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+)-(\d{5})-of-(\d{5})\.gguf$").expect("series regex"));

/// A sharded GGUF model: all parts found of a `-NNNNN-of-NNNNN` series.
#[derive(Debug, Clone)]
pub struct GgufSeries {
    pub base_name: String,
    pub total_parts: usize,
    pub files: Vec<HfFile>,
}

impl GgufSeries {
    pub fn is_complete(&self) -> bool {
        self.total_parts > 0 && self.files.len() == self.total_parts
    }
}

/// A selectable GGUF entry: a whole shard series or a standalone file.
#[derive(Debug, Clone)]
pub enum GgufItem {
    Series(GgufSeries),
    Single(HfFile),
}

impl GgufItem {
    pub fn label(&self) -> String {
        match self {
            GgufItem::Series(s) => {
                let completeness = if s.is_complete() {
                    String::new()
                } else {
                    format!(" (INCOMPLETE: {}/{} parts)", s.files.len(), s.total_parts)
                };
                format!(
                    "Series: {} ({} parts){}",
                    s.base_name,
                    s.files.len(),
                    completeness
                )
            }
            GgufItem::Single(f) => format!("File: {}", f.filename),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            GgufItem::Series(s) => s.is_complete(),
            GgufItem::Single(_) => true,
        }
    }

    pub fn into_files(self) -> Vec<HfFile> {
        match self {
            GgufItem::Series(s) => s.files,
            GgufItem::Single(f) => vec![f],
        }
    }
}

/// Groups a repo's GGUF files into shard series and standalone entries,
/// sorted by label. Non-GGUF files are dropped.
pub fn group_gguf(files: Vec<HfFile>) -> Vec<GgufItem> {
    let mut series: HashMap<String, GgufSeries> = HashMap::new();
    let mut singles: Vec<HfFile> = Vec::new();

    for file in files {
        if !file.filename.to_lowercase().ends_with(".gguf") {
            continue;
        }
        match GGUF_SERIES_RE.captures(&file.filename) {
            Some(caps) => {
                let base_name = caps[1].to_string();
                let total_parts: usize = caps[3].parse().unwrap_or(0);
                let key = format!("{}-of-{}", base_name, total_parts);
                let entry = series.entry(key).or_insert_with(|| GgufSeries {
                    base_name,
                    total_parts,
                    files: Vec::new(),
                });
                entry.files.push(file);
            }
            None => singles.push(file),
        }
    }

    let mut items: Vec<GgufItem> = Vec::new();
    for (_, mut s) in series {
        s.files.sort_by(|a, b| a.filename.cmp(&b.filename));
        items.push(GgufItem::Series(s));
    }
    items.extend(singles.into_iter().map(GgufItem::Single));
    items.sort_by_key(|i| i.label());
    items
}
