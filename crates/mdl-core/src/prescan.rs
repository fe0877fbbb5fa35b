//! HTTP HEAD pre-scan.
//!
//! Discovers file sizes before the progress view starts so bars can show
//! totals immediately. Sources that already report sizes (release asset
//! metadata) skip this entirely. Failures leave the size unknown; the GET
//! response fills it in later.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::str;
use std::time::Duration;

use crate::http;
use crate::scheduler::DownloadRequest;

/// Fan-out cap for the HEAD phase, independent of the download pool.
pub const PRESCAN_CONCURRENCY: usize = 20;

const HEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Fills `known_size` for every request that lacks one, up to
/// [`PRESCAN_CONCURRENCY`] probes in flight at a time.
pub async fn scan_sizes(requests: &mut [DownloadRequest], token: Option<&str>) {
    let mut pending: VecDeque<usize> = requests
        .iter()
        .enumerate()
        .filter(|(_, r)| r.known_size.is_none())
        .map(|(i, _)| i)
        .collect();
    if pending.is_empty() {
        return;
    }
    tracing::info!("pre-scanning {} file(s) for sizes", pending.len());

    let mut join_set = tokio::task::JoinSet::new();
    loop {
        while join_set.len() < PRESCAN_CONCURRENCY {
            let Some(i) = pending.pop_front() else {
                break;
            };
            let url = requests[i].url.clone();
            let token = token.map(str::to_string);
            join_set.spawn_blocking(move || (i, probe_size(&url, token.as_deref())));
        }
        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let Ok((i, probed)) = joined else {
            continue;
        };
        match probed {
            Ok(size) => requests[i].known_size = Some(size),
            Err(e) => {
                tracing::warn!(url = %requests[i].url, error = %e, "pre-scan failed; size stays unknown");
            }
        }
    }
}

/// One HEAD probe. Only a `200 OK` with a `Content-Length` yields a size.
/// Blocking; run under `spawn_blocking` from async code.
pub fn probe_size(url: &str, token: Option<&str>) -> Result<u64> {
    let mut content_length: Option<u64> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.nobody(true)?;
    easy.useragent(http::PRESCAN_USER_AGENT)?;
    easy.follow_location(true)?;
    easy.max_redirections(http::MAX_REDIRECTS)?;
    easy.timeout(HEAD_TIMEOUT)?;

    if let Some(auth) = http::bearer_header(url, token) {
        let mut list = curl::easy::List::new();
        list.append(&auth)?;
        easy.http_headers(list)?;
        easy.unrestricted_auth(true)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                let line = line.trim_end();
                if line.starts_with("HTTP/") {
                    // New hop: forget the previous response's length.
                    content_length = None;
                } else if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().ok();
                    }
                }
            }
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if code != 200 {
        anyhow::bail!("HEAD {} returned HTTP {}", url, code);
    }
    content_length.with_context(|| format!("HEAD {} had no Content-Length", url))
}
