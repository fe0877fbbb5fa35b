//! Shared HTTP plumbing on the curl stack: user agents, the gated-host
//! bearer rule, and a small body-capture GET used by the source APIs.

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("mdl/", env!("CARGO_PKG_VERSION"));
pub const PRESCAN_USER_AGENT: &str = concat!("mdl-prescan/", env!("CARGO_PKG_VERSION"));

/// The only host that ever receives the bearer token.
pub const GATED_HOST: &str = "huggingface.co";

pub const MAX_REDIRECTS: u32 = 10;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Wall-clock ceiling for one GET transfer.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(3600);

/// True when `url`'s hostname string-matches the gated host.
pub fn host_is_gated(url: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(GATED_HOST)))
        .unwrap_or(false)
}

/// The `Authorization` header line for `url`, or `None` when the token is
/// absent or the host is not gated.
pub fn bearer_header(url: &str, token: Option<&str>) -> Option<String> {
    match token {
        Some(t) if !t.is_empty() && host_is_gated(url) => {
            Some(format!("Authorization: Bearer {}", t))
        }
        _ => None,
    }
}

/// Fetches a small response body (API JSON). Follows redirects, fails on
/// non-2xx. Blocking; call from `spawn_blocking` in async contexts.
pub fn fetch_body(url: &str, token: Option<&str>) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.useragent(USER_AGENT)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(Duration::from_secs(30))?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    if let Some(auth) = bearer_header(url, token) {
        list.append(&auth)?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    Ok(body)
}
