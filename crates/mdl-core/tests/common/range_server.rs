//! Minimal HTTP/1.1 server for download tests: HEAD, Range GET, and the
//! failure modes the worker must classify (refused resume, forced status,
//! missing Content-Length, mid-stream disconnect).
//!
//! Serves a single static body per server. Every response carries
//! `Connection: close` and the connection is dropped afterwards, so a
//! missing Content-Length still delimits the body.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If false, omit `Content-Length`; the body is delimited by close.
    pub send_content_length: bool,
    /// Forces every GET to this status line (e.g. `404 Not Found`) with
    /// `error_body` as the payload.
    pub status_override: Option<&'static str>,
    pub error_body: &'static [u8],
    /// Close the connection after this many body bytes of a GET response.
    pub drop_after: Option<usize>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            support_ranges: true,
            send_content_length: true,
            status_override: None,
            error_body: b"",
            drop_after: None,
        }
    }
}

/// One observed request: method plus the raw `Range` value, if any.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub range: Option<String>,
}

pub type RequestLog = Arc<Mutex<Vec<SeenRequest>>>;

/// Starts a server serving `body` with default options. Returns the base URL.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, RangeServerOptions::default()).0
}

/// Like `start` but with custom behavior; also returns the request log.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log_for_server = Arc::clone(&log);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&log_for_server);
            thread::spawn(move || handle(stream, &body, opts, &log));
        }
    });
    (format!("http://127.0.0.1:{}/", port), log)
}

fn handle(mut stream: TcpStream, body: &[u8], opts: RangeServerOptions, log: &RequestLog) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range) = parse_request(request);
    log.lock().unwrap().push(SeenRequest {
        method: method.to_string(),
        range: range.clone(),
    });
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    if let Some(status) = opts.status_override {
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            opts.error_body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(opts.error_body);
        return;
    }

    let parsed_range = range.as_deref().and_then(parse_byte_range);
    let (status, slice) = match parsed_range {
        Some((start, _)) if opts.support_ranges => {
            let start = (start as usize).min(body.len());
            ("206 Partial Content", &body[start..])
        }
        _ => ("200 OK", body),
    };

    let mut headers = format!("HTTP/1.1 {}\r\n", status);
    if opts.send_content_length {
        headers.push_str(&format!("Content-Length: {}\r\n", slice.len()));
    }
    if status.starts_with("206") {
        let start = total as usize - slice.len();
        headers.push_str(&format!(
            "Content-Range: bytes {}-{}/{}\r\n",
            start,
            total.saturating_sub(1),
            total
        ));
    }
    headers.push_str("Connection: close\r\n\r\n");
    let _ = stream.write_all(headers.as_bytes());

    match opts.drop_after {
        Some(cut) if cut < slice.len() => {
            let _ = stream.write_all(&slice[..cut]);
            let _ = stream.flush();
            let _ = stream.shutdown(Shutdown::Both);
        }
        _ => {
            let _ = stream.write_all(slice);
        }
    }
}

/// Returns (method, raw `Range` header value).
fn parse_request(request: &str) -> (&str, Option<String>) {
    let mut method = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    (method, range)
}

/// Parses `bytes=X-` / `bytes=X-Y` into (start, end_inclusive).
fn parse_byte_range(value: &str) -> Option<(u64, u64)> {
    let rest = value.strip_prefix("bytes=")?;
    let (a, b) = rest.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let end = if b.trim().is_empty() {
        u64::MAX
    } else {
        b.trim().parse::<u64>().ok()?
    };
    Some((start, end))
}
