//! Shared helpers for integration tests: range-aware and flaky responders,
//! a raw socket server, recording reporters and archive page builders.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use datfetch_core::{Console, ProgressSink, Severity};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use wiremock::{Request, Respond, ResponseTemplate};

/// Serves `body`, honouring `Range: bytes=N-` with a 206 suffix.
pub struct RangeResponder {
    pub body: Vec<u8>,
    pub hits: Arc<AtomicUsize>,
    pub ranges: Arc<Mutex<Vec<String>>>,
}

impl RangeResponder {
    pub fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            hits: Arc::new(AtomicUsize::new(0)),
            ranges: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let range = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let Some(range) = range else {
            return ResponseTemplate::new(200).set_body_bytes(self.body.clone());
        };
        self.ranges.lock().unwrap().push(range.clone());

        let start = range
            .strip_prefix("bytes=")
            .and_then(|r| r.strip_suffix('-'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0)
            .min(self.body.len());
        ResponseTemplate::new(206)
            .insert_header(
                "content-range",
                format!("bytes {start}-{}/{}", self.body.len().saturating_sub(1), self.body.len()),
            )
            .set_body_bytes(self.body[start..].to_vec())
    }
}

/// Answers `fail_count` requests with `status`, then 200 with `body`.
pub struct FlakyResponder {
    pub request_count: Arc<AtomicUsize>,
    pub fail_count: usize,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FlakyResponder {
    pub fn new(fail_count: usize, status: u16, body: &[u8]) -> Self {
        Self {
            request_count: Arc::new(AtomicUsize::new(0)),
            fail_count,
            status,
            body: body.to_vec(),
        }
    }
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.request_count.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_count {
            ResponseTemplate::new(self.status).set_body_bytes(b"unavailable".to_vec())
        } else {
            ResponseTemplate::new(200).set_body_bytes(self.body.clone())
        }
    }
}

/// Records console lines and progress calls; can cancel a token on first progress.
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: Mutex<Vec<(String, Severity)>>,
    pub answers: Mutex<Vec<String>>,
    pub begins: Mutex<Vec<(u64, u64)>>,
    pub advanced: AtomicUsize,
    pub cancel_on_progress: Option<CancellationToken>,
}

impl RecordingReporter {
    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_progress: Some(token),
            ..Self::default()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn has_line_starting_with(&self, prefix: &str) -> bool {
        self.lines().iter().any(|l| l.starts_with(prefix))
    }
}

impl Console for RecordingReporter {
    fn report(&self, message: &str, severity: Severity, _rewrite_last_line: bool) {
        self.lines.lock().unwrap().push((message.to_string(), severity));
    }

    fn prompt(&self, _message: &str) -> io::Result<String> {
        self.answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer"))
    }
}

impl ProgressSink for RecordingReporter {
    fn begin(&self, total: u64, position: u64) {
        self.begins.lock().unwrap().push((total, position));
    }

    fn advance(&self, bytes: u64) {
        self.advanced.fetch_add(bytes as usize, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_progress {
            token.cancel();
        }
    }

    fn end(&self) {}
}

/// Renders a directory listing page in the archive's table layout.
pub fn listing_page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><body><table id=\"list\"><thead><tr><th>File Name</th><th>Size</th></tr></thead><tbody>\n\
         <tr><td class=\"link\"><a href=\"../\">Parent directory/</a></td><td>-</td></tr>\n",
    );
    for (title, href) in rows {
        html.push_str(&format!(
            "<tr><td class=\"link\"><a href=\"{href}\" title=\"{title}\">{title}</a></td><td>-</td></tr>\n"
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

/// Minimal No-Intro style DAT with the given game names.
pub fn dat_xml(system: &str, games: &[&str]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\"?>\n<datafile>\n\t<header>\n\t\t<name>{system}</name>\n\
         \t\t<url>https://www.no-intro.org</url>\n\t</header>\n"
    );
    for game in games {
        xml.push_str(&format!(
            "\t<game name=\"{game}\">\n\t\t<rom name=\"{game}.gb\" size=\"1\"/>\n\t</game>\n"
        ));
    }
    xml.push_str("</datafile>\n");
    xml
}

/// Deterministic payload larger than one write slice.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// One-request-per-connection HTTP server writing whatever bytes the handler
/// returns, then closing. Serves replies wiremock cannot express, such as
/// bodies cut short or bodies without `Content-Length`.
pub struct RawServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl RawServer {
    /// `handler(n, head)` gets the 0-based request number and the request head.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(usize, &str) -> Vec<u8> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let head = read_head(&mut socket).await;
                let n = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(head.clone());
                    seen.len() - 1
                };
                let _ = socket.write_all(&handler(n, &head)).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, file: &str) -> String {
        format!("http://{}/{file}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `Range` header values of every request received, in order.
    pub fn ranges(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|head| range_start(head).map(|start| format!("bytes={start}-")))
            .collect()
    }
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Start offset of a `Range: bytes=N-` header in a raw request head.
pub fn range_start(head: &str) -> Option<usize> {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("range").then(|| value.trim().to_string())
        })?
        .strip_prefix("bytes=")?
        .strip_suffix('-')?
        .parse()
        .ok()
}

/// Raw `HTTP/1.1` reply with `Connection: close`.
pub fn raw_reply(status: &str, headers: &[(&str, String)], body: &[u8]) -> Vec<u8> {
    let mut reply = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
    for (name, value) in headers {
        reply.push_str(&format!("{name}: {value}\r\n"));
    }
    reply.push_str("\r\n");
    let mut bytes = reply.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}
