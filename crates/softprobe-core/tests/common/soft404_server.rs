//! Minimal HTTP/1.1 server that answers like a soft-404 site, for integration tests.
//!
//! Serves a fixed route table. Unknown paths get `200 OK` with the site's
//! not-found HTML, the way the real site does. Every response closes the
//! connection. Requests are recorded so tests can check the headers sent.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub const NOT_FOUND_PAGE: &[u8] =
    b"<!DOCTYPE html><html><head><title>Page not found</title></head><body>Sorry</body></html>";
pub const CONSENT_PAGE: &[u8] = b"<html><body>Are you 18 or older?</body></html>";

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u32,
    pub body: Vec<u8>,
    pub location: Option<String>,
    pub content_encoding: Option<String>,
    /// Without this cookie the request gets the consent wall instead.
    pub cookie: Option<String>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            location: None,
            content_encoding: None,
            cookie: None,
        }
    }

    pub fn status(status: u32) -> Self {
        Self {
            status,
            body: b"gone".to_vec(),
            location: None,
            content_encoding: None,
            cookie: None,
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 302,
            body: Vec::new(),
            location: Some(to.to_string()),
            content_encoding: None,
            cookie: None,
        }
    }

    /// `body` is already encoded with `coding` (e.g. gzip bytes).
    pub fn encoded(mut self, coding: &str) -> Self {
        self.content_encoding = Some(coding.to_string());
        self
    }

    pub fn behind_cookie(mut self, cookie: &str) -> Self {
        self.cookie = Some(cookie.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct Server {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Server {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> Server {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &log));
        }
    });
    Server {
        base: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// A URL whose server accepts connections and never answers.
pub fn stalled_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://127.0.0.1:{}/slow.pdf", port)
}

/// A URL nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/nothing.pdf", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    log: &Mutex<Vec<Recorded>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let recorded = parse_request(request);
    let sent_cookie = recorded.header("Cookie").map(str::to_string);
    let path = recorded.path.clone();
    log.lock().unwrap().push(recorded);

    let route = routes.get(&path);
    let (status, body, location, encoding) = match route {
        Some(r) if r.cookie.is_some() && r.cookie != sent_cookie => {
            (200, CONSENT_PAGE, None, None)
        }
        Some(r) => (
            r.status,
            r.body.as_slice(),
            r.location.as_deref(),
            r.content_encoding.as_deref(),
        ),
        None => (200, NOT_FOUND_PAGE, None, None),
    };
    let reason = match status {
        200 => "OK",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Status",
    };
    let location = location
        .map(|l| format!("Location: {}\r\n", l))
        .unwrap_or_default();
    let encoding = encoding
        .map(|e| format!("Content-Encoding: {}\r\n", e))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}{}Connection: close\r\n\r\n",
        status,
        reason,
        body.len(),
        location,
        encoding
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn parse_request(request: &str) -> Recorded {
    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    Recorded { path, headers }
}
