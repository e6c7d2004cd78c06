//! Browser identity sent with every probe.
//!
//! The target site serves a consent wall instead of content unless the
//! request looks like a desktop browser navigation and carries its
//! age-verification cookie.

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, br";
pub const CONSENT_COOKIE: &str = "justiceGovAgeVerified=true";

/// Navigation headers that never vary.
const NAVIGATION_HEADERS: [(&str, &str); 6] = [
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
];

/// `[identity]` section of config.toml. Missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserIdentity {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Advertised encodings; codings libcurl cannot decode are left out.
    pub accept_encoding: String,
    /// `Cookie` value; empty sends none.
    pub cookie: String,
}

impl Default for BrowserIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            accept_encoding: DEFAULT_ACCEPT_ENCODING.to_string(),
            cookie: CONSENT_COOKIE.to_string(),
        }
    }
}

impl BrowserIdentity {
    /// `Name: value` lines for headers curl has no dedicated option for.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Accept: {}", self.accept),
            format!("Accept-Language: {}", self.accept_language),
        ];
        lines.extend(
            NAVIGATION_HEADERS
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v)),
        );
        lines
    }

    /// The configured `Accept-Encoding` list minus codings libcurl cannot
    /// decode. Advertising one it cannot decode turns a genuine file into a
    /// transfer error. An empty result means "whatever libcurl supports".
    pub fn decodable_encoding(&self, zlib: bool, brotli: bool) -> String {
        self.accept_encoding
            .split(',')
            .map(str::trim)
            .filter(|coding| {
                let name = coding.split(';').next().unwrap_or("").trim();
                match name.to_ascii_lowercase().as_str() {
                    "identity" => true,
                    "gzip" | "x-gzip" | "deflate" => zlib,
                    "br" => brotli,
                    _ => false,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
