//! Base-link modeling: strip the extension from a result link and derive the
//! local filename stem used for the output file and the skip check.

mod path;
mod sanitize;

pub use path::split_extension;
pub use sanitize::sanitize_stem;

use thiserror::Error;
use url::Url;

/// Reasons an input link cannot be turned into a `BaseLink`.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid URL {link:?}: {source}")]
    InvalidUrl {
        link: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {scheme:?} in {link:?}")]
    UnsupportedScheme { link: String, scheme: String },
    #[error("no filename in URL path: {0:?}")]
    NoFileName(String),
}

/// A result link with its trailing extension removed.
///
/// Holds the original link (written to the miss log), the extension-less URL
/// that candidates are built from, and the sanitized local filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseLink {
    original: String,
    base_url: String,
    stem: String,
}

impl BaseLink {
    /// Derives the base link from `link`.
    ///
    /// The last path segment loses everything from its final `.` (a leading
    /// dot is not an extension separator). Query and fragment are dropped.
    ///
    /// # Examples
    ///
    /// - `https://host/files/EFTA0001.pdf` → base `https://host/files/EFTA0001`, stem `EFTA0001`
    /// - `https://host/files/clip` → base `https://host/files/clip`, stem `clip`
    pub fn parse(link: &str) -> Result<Self, LinkError> {
        let original = link.trim().to_string();
        let mut url = Url::parse(&original).map_err(|source| LinkError::InvalidUrl {
            link: original.clone(),
            source,
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(LinkError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                link: original,
            });
        }

        let segment = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| LinkError::NoFileName(original.clone()))?;
        let (raw_stem, _) = split_extension(&segment);

        let path = url.path();
        let dir = &path[..path.len() - segment.len()];
        let new_path = format!("{}{}", dir, raw_stem);
        url.set_path(&new_path);
        url.set_query(None);
        url.set_fragment(None);

        let decoded = urlencoding::decode(raw_stem)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| raw_stem.to_string());
        let stem = sanitize_stem(&decoded);
        if stem.is_empty() {
            return Err(LinkError::NoFileName(original));
        }

        Ok(Self {
            original,
            base_url: url.to_string(),
            stem,
        })
    }

    /// The link exactly as supplied (trimmed).
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The URL without its extension, e.g. `http://x/doc`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Local filename stem, e.g. `doc`.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Fully qualified candidate URL for `extension` (given without the dot).
    pub fn with_extension(&self, extension: &str) -> String {
        format!("{}.{}", self.base_url, extension)
    }

    /// Local output filename for `extension`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.stem, extension)
    }
}
