//! Soft-404 signature marker.
//!
//! The marker is the `<title>` element of a saved copy of the site's
//! "page not found" response. It is loaded once at startup and shared
//! read-only by every probe. If the reference page is missing or has no
//! title, the literal `Page not found` is used instead.

use memchr::memmem;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Marker used when no reference page is available.
pub const FALLBACK_MARKER: &[u8] = b"Page not found";

/// How the marker was obtained (reported at startup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSource {
    /// Explicit `signature_marker` from config or CLI.
    Configured,
    /// `<title>` element of the reference page.
    ReferencePage,
    /// Built-in fallback literal.
    Fallback,
}

/// Immutable marker bytes identifying the soft-404 page. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMarker {
    bytes: Arc<[u8]>,
    source: MarkerSource,
}

impl SignatureMarker {
    /// Marker from explicit bytes. Empty input falls back to `FALLBACK_MARKER`,
    /// since an empty needle would match every chunk.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Self::fallback();
        }
        Self {
            bytes: Arc::from(bytes),
            source: MarkerSource::Configured,
        }
    }

    pub fn fallback() -> Self {
        Self {
            bytes: Arc::from(FALLBACK_MARKER),
            source: MarkerSource::Fallback,
        }
    }

    /// Loads the marker from a reference not-found page.
    ///
    /// Never fails: an unreadable page or a page without a `<title>` element
    /// logs a warning and yields the fallback marker.
    pub fn from_reference_page(path: &Path) -> Self {
        match fs::read(path) {
            Ok(page) => match extract_title(&page) {
                Some(title) => {
                    tracing::debug!(
                        path = %path.display(),
                        marker = %String::from_utf8_lossy(title),
                        "loaded soft-404 signature"
                    );
                    Self {
                        bytes: Arc::from(title),
                        source: MarkerSource::ReferencePage,
                    }
                }
                None => {
                    tracing::warn!(
                        path = %path.display(),
                        "reference page has no <title>; using fallback marker"
                    );
                    Self::fallback()
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not read reference page; using fallback marker"
                );
                Self::fallback()
            }
        }
    }

    /// Resolves the marker from the configured sources: explicit marker first,
    /// then the reference page, then the fallback.
    pub fn load(explicit: Option<&str>, reference_page: Option<&Path>) -> Self {
        if let Some(m) = explicit.filter(|m| !m.is_empty()) {
            return Self::new(m);
        }
        match reference_page {
            Some(path) => Self::from_reference_page(path),
            None => Self::fallback(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source(&self) -> MarkerSource {
        self.source
    }

    /// True if the marker occurs anywhere in `haystack`.
    pub fn found_in(&self, haystack: &[u8]) -> bool {
        memmem::find(haystack, &self.bytes).is_some()
    }
}

/// Returns the bytes of the first `<title ...>...</title>` element, tags included.
/// Tag names are matched case-insensitively.
fn extract_title(page: &[u8]) -> Option<&[u8]> {
    let lower = page.to_ascii_lowercase();
    let start = memmem::find(&lower, b"<title")?;
    let close = b"</title>";
    let end = memmem::find(&lower[start..], close)? + start + close.len();
    Some(&page[start..end])
}
