//! Soft-404 classification of the first response chunk.

use crate::signature::SignatureMarker;

/// How many leading bytes are scanned for HTML markup.
const HTML_SNIFF_LEN: usize = 50;

const HTML_TOKENS: [&[u8]; 2] = [b"<!doctype html", b"<html"];

/// Classification of a 200 response from its first chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Zero-length body.
    Empty,
    /// HTML page or the site's not-found page served with 200.
    SoftNotFound,
    /// Anything else; treated as the real asset.
    Genuine,
}

/// Classifies `first_chunk`.
///
/// Binary assets practically never start with HTML markup, so a chunk that is
/// neither HTML nor contains the signature marker is accepted as genuine
/// without content-type validation.
pub fn classify(first_chunk: &[u8], signature: &SignatureMarker) -> Verdict {
    if first_chunk.is_empty() {
        return Verdict::Empty;
    }
    let head = first_chunk[..first_chunk.len().min(HTML_SNIFF_LEN)].to_ascii_lowercase();
    let looks_html = HTML_TOKENS
        .iter()
        .any(|token| memchr::memmem::find(&head, token).is_some());
    if looks_html || signature.found_in(first_chunk) {
        return Verdict::SoftNotFound;
    }
    Verdict::Genuine
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> SignatureMarker {
        SignatureMarker::new("Page not found")
    }

    #[test]
    fn empty_chunk() {
        assert_eq!(classify(b"", &marker()), Verdict::Empty);
    }

    #[test]
    fn doctype_and_html_tag_any_case() {
        assert_eq!(classify(b"<!DOCTYPE html><p>hi", &marker()), Verdict::SoftNotFound);
        assert_eq!(classify(b"\n  <HTML lang=en>", &marker()), Verdict::SoftNotFound);
    }

    #[test]
    fn html_token_past_sniff_window_is_not_enough() {
        let mut chunk = vec![b' '; HTML_SNIFF_LEN];
        chunk.extend_from_slice(b"<html>");
        assert_eq!(classify(&chunk, &marker()), Verdict::Genuine);
    }

    #[test]
    fn marker_and_html_page() {
        assert_eq!(
            classify(b"<html><body>Page not found</body></html>", &marker()),
            Verdict::SoftNotFound
        );
    }

    #[test]
    fn marker_anywhere_is_never_genuine() {
        let m = marker();
        let prefixes: [&[u8]; 4] = [b"", b"\xef\xbb\xbf", b"%PDF-1.7 ", &[0u8; 4000]];
        let suffixes: [&[u8]; 3] = [b"", b" trailing", &[0xffu8; 100]];
        for prefix in prefixes {
            for suffix in suffixes {
                let mut chunk = prefix.to_vec();
                chunk.extend_from_slice(m.as_bytes());
                chunk.extend_from_slice(suffix);
                assert_eq!(classify(&chunk, &m), Verdict::SoftNotFound);
            }
        }
    }

    #[test]
    fn binary_and_text_are_genuine() {
        assert_eq!(classify(b"%PDF-1.4\n%\xe2\xe3", &marker()), Verdict::Genuine);
        assert_eq!(classify(b"\x00\x00\x00\x18ftypmp42", &marker()), Verdict::Genuine);
        assert_eq!(classify(b"Hello World", &marker()), Verdict::Genuine);
    }

    #[test]
    fn total_over_arbitrary_bytes() {
        let m = marker();
        for n in 0..=255u8 {
            let chunk: Vec<u8> = (0..n).map(|i| i.wrapping_mul(n)).collect();
            let v = classify(&chunk, &m);
            assert!(matches!(v, Verdict::Empty | Verdict::SoftNotFound | Verdict::Genuine));
            assert_eq!(v == Verdict::Empty, chunk.is_empty());
        }
    }
}
