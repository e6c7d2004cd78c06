//! Extension splitting for the last URL path segment.

/// Splits `segment` at its final `.` into `(stem, extension)`.
///
/// Leading dots never start an extension, so `.hidden` and `..` have none.
/// A trailing dot yields an empty extension (`"a."` → `("a", Some(""))`).
pub fn split_extension(segment: &str) -> (&str, Option<&str>) {
    let leading = segment.len() - segment.trim_start_matches('.').len();
    match segment[leading..].rfind('.') {
        Some(i) => {
            let dot = leading + i;
            (&segment[..dot], Some(&segment[dot + 1..]))
        }
        None => (segment, None),
    }
}
