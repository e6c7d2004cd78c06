//! Filesystem-safe stem sanitization for output filenames.

/// Longest stem we keep; leaves room for `.<ext>.part` under NAME_MAX (255).
const STEM_MAX: usize = 240;

/// Sanitizes a decoded filename stem for use as a local file name.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses runs of `_`
/// - Trims leading/trailing dots, spaces and underscores
/// - Truncates to `STEM_MAX` bytes on a char boundary
pub fn sanitize_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');
    let mut take = trimmed.len().min(STEM_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
