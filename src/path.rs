//! FSH-style path lexing.
//!
//! Paths are dot-separated, but a dot inside brackets belongs to the bracket
//! token (`extension[http://example.org/ext].url` is two segments). The
//! sentinel path `"."` addresses the snapshot root and lexes to no segments.

/// One parsed path segment: the element name and an optional bracket token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub base: String,
    pub slice: Option<String>,
}

/// Split a path on dots at bracket depth zero.
pub fn split_fsh_path(path: &str) -> Vec<String> {
    if path == "." {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth: u32 = 0;

    for ch in path.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '.' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Parse one raw segment into `{base, slice?}`.
///
/// Mirrors `^([^\[\]:]+)(?:\[(.+?)\])?$`: the base may not contain brackets
/// or colons, the bracket token spans up to the final `]`. A raw segment
/// that does not fit the pattern becomes the base verbatim, with no slice.
pub fn parse_segment(raw: &str) -> PathSegment {
    let fallback = || PathSegment {
        base: raw.to_string(),
        slice: None,
    };

    match raw.find('[') {
        None => fallback(),
        Some(open) => {
            let base = &raw[..open];
            if base.is_empty() || base.contains(':') || base.contains(']') {
                return fallback();
            }
            let Some(inner) = raw[open + 1..].strip_suffix(']') else {
                return fallback();
            };
            if inner.is_empty() {
                return fallback();
            }
            PathSegment {
                base: base.to_string(),
                slice: Some(inner.to_string()),
            }
        }
    }
}

/// Uppercase the first ASCII character, leave the rest untouched.
pub fn initcap(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Last dot-separated segment of a path-like string.
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
