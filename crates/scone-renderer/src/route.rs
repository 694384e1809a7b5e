//! Fragment route protocol (`#file=<percent-encoded path>`).
//!
//! Encoding follows the browser's `encodeURIComponent` / `encodeURI` sets so
//! routes written here are interchangeable with routes typed in an address bar.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters escaped by `encodeURI` (reserved URI characters are kept).
const URI: &AsciiSet = &COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Route key inside the fragment.
const FILE_KEY: &str = "file=";

/// Percent-encode a single URI component.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-encode a path for use as a request URI, keeping `/` and other
/// reserved characters intact.
#[must_use]
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI).to_string()
}

/// Percent-decode a value, returning `None` if it is not valid UTF-8.
#[must_use]
pub fn decode(value: &str) -> Option<String> {
    percent_decode_str(value)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Build the fragment (with leading `#`) that routes to `path`.
///
/// # Examples
///
/// ```
/// use scone_renderer::file_fragment;
///
/// assert_eq!(file_fragment("pages/a b.md"), "#file=pages%2Fa%20b.md");
/// ```
#[must_use]
pub fn file_fragment(path: &str) -> String {
    format!("#{FILE_KEY}{}", encode_component(path))
}

/// Extract the routed file path from a fragment.
///
/// Accepts the fragment with or without the leading `#`. The value runs from
/// `file=` up to the next `&` or the end. Returns `None` when the key is
/// absent, the value is empty, or it does not decode to UTF-8.
///
/// # Examples
///
/// ```
/// use scone_renderer::parse_file_fragment;
///
/// assert_eq!(parse_file_fragment("#file=a.md").as_deref(), Some("a.md"));
/// assert_eq!(parse_file_fragment("#top"), None);
/// ```
#[must_use]
pub fn parse_file_fragment(fragment: &str) -> Option<String> {
    let start = fragment.find(FILE_KEY)? + FILE_KEY.len();
    let rest = &fragment[start..];
    let value = rest.split('&').next().unwrap_or_default();
    if value.is_empty() {
        return None;
    }
    decode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_escapes_slash() {
        assert_eq!(encode_component("pages/guide.md"), "pages%2Fguide.md");
    }

    #[test]
    fn test_encode_component_keeps_unreserved() {
        assert_eq!(encode_component("a-b_c.d!~*'()"), "a-b_c.d!~*'()");
    }

    #[test]
    fn test_encode_component_utf8() {
        assert_eq!(encode_component("가.md"), "%EA%B0%80.md");
    }

    #[test]
    fn test_encode_uri_keeps_reserved() {
        assert_eq!(encode_uri("pages/a b.md?x=1#y"), "pages/a%20b.md?x=1#y");
    }

    #[test]
    fn test_parse_ignores_other_params() {
        assert_eq!(
            parse_file_fragment("#file=a%2Fb.md&line=3").as_deref(),
            Some("a/b.md")
        );
    }

    #[test]
    fn test_parse_without_hash() {
        assert_eq!(parse_file_fragment("file=a.md").as_deref(), Some("a.md"));
    }

    #[test]
    fn test_parse_empty_value() {
        assert_eq!(parse_file_fragment("#file="), None);
        assert_eq!(parse_file_fragment("#file=&x=1"), None);
    }

    #[test]
    fn test_parse_invalid_utf8() {
        assert_eq!(parse_file_fragment("#file=%FF%FE"), None);
    }

    #[test]
    fn test_roundtrip_awkward_paths() {
        for path in [
            "a.md",
            "pages/nested/dir/page.md",
            "pages/with space.md",
            "pages/100%.md",
            "pages/a&b=c.md",
            "pages/한글 문서.md",
            "pages/#hash.md",
        ] {
            assert_eq!(
                parse_file_fragment(&file_fragment(path)).as_deref(),
                Some(path),
                "round trip failed for {path}"
            );
        }
    }
}
