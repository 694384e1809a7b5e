//! HTML escaping and heading slugs.

use std::borrow::Cow;

/// Escape text for use in HTML content and double- or single-quoted
/// attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push_str(entity);
    }
    out
}

/// Decode character references in an attribute value.
///
/// Handles the named references `escape_html` produces (plus `&apos;`) and
/// numeric ones. Anything else, including a bare `&`, is kept as written.
pub(crate) fn unescape_html(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let reference = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_reference(&tail[1..end]).map(|c| (c, end)));
        match reference {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Convert heading text to an anchor id.
///
/// Keeps alphanumerics (any script), maps whitespace and `-`/`_` runs to a
/// single `-`, drops everything else.
#[must_use]
pub(crate) fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_unescape_html() {
        assert_eq!(unescape_html("a=1&amp;b=2"), "a=1&b=2");
        assert_eq!(unescape_html("&lt;&quot;&#x27;&#39;&gt;"), "<\"''>");
        assert_eq!(unescape_html("&#X41;&#66;"), "AB");
        assert!(matches!(unescape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_html_keeps_unknown_references() {
        assert_eq!(unescape_html("fish & chips"), "fish & chips");
        assert_eq!(unescape_html("&nbsp;&bogus"), "&nbsp;&bogus");
        assert_eq!(unescape_html("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("Is it (really) done?"), "is-it-really-done");
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("snake_case and  kebab-case"), "snake-case-and-kebab-case");
        assert_eq!(slugify("-- leading"), "leading");
        assert_eq!(slugify("설치 방법"), "설치-방법");
        assert_eq!(slugify("?!"), "");
    }
}
