//! Asset and link rewriting for rendered documents.
//!
//! Documents are written with paths relative to the documents root
//! (`pages/` by default) while the viewer resolves everything relative to the
//! manifest. [`LinkRewriter`] bridges the two:
//!
//! - `![](img/pic.png)` → `src="pages/img/pic.png"`
//! - `[x](https://example.com)` → opens in a new context with no referrer
//! - `[x](other.md)` → `href="#file=pages%2Fother.md"` (routed in the viewer)
//!
//! The same rules apply to `<img src>` and `<a href>` in raw HTML blocks.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::{escape_html, unescape_html};
use crate::route::{decode, file_fragment};

/// Opening `<img>` / `<a>` tags in raw HTML.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(img|a)\b[^>]*>").unwrap());

/// `src=` / `href=` attribute with a quoted value.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(\s(src|href)\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// `target=` / `rel=` attribute with a quoted or bare value.
static TARGET_REL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\s(?:target|rel)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)"#).unwrap()
});

/// Default documents root.
pub const DEFAULT_DOCS_ROOT: &str = "pages/";

/// Result of rewriting a hyperlink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewrittenLink {
    /// Destination to emit.
    pub href: String,
    /// Open in a new browsing context with `rel="noreferrer"`.
    pub external: bool,
}

/// Rewrites image sources and link destinations against the documents root.
#[derive(Clone, Debug)]
pub struct LinkRewriter {
    docs_root: String,
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_DOCS_ROOT)
    }
}

impl LinkRewriter {
    /// Create a rewriter for the given documents root.
    ///
    /// A trailing `/` is added when missing; an empty root disables prefixing.
    #[must_use]
    pub fn new(docs_root: impl Into<String>) -> Self {
        let mut docs_root = docs_root.into();
        if !docs_root.is_empty() && !docs_root.ends_with('/') {
            docs_root.push('/');
        }
        Self { docs_root }
    }

    /// Documents root with trailing slash.
    #[must_use]
    pub fn docs_root(&self) -> &str {
        &self.docs_root
    }

    /// Rewrite an image source.
    #[must_use]
    pub fn image_src<'a>(&self, src: &'a str) -> Cow<'a, str> {
        if is_relative(src) && !src.starts_with(&self.docs_root) {
            Cow::Owned(format!("{}{src}", self.docs_root))
        } else {
            Cow::Borrowed(src)
        }
    }

    /// Rewrite a hyperlink destination.
    #[must_use]
    pub fn link(&self, href: &str) -> RewrittenLink {
        if is_http(href) {
            return RewrittenLink {
                href: href.to_owned(),
                external: true,
            };
        }

        if !is_relative(href) {
            return RewrittenLink {
                href: href.to_owned(),
                external: false,
            };
        }

        let prefixed = if href.starts_with(&self.docs_root) {
            href.to_owned()
        } else {
            format!("{}{href}", self.docs_root)
        };

        // Anchors inside another document are dropped: the route only names files.
        let path = prefixed.split('#').next().unwrap_or_default();
        let decoded = decode(path).unwrap_or_else(|| path.to_owned());
        let normalized = normalize_dot_segments(&decoded);

        let href = if normalized.to_ascii_lowercase().ends_with(".md") {
            file_fragment(&normalized)
        } else {
            prefixed
        };

        RewrittenLink {
            href,
            external: false,
        }
    }

    /// Rewrite `<img src>` and `<a href>` attributes inside raw HTML.
    #[must_use]
    pub fn rewrite_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        if !html.contains('<') {
            return Cow::Borrowed(html);
        }
        TAG_RE.replace_all(html, |caps: &Captures<'_>| {
            let tag = &caps[0];
            if caps[1].eq_ignore_ascii_case("img") {
                self.rewrite_tag(tag, "src")
            } else {
                self.rewrite_tag(tag, "href")
            }
        })
    }

    fn rewrite_tag(&self, tag: &str, attr: &str) -> String {
        let Some(caps) = ATTR_RE
            .captures_iter(tag)
            .find(|caps| caps[2].eq_ignore_ascii_case(attr))
        else {
            return tag.to_owned();
        };

        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let raw = caps
            .get(3)
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        let value = unescape_html(raw);

        let (new_value, external) = if attr == "src" {
            (self.image_src(&value).into_owned(), false)
        } else {
            let link = self.link(&value);
            (link.href, link.external)
        };
        if !external && new_value == value {
            return tag.to_owned();
        }

        let (before, after) = (&tag[..whole.start], &tag[whole.end..]);
        let mut out = String::with_capacity(tag.len() + 48);
        if external {
            // Any author-supplied target or rel is replaced.
            out.push_str(&TARGET_REL_RE.replace_all(before, ""));
        } else {
            out.push_str(before);
        }
        out.push_str(&caps[1]);
        out.push('"');
        out.push_str(&escape_html(&new_value));
        out.push('"');
        if external {
            out.push_str(r#" target="_blank" rel="noreferrer""#);
            out.push_str(&TARGET_REL_RE.replace_all(after, ""));
        } else {
            out.push_str(after);
        }
        out
    }
}

/// True for paths resolved relative to the current document.
///
/// Excludes empty strings, scheme-qualified (`https:`, `mailto:`, `data:`) and
/// protocol-relative (`//host`) URLs, root-absolute paths, and fragments.
#[must_use]
pub fn is_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.starts_with('#')
        && !has_scheme(path)
}

fn is_http(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"
fn has_scheme(path: &str) -> bool {
    let Some(colon) = path.find(':') else {
        return false;
    };
    let scheme = &path[..colon];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Collapse `.` and `..` segments; `..` never climbs above the first segment.
fn normalize_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewriter() -> LinkRewriter {
        LinkRewriter::default()
    }

    #[test]
    fn test_new_adds_trailing_slash() {
        assert_eq!(LinkRewriter::new("docs").docs_root(), "docs/");
        assert_eq!(LinkRewriter::new("docs/").docs_root(), "docs/");
        assert_eq!(LinkRewriter::new("").docs_root(), "");
    }

    #[test]
    fn test_is_relative() {
        assert!(is_relative("img/pic.png"));
        assert!(is_relative("./pic.png"));
        assert!(is_relative("../pic.png"));
        assert!(!is_relative(""));
        assert!(!is_relative("/abs/pic.png"));
        assert!(!is_relative("#section"));
        assert!(!is_relative("https://example.com/pic.png"));
        assert!(!is_relative("HTTP://example.com/pic.png"));
        assert!(!is_relative("//cdn.example.com/pic.png"));
        assert!(!is_relative("mailto:someone@example.com"));
        assert!(!is_relative("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_image_relative_gets_prefix() {
        assert_eq!(rewriter().image_src("img/pic.png"), "pages/img/pic.png");
    }

    #[test]
    fn test_image_already_prefixed() {
        assert_eq!(rewriter().image_src("pages/img/pic.png"), "pages/img/pic.png");
    }

    #[test]
    fn test_image_absolute_untouched() {
        assert_eq!(
            rewriter().image_src("https://example.com/pic.png"),
            "https://example.com/pic.png"
        );
        assert_eq!(rewriter().image_src("/static/pic.png"), "/static/pic.png");
    }

    #[test]
    fn test_link_http_is_external() {
        let link = rewriter().link("https://example.com/docs");
        assert_eq!(link.href, "https://example.com/docs");
        assert!(link.external);

        assert!(rewriter().link("HTTP://EXAMPLE.COM").external);
    }

    #[test]
    fn test_link_markdown_becomes_route() {
        let link = rewriter().link("other.md");
        assert_eq!(link.href, "#file=pages%2Fother.md");
        assert!(!link.external);
    }

    #[test]
    fn test_link_markdown_already_prefixed() {
        assert_eq!(rewriter().link("pages/other.md").href, "#file=pages%2Fother.md");
    }

    #[test]
    fn test_link_markdown_case_insensitive_extension() {
        assert_eq!(rewriter().link("README.MD").href, "#file=pages%2FREADME.MD");
    }

    #[test]
    fn test_link_markdown_is_decoded_before_routing() {
        assert_eq!(
            rewriter().link("with%20space.md").href,
            "#file=pages%2Fwith%20space.md"
        );
    }

    #[test]
    fn test_link_markdown_dot_segments() {
        assert_eq!(
            rewriter().link("./guide/../intro.md").href,
            "#file=pages%2Fintro.md"
        );
    }

    #[test]
    fn test_link_markdown_with_anchor() {
        assert_eq!(
            rewriter().link("other.md#install").href,
            "#file=pages%2Fother.md"
        );
    }

    #[test]
    fn test_link_relative_non_markdown_is_prefixed() {
        let link = rewriter().link("files/report.pdf");
        assert_eq!(link.href, "pages/files/report.pdf");
        assert!(!link.external);
    }

    #[test]
    fn test_link_fragment_and_absolute_untouched() {
        assert_eq!(rewriter().link("#usage").href, "#usage");
        assert_eq!(rewriter().link("/index.html").href, "/index.html");
        assert_eq!(
            rewriter().link("mailto:a@example.com").href,
            "mailto:a@example.com"
        );
    }

    #[test]
    fn test_rewrite_html_img() {
        let html = r#"<p><img src="img/pic.png" width="10"></p>"#;
        assert_eq!(
            rewriter().rewrite_html(html),
            r#"<p><img src="pages/img/pic.png" width="10"></p>"#
        );
    }

    #[test]
    fn test_rewrite_html_single_quotes() {
        assert_eq!(
            rewriter().rewrite_html("<img alt='x' src='pic.png'>"),
            r#"<img alt='x' src="pages/pic.png">"#
        );
    }

    #[test]
    fn test_rewrite_html_external_anchor() {
        assert_eq!(
            rewriter().rewrite_html(r#"<a href="https://example.com">x</a>"#),
            r#"<a href="https://example.com" target="_blank" rel="noreferrer">x</a>"#
        );
    }

    #[test]
    fn test_rewrite_html_external_overrides_target_and_rel() {
        assert_eq!(
            rewriter().rewrite_html(
                r#"<a target="_self" href="https://example.com" rel='opener' class="x">x</a>"#
            ),
            r#"<a href="https://example.com" target="_blank" rel="noreferrer" class="x">x</a>"#
        );
        assert_eq!(
            rewriter().rewrite_html(r#"<a TARGET=_top href="http://example.com">x</a>"#),
            r#"<a href="http://example.com" target="_blank" rel="noreferrer">x</a>"#
        );
    }

    #[test]
    fn test_rewrite_html_keeps_entities_in_external_href() {
        assert_eq!(
            rewriter().rewrite_html(r#"<a href="https://x.com/?a=1&amp;b=2">x</a>"#),
            r#"<a href="https://x.com/?a=1&amp;b=2" target="_blank" rel="noreferrer">x</a>"#
        );
    }

    #[test]
    fn test_rewrite_html_entities_in_relative_paths() {
        assert_eq!(
            rewriter().rewrite_html(r#"<img src="img/chart.png?w=1&amp;h=2">"#),
            r#"<img src="pages/img/chart.png?w=1&amp;h=2">"#
        );
        assert_eq!(
            rewriter().rewrite_html(r#"<a href="files/r.pdf?a=1&amp;b=2">r</a>"#),
            r#"<a href="pages/files/r.pdf?a=1&amp;b=2">r</a>"#
        );
    }

    #[test]
    fn test_rewrite_html_unchanged_tag_is_verbatim() {
        let html = r#"<a href='#top?a&amp;b' target="_self">top</a><img src='/logo.png?v=1&amp;x=2'>"#;
        assert_eq!(rewriter().rewrite_html(html), html);
    }

    #[test]
    fn test_rewrite_html_markdown_anchor() {
        assert_eq!(
            rewriter().rewrite_html(r#"<a href="next.md">Next</a>"#),
            r##"<a href="#file=pages%2Fnext.md">Next</a>"##
        );
    }

    #[test]
    fn test_rewrite_html_ignores_other_tags() {
        let html = r#"<link href="style.css"><script src="x.js"></script>"#;
        assert_eq!(rewriter().rewrite_html(html), html);
    }

    #[test]
    fn test_rewrite_html_without_tags_is_borrowed() {
        assert!(matches!(
            rewriter().rewrite_html("plain text"),
            Cow::Borrowed(_)
        ));
    }
}
