//! Static HTML snapshot of the viewer page.
//!
//! [`HtmlPageView`] implements [`View`] by keeping the page state in memory
//! and rewriting a standalone HTML file whenever it changes.

use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};

use scone_renderer::escape_html;
use scone_viewer::{NavEntry, Theme, View};

const STYLE: &str = r"
:root { --bg: #fff; --fg: #1f2328; --muted: #59636e; --accent: #0969da; --panel: #f6f8fa; }
[data-theme='dark'] { --bg: #0d1117; --fg: #e6edf3; --muted: #9198a1; --accent: #4493f8; --panel: #151b23; }
body { margin: 0; display: flex; background: var(--bg); color: var(--fg); font-family: system-ui, sans-serif; }
#sidebar { width: 16rem; min-height: 100vh; padding: 1rem; background: var(--panel); }
#sidebar h3 { font-size: 0.8rem; text-transform: uppercase; color: var(--muted); }
#sidebar a { display: block; padding: 0.2rem 0; color: var(--fg); text-decoration: none; }
#sidebar a.active { color: var(--accent); font-weight: 600; }
#content { flex: 1; padding: 2rem; max-width: 50rem; }
.loading { color: var(--muted); }
.error { color: #cf222e; }
@media (max-width: 768px) { #sidebar { display: none; } body.sidebar-open #sidebar { display: block; } }
";

#[derive(Debug, Default, PartialEq, Eq)]
enum Content {
    #[default]
    Empty,
    Loading,
    Html(String),
    Error(String),
}

/// Page state written to a single HTML file.
#[derive(Debug)]
pub(crate) struct HtmlPageView {
    path: PathBuf,
    theme: Theme,
    sidebar_open: bool,
    navigation: Vec<NavEntry>,
    active: Option<String>,
    title: String,
    content: Content,
    highlight_css: Option<String>,
    dirty: bool,
}

impl HtmlPageView {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            theme: Theme::default(),
            sidebar_open: false,
            navigation: Vec::new(),
            active: None,
            title: String::new(),
            content: Content::Empty,
            highlight_css: None,
            dirty: true,
        }
    }

    /// Embed the code highlighter's stylesheet.
    #[must_use]
    pub(crate) fn with_stylesheet(mut self, css: Option<String>) -> Self {
        self.highlight_css = css;
        self
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Write the page if anything changed since the last flush.
    ///
    /// Returns `true` if the file was written.
    pub(crate) fn flush(&mut self) -> io::Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.render())?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "Page written");
        Ok(true)
    }

    /// Render the complete page.
    pub(crate) fn render(&self) -> String {
        let mut html = String::with_capacity(4096);
        html.push_str("<!DOCTYPE html>\n");
        write!(
            html,
            "<html lang=\"en\" data-theme=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{}</title>\n<style>{STYLE}</style>\n",
            self.theme,
            escape_html(&self.title)
        )
        .unwrap();
        if let Some(css) = &self.highlight_css {
            writeln!(html, "<style id=\"highlight\">\n{css}</style>").unwrap();
        }
        html.push_str("</head>\n");

        let body_class = if self.sidebar_open { " class=\"sidebar-open\"" } else { "" };
        writeln!(html, "<body{body_class}>").unwrap();
        write!(
            html,
            "<button id=\"hamburger\" aria-expanded=\"{}\">Menu</button>\n\
             <button id=\"theme-toggle\">{}</button>\n",
            self.sidebar_open,
            match self.theme {
                Theme::Light => "Dark mode",
                Theme::Dark => "Light mode",
            }
        )
        .unwrap();

        html.push_str("<nav id=\"sidebar\">\n<button id=\"close-sidebar\">Close</button>\n");
        self.render_navigation(&mut html);
        html.push_str("</nav>\n<main id=\"content\">\n");
        match &self.content {
            Content::Empty => {}
            Content::Loading => html.push_str("<p class=\"loading\">Loading...</p>\n"),
            Content::Html(body) => {
                html.push_str(body);
                html.push('\n');
            }
            Content::Error(message) => {
                writeln!(html, "<p class=\"error\">{}</p>", escape_html(message)).unwrap();
            }
        }
        html.push_str("</main>\n</body>\n</html>\n");
        html
    }

    fn render_navigation(&self, html: &mut String) {
        let mut in_list = false;
        for entry in &self.navigation {
            match entry {
                NavEntry::Header { label } => {
                    if in_list {
                        html.push_str("</ul>\n");
                    }
                    writeln!(html, "<h3>{}</h3>\n<ul>", escape_html(label)).unwrap();
                    in_list = true;
                }
                NavEntry::Document { label, href, .. } => {
                    let class = if entry.is_active(self.active.as_deref()) {
                        " class=\"active\""
                    } else {
                        ""
                    };
                    writeln!(
                        html,
                        "<li><a href=\"{}\"{class}>{}</a></li>",
                        escape_html(href),
                        escape_html(label)
                    )
                    .unwrap();
                }
                NavEntry::External { label, url } => {
                    writeln!(
                        html,
                        "<li><a href=\"{}\" target=\"_blank\" rel=\"noreferrer\">{}</a></li>",
                        escape_html(url),
                        escape_html(label)
                    )
                    .unwrap();
                }
            }
        }
        if in_list {
            html.push_str("</ul>\n");
        }
    }
}

impl View for HtmlPageView {
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.dirty = true;
    }

    fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
        self.dirty = true;
    }

    fn render_navigation(&mut self, entries: &[NavEntry]) {
        self.navigation = entries.to_vec();
        self.dirty = true;
    }

    fn set_active(&mut self, file: Option<&str>) {
        self.active = file.map(str::to_owned);
        self.dirty = true;
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
        self.dirty = true;
    }

    fn show_loading(&mut self) {
        self.content = Content::Loading;
        self.dirty = true;
    }

    fn show_content(&mut self, html: &str) {
        self.content = Content::Html(html.to_owned());
        self.dirty = true;
    }

    fn show_error(&mut self, message: &str) {
        self.content = Content::Error(message.to_owned());
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn nav() -> Vec<NavEntry> {
        vec![
            NavEntry::Header {
                label: "Guide".to_owned(),
            },
            NavEntry::Document {
                label: "Intro".to_owned(),
                file: "pages/intro.md".to_owned(),
                href: "#file=pages%2Fintro.md".to_owned(),
            },
            NavEntry::External {
                label: "Site".to_owned(),
                url: "https://example.com".to_owned(),
            },
        ]
    }

    #[test]
    fn test_render_theme_and_sidebar() {
        let mut view = HtmlPageView::new(Path::new("index.html"));
        view.apply_theme(Theme::Dark);
        view.set_sidebar_open(true);

        let html = view.render();
        assert!(html.contains("data-theme=\"dark\""));
        assert!(html.contains("<body class=\"sidebar-open\">"));
        assert!(html.contains("aria-expanded=\"true\""));
        assert!(html.contains(">Light mode</button>"));
    }

    #[test]
    fn test_render_navigation_marks_active() {
        let mut view = HtmlPageView::new(Path::new("index.html"));
        View::render_navigation(&mut view, &nav());
        view.set_active(Some("pages/intro.md"));

        let html = view.render();
        assert!(html.contains("<h3>Guide</h3>"));
        assert!(html.contains("<a href=\"#file=pages%2Fintro.md\" class=\"active\">Intro</a>"));
        assert!(html.contains("target=\"_blank\" rel=\"noreferrer\">Site</a>"));
    }

    #[test]
    fn test_render_escapes_title_and_error() {
        let mut view = HtmlPageView::new(Path::new("index.html"));
        view.set_title("<A> - Scone");
        view.show_error("Failed <here>");

        let html = view.render();
        assert!(html.contains("<title>&lt;A&gt; - Scone</title>"));
        assert!(html.contains("<p class=\"error\">Failed &lt;here&gt;</p>"));
    }

    #[test]
    fn test_content_replaces_loading() {
        let mut view = HtmlPageView::new(Path::new("index.html"));
        view.show_loading();
        assert!(view.render().contains("Loading..."));

        view.show_content("<h1>Hi</h1>");
        let html = view.render();
        assert!(!html.contains("Loading..."));
        assert!(html.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_render_without_highlighter_has_no_highlight_style() {
        let view = HtmlPageView::new(Path::new("index.html"))
            .with_stylesheet(scone_renderer::MarkdownRenderer::new().stylesheet());
        assert!(!view.render().contains("<style id=\"highlight\">"));
    }

    #[cfg(feature = "highlight")]
    #[test]
    fn test_render_includes_highlight_stylesheet() {
        let renderer = scone_renderer::MarkdownRenderer::new()
            .with_highlighter(scone_renderer::SyntectHighlighter::new());
        let view = HtmlPageView::new(Path::new("index.html")).with_stylesheet(renderer.stylesheet());

        let html = view.render();
        let start = html.find("<style id=\"highlight\">").unwrap();
        let head_end = html.find("</head>").unwrap();
        assert!(start < head_end);
        let highlight = &html[start..head_end];
        assert!(highlight.contains("[data-theme='light'] {"));
        assert!(highlight.contains("[data-theme='dark'] {"));
        assert!(highlight.contains(".comment"));
    }

    #[test]
    fn test_flush_writes_only_when_dirty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/index.html");
        let mut view = HtmlPageView::new(&path);

        assert!(view.flush().unwrap());
        assert!(!view.flush().unwrap());

        view.set_title("Intro - Scone");
        assert!(view.flush().unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, view.render());
    }
}
