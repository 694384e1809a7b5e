//! Markdown to HTML renderer.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};

use crate::escape::{escape_html, slugify};
use crate::highlight::Highlighter;
use crate::links::LinkRewriter;

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Number of code blocks the highlighter produced markup for.
    pub highlighted_blocks: usize,
}

/// Markdown renderer for viewer documents.
///
/// Defaults match the viewer: GitHub-flavored markdown (tables,
/// strikethrough, task lists, alerts) and soft line breaks rendered as
/// `<br>`. Image sources and link destinations go through the configured
/// [`LinkRewriter`] while rendering, so the output needs no second pass.
#[derive(Clone)]
pub struct MarkdownRenderer {
    links: LinkRewriter,
    highlighter: Option<Arc<dyn Highlighter>>,
    gfm: bool,
    breaks: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with GFM and line breaks enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            links: LinkRewriter::default(),
            highlighter: None,
            gfm: true,
            breaks: true,
        }
    }

    /// Use a specific link rewriter (documents root).
    #[must_use]
    pub fn with_links(mut self, links: LinkRewriter) -> Self {
        self.links = links;
        self
    }

    /// Highlight fenced code blocks with `highlighter`.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Render soft line breaks as `<br>` (enabled by default).
    #[must_use]
    pub fn with_breaks(mut self, enabled: bool) -> Self {
        self.breaks = enabled;
        self
    }

    /// Link rewriter in use.
    #[must_use]
    pub fn links(&self) -> &LinkRewriter {
        &self.links
    }

    /// Stylesheet required by the configured highlighter.
    #[must_use]
    pub fn stylesheet(&self) -> Option<String> {
        self.highlighter.as_deref().and_then(Highlighter::stylesheet)
    }

    /// True if a highlighter is configured.
    #[must_use]
    pub fn has_highlighter(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown text using the configured parser options.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> RenderResult {
        self.render(Parser::new_ext(markdown, self.parser_options()))
    }

    /// Render markdown events.
    pub fn render<'a, I>(&self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        let mut writer = HtmlWriter::new(self);
        for event in events {
            writer.process_event(event);
        }
        RenderResult {
            html: writer.output,
            highlighted_blocks: writer.highlighted,
        }
    }
}

struct CodeBuffer {
    lang: Option<String>,
    source: String,
}

struct HeadingBuffer {
    level: u8,
    html: String,
    text: String,
}

struct ImageBuffer {
    src: String,
    title: String,
    alt: String,
    /// Images nested inside alt text contribute only their text.
    depth: usize,
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

/// Per-render output state.
struct HtmlWriter<'r> {
    renderer: &'r MarkdownRenderer,
    output: String,
    code: Option<CodeBuffer>,
    heading: Option<HeadingBuffer>,
    image: Option<ImageBuffer>,
    table: TableState,
    ids: HashMap<String, usize>,
    highlighted: usize,
}

impl<'r> HtmlWriter<'r> {
    fn new(renderer: &'r MarkdownRenderer) -> Self {
        Self {
            renderer,
            output: String::with_capacity(4096),
            code: None,
            heading: None,
            image: None,
            table: TableState::default(),
            ids: HashMap::new(),
            highlighted: 0,
        }
    }

    /// Buffer receiving inline content: the open heading, else the output.
    fn buf(&mut self) -> &mut String {
        match self.heading.as_mut() {
            Some(heading) => &mut heading.html,
            None => &mut self.output,
        }
    }

    fn push_inline(&mut self, html: &str) {
        if self.image.is_none() {
            self.buf().push_str(html);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => {
                let rewritten = self.renderer.links.rewrite_html(&html).into_owned();
                self.push_inline(&rewritten);
            }
            Event::SoftBreak => {
                if self.renderer.breaks {
                    self.push_inline("<br>\n");
                } else {
                    self.push_inline("\n");
                }
            }
            Event::HardBreak => self.push_inline("<br>\n"),
            Event::Rule => self.output.push_str("<hr>\n"),
            Event::TaskListMarker(checked) => {
                self.push_inline(if checked {
                    r#"<input type="checkbox" checked disabled> "#
                } else {
                    r#"<input type="checkbox" disabled> "#
                });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.push_inline("<p>"),
            Tag::Heading { level, .. } => {
                self.heading = Some(HeadingBuffer {
                    level: heading_level_to_num(level),
                    html: String::new(),
                    text: String::new(),
                });
            }
            Tag::BlockQuote(Some(kind)) => {
                let (class, title) = alert_label(kind);
                write!(
                    self.output,
                    r#"<div class="markdown-alert markdown-alert-{class}"><p class="markdown-alert-title">{title}</p>"#
                )
                .unwrap();
            }
            Tag::BlockQuote(None) => self.output.push_str("<blockquote>\n"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBuffer {
                    lang,
                    source: String::new(),
                });
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => writeln!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    in_head: false,
                    cell: 0,
                };
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.cell = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = if self.table.in_head { "th" } else { "td" };
                let style = match self.table.alignments.get(self.table.cell) {
                    Some(Alignment::Left) => r#" style="text-align: left""#,
                    Some(Alignment::Center) => r#" style="text-align: center""#,
                    Some(Alignment::Right) => r#" style="text-align: right""#,
                    _ => "",
                };
                write!(self.output, "<{tag}{style}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let link = self.renderer.links.link(&dest_url);
                let mut html = format!(r#"<a href="{}""#, escape_html(&link.href));
                if !title.is_empty() {
                    write!(html, r#" title="{}""#, escape_html(&title)).unwrap();
                }
                if link.external {
                    html.push_str(r#" target="_blank" rel="noreferrer""#);
                }
                html.push('>');
                self.push_inline(&html);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                if let Some(image) = self.image.as_mut() {
                    image.depth += 1;
                } else {
                    self.image = Some(ImageBuffer {
                        src: self.renderer.links.image_src(&dest_url).into_owned(),
                        title: title.into_string(),
                        alt: String::new(),
                        depth: 0,
                    });
                }
            }
            Tag::DefinitionList => self.output.push_str("<dl>\n"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.push_inline("</p>\n"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.take() {
                    let id = self.unique_id(&heading.text);
                    let level = heading.level;
                    writeln!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        heading.html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(Some(_)) => self.output.push_str("</div>\n"),
            TagEnd::BlockQuote(None) => self.output.push_str("</blockquote>\n"),
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.code_block(code);
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::Table => self.output.push_str("</tbody></table>\n"),
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.output.push_str("</tr></thead><tbody>\n");
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.table.in_head { "</th>" } else { "</td>" });
                self.table.cell += 1;
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => self.end_image(),
            TagEnd::DefinitionList => self.output.push_str("</dl>\n"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn end_image(&mut self) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        if image.depth > 0 {
            image.depth -= 1;
            return;
        }
        let Some(image) = self.image.take() else {
            return;
        };
        let mut html = format!(
            r#"<img src="{}" alt="{}""#,
            escape_html(&image.src),
            escape_html(&image.alt)
        );
        if !image.title.is_empty() {
            write!(html, r#" title="{}""#, escape_html(&image.title)).unwrap();
        }
        html.push('>');
        self.buf().push_str(&html);
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.source.push_str(text);
        } else if let Some(image) = self.image.as_mut() {
            image.alt.push_str(text);
        } else if let Some(heading) = self.heading.as_mut() {
            heading.text.push_str(text);
            heading.html.push_str(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(code);
            return;
        }
        if let Some(heading) = self.heading.as_mut() {
            heading.text.push_str(code);
        }
        let html = format!("<code>{}</code>", escape_html(code));
        self.buf().push_str(&html);
    }

    fn code_block(&mut self, code: CodeBuffer) {
        let Some(lang) = code.lang else {
            writeln!(
                self.output,
                "<pre><code>{}</code></pre>",
                escape_html(&code.source)
            )
            .unwrap();
            return;
        };

        let inner = match self.renderer.highlighter.as_deref() {
            Some(highlighter) => match highlighter.highlight(&lang, &code.source) {
                Some(html) => {
                    self.highlighted += 1;
                    html
                }
                None => escape_html(&code.source),
            },
            None => escape_html(&code.source),
        };

        writeln!(
            self.output,
            r#"<pre><code class="language-{}">{inner}</code></pre>"#,
            escape_html(&lang)
        )
        .unwrap();
    }

    /// Heading id, deduplicated with `-1`, `-2` suffixes.
    fn unique_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            "section".to_owned()
        } else {
            base
        };
        let count = self.ids.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}

fn alert_label(kind: BlockQuoteKind) -> (&'static str, &'static str) {
    match kind {
        BlockQuoteKind::Note => ("note", "Note"),
        BlockQuoteKind::Tip => ("tip", "Tip"),
        BlockQuoteKind::Important => ("important", "Important"),
        BlockQuoteKind::Warning => ("warning", "Warning"),
        BlockQuoteKind::Caution => ("caution", "Caution"),
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
