//! Markdown rendering for the Scone documentation viewer.
//!
//! The [`MarkdownRenderer`] turns a document into HTML in a single pass,
//! rewriting image sources and links through a [`LinkRewriter`] as it goes:
//! relative assets get the documents root prefix, external links open in a
//! new context, and links to other markdown files become `#file=` routes.
//!
//! # Example
//!
//! ```
//! use scone_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("![logo](img/logo.png)");
//! assert!(result.html.contains(r#"src="pages/img/logo.png""#));
//! ```

mod escape;
mod highlight;
mod links;
mod renderer;
mod route;

pub use escape::escape_html;
#[cfg(feature = "syntect")]
pub use highlight::SyntectHighlighter;
pub use highlight::Highlighter;
pub use links::{DEFAULT_DOCS_ROOT, LinkRewriter, RewrittenLink, is_relative};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use route::{decode, encode_component, encode_uri, file_fragment, parse_file_fragment};
