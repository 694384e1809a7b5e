//! Pluggable syntax highlighting for fenced code blocks.
//!
//! The renderer asks the configured [`Highlighter`] for every fenced block
//! with a language tag. Returning `None` falls back to plain escaped code, so
//! unknown languages never break rendering.

/// Syntax highlighter for fenced code blocks.
pub trait Highlighter: Send + Sync {
    /// Highlight `source` written in `language`.
    ///
    /// Returns the inner HTML of the `<code>` element (already escaped), or
    /// `None` to render the block as plain text.
    fn highlight(&self, language: &str, source: &str) -> Option<String>;

    /// CSS for the markup this highlighter emits, if it needs any.
    ///
    /// Rules are scoped by the page's `data-theme` attribute.
    fn stylesheet(&self) -> Option<String> {
        None
    }
}

#[cfg(feature = "syntect")]
pub use syntect_impl::SyntectHighlighter;

#[cfg(feature = "syntect")]
mod syntect_impl {
    use std::fmt::Write;

    use syntect::highlighting::ThemeSet;
    use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
    use syntect::parsing::{SyntaxReference, SyntaxSet};
    use syntect::util::LinesWithEndings;

    use super::Highlighter;

    /// Bundled syntect theme per page theme.
    const THEMES: [(&str, &str); 2] = [("light", "InspiredGitHub"), ("dark", "base16-ocean.dark")];

    /// Highlighter backed by syntect's bundled grammars.
    ///
    /// Emits CSS classes (`<span class="source rust">`) rather than inline
    /// colors, so light and dark themes can style the same markup.
    pub struct SyntectHighlighter {
        syntax_set: SyntaxSet,
    }

    impl Default for SyntectHighlighter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SyntectHighlighter {
        /// Load the default syntax definitions.
        #[must_use]
        pub fn new() -> Self {
            Self {
                syntax_set: SyntaxSet::load_defaults_newlines(),
            }
        }

        fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
            let lang = language.to_lowercase();
            if let Some(syntax) = self
                .syntax_set
                .find_syntax_by_token(&lang)
                .or_else(|| self.syntax_set.find_syntax_by_extension(&lang))
            {
                return Some(syntax);
            }

            let mapped = match lang.as_str() {
                "rust" => "rs",
                "python" => "py",
                "javascript" => "js",
                "typescript" => "ts",
                "shell" | "bash" | "zsh" => "sh",
                "yaml" => "yml",
                "markdown" => "md",
                "c++" => "cpp",
                "c#" | "csharp" => "cs",
                "ruby" => "rb",
                _ => return None,
            };
            self.syntax_set.find_syntax_by_extension(mapped)
        }
    }

    impl Highlighter for SyntectHighlighter {
        fn highlight(&self, language: &str, source: &str) -> Option<String> {
            let syntax = self.find_syntax(language)?;
            let mut generator = ClassedHTMLGenerator::new_with_class_style(
                syntax,
                &self.syntax_set,
                ClassStyle::Spaced,
            );
            for line in LinesWithEndings::from(source) {
                if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                    tracing::debug!(language, error = %e, "Highlighting failed, using plain text");
                    return None;
                }
            }
            Some(generator.finalize())
        }

        fn stylesheet(&self) -> Option<String> {
            let theme_set = ThemeSet::load_defaults();
            let mut css = String::new();
            for (page_theme, name) in THEMES {
                let Some(theme) = theme_set.themes.get(name) else {
                    tracing::warn!(theme = name, "Highlight theme not bundled");
                    continue;
                };
                match css_for_theme_with_class_style(theme, ClassStyle::Spaced) {
                    Ok(rules) => {
                        writeln!(css, "[data-theme='{page_theme}'] {{\n{rules}}}").unwrap();
                    }
                    Err(e) => {
                        tracing::warn!(theme = name, error = %e, "Failed to build highlight stylesheet");
                    }
                }
            }
            (!css.is_empty()).then_some(css)
        }
    }

}
