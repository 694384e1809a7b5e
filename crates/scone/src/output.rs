//! Styled console output on stderr.

use console::{Style, Term};

/// Console reporter for command progress and results.
///
/// Writes go to stderr and ignore failures: a closed terminal must not abort
/// the viewer.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    fail: Style,
    strong: Style,
    faint: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red().bold(),
            strong: Style::new().cyan().bold(),
            faint: Style::new().dim(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn styled(&self, style: &Style, text: &str) {
        self.line(&style.apply_to(text).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.ok, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warn, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.fail, msg);
    }

    /// Section heading, e.g. the manifest name in `scone check`.
    pub(crate) fn heading(&self, msg: &str) {
        self.styled(&self.strong, msg);
    }

    /// Indented `label  value` row.
    pub(crate) fn item(&self, label: &str, value: &str) {
        self.line(&format!("  {label}  {}", self.faint.apply_to(value)));
    }
}
