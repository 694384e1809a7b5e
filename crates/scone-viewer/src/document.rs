//! Document request state: the same-file guard, generations and the
//! modification baseline.

use scone_manifest::Manifest;
use scone_renderer::decode;

/// Document display state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Non-silent request in flight.
    Loading,
    /// Document rendered.
    Displayed,
    /// Last request failed.
    Failed,
}

/// Tracks which document is current and which request is the latest.
///
/// Every accepted request gets a new generation; only the result carrying
/// the latest generation may be applied, so a slow response for a document
/// the user already left can never overwrite the newer one.
#[derive(Debug, Default)]
pub struct DocumentLoader {
    current: Option<String>,
    generation: u64,
    state: DocState,
    last_modified: Option<String>,
}

impl DocumentLoader {
    /// Create an idle loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a request for `file` and return its generation.
    ///
    /// Returns `None` for a non-silent request of the current file.
    pub fn begin(&mut self, file: &str, silent: bool) -> Option<u64> {
        let same = self.current.as_deref() == Some(file);
        if same && !silent {
            return None;
        }
        if !same {
            self.current = Some(file.to_owned());
            self.last_modified = None;
        }
        if !silent {
            self.state = DocState::Loading;
        }
        self.generation += 1;
        Some(self.generation)
    }

    /// Whether `generation` is the latest issued one.
    #[must_use]
    pub fn is_latest(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Record a successful display, seeding the baseline when known.
    pub fn displayed(&mut self, last_modified: Option<String>) {
        self.state = DocState::Displayed;
        if last_modified.is_some() {
            self.last_modified = last_modified;
        }
    }

    /// Record a failure. The current file is cleared so the next request for
    /// it is not swallowed by the guard.
    pub fn failed(&mut self) {
        self.state = DocState::Failed;
        self.current = None;
        self.last_modified = None;
    }

    /// Compare a probe result for `file` with the baseline.
    ///
    /// Returns `true` (and adopts the new value) when the displayed document
    /// changed.
    pub fn observe(&mut self, file: &str, last_modified: Option<&str>) -> bool {
        if self.state != DocState::Displayed || self.current.as_deref() != Some(file) {
            return false;
        }
        let Some(last_modified) = last_modified else {
            return false;
        };
        if self.last_modified.as_deref() == Some(last_modified) {
            return false;
        }
        self.last_modified = Some(last_modified.to_owned());
        true
    }

    /// Current document path.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Display state.
    #[must_use]
    pub fn state(&self) -> DocState {
        self.state
    }

    /// Latest issued generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Modification baseline of the current document.
    #[must_use]
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }
}

/// Page title for `file`: `<title> - <site title>`.
///
/// The title comes from the first manifest item with exactly this file, or
/// from the file name.
#[must_use]
pub fn page_title(manifest: Option<&Manifest>, file: &str, site_title: &str) -> String {
    let title = manifest
        .and_then(|m| m.title_for(file))
        .map_or_else(|| fallback_title(file), str::to_owned);
    format!("{title} - {site_title}")
}

/// Last path segment of the decoded path, extension stripped.
#[must_use]
pub fn fallback_title(file: &str) -> String {
    let decoded = decode(file).unwrap_or_else(|| file.to_owned());
    let last = match decoded.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => decoded.as_str(),
    };
    match last.rfind('.') {
        Some(dot) if dot + 1 < last.len() && !last[dot..].contains('/') => last[..dot].to_owned(),
        _ => last.to_owned(),
    }
}
