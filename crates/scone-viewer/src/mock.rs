//! In-memory test doubles for the viewer's environment.
//!
//! Provides [`MockFetcher`], [`RecordingView`], [`MemoryLocation`] and
//! [`MemoryPreferences`] for driving a [`Viewer`](crate::Viewer) without a
//! network or a real page.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{FetchError, PreferenceError};
use crate::fetch::{Fetched, Fetcher};
use crate::navigation::NavEntry;
use crate::router::Location;
use crate::shell::{PreferenceStore, Theme};
use crate::view::{Control, View};

#[derive(Clone, Debug, Default)]
struct MockFile {
    body: String,
    last_modified: Option<String>,
}

/// Fetcher serving in-memory files.
///
/// Unknown paths answer with HTTP 404. Requests are counted per path, and a
/// path can be held so its GET only completes once released.
///
/// # Example
///
/// ```ignore
/// use scone_viewer::MockFetcher;
///
/// let fetcher = MockFetcher::new()
///     .with_file("manifest.json", r#"[]"#)
///     .with_file("a.md", "# A")
///     .with_last_modified("a.md", "Mon, 01 Jan 2024 00:00:00 GMT");
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    files: RwLock<HashMap<String, MockFile>>,
    failing: RwLock<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    fetches: Mutex<HashMap<String, usize>>,
    probes: Mutex<HashMap<String, usize>>,
}

impl MockFetcher {
    /// Create a fetcher with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.set_file(path, body);
        self
    }

    /// Set the `Last-Modified` value of a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_last_modified(
        self,
        path: impl Into<String>,
        last_modified: impl Into<String>,
    ) -> Self {
        self.set_last_modified(path, last_modified);
        self
    }

    /// Replace a file body in place.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<String>, body: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .entry(path.into())
            .or_default()
            .body = body.into();
    }

    /// Change the `Last-Modified` value of a file in place.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_last_modified(&self, path: impl Into<String>, last_modified: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .entry(path.into())
            .or_default()
            .last_modified = Some(last_modified.into());
    }

    /// Make GET requests for `path` answer with HTTP 500. Probes still work.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_fetches(&self, path: impl Into<String>) {
        self.failing.write().unwrap().insert(path.into());
    }

    /// Hold GET requests for `path` until the returned gate is notified.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn hold(&self, path: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(path.into(), Arc::clone(&gate));
        gate
    }

    /// Number of GET requests issued for `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Number of probes issued for `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn probe_count(&self, path: &str) -> usize {
        self.probes.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    fn lookup(&self, path: &str) -> Result<MockFile, FetchError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                path: path.to_owned(),
            })
    }
}

fn count(counter: &Mutex<HashMap<String, usize>>, path: &str) {
    *counter
        .lock()
        .unwrap()
        .entry(path.to_owned())
        .or_insert(0) += 1;
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(&self, path: &str) -> Result<Fetched, FetchError> {
        count(&self.fetches, path);

        let gate = self.gates.lock().unwrap().get(path).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.read().unwrap().contains(path) {
            return Err(FetchError::Status {
                status: 500,
                path: path.to_owned(),
            });
        }

        let file = self.lookup(path)?;
        Ok(Fetched {
            body: file.body,
            last_modified: file.last_modified,
        })
    }

    async fn probe(&self, path: &str) -> Result<Option<String>, FetchError> {
        count(&self.probes, path);
        Ok(self.lookup(path)?.last_modified)
    }
}

/// View that records the last value of everything the viewer shows.
#[derive(Debug, Default)]
pub struct RecordingView {
    /// Applied theme.
    pub theme: Option<Theme>,
    /// Sidebar state.
    pub sidebar_open: bool,
    /// Rendered navigation.
    pub navigation: Vec<NavEntry>,
    /// Active document path.
    pub active: Option<String>,
    /// Page title.
    pub title: Option<String>,
    /// Content area HTML.
    pub content: Option<String>,
    /// Content area error message.
    pub error: Option<String>,
    /// Whether the loading placeholder is showing.
    pub loading: bool,
    /// Times the loading placeholder was shown.
    pub loading_count: usize,
    /// Times document HTML was injected.
    pub content_count: usize,
    missing: HashSet<Control>,
}

impl RecordingView {
    /// Create a view with every optional control present.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an optional control.
    #[must_use]
    pub fn without(mut self, control: Control) -> Self {
        self.missing.insert(control);
        self
    }
}

impl View for RecordingView {
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }

    fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    fn render_navigation(&mut self, entries: &[NavEntry]) {
        self.navigation = entries.to_vec();
    }

    fn set_active(&mut self, file: Option<&str>) {
        self.active = file.map(str::to_owned);
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_owned());
    }

    fn show_loading(&mut self) {
        self.loading = true;
        self.loading_count += 1;
    }

    fn show_content(&mut self, html: &str) {
        self.loading = false;
        self.error = None;
        self.content = Some(html.to_owned());
        self.content_count += 1;
    }

    fn show_error(&mut self, message: &str) {
        self.loading = false;
        self.content = None;
        self.error = Some(message.to_owned());
    }

    fn has_control(&self, control: Control) -> bool {
        !self.missing.contains(&control)
    }
}

/// Shared in-memory fragment.
///
/// Clones share the same value, so a test can keep one clone to play the
/// user's address bar while the viewer owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryLocation(Arc<Mutex<String>>);

impl MemoryLocation {
    /// Create a location with the given fragment.
    #[must_use]
    pub fn new(fragment: &str) -> Self {
        Self(Arc::new(Mutex::new(fragment.to_owned())))
    }

    /// Current fragment.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self) -> String {
        self.0.lock().unwrap().clone()
    }

    /// Replace the fragment, as a user editing the address bar would.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set(&self, fragment: &str) {
        fragment.clone_into(&mut self.0.lock().unwrap());
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.get()
    }

    fn set_fragment(&mut self, fragment: &str) {
        self.set(fragment);
    }
}

/// Shared in-memory preference store.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    values: Arc<Mutex<HashMap<String, String>>>,
    failing: bool,
}

impl MemoryPreferences {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        self
    }

    /// Make every write fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if self.failing {
            return Err(PreferenceError {
                key: key.to_owned(),
                message: "storage unavailable".to_owned(),
            });
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
