//! The viewer controller.
//!
//! [`Viewer`] owns all application state and processes one message at a
//! time, in arrival order. Host input ([`ViewerEvent`]), finished document
//! fetches and change probes all arrive on the same channel; network work runs
//! in spawned tasks that report back through it.

use std::sync::Arc;
use std::time::Duration;

use scone_manifest::Manifest;
use scone_renderer::MarkdownRenderer;
use tokio::sync::mpsc;

use crate::document::{DocState, DocumentLoader, page_title};
use crate::error::{LoadError, RenderError};
use crate::fetch::{Fetched, Fetcher, load_manifest};
use crate::navigation::Navigation;
use crate::poller::{ChangePoller, DEFAULT_POLL_INTERVAL};
use crate::router::{HashRouter, Location};
use crate::shell::{PreferenceStore, Shell};
use crate::view::{Control, View};

/// Content shown when a document cannot be loaded.
pub const DOCUMENT_FAILURE_MESSAGE: &str = "Failed to load the document.";

/// Input from the host page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    /// The address-bar fragment changed.
    HashChanged,
    /// A document entry in the navigation was activated.
    NavigationClicked(String),
    /// Theme switch pressed.
    ToggleTheme,
    /// Hamburger pressed.
    ToggleSidebar,
    /// Request to open the sidebar.
    OpenSidebar,
    /// Sidebar close button pressed.
    CloseSidebar,
    /// Key pressed, by DOM key name (e.g., "Escape").
    KeyPressed(String),
}

/// Everything the viewer reacts to.
#[derive(Debug)]
pub(crate) enum Message {
    Event(ViewerEvent),
    Loaded {
        generation: u64,
        file: String,
        silent: bool,
        result: Result<Fetched, RenderError>,
    },
    Probed {
        file: String,
        last_modified: Option<String>,
    },
}

/// Cloneable handle for delivering [`ViewerEvent`]s.
#[derive(Clone, Debug)]
pub struct EventSender(mpsc::UnboundedSender<Message>);

impl EventSender {
    /// Queue an event. Returns `false` if the viewer is gone.
    pub fn send(&self, event: ViewerEvent) -> bool {
        self.0.send(Message::Event(event)).is_ok()
    }
}

/// Viewer settings.
#[derive(Clone, Debug)]
pub struct ViewerOptions {
    /// Appended to every page title.
    pub site_title: String,
    /// Manifest path relative to the origin.
    pub manifest_path: String,
    /// Whether the displayed document is polled for changes.
    pub poll_enabled: bool,
    /// Probe period.
    pub poll_interval: Duration,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            site_title: "Scone".to_owned(),
            manifest_path: "manifest.json".to_owned(),
            poll_enabled: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Manifest-driven markdown viewer.
pub struct Viewer<V: View> {
    view: V,
    fetcher: Arc<dyn Fetcher>,
    router: HashRouter,
    preferences: Box<dyn PreferenceStore>,
    renderer: MarkdownRenderer,
    options: ViewerOptions,
    shell: Shell,
    manifest: Option<Manifest>,
    navigation: Navigation,
    document: DocumentLoader,
    poller: Option<ChangePoller>,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl<V: View> Viewer<V> {
    /// Create a viewer and apply the saved theme.
    pub fn new(
        mut view: V,
        fetcher: Arc<dyn Fetcher>,
        location: Box<dyn Location>,
        preferences: Box<dyn PreferenceStore>,
        options: ViewerOptions,
    ) -> Self {
        let shell = Shell::init(&mut view, &*preferences);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            view,
            fetcher,
            router: HashRouter::new(location),
            preferences,
            renderer: MarkdownRenderer::new(),
            options,
            shell,
            manifest: None,
            navigation: Navigation::default(),
            document: DocumentLoader::new(),
            poller: None,
            tx,
            rx,
        }
    }

    /// Use a custom markdown renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Handle for delivering host events.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender(self.tx.clone())
    }

    /// Load the manifest, build navigation and show the initial document.
    ///
    /// On failure the content area shows an initialization error and the
    /// viewer stays inert apart from the shell controls.
    pub async fn start(&mut self) -> Result<(), LoadError> {
        let manifest = match load_manifest(self.fetcher.as_ref(), &self.options.manifest_path).await
        {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize viewer");
                let message = format!("Failed to initialize: check {}", self.options.manifest_path);
                self.view.show_error(&message);
                return Err(e);
            }
        };

        self.navigation = Navigation::build(&manifest);
        self.view.render_navigation(self.navigation.entries());
        self.manifest = Some(manifest);

        match self.initial_route() {
            Some(file) => self.request(&file, false),
            None => tracing::info!("Manifest has no initial document"),
        }
        Ok(())
    }

    /// Wait for the next message and handle it.
    ///
    /// Cancel-safe: a message is either fully handled or left queued.
    pub async fn step(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.handle(message);
        }
    }

    /// Handle one already queued message, if any.
    pub fn try_step(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(message) => {
                self.handle(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Handle messages forever.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// Handle a host event immediately.
    pub fn dispatch(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::HashChanged => {
                if self.manifest.is_none() {
                    return;
                }
                if let Some(file) = self.router.target() {
                    self.request(&file, false);
                }
            }
            ViewerEvent::NavigationClicked(file) => self.open(&file),
            ViewerEvent::ToggleTheme => {
                if self.require(Control::ThemeToggle) {
                    self.shell
                        .toggle_theme(&mut self.view, &mut *self.preferences);
                }
            }
            ViewerEvent::ToggleSidebar => {
                if self.require(Control::Hamburger) {
                    self.shell.toggle_sidebar(&mut self.view);
                }
            }
            ViewerEvent::OpenSidebar => {
                if self.require(Control::Hamburger) {
                    self.shell.open_sidebar(&mut self.view);
                }
            }
            ViewerEvent::CloseSidebar => {
                if self.require(Control::CloseSidebar) {
                    self.shell.close_sidebar(&mut self.view);
                }
            }
            ViewerEvent::KeyPressed(key) => {
                if key == "Escape" {
                    self.shell.close_sidebar(&mut self.view);
                }
            }
        }
    }

    /// Route to `file` the way a navigation click does: update the fragment
    /// and the active entry; the fetch follows from the route change.
    pub fn open(&mut self, file: &str) {
        if self.router.set_target(file) {
            self.enqueue(ViewerEvent::HashChanged);
        }
        self.view.set_active(Some(file));
    }

    /// Host view.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Host view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Loaded manifest.
    #[must_use]
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Navigation entries.
    #[must_use]
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Shell state.
    #[must_use]
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Path of the current document.
    #[must_use]
    pub fn current_file(&self) -> Option<&str> {
        self.document.current()
    }

    /// Document display state.
    #[must_use]
    pub fn document_state(&self) -> DocState {
        self.document.state()
    }

    /// File being polled for changes, if any.
    #[must_use]
    pub fn polled_file(&self) -> Option<&str> {
        self.poller.as_ref().map(ChangePoller::file)
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Event(event) => self.dispatch(event),
            Message::Loaded {
                generation,
                file,
                silent,
                result,
            } => self.on_loaded(generation, &file, silent, result),
            Message::Probed {
                file,
                last_modified,
            } => self.on_probed(&file, last_modified.as_deref()),
        }
    }

    fn enqueue(&self, event: ViewerEvent) {
        // Receiver lives in `self`, so the send cannot fail.
        let _ = self.tx.send(Message::Event(event));
    }

    fn require(&self, control: Control) -> bool {
        let present = self.view.has_control(control);
        if !present {
            tracing::debug!(?control, "Control not present, ignoring");
        }
        present
    }

    /// Use the routed file, or route to the manifest's first document.
    fn initial_route(&mut self) -> Option<String> {
        if let Some(file) = self.router.target() {
            return Some(file);
        }
        let first = self.manifest.as_ref()?.first_file()?.to_owned();
        if self.router.set_target(&first) {
            self.enqueue(ViewerEvent::HashChanged);
        }
        Some(first)
    }

    fn request(&mut self, file: &str, silent: bool) {
        let Some(generation) = self.document.begin(file, silent) else {
            tracing::debug!(file, "Document already current");
            return;
        };

        if !silent {
            self.poller = None;
            self.view.show_loading();
            let title = page_title(self.manifest.as_ref(), file, &self.options.site_title);
            self.view.set_title(&title);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let messages = self.tx.clone();
        let file = file.to_owned();
        tokio::spawn(async move {
            let result = fetcher.fetch_text(&file).await.map_err(RenderError::from);
            let _ = messages.send(Message::Loaded {
                generation,
                file,
                silent,
                result,
            });
        });
    }

    fn on_loaded(
        &mut self,
        generation: u64,
        file: &str,
        silent: bool,
        result: Result<Fetched, RenderError>,
    ) {
        if !self.document.is_latest(generation) {
            tracing::debug!(
                file,
                generation,
                latest = self.document.generation(),
                "Discarding stale document result"
            );
            return;
        }

        match result {
            Ok(fetched) => self.display(file, silent, fetched),
            Err(e) => {
                tracing::warn!(file, error = %e, "Failed to display document");
                self.poller = None;
                self.document.failed();
                self.view.show_error(DOCUMENT_FAILURE_MESSAGE);
            }
        }
    }

    fn display(&mut self, file: &str, silent: bool, fetched: Fetched) {
        let rendered = self.renderer.render_markdown(&fetched.body);
        self.view.show_content(&rendered.html);
        self.document.displayed(fetched.last_modified);
        self.view.set_active(Some(file));
        self.shell.close_sidebar(&mut self.view);

        self.poller = None;
        if self.options.poll_enabled {
            self.poller = Some(ChangePoller::start(
                file,
                self.options.poll_interval,
                Arc::clone(&self.fetcher),
                self.tx.clone(),
            ));
        }

        if silent {
            tracing::info!(file, "Document refreshed");
        } else {
            tracing::debug!(
                file,
                highlighted = rendered.highlighted_blocks,
                "Displayed document"
            );
        }
    }

    fn on_probed(&mut self, file: &str, last_modified: Option<&str>) {
        if self.document.observe(file, last_modified) {
            tracing::debug!(file, last_modified, "Document changed on server");
            self.request(file, true);
        }
    }
}
