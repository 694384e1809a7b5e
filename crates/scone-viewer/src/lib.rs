//! Routing, rendering and change polling for the Scone documentation viewer.
//!
//! The [`Viewer`] is a single controller that owns the application state:
//! the manifest, the current document, its modification baseline and the
//! change poller. Everything it touches in the outside world sits behind a
//! narrow trait:
//!
//! - [`View`]: the page (navigation, content area, title, theme, sidebar)
//! - [`Fetcher`]: the origin serving the manifest and documents
//! - [`Location`]: the address-bar fragment (`#file=<path>`)
//! - [`PreferenceStore`]: persistent storage for the theme
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scone_viewer::{Viewer, ViewerOptions};
//!
//! let mut viewer = Viewer::new(view, Arc::new(fetcher), Box::new(location),
//!     Box::new(preferences), ViewerOptions::default());
//! viewer.start().await?;
//! viewer.run().await;
//! ```
//!
//! # Feature Flags
//!
//! - `mock`: in-memory test doubles ([`MockFetcher`], [`RecordingView`],
//!   [`MemoryLocation`], [`MemoryPreferences`])

mod document;
mod error;
mod fetch;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod navigation;
mod poller;
mod router;
mod shell;
mod view;
mod viewer;

pub use document::{DocState, DocumentLoader, fallback_title, page_title};
pub use error::{FetchError, LoadError, PreferenceError, RenderError};
pub use fetch::{Fetched, Fetcher, load_manifest};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MemoryLocation, MemoryPreferences, MockFetcher, RecordingView};
pub use navigation::{NavEntry, Navigation};
pub use poller::{ChangePoller, DEFAULT_POLL_INTERVAL};
pub use router::{HashRouter, Location};
pub use shell::{PreferenceStore, Shell, THEME_KEY, Theme};
pub use view::{Control, View};
pub use viewer::{DOCUMENT_FAILURE_MESSAGE, EventSender, Viewer, ViewerEvent, ViewerOptions};
