//! Sidebar navigation built from the manifest.

use scone_manifest::{Item, Manifest};
use scone_renderer::file_fragment;

/// One row of the navigation sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavEntry {
    /// Section header.
    Header {
        /// Section name.
        label: String,
    },
    /// Link to a document rendered in the viewer.
    Document {
        /// Link text.
        label: String,
        /// Document path, used for active-state matching.
        file: String,
        /// `#file=` route.
        href: String,
    },
    /// Link opened in a new browsing context. Never active.
    External {
        /// Link text.
        label: String,
        /// Absolute URL.
        url: String,
    },
}

impl NavEntry {
    /// Whether this entry is highlighted while `current` is displayed.
    ///
    /// Matching is exact string equality on the document path.
    #[must_use]
    pub fn is_active(&self, current: Option<&str>) -> bool {
        match self {
            Self::Document { file, .. } => current == Some(file.as_str()),
            Self::Header { .. } | Self::External { .. } => false,
        }
    }
}

/// Navigation entries in display order.
#[derive(Clone, Debug, Default)]
pub struct Navigation {
    entries: Vec<NavEntry>,
}

impl Navigation {
    /// Build entries: one header per section followed by its items.
    #[must_use]
    pub fn build(manifest: &Manifest) -> Self {
        let mut entries = Vec::new();
        for section in manifest.sections() {
            entries.push(NavEntry::Header {
                label: section.name.clone(),
            });
            entries.extend(section.items.iter().map(entry));
        }
        Self { entries }
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    /// File of the `index`-th document entry (zero-based), skipping headers
    /// and external links.
    #[must_use]
    pub fn document(&self, index: usize) -> Option<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                NavEntry::Document { file, .. } => Some(file.as_str()),
                _ => None,
            })
            .nth(index)
    }
}

fn entry(item: &Item) -> NavEntry {
    match item {
        Item::Internal { title, file } => NavEntry::Document {
            label: label(title, file),
            file: file.clone(),
            href: file_fragment(file),
        },
        Item::External { title, url } => NavEntry::External {
            label: label(title, url),
            url: url.clone(),
        },
    }
}

fn label(title: &str, fallback: &str) -> String {
    let label = if title.is_empty() { fallback } else { title };
    label.to_owned()
}
