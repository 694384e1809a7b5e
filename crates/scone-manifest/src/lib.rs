//! Navigation manifest for Scone.
//!
//! The manifest is a JSON array of sections, each holding an ordered list of
//! items. An item either points at a markdown document served next to the
//! manifest (`file`) or at an external page (`url`):
//!
//! ```json
//! [
//!   {
//!     "section": "Guide",
//!     "items": [
//!       { "title": "Getting started", "file": "pages/start.md" },
//!       { "title": "Issue tracker", "url": "https://example.com/issues" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Parsing is split in two stages so callers can tell malformed JSON
//! ([`ManifestError::Parse`]) from well-formed JSON with the wrong shape
//! ([`ManifestError::Validation`]).

mod validate;

use serde_json::Value;

/// Manifest loading error.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Body is not valid JSON.
    #[error("Manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// JSON is valid but does not describe sections and items.
    #[error("Invalid manifest at {location}: {message}")]
    Validation {
        /// Offending element (e.g., "section[1].items[0]").
        location: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Navigation manifest: ordered sections of items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    sections: Vec<Section>,
}

/// Named group of navigation items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Section label shown as a sidebar header.
    pub name: String,
    /// Items in display order.
    pub items: Vec<Item>,
}

/// Single navigation entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// Markdown document rendered inside the viewer.
    Internal {
        /// Link label.
        title: String,
        /// Document path relative to the origin (e.g., "pages/guide.md").
        file: String,
    },
    /// Link opened in a new browsing context.
    External {
        /// Link label.
        title: String,
        /// Absolute URL.
        url: String,
    },
}

impl Item {
    /// Link label.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Internal { title, .. } | Self::External { title, .. } => title,
        }
    }

    /// Document path for internal items.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Internal { file, .. } => Some(file),
            Self::External { .. } => None,
        }
    }

    /// URL for external items.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::External { url, .. } => Some(url),
            Self::Internal { .. } => None,
        }
    }
}

impl Manifest {
    /// Create a manifest from already validated sections.
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Parse and validate manifest JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for malformed JSON and
    /// [`ManifestError::Validation`] when the structure is wrong.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Validate an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Validation`] when the structure is wrong.
    pub fn from_value(value: &Value) -> Result<Self, ManifestError> {
        validate::sections(value).map(Self::new)
    }

    /// Sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// True if the manifest has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All items across sections, in display order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// Title of the first internal item whose file equals `file` exactly.
    #[must_use]
    pub fn title_for(&self, file: &str) -> Option<&str> {
        self.items()
            .find(|item| item.file() == Some(file))
            .map(Item::title)
            .filter(|title| !title.is_empty())
    }

    /// File of the first internal item in the first section.
    ///
    /// This is the document shown when the viewer starts without a route.
    #[must_use]
    pub fn first_file(&self) -> Option<&str> {
        self.sections
            .first()?
            .items
            .iter()
            .find_map(Item::file)
    }

    /// Number of internal documents.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.items().filter(|item| item.file().is_some()).count()
    }

    /// Number of external links.
    #[must_use]
    pub fn external_count(&self) -> usize {
        self.items().filter(|item| item.url().is_some()).count()
    }
}
