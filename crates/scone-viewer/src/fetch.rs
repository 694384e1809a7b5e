//! Transport abstraction for the manifest, documents and change probes.
//!
//! Implementations must bypass HTTP caches (`Cache-Control: no-store`) so
//! edits on the server are visible on the next request.

use async_trait::async_trait;
use scone_manifest::Manifest;

use crate::error::{FetchError, LoadError};

/// Successful GET response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetched {
    /// Response body decoded as UTF-8.
    pub body: String,
    /// `Last-Modified` header, if the server sent one.
    pub last_modified: Option<String>,
}

impl Fetched {
    /// Response without modification metadata.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            last_modified: None,
        }
    }

    /// Attach a `Last-Modified` value.
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }
}

/// Fetches resources relative to the viewer's origin.
///
/// Paths are passed exactly as they appear in the manifest; implementations
/// percent-encode them for the wire.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a resource as text.
    async fn fetch_text(&self, path: &str) -> Result<Fetched, FetchError>;

    /// HEAD a resource and return its `Last-Modified` value.
    async fn probe(&self, path: &str) -> Result<Option<String>, FetchError>;
}

/// Fetch and validate the navigation manifest.
///
/// # Errors
///
/// Returns an error if the manifest cannot be fetched, is not JSON, or fails
/// validation.
pub async fn load_manifest(
    fetcher: &dyn Fetcher,
    path: &str,
) -> Result<Manifest, LoadError> {
    let fetched = fetcher.fetch_text(path).await?;
    let manifest = Manifest::from_json(&fetched.body)?;
    tracing::debug!(
        path,
        sections = manifest.sections().len(),
        documents = manifest.document_count(),
        "Loaded manifest"
    );
    Ok(manifest)
}
