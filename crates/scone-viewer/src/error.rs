//! Error types for the viewer.

use scone_manifest::ManifestError;

/// Transport-level failure for a single request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("{path}: HTTP {status}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested path.
        path: String,
    },
    /// Request could not be completed.
    #[error("{path}: {message}")]
    Transport {
        /// Requested path.
        path: String,
        /// Underlying error description.
        message: String,
    },
    /// Body is not valid UTF-8.
    #[error("{path}: response body is not valid UTF-8")]
    Decode {
        /// Requested path.
        path: String,
    },
}

impl FetchError {
    /// Requested path the error refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Status { path, .. } | Self::Transport { path, .. } | Self::Decode { path } => {
                path
            }
        }
    }
}

/// Manifest loading failure. Aborts initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Manifest could not be fetched.
    #[error("Failed to load manifest: {0}")]
    Load(#[from] FetchError),
    /// Manifest body is not valid JSON.
    #[error("Failed to parse manifest: {0}")]
    Parse(#[source] serde_json::Error),
    /// Manifest JSON has the wrong shape.
    #[error("Invalid manifest at {location}: {message}")]
    Validation {
        /// Offending element (e.g., "section[0].items[2]").
        location: String,
        /// What is wrong with it.
        message: String,
    },
}

impl From<ManifestError> for LoadError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Parse(e) => Self::Parse(e),
            ManifestError::Validation { location, message } => {
                Self::Validation { location, message }
            }
        }
    }
}

/// Document display failure. Logged and shown as a static message.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Document could not be fetched or decoded.
    #[error("Failed to load document: {0}")]
    Fetch(#[from] FetchError),
}

/// Preference could not be persisted.
#[derive(Debug, thiserror::Error)]
#[error("Failed to save preference {key}: {message}")]
pub struct PreferenceError {
    /// Preference key.
    pub key: String,
    /// Underlying error description.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_maps_to_load_error() {
        let err: LoadError = scone_manifest::Manifest::from_json("{").unwrap_err().into();
        assert!(matches!(err, LoadError::Parse(_)));

        let err: LoadError = scone_manifest::Manifest::from_json("{}").unwrap_err().into();
        assert!(matches!(err, LoadError::Validation { .. }));
        assert!(err.to_string().starts_with("Invalid manifest at manifest"));
    }

    #[test]
    fn test_fetch_error_path() {
        let err = FetchError::Status {
            status: 404,
            path: "pages/a.md".to_owned(),
        };
        assert_eq!(err.path(), "pages/a.md");
        assert_eq!(err.to_string(), "pages/a.md: HTTP 404");
    }
}
