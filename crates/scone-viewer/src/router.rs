//! Hash router: maps the address-bar fragment to a document path.

use scone_renderer::{file_fragment, parse_file_fragment};

/// Address-bar fragment of the host.
pub trait Location {
    /// Current fragment, including the leading `#` (empty when unset).
    fn fragment(&self) -> String;

    /// Replace the fragment without reloading the page.
    fn set_fragment(&mut self, fragment: &str);
}

/// Reads and writes `#file=<path>` routes.
pub struct HashRouter {
    location: Box<dyn Location>,
}

impl HashRouter {
    /// Create a router over the host location.
    #[must_use]
    pub fn new(location: Box<dyn Location>) -> Self {
        Self { location }
    }

    /// Document path encoded in the fragment, if any.
    #[must_use]
    pub fn target(&self) -> Option<String> {
        parse_file_fragment(&self.location.fragment())
    }

    /// Route to `path`.
    ///
    /// Returns `true` if the fragment changed, which the host observes as a
    /// route change.
    pub fn set_target(&mut self, path: &str) -> bool {
        let fragment = file_fragment(path);
        if self.location.fragment() == fragment {
            return false;
        }
        self.location.set_fragment(&fragment);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryLocation;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_target_absent() {
        let router = HashRouter::new(Box::new(MemoryLocation::new("")));
        assert_eq!(router.target(), None);

        let router = HashRouter::new(Box::new(MemoryLocation::new("#section-2")));
        assert_eq!(router.target(), None);
    }

    #[test]
    fn test_set_target_writes_encoded_fragment() {
        let location = MemoryLocation::new("");
        let mut router = HashRouter::new(Box::new(location.clone()));

        assert!(router.set_target("pages/getting started.md"));

        assert_eq!(location.get(), "#file=pages%2Fgetting%20started.md");
        assert_eq!(
            router.target().as_deref(),
            Some("pages/getting started.md")
        );
    }

    #[test]
    fn test_set_same_target_is_unchanged() {
        let mut router = HashRouter::new(Box::new(MemoryLocation::new("#file=a.md")));
        assert!(!router.set_target("a.md"));
    }

    #[test]
    fn test_round_trip() {
        let mut router = HashRouter::new(Box::new(MemoryLocation::new("")));
        for path in ["a.md", "pages/x&y=z.md", "pages/문서.md", "pages/50%.md"] {
            router.set_target(path);
            assert_eq!(router.target().as_deref(), Some(path));
        }
    }
}
