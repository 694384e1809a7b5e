//! Shell controller: theme and sidebar state.

use std::fmt;

use crate::error::PreferenceError;
use crate::view::View;

/// Preference key holding the theme.
pub const THEME_KEY: &str = "theme";

/// Color theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    /// Light theme (default).
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// Value stored in preferences and in the `data-theme` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored preference. Missing or unknown values are light.
    #[must_use]
    pub fn from_preference(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser-local persistent key/value storage.
pub trait PreferenceStore {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Theme and sidebar state mirrored onto the view.
#[derive(Debug)]
pub struct Shell {
    theme: Theme,
    sidebar_open: bool,
}

impl Shell {
    /// Read the saved theme and apply it; the sidebar starts closed.
    pub fn init(view: &mut dyn View, preferences: &dyn PreferenceStore) -> Self {
        let theme = Theme::from_preference(preferences.get(THEME_KEY).as_deref());
        view.apply_theme(theme);
        view.set_sidebar_open(false);
        Self {
            theme,
            sidebar_open: false,
        }
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the sidebar is open.
    #[must_use]
    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Flip the theme and persist it.
    ///
    /// The new theme is applied even when saving fails.
    pub fn toggle_theme(&mut self, view: &mut dyn View, preferences: &mut dyn PreferenceStore) {
        self.theme = self.theme.toggled();
        view.apply_theme(self.theme);
        if let Err(e) = preferences.set(THEME_KEY, self.theme.as_str()) {
            tracing::warn!(error = %e, "Failed to persist theme");
        }
    }

    /// Open the sidebar.
    pub fn open_sidebar(&mut self, view: &mut dyn View) {
        self.set_sidebar(view, true);
    }

    /// Close the sidebar.
    pub fn close_sidebar(&mut self, view: &mut dyn View) {
        self.set_sidebar(view, false);
    }

    /// Toggle the sidebar.
    pub fn toggle_sidebar(&mut self, view: &mut dyn View) {
        self.set_sidebar(view, !self.sidebar_open);
    }

    fn set_sidebar(&mut self, view: &mut dyn View, open: bool) {
        self.sidebar_open = open;
        view.set_sidebar_open(open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryPreferences, RecordingView};

    #[test]
    fn test_theme_from_preference() {
        assert_eq!(Theme::from_preference(None), Theme::Light);
        assert_eq!(Theme::from_preference(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_preference(Some("light")), Theme::Light);
        assert_eq!(Theme::from_preference(Some("sepia")), Theme::Light);
    }

    #[test]
    fn test_init_applies_saved_theme() {
        let mut view = RecordingView::new();
        let prefs = MemoryPreferences::new().with(THEME_KEY, "dark");

        let shell = Shell::init(&mut view, &prefs);

        assert_eq!(shell.theme(), Theme::Dark);
        assert_eq!(view.theme, Some(Theme::Dark));
        assert!(!view.sidebar_open);
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut view = RecordingView::new();
        let mut prefs = MemoryPreferences::new();
        let mut shell = Shell::init(&mut view, &prefs);

        shell.toggle_theme(&mut view, &mut prefs);
        assert_eq!(view.theme, Some(Theme::Dark));
        assert_eq!(prefs.get(THEME_KEY).as_deref(), Some("dark"));

        shell.toggle_theme(&mut view, &mut prefs);
        assert_eq!(view.theme, Some(Theme::Light));
        assert_eq!(prefs.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_toggle_theme_survives_persist_failure() {
        let mut view = RecordingView::new();
        let mut prefs = MemoryPreferences::new().failing();
        let mut shell = Shell::init(&mut view, &prefs);

        shell.toggle_theme(&mut view, &mut prefs);

        assert_eq!(shell.theme(), Theme::Dark);
        assert_eq!(view.theme, Some(Theme::Dark));
        assert_eq!(prefs.get(THEME_KEY), None);
    }

    #[test]
    fn test_sidebar_toggle() {
        let mut view = RecordingView::new();
        let mut shell = Shell::init(&mut view, &MemoryPreferences::new());

        shell.toggle_sidebar(&mut view);
        assert!(shell.sidebar_open());
        assert!(view.sidebar_open);

        shell.toggle_sidebar(&mut view);
        assert!(!view.sidebar_open);

        shell.open_sidebar(&mut view);
        shell.close_sidebar(&mut view);
        assert!(!view.sidebar_open);
    }
}
