//! Host page abstraction.
//!
//! A [`View`] owns the visible surface: the navigation list, the content
//! area, the page title, the document-wide theme attribute and the sidebar
//! state. The navigation and content containers are mandatory; the hamburger,
//! close and theme controls are optional and reported through
//! [`View::has_control`].

use crate::navigation::NavEntry;
use crate::shell::Theme;

/// Optional interactive controls of the host page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Sidebar toggle button (`aria-expanded` mirrors the sidebar state).
    Hamburger,
    /// Button that closes the sidebar.
    CloseSidebar,
    /// Light/dark theme switch.
    ThemeToggle,
}

/// Host page the viewer renders into.
pub trait View {
    /// Set the document-wide `data-theme` attribute.
    fn apply_theme(&mut self, theme: Theme);

    /// Reflect the sidebar state (`sidebar-open` class and the hamburger's
    /// `aria-expanded`).
    fn set_sidebar_open(&mut self, open: bool);

    /// Replace the navigation list.
    fn render_navigation(&mut self, entries: &[NavEntry]);

    /// Mark every document entry whose file equals `file` as active and all
    /// others inactive.
    fn set_active(&mut self, file: Option<&str>);

    /// Set the page title.
    fn set_title(&mut self, title: &str);

    /// Show the loading placeholder in the content area.
    fn show_loading(&mut self);

    /// Replace the content area with rendered document HTML.
    fn show_content(&mut self, html: &str);

    /// Replace the content area with an error message.
    fn show_error(&mut self, message: &str);

    /// Whether an optional control exists on the page.
    fn has_control(&self, control: Control) -> bool {
        let _ = control;
        true
    }
}
