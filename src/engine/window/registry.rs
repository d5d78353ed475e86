use crate::engine::window::{BaseWindow, WindowId};
use std::cell::RefCell;

/// Every live window of the app, in creation order.
///
/// Internal windows (the offscreen host and offscreen controllers) are tracked
/// too, so they can be looked up by id, but they are never returned by
/// [`WindowRegistry::all_windows`] or [`WindowRegistry::focused_window`].
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: RefCell<Vec<BaseWindow>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, window: BaseWindow) {
        let mut windows = self.windows.borrow_mut();
        if windows.iter().any(|w| w.id() == window.id()) {
            return;
        }
        windows.push(window);
    }

    /// Returns false when the window was not registered.
    pub(crate) fn unregister(&self, id: WindowId) -> bool {
        let mut windows = self.windows.borrow_mut();
        let before = windows.len();
        windows.retain(|w| w.id() != id);
        windows.len() != before
    }

    /// User-visible windows.
    pub fn all_windows(&self) -> Vec<BaseWindow> {
        self.windows
            .borrow()
            .iter()
            .filter(|w| !w.kind().is_internal())
            .cloned()
            .collect()
    }

    pub fn focused_window(&self) -> Option<BaseWindow> {
        self.windows
            .borrow()
            .iter()
            .find(|w| !w.kind().is_internal() && w.is_focused())
            .cloned()
    }

    /// Looks up any window, internal ones included.
    pub fn from_id(&self, id: WindowId) -> Option<BaseWindow> {
        self.windows.borrow().iter().find(|w| w.id() == id).cloned()
    }

    /// Number of registered windows, internal ones included.
    pub fn len(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::window::WindowKind;

    #[test]
    fn enumeration_skips_internal_windows() {
        let registry = WindowRegistry::new();
        let visible = BaseWindow::new(WindowKind::TopLevel, None);
        let host = BaseWindow::new(WindowKind::OffscreenHost, None);
        let offscreen = BaseWindow::new(WindowKind::Offscreen, None);

        registry.register(host.clone());
        registry.register(visible.clone());
        registry.register(offscreen.clone());

        let all = registry.all_windows();
        assert_eq!(all.len(), 1);
        assert!(all[0].same_as(&visible));
        assert_eq!(registry.len(), 3);
        assert!(registry.from_id(host.id()).is_some());
    }

    #[test]
    fn focused_window_ignores_internal_windows() {
        let registry = WindowRegistry::new();
        let offscreen = BaseWindow::new(WindowKind::Offscreen, None);
        offscreen.set_focused(true);
        registry.register(offscreen);
        assert!(registry.focused_window().is_none());

        let visible = BaseWindow::new(WindowKind::TopLevel, None);
        visible.set_focused(true);
        registry.register(visible.clone());
        assert!(registry.focused_window().unwrap().same_as(&visible));
    }

    #[test]
    fn register_is_idempotent() {
        let registry = WindowRegistry::new();
        let window = BaseWindow::new(WindowKind::TopLevel, None);
        registry.register(window.clone());
        registry.register(window.clone());
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(window.id()));
        assert!(!registry.unregister(window.id()));
        assert!(registry.is_empty());
    }
}
