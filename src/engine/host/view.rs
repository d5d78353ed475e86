use crate::engine::contents::{ContentsId, ContentsView};
use crate::engine::errors::EngineError;
use crate::render::backend::{NativeWindowId, RenderBackend};
use std::rc::Rc;

/// Container view of the host window. Holds the attached surfaces in attach order.
pub struct HostSurfaceView {
    window: NativeWindowId,
    backend: Rc<dyn RenderBackend>,
    children: Vec<ContentsView>,
}

impl HostSurfaceView {
    pub(crate) fn new(window: NativeWindowId, backend: Rc<dyn RenderBackend>) -> Self {
        Self {
            window,
            backend,
            children: Vec::new(),
        }
    }

    /// Attaches a surface. Nothing is recorded when the native attach fails.
    pub fn add_surface(&mut self, view: ContentsView) -> Result<(), EngineError> {
        self.backend.attach_surface(self.window, view.surface())?;
        self.push(view);
        Ok(())
    }

    /// Detaches the surface of contents `id`. Returns false when it was not attached.
    pub fn remove_surface(&mut self, id: ContentsId) -> bool {
        match self.take(id) {
            Some(view) => {
                self.backend.detach_surface(self.window, view.surface());
                true
            }
            None => false,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn contains(&self, id: ContentsId) -> bool {
        self.children.iter().any(|v| v.id() == id)
    }

    /// Ids of the attached contents, in attach order
    pub fn child_ids(&self) -> Vec<ContentsId> {
        self.children.iter().map(|v| v.id()).collect()
    }

    /// Records a surface the caller already attached natively.
    pub(crate) fn push(&mut self, view: ContentsView) {
        self.children.push(view);
    }

    /// Forgets the surface of `id` without detaching it natively.
    pub(crate) fn take(&mut self, id: ContentsId) -> Option<ContentsView> {
        let Some(pos) = self.children.iter().position(|v| v.id() == id) else {
            log::debug!("host view: contents {} is not attached", id);
            return None;
        };
        Some(self.children.remove(pos))
    }

    /// Forgets every surface without detaching them natively.
    pub(crate) fn take_all(&mut self) -> Vec<ContentsView> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn detach_all(&mut self) {
        for view in self.take_all() {
            self.backend.detach_surface(self.window, view.surface());
        }
    }
}

impl Drop for HostSurfaceView {
    fn drop(&mut self) {
        self.detach_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{WebPreferences, WindowOptions};
    use crate::engine::contents::WebContents;
    use crate::render::backends::null::NullBackend;

    fn setup() -> (NullBackend, HostSurfaceView) {
        let backend = NullBackend::new().unwrap();
        let window = backend.create_window(&WindowOptions::hidden_host()).unwrap();
        let view = HostSurfaceView::new(window, Rc::new(backend.clone()));
        (backend, view)
    }

    fn view_for(backend: &NullBackend) -> ContentsView {
        let contents = backend.create_contents(&WebPreferences::default()).unwrap();
        ContentsView::new(WebContents::new(contents))
    }

    #[test]
    fn surfaces_are_kept_in_attach_order() {
        let (backend, mut view) = setup();
        let a = view_for(&backend);
        let b = view_for(&backend);

        view.add_surface(a.clone()).unwrap();
        view.add_surface(b.clone()).unwrap();

        assert_eq!(view.child_count(), 2);
        assert_eq!(view.child_ids(), vec![a.id(), b.id()]);
        assert_eq!(backend.attached_to(view.window), vec![a.surface(), b.surface()]);
    }

    #[test]
    fn failed_attach_records_nothing() {
        let (backend, mut view) = setup();
        let a = view_for(&backend);

        backend.fail_next_attach();
        assert!(matches!(view.add_surface(a.clone()), Err(EngineError::Binding(_))));
        assert_eq!(view.child_count(), 0);
        assert!(!view.contains(a.id()));
    }

    #[test]
    fn removal_is_idempotent() {
        let (backend, mut view) = setup();
        let a = view_for(&backend);
        view.add_surface(a.clone()).unwrap();

        assert!(view.remove_surface(a.id()));
        assert!(!view.remove_surface(a.id()));
        assert!(!view.remove_surface(ContentsId::new()));
        assert_eq!(view.child_count(), 0);
        assert!(backend.attached_to(view.window).is_empty());
    }

    #[test]
    fn drop_detaches_remaining_surfaces() {
        let (backend, mut view) = setup();
        let window = view.window;
        view.add_surface(view_for(&backend)).unwrap();
        view.add_surface(view_for(&backend)).unwrap();

        drop(view);
        assert!(backend.attached_to(window).is_empty());
    }

    #[test]
    fn take_forgets_without_detaching() {
        let (backend, mut view) = setup();
        let a = view_for(&backend);
        let b = view_for(&backend);
        view.add_surface(a.clone()).unwrap();
        view.add_surface(b.clone()).unwrap();

        assert_eq!(view.take(a.id()).map(|v| v.id()), Some(a.id()));
        assert!(view.take(a.id()).is_none());
        assert_eq!(backend.attached_to(view.window), vec![a.surface(), b.surface()]);

        let rest = view.take_all();
        assert_eq!(rest.len(), 1);
        assert_eq!(view.child_count(), 0);
    }
}
