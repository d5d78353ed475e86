use crate::engine::app::WeakApp;
use crate::engine::contents::ContentsId;
use crate::engine::errors::EngineError;
use crate::engine::host::HostWindow;
use std::cell::{Cell, RefCell};

/// Owner of the app's single host slot.
///
/// The slot is empty when no host exists. [`HostRegistry::instance`] fills it
/// on demand, and a host clears it itself when it tears down.
pub struct HostRegistry {
    app: WeakApp,
    slot: RefCell<Option<HostWindow>>,
    constructing: Cell<bool>,
    /// Number of hosts built so far
    generation: Cell<u64>,
}

impl HostRegistry {
    pub(crate) fn new(app: WeakApp) -> Self {
        Self {
            app,
            slot: RefCell::new(None),
            constructing: Cell::new(false),
            generation: Cell::new(0),
        }
    }

    /// Returns the live host, building a new one when the slot is empty.
    ///
    /// A request made while a host is being built fails with
    /// [`EngineError::HostUnderConstruction`] instead of building a second one.
    pub fn instance(&self) -> Result<HostWindow, EngineError> {
        if let Some(host) = self.current() {
            return Ok(host);
        }
        if self.constructing.get() {
            return Err(EngineError::HostUnderConstruction);
        }

        let app = self.app.upgrade().ok_or(EngineError::HostDestroyed)?;

        self.constructing.set(true);
        let built = HostWindow::create(&app);
        self.constructing.set(false);

        let host = built?;
        self.generation.set(self.generation.get() + 1);
        *self.slot.borrow_mut() = Some(host.clone());

        log::info!("host {}: created hidden host window #{}", host.id(), self.generation.get());
        Ok(host)
    }

    /// The live host, without building one.
    pub fn current(&self) -> Option<HostWindow> {
        self.slot.borrow().clone()
    }

    pub fn is_alive(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Removes the surface of `id` from the live host, if there is one.
    /// No host is built for this.
    pub fn remove_surface(&self, id: ContentsId) -> bool {
        match self.current() {
            Some(host) => host.remove_surface(id),
            None => false,
        }
    }

    /// Tears the live host down when it has no surfaces left.
    pub fn release_if_empty(&self) {
        if let Some(host) = self.current() {
            if host.child_count() == 0 {
                host.teardown();
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub(crate) fn clear(&self, host: &HostWindow) {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().is_some_and(|h| h.same_as(host)) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::app::App;
    use crate::engine::config::{AppConfig, WebPreferences, WindowOptions};
    use crate::engine::contents::{ContentsView, WebContents};
    use crate::engine::window::Menu;
    use crate::render::backend::{ContentsBackend, NativeWindowId, RenderBackend, SurfaceHandle};
    use crate::render::backends::null::NullBackend;
    use std::rc::Rc;

    fn setup() -> (NullBackend, App) {
        let backend = NullBackend::new().unwrap();
        let app = App::new(AppConfig::default(), Rc::new(backend.clone()));
        (backend, app)
    }

    fn view(app: &App) -> ContentsView {
        ContentsView::new(WebContents::create(app, &WebPreferences::default()).unwrap())
    }

    #[test]
    fn instance_is_a_singleton() {
        let (backend, app) = setup();
        let a = app.hosts().instance().unwrap();
        let b = app.hosts().instance().unwrap();

        assert!(a.same_as(&b));
        assert_eq!(app.hosts().generation(), 1);
        assert_eq!(backend.open_windows(), vec![a.native_window()]);
    }

    #[test]
    fn host_is_created_hidden() {
        let (backend, app) = setup();
        let host = app.hosts().instance().unwrap();

        let native = backend.window(host.native_window()).unwrap();
        assert!(!native.options.show);
        assert!(!native.options.resizable);
        assert!(!native.options.fullscreenable);
        assert_eq!((native.options.width, native.options.height), (0, 0));
    }

    #[test]
    fn child_count_tracks_adds_minus_removes() {
        let (_backend, app) = setup();
        let host = app.hosts().instance().unwrap();
        let views: Vec<_> = (0..4).map(|_| view(&app)).collect();
        for v in &views {
            host.add_surface(v.clone()).unwrap();
        }

        assert!(app.hosts().remove_surface(views[0].id()));
        assert!(app.hosts().remove_surface(views[2].id()));

        assert_eq!(host.child_count(), 2);
        assert!(host.is_alive());
        assert_eq!(host.child_ids(), vec![views[1].id(), views[3].id()]);
    }

    #[test]
    fn last_removal_tears_down_and_next_instance_is_fresh() {
        let (backend, app) = setup();
        let host = app.hosts().instance().unwrap();
        let v = view(&app);
        host.add_surface(v.clone()).unwrap();

        assert!(app.hosts().remove_surface(v.id()));
        assert!(!host.is_alive());
        assert!(!app.hosts().is_alive());
        assert!(backend.window(host.native_window()).unwrap().closed);

        let fresh = app.hosts().instance().unwrap();
        assert!(!fresh.same_as(&host));
        assert_eq!(fresh.child_count(), 0);
        assert_eq!(app.hosts().generation(), 2);
    }

    #[test]
    fn stale_handle_is_inert() {
        let (_backend, app) = setup();
        let host = app.hosts().instance().unwrap();
        let v = view(&app);
        host.add_surface(v.clone()).unwrap();
        host.remove_surface(v.id());

        assert!(matches!(host.add_surface(view(&app)), Err(EngineError::HostDestroyed)));
        assert!(!host.remove_surface(v.id()));
        assert!(!app.hosts().is_alive());
    }

    #[test]
    fn removal_without_host_builds_nothing() {
        let (backend, app) = setup();
        assert!(!app.hosts().remove_surface(ContentsId::new()));
        assert!(!app.hosts().is_alive());
        assert_eq!(app.hosts().generation(), 0);
        assert!(backend.open_windows().is_empty());
    }

    #[test]
    fn missing_id_on_empty_host_tears_it_down() {
        let (_backend, app) = setup();
        let host = app.hosts().instance().unwrap();

        assert!(!app.hosts().remove_surface(ContentsId::new()));
        assert!(!host.is_alive());
    }

    #[test]
    fn missing_id_on_populated_host_changes_nothing() {
        let (_backend, app) = setup();
        let host = app.hosts().instance().unwrap();
        host.add_surface(view(&app)).unwrap();

        assert!(!app.hosts().remove_surface(ContentsId::new()));
        assert_eq!(host.child_count(), 1);
        assert!(host.is_alive());
    }

    #[test]
    fn release_if_empty_keeps_populated_host() {
        let (_backend, app) = setup();
        let host = app.hosts().instance().unwrap();
        host.add_surface(view(&app)).unwrap();

        app.hosts().release_if_empty();
        assert!(host.is_alive());

        let empty_app = setup().1;
        let empty = empty_app.hosts().instance().unwrap();
        empty_app.hosts().release_if_empty();
        assert!(!empty.is_alive());
    }

    #[test]
    fn failed_host_construction_leaves_slot_empty() {
        let (backend, app) = setup();
        backend.fail_next_window();

        assert!(matches!(app.hosts().instance(), Err(EngineError::Binding(_))));
        assert!(!app.hosts().is_alive());
        assert!(app.hosts().instance().is_ok());
    }

    #[test]
    fn host_is_not_enumerated() {
        let (_backend, app) = setup();
        let host = app.hosts().instance().unwrap();

        assert!(app.all_windows().is_empty());
        assert!(app.windows().from_id(host.id()).is_some());

        host.teardown();
        assert!(app.windows().from_id(host.id()).is_none());
    }

    /// Backend that asks for the host again while the host window is being built.
    struct ReentrantBackend {
        inner: NullBackend,
        app: RefCell<Option<WeakApp>>,
        nested: RefCell<Option<Result<HostWindow, EngineError>>>,
    }

    impl RenderBackend for ReentrantBackend {
        fn name(&self) -> &str {
            "ReentrantBackend"
        }

        fn create_contents(&self, prefs: &WebPreferences) -> anyhow::Result<Box<dyn ContentsBackend>> {
            self.inner.create_contents(prefs)
        }

        fn create_window(&self, options: &WindowOptions) -> anyhow::Result<NativeWindowId> {
            if let Some(app) = self.app.borrow().as_ref().and_then(|a| a.upgrade()) {
                *self.nested.borrow_mut() = Some(app.hosts().instance());
            }
            self.inner.create_window(options)
        }

        fn close_window(&self, window: NativeWindowId) {
            self.inner.close_window(window)
        }

        fn attach_surface(&self, window: NativeWindowId, surface: SurfaceHandle) -> anyhow::Result<()> {
            self.inner.attach_surface(window, surface)
        }

        fn detach_surface(&self, window: NativeWindowId, surface: SurfaceHandle) {
            self.inner.detach_surface(window, surface)
        }

        fn set_menu(&self, window: NativeWindowId, menu: &Menu) {
            self.inner.set_menu(window, menu)
        }
    }

    #[test]
    fn reentrant_instance_fails_while_constructing() {
        let backend = Rc::new(ReentrantBackend {
            inner: NullBackend::new().unwrap(),
            app: RefCell::new(None),
            nested: RefCell::new(None),
        });
        let app = App::new(AppConfig::default(), backend.clone());
        *backend.app.borrow_mut() = Some(app.downgrade());

        let host = app.hosts().instance().unwrap();

        let nested = backend.nested.borrow_mut().take().unwrap();
        assert!(matches!(nested, Err(EngineError::HostUnderConstruction)));
        assert_eq!(app.hosts().generation(), 1);
        assert!(app.hosts().current().unwrap().same_as(&host));
    }
}
