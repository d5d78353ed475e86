use crate::engine::app::{App, WeakApp};
use crate::engine::config::WindowOptions;
use crate::engine::contents::{ContentsId, ContentsView};
use crate::engine::errors::EngineError;
use crate::engine::events::WindowEvent;
use crate::engine::host::HostSurfaceView;
use crate::engine::window::{BaseWindow, WindowId, WindowKind};
use crate::render::backend::{NativeWindowId, RenderBackend};
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// The hidden native window all offscreen surfaces are attached to.
///
/// Handles are cheap to clone. Once torn down a handle stays valid but inert:
/// [`HostWindow::add_surface`] fails with [`EngineError::HostDestroyed`] and
/// [`HostWindow::remove_surface`] does nothing.
#[derive(Clone)]
pub struct HostWindow {
    inner: Rc<HostInner>,
}

struct HostInner {
    base: BaseWindow,
    native: NativeWindowId,
    view: RefCell<HostSurfaceView>,
    alive: Cell<bool>,
    backend: Rc<dyn RenderBackend>,
    app: WeakApp,
}

impl HostWindow {
    /// Builds the native window with the fixed hidden configuration.
    pub(crate) fn create(app: &App) -> Result<Self, EngineError> {
        let backend = app.backend();
        let native = backend.create_window(&WindowOptions::hidden_host())?;

        let base = BaseWindow::new(WindowKind::OffscreenHost, Some(native));
        base.init(app);
        app.windows().register(base.clone());

        Ok(Self {
            inner: Rc::new(HostInner {
                base,
                native,
                view: RefCell::new(HostSurfaceView::new(native, backend.clone())),
                alive: Cell::new(true),
                backend,
                app: app.downgrade(),
            }),
        })
    }

    pub fn id(&self) -> WindowId {
        self.inner.base.id()
    }

    pub fn base(&self) -> &BaseWindow {
        &self.inner.base
    }

    pub fn native_window(&self) -> NativeWindowId {
        self.inner.native
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    pub fn child_count(&self) -> usize {
        self.inner.view.borrow().child_count()
    }

    pub fn contains(&self, id: ContentsId) -> bool {
        self.inner.view.borrow().contains(id)
    }

    pub fn child_ids(&self) -> Vec<ContentsId> {
        self.inner.view.borrow().child_ids()
    }

    pub fn add_surface(&self, view: ContentsView) -> Result<(), EngineError> {
        if !self.is_alive() {
            return Err(EngineError::HostDestroyed);
        }

        // Native calls run outside the view borrow so backend callbacks may
        // query the host.
        let id = view.id();
        self.inner.backend.attach_surface(self.inner.native, view.surface())?;
        self.inner.view.borrow_mut().push(view);
        log::debug!("host {}: attached contents {} ({} surfaces)", self.id(), id, self.child_count());
        Ok(())
    }

    /// Detaches the surface of contents `id`. Whenever the host is left without
    /// surfaces afterwards it is torn down, also when `id` was not attached.
    pub fn remove_surface(&self, id: ContentsId) -> bool {
        if !self.is_alive() {
            return false;
        }

        let taken = self.inner.view.borrow_mut().take(id);
        let removed = match taken {
            Some(view) => {
                self.inner.backend.detach_surface(self.inner.native, view.surface());
                true
            }
            None => false,
        };
        if removed {
            log::debug!("host {}: detached contents {} ({} surfaces)", self.id(), id, self.child_count());
        }

        if self.child_count() == 0 {
            self.teardown();
        }
        removed
    }

    /// Clears the registry slot, then closes the native window.
    pub(crate) fn teardown(&self) {
        if !self.is_alive() {
            return;
        }

        if let Some(app) = self.inner.app.upgrade() {
            app.hosts().clear(self);
            app.windows().unregister(self.id());
        }
        self.close();
    }

    fn close(&self) {
        if self.inner.alive.replace(false) {
            log::info!("host {}: closing hidden host window", self.id());

            let children = self.inner.view.borrow_mut().take_all();
            for view in children {
                self.inner.backend.detach_surface(self.inner.native, view.surface());
            }
            self.inner.backend.close_window(self.inner.native);
            self.inner.base.mark_closed();
            self.inner.base.events().emit(&WindowEvent::Closed);
        }
    }

    pub fn same_as(&self, other: &HostWindow) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for HostWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostWindow")
            .field("id", &self.id())
            .field("native", &self.inner.native)
            .field("alive", &self.is_alive())
            .field("child_count", &self.child_count())
            .finish()
    }
}
