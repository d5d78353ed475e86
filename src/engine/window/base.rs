use crate::engine::app::App;
use crate::engine::emitter::{EventEmitter, ListenerId};
use crate::engine::events::WindowEvent;
use crate::engine::window::Menu;
use crate::render::backend::{NativeWindowId, RenderBackend};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// A unique identifier for a window, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WindowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of window this is. Internal kinds never show up in window enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowKind {
    /// Regular user-visible window
    TopLevel,
    /// The hidden window that aggregates offscreen surfaces
    OffscreenHost,
    /// Controller for an offscreen render surface
    Offscreen,
}

impl WindowKind {
    pub fn is_internal(&self) -> bool {
        matches!(self, WindowKind::OffscreenHost | WindowKind::Offscreen)
    }
}

/// State every window kind has in common. This is a cheap-to-clone handle; clones
/// refer to the same window.
#[derive(Clone)]
pub struct BaseWindow {
    inner: Rc<BaseInner>,
}

struct BaseInner {
    id: WindowId,
    kind: WindowKind,
    /// Native window, when this window has one of its own
    native: Option<NativeWindowId>,
    title: RefCell<String>,
    focused: Cell<bool>,
    closed: Cell<bool>,
    menu: RefCell<Option<Menu>>,
    owner: Cell<Option<WindowId>>,
    events: EventEmitter<WindowEvent>,
}

impl BaseWindow {
    pub(crate) fn new(kind: WindowKind, native: Option<NativeWindowId>) -> Self {
        Self {
            inner: Rc::new(BaseInner {
                id: WindowId::new(),
                kind,
                native,
                title: RefCell::new(String::new()),
                focused: Cell::new(false),
                closed: Cell::new(false),
                menu: RefCell::new(None),
                owner: Cell::new(None),
                events: EventEmitter::new(),
            }),
        }
    }

    /// Common window initialisation. On platforms without a native application
    /// menu, the app menu is attached to the window itself.
    pub(crate) fn init(&self, app: &App) {
        if app.config().platform.has_native_app_menu() {
            return;
        }

        if let Some(menu) = app.application_menu() {
            log::debug!("window {}: attaching application menu", self.id());
            self.set_menu(&*app.backend(), menu);
        }
    }

    pub fn id(&self) -> WindowId {
        self.inner.id
    }

    pub fn kind(&self) -> WindowKind {
        self.inner.kind
    }

    pub fn native(&self) -> Option<NativeWindowId> {
        self.inner.native
    }

    pub fn title(&self) -> String {
        self.inner.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.inner.title.borrow_mut() = title.into();
    }

    pub fn is_focused(&self) -> bool {
        self.inner.focused.get()
    }

    pub(crate) fn set_focused(&self, focused: bool) {
        self.inner.focused.set(focused);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Marks the window closed. Returns false when it already was.
    pub(crate) fn mark_closed(&self) -> bool {
        self.inner.focused.set(false);
        !self.inner.closed.replace(true)
    }

    pub fn menu(&self) -> Option<Menu> {
        self.inner.menu.borrow().clone()
    }

    pub fn set_menu(&self, backend: &dyn RenderBackend, menu: Menu) {
        if let Some(native) = self.inner.native {
            backend.set_menu(native, &menu);
        }
        *self.inner.menu.borrow_mut() = Some(menu);
    }

    /// Window this one is attached to, if any
    pub fn owner(&self) -> Option<WindowId> {
        self.inner.owner.get()
    }

    pub(crate) fn set_owner(&self, owner: Option<WindowId>) {
        self.inner.owner.set(owner);
    }

    pub fn events(&self) -> &EventEmitter<WindowEvent> {
        &self.inner.events
    }

    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&WindowEvent) + 'static,
    {
        self.inner.events.on(name, listener)
    }

    pub fn once<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&WindowEvent) + 'static,
    {
        self.inner.events.once(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// True when both handles refer to the same window.
    pub fn same_as(&self, other: &BaseWindow) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for BaseWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseWindow")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("native", &self.inner.native)
            .field("focused", &self.inner.focused.get())
            .field("closed", &self.inner.closed.get())
            .finish()
    }
}
