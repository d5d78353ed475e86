use crate::engine::app::{App, WeakApp};
use crate::engine::config::OffscreenWindowOptions;
use crate::engine::contents::{ContentsId, ContentsView, WebContents};
use crate::engine::emitter::{EventEmitter, EventToken, ListenerId};
use crate::engine::errors::EngineError;
use crate::engine::events::{AppEvent, ContentsEvent, WindowEvent};
use crate::engine::host::HostWindow;
use crate::engine::window::{BaseWindow, WindowId, WindowKind};
use crate::render::backend::{Color, SurfaceHandle, SurfaceSize};
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};
use tokio_util::sync::CancellationToken;

/// Lifecycle of an offscreen window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowState {
    /// Being wired up; never observable from outside the constructor
    Constructing,
    /// Surface attached to the host
    Active,
    /// Closed, the surface has been removed from the host
    Closed,
}

/// Application-facing controller of one offscreen render surface.
///
/// Clones refer to the same window. The app keeps the window alive until it
/// is closed, so dropping every handle does not detach the surface.
#[derive(Clone)]
pub struct OffscreenWindow {
    pub(super) inner: Rc<OffscreenInner>,
}

pub(super) struct OffscreenInner {
    app: WeakApp,
    base: BaseWindow,
    pub(super) contents: WebContents,
    state: Cell<WindowState>,
    size: Cell<SurfaceSize>,
    background: Cell<Option<Color>>,
    visible: Cell<bool>,
    /// Pending unresponsive notification
    unresponsive: RefCell<Option<CancellationToken>>,
}

impl OffscreenWindow {
    /// Creates the window and attaches its surface to the app's host.
    ///
    /// Fails with [`EngineError::NotReady`] before the app is ready. When the
    /// surface cannot be attached no window is created, and a host that was
    /// built for this window alone is released again. Adopted contents must be
    /// alive and not attached to the host already.
    pub fn new(app: &App, options: OffscreenWindowOptions) -> Result<Self, EngineError> {
        if !app.is_ready() {
            return Err(EngineError::NotReady);
        }

        let background = match &options.background_color {
            Some(hex) => Some(Color::parse_hex(hex).ok_or_else(|| EngineError::InvalidColor(hex.clone()))?),
            None => None,
        };

        if let Some(contents) = &options.contents {
            if contents.is_destroyed() {
                return Err(EngineError::ContentsDestroyed(contents.id()));
            }
            if app.hosts().current().is_some_and(|h| h.contains(contents.id())) {
                return Err(EngineError::ContentsInUse(contents.id()));
            }
        }

        let owns_contents = options.contents.is_none();
        let contents = match &options.contents {
            Some(contents) => contents.clone(),
            None => WebContents::create(app, &options.effective_web_preferences())?,
        };

        let host = match attach(app, &contents) {
            Ok(host) => host,
            Err(e) => {
                log::warn!("offscreen: cannot attach contents {}: {}", contents.id(), e);
                app.hosts().release_if_empty();
                if owns_contents {
                    contents.destroy();
                }
                return Err(e);
            }
        };

        let size = SurfaceSize {
            width: options.width,
            height: options.height,
        };

        let window = Self {
            inner: Rc::new(OffscreenInner {
                app: app.downgrade(),
                base: BaseWindow::new(WindowKind::Offscreen, None),
                contents: contents.clone(),
                state: Cell::new(WindowState::Constructing),
                size: Cell::new(size),
                background: Cell::new(background),
                visible: Cell::new(false),
                unresponsive: RefCell::new(None),
            }),
        };

        window.inner.base.set_owner(Some(host.id()));
        contents.set_owner_window(Some(host.native_window()));
        contents.set_size(size);
        if let Some(color) = background {
            contents.set_background_color(color);
        }

        window.forward_contents_events();
        window.forward_window_events(app);

        app.windows().register(window.inner.base.clone());
        app.track_offscreen(window.clone());
        window.inner.state.set(WindowState::Active);

        log::debug!(
            "offscreen {}: created for contents {} on host {}",
            window.id(),
            contents.id(),
            host.id()
        );

        let event = EventToken::new();
        app.emit(&AppEvent::OffscreenWindowCreated {
            event: event.clone(),
            window: window.clone(),
        });

        if options.show && !event.is_default_prevented() {
            window.show();
        }

        Ok(window)
    }

    fn forward_contents_events(&self) {
        let contents = &self.inner.contents;

        let weak = self.downgrade();
        contents.on("page-title-updated", move |ev| {
            let Some(window) = upgrade(&weak) else { return };
            if let ContentsEvent::PageTitleUpdated { event, title, explicit_set } = ev {
                window.inner.base.events().emit(&WindowEvent::PageTitleUpdated {
                    event: event.clone(),
                    title: title.clone(),
                    explicit_set: *explicit_set,
                });
            }
        });

        let weak = self.downgrade();
        contents.once("did-start-navigation", move |_| {
            if let Some(window) = upgrade(&weak) {
                window.focus();
            }
        });

        let weak = self.downgrade();
        contents.on("first-visually-non-empty-paint", move |_| {
            let Some(window) = upgrade(&weak) else { return };
            let Some(app) = window.inner.app.upgrade() else { return };

            let weak = window.downgrade();
            app.post_task(move || {
                if let Some(window) = upgrade(&weak) {
                    if window.state() == WindowState::Active {
                        window.inner.base.events().emit(&WindowEvent::ReadyToShow);
                    }
                }
            });
        });

        let weak = self.downgrade();
        contents.on("renderer-unresponsive", move |_| {
            if let Some(window) = upgrade(&weak) {
                window.schedule_unresponsive();
            }
        });

        let weak = self.downgrade();
        contents.on("renderer-responsive", move |_| {
            if let Some(window) = upgrade(&weak) {
                window.cancel_unresponsive();
                window.inner.base.events().emit(&WindowEvent::Responsive);
            }
        });

        let weak = self.downgrade();
        contents.on("input-event", move |ev| {
            let Some(window) = upgrade(&weak) else { return };
            if let ContentsEvent::InputEvent { kind } = ev {
                if kind.is_gesture_scroll() {
                    window.inner.base.events().emit(&WindowEvent::ScrollTouchEdge);
                }
            }
        });

        let weak = self.downgrade();
        contents.on("close-requested", move |_| {
            if let Some(window) = upgrade(&weak) {
                window.close();
            }
        });
    }

    fn forward_window_events(&self, app: &App) {
        let base = &self.inner.base;

        let (weak, weak_app) = (self.downgrade(), app.downgrade());
        base.on("blur", move |ev| {
            let (Some(window), Some(app)) = (upgrade(&weak), weak_app.upgrade()) else { return };
            if let WindowEvent::Blur { event } = ev {
                app.emit(&AppEvent::OffscreenWindowBlur {
                    event: event.clone(),
                    window,
                });
            }
        });

        let (weak, weak_app) = (self.downgrade(), app.downgrade());
        base.on("focus", move |ev| {
            let (Some(window), Some(app)) = (upgrade(&weak), weak_app.upgrade()) else { return };
            if let WindowEvent::Focus { event } = ev {
                app.emit(&AppEvent::OffscreenWindowFocus {
                    event: event.clone(),
                    window,
                });
            }
        });

        let contents_id = self.inner.contents.id();
        let weak_app = app.downgrade();
        base.on("closed", move |_| {
            if let Some(app) = weak_app.upgrade() {
                app.hosts().remove_surface(contents_id);
            }
        });
    }

    fn schedule_unresponsive(&self) {
        if self.is_closed() {
            return;
        }
        if self.inner.unresponsive.borrow().is_some() {
            return;
        }
        let Some(app) = self.inner.app.upgrade() else { return };

        let token = CancellationToken::new();
        *self.inner.unresponsive.borrow_mut() = Some(token.clone());

        let weak = self.downgrade();
        let weak_app = app.downgrade();
        app.post_delayed_task(app.config().unresponsive_delay, move || {
            if token.is_cancelled() {
                return;
            }
            let Some(window) = upgrade(&weak) else { return };
            window.inner.unresponsive.borrow_mut().take();

            let suppressed = weak_app.upgrade().map_or(true, |app| app.is_unresponsive_suppressed());
            if window.is_closed() || suppressed {
                return;
            }
            log::debug!("offscreen {}: renderer unresponsive", window.id());
            window.inner.base.events().emit(&WindowEvent::Unresponsive);
        });
    }

    fn cancel_unresponsive(&self) {
        if let Some(token) = self.inner.unresponsive.borrow_mut().take() {
            token.cancel();
        }
    }

    fn downgrade(&self) -> Weak<OffscreenInner> {
        Rc::downgrade(&self.inner)
    }

    /// Looks up an open offscreen window by id.
    pub fn from_id(app: &App, id: WindowId) -> Option<OffscreenWindow> {
        app.offscreen_window(id)
    }

    pub fn id(&self) -> WindowId {
        self.inner.base.id()
    }

    pub fn base(&self) -> &BaseWindow {
        &self.inner.base
    }

    pub fn contents(&self) -> &WebContents {
        &self.inner.contents
    }

    pub fn contents_id(&self) -> ContentsId {
        self.inner.contents.id()
    }

    /// The host window this window's surface is attached to.
    pub fn owner(&self) -> Option<WindowId> {
        self.inner.base.owner()
    }

    pub fn state(&self) -> WindowState {
        self.inner.state.get()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == WindowState::Closed
    }

    /// Closes the window and removes its surface from the host. `closed` is
    /// emitted once; later calls do nothing.
    pub fn close(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.state.set(WindowState::Closed);
        self.cancel_unresponsive();
        self.inner.visible.set(false);
        self.inner.base.mark_closed();

        log::debug!("offscreen {}: closing", self.id());
        self.inner.base.events().emit(&WindowEvent::Closed);

        if let Some(app) = self.inner.app.upgrade() {
            app.windows().unregister(self.id());
            app.untrack_offscreen(self.id());
        }
        self.inner.contents.destroy();
    }

    pub fn focus(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.base.set_focused(true);
        self.inner.base.events().emit(&WindowEvent::Focus { event: EventToken::new() });
        self.inner.contents.focus();
    }

    pub fn blur(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.base.set_focused(false);
        self.inner.base.events().emit(&WindowEvent::Blur { event: EventToken::new() });
        self.inner.contents.blur();
    }

    pub fn is_focused(&self) -> bool {
        self.inner.base.is_focused()
    }

    pub fn set_size(&self, width: u32, height: u32) -> Result<(), EngineError> {
        if self.is_closed() {
            return Err(EngineError::WindowClosed);
        }

        let size = SurfaceSize { width, height };
        self.inner.size.set(size);
        self.inner.contents.set_size(size);
        self.inner.base.events().emit(&WindowEvent::Resize { width, height });
        Ok(())
    }

    pub fn size(&self) -> SurfaceSize {
        self.inner.size.get()
    }

    /// Accepts `#RGB`, `#RRGGBB` and `#AARRGGBB`.
    pub fn set_background_color(&self, hex: &str) -> Result<(), EngineError> {
        let color = Color::parse_hex(hex).ok_or_else(|| EngineError::InvalidColor(hex.to_string()))?;
        if self.is_closed() {
            return Err(EngineError::WindowClosed);
        }

        self.inner.background.set(Some(color));
        self.inner.contents.set_background_color(color);
        Ok(())
    }

    pub fn background_color(&self) -> Option<Color> {
        self.inner.background.get()
    }

    pub fn show(&self) {
        if self.is_closed() || self.inner.visible.replace(true) {
            return;
        }
        self.inner.contents.set_visible(true);
    }

    pub fn hide(&self) {
        if self.is_closed() || !self.inner.visible.replace(false) {
            return;
        }
        self.inner.contents.set_visible(false);
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    /// Surface of the dev-tools frontend, if it is open.
    pub fn dev_tools_contents(&self) -> Option<SurfaceHandle> {
        self.inner.contents.dev_tools_surface()
    }

    pub fn events(&self) -> &EventEmitter<WindowEvent> {
        self.inner.base.events()
    }

    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&WindowEvent) + 'static,
    {
        self.inner.base.on(name, listener)
    }

    pub fn once<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&WindowEvent) + 'static,
    {
        self.inner.base.once(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.base.off(id)
    }

    pub fn same_as(&self, other: &OffscreenWindow) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

fn attach(app: &App, contents: &WebContents) -> Result<HostWindow, EngineError> {
    let host = app.hosts().instance()?;
    host.add_surface(ContentsView::new(contents.clone()))?;
    Ok(host)
}

fn upgrade(weak: &Weak<OffscreenInner>) -> Option<OffscreenWindow> {
    weak.upgrade().map(|inner| OffscreenWindow { inner })
}

impl Debug for OffscreenWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffscreenWindow")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("contents", &self.inner.contents.id())
            .field("visible", &self.inner.visible.get())
            .finish()
    }
}
