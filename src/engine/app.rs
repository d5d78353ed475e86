use crate::engine::config::{AppConfig, WindowOptions};
use crate::engine::emitter::{EventEmitter, ListenerId};
use crate::engine::errors::EngineError;
use crate::engine::events::AppEvent;
use crate::engine::host::HostRegistry;
use crate::engine::offscreen::OffscreenWindow;
use crate::engine::tick::TickResult;
use crate::engine::window::{BaseWindow, Menu, TopLevelWindow, WindowId, WindowRegistry};
use crate::render::backend::RenderBackend;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

type Task = Box<dyn FnOnce()>;

struct DeferredTask {
    /// None when the deadline is past what `Instant` can represent
    due: Option<Instant>,
    task: Task,
}

/// Top-level application context.
///
/// Owns the render backend, the window registry, the host registry and the
/// app-wide event emitter. It is a cheap-to-clone handle; components that
/// need to reach back to it hold a [`WeakApp`].
///
/// Work that must not run inline (ready-to-show notifications, delayed
/// unresponsive notifications) is queued and executed by [`App::tick`].
///
/// ```
/// # use std::rc::Rc;
/// # use offscreen_host::engine::app::App;
/// # use offscreen_host::engine::config::AppConfig;
/// # use offscreen_host::render::backends::null::NullBackend;
/// let backend = NullBackend::new().unwrap();
/// let app = App::new(AppConfig::default(), Rc::new(backend));
/// app.set_ready();
/// assert!(app.all_windows().is_empty());
/// ```
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

/// Non-owning reference to an [`App`].
#[derive(Clone)]
pub struct WeakApp {
    inner: Weak<AppInner>,
}

struct AppInner {
    config: AppConfig,
    backend: Rc<dyn RenderBackend>,
    events: EventEmitter<AppEvent>,
    windows: WindowRegistry,
    hosts: HostRegistry,
    /// Offscreen windows that have not been closed yet
    offscreen: RefCell<Vec<OffscreenWindow>>,
    menu: RefCell<Option<Menu>>,
    ready: Cell<bool>,
    suppress_unresponsive: Cell<bool>,
    tasks: RefCell<Vec<DeferredTask>>,
}

impl App {
    pub fn new(config: AppConfig, backend: Rc<dyn RenderBackend>) -> Self {
        log::debug!("app: using render backend {}", backend.name());

        let inner = Rc::new_cyclic(|weak| AppInner {
            config,
            backend,
            events: EventEmitter::new(),
            windows: WindowRegistry::new(),
            hosts: HostRegistry::new(WeakApp { inner: weak.clone() }),
            offscreen: RefCell::new(Vec::new()),
            menu: RefCell::new(None),
            ready: Cell::new(false),
            suppress_unresponsive: Cell::new(false),
            tasks: RefCell::new(Vec::new()),
        });

        Self { inner }
    }

    pub fn downgrade(&self) -> WeakApp {
        WeakApp {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> Rc<dyn RenderBackend> {
        self.inner.backend.clone()
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.inner.windows
    }

    pub fn hosts(&self) -> &HostRegistry {
        &self.inner.hosts
    }

    /// Marks the app ready and emits `ready`. Only the first call emits.
    pub fn set_ready(&self) {
        if self.inner.ready.replace(true) {
            return;
        }
        log::info!("app: ready");
        self.emit(&AppEvent::Ready);
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.get()
    }

    /// User-visible windows. The offscreen host and offscreen windows are never listed.
    pub fn all_windows(&self) -> Vec<BaseWindow> {
        self.inner.windows.all_windows()
    }

    pub fn focused_window(&self) -> Option<BaseWindow> {
        self.inner.windows.focused_window()
    }

    pub fn create_window(&self, options: WindowOptions) -> Result<TopLevelWindow, EngineError> {
        TopLevelWindow::new(self, &options)
    }

    /// Offscreen windows that have not been closed, in creation order.
    pub fn offscreen_windows(&self) -> Vec<OffscreenWindow> {
        self.inner.offscreen.borrow().clone()
    }

    pub fn offscreen_window(&self, id: WindowId) -> Option<OffscreenWindow> {
        self.inner.offscreen.borrow().iter().find(|w| w.id() == id).cloned()
    }

    pub(crate) fn track_offscreen(&self, window: OffscreenWindow) {
        self.inner.offscreen.borrow_mut().push(window);
    }

    pub(crate) fn untrack_offscreen(&self, id: WindowId) {
        self.inner.offscreen.borrow_mut().retain(|w| w.id() != id);
    }

    pub fn set_application_menu(&self, menu: Option<Menu>) {
        *self.inner.menu.borrow_mut() = menu;
    }

    pub fn application_menu(&self) -> Option<Menu> {
        self.inner.menu.borrow().clone()
    }

    /// While set, pending unresponsive notifications are dropped instead of emitted.
    pub fn set_unresponsive_suppressed(&self, suppressed: bool) {
        self.inner.suppress_unresponsive.set(suppressed);
    }

    pub fn is_unresponsive_suppressed(&self) -> bool {
        self.inner.suppress_unresponsive.get()
    }

    pub fn events(&self) -> &EventEmitter<AppEvent> {
        &self.inner.events
    }

    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&AppEvent) + 'static,
    {
        self.inner.events.on(name, listener)
    }

    pub fn once<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&AppEvent) + 'static,
    {
        self.inner.events.once(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    pub fn emit(&self, event: &AppEvent) -> usize {
        self.inner.events.emit(event)
    }

    /// Run `task` on the next tick.
    pub fn post_task(&self, task: impl FnOnce() + 'static) {
        self.post_delayed_task(Duration::ZERO, task);
    }

    /// Run `task` on the first tick after `delay` has passed. A delay too large
    /// to represent keeps the task pending for good.
    pub fn post_delayed_task(&self, delay: Duration, task: impl FnOnce() + 'static) {
        self.inner.tasks.borrow_mut().push(DeferredTask {
            due: Instant::now().checked_add(delay),
            task: Box::new(task),
        });
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Runs every deferred task whose deadline has passed, in posting order.
    /// Tasks posted while ticking run on a later tick.
    pub fn tick(&self) -> TickResult {
        let now = Instant::now();

        let due: Vec<DeferredTask> = {
            let mut tasks = self.inner.tasks.borrow_mut();
            let (due, pending): (Vec<_>, Vec<_>) = tasks.drain(..).partition(|t| t.due.is_some_and(|due| due <= now));
            *tasks = pending;
            due
        };

        let tasks_run = due.len();
        for deferred in due {
            (deferred.task)();
        }

        let tasks = self.inner.tasks.borrow();
        TickResult {
            tasks_run,
            pending_tasks: tasks.len(),
            next_tick_in: tasks
                .iter()
                .filter_map(|t| t.due)
                .map(|due| due.saturating_duration_since(now))
                .min(),
        }
    }
}

impl WeakApp {
    pub fn upgrade(&self) -> Option<App> {
        self.inner.upgrade().map(|inner| App { inner })
    }
}

impl Debug for App {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("backend", &self.inner.backend.name())
            .field("ready", &self.inner.ready.get())
            .field("windows", &self.inner.windows.len())
            .field("host_alive", &self.inner.hosts.is_alive())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

impl Debug for WeakApp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakApp")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
