//! Render contents: the document side of an offscreen window.
//!
//! A [`WebContents`] wraps the native [`ContentsBackend`] and owns the event
//! emitter the binding layer reports through (see [`WebContents::dispatch`]).
//! Navigation, messaging and dev-tools calls are plain pass-throughs.

use crate::engine::app::App;
use crate::engine::config::WebPreferences;
use crate::engine::emitter::{EventEmitter, ListenerId, NamedEvent};
use crate::engine::errors::EngineError;
use crate::engine::events::ContentsEvent;
use crate::render::backend::{
    Color, ContentsBackend, DevToolsMode, NativeWindowId, Rect, RgbaImage, SurfaceHandle, SurfaceSize,
};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::rc::Rc;
use url::Url;
use uuid::Uuid;

/// A unique identifier for render contents, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentsId(Uuid);

impl ContentsId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentsId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ContentsId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub struct WebContents {
    inner: Rc<ContentsInner>,
}

struct ContentsInner {
    id: ContentsId,
    backend: Box<dyn ContentsBackend>,
    events: EventEmitter<ContentsEvent>,
    destroyed: Cell<bool>,
}

impl WebContents {
    /// Wraps native contents created by the binding layer.
    pub fn new(backend: Box<dyn ContentsBackend>) -> Self {
        Self {
            inner: Rc::new(ContentsInner {
                id: ContentsId::new(),
                backend,
                events: EventEmitter::new(),
                destroyed: Cell::new(false),
            }),
        }
    }

    /// Creates new native contents through the app's backend.
    pub fn create(app: &App, prefs: &WebPreferences) -> Result<Self, EngineError> {
        let backend = app.backend().create_contents(prefs)?;
        let contents = Self::new(backend);
        log::debug!("contents {}: created on surface {:?}", contents.id(), contents.surface());
        Ok(contents)
    }

    pub fn id(&self) -> ContentsId {
        self.inner.id
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.inner.backend.surface()
    }

    pub fn events(&self) -> &EventEmitter<ContentsEvent> {
        &self.inner.events
    }

    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&ContentsEvent) + 'static,
    {
        self.inner.events.on(name, listener)
    }

    pub fn once<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&ContentsEvent) + 'static,
    {
        self.inner.events.once(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// Entry point for the binding layer: report `event` to every listener.
    /// Events reported after destruction are dropped.
    pub fn dispatch(&self, event: &ContentsEvent) -> usize {
        if self.is_destroyed() {
            log::trace!("contents {}: dropping {} after destroy", self.id(), event.name());
            return 0;
        }
        self.inner.events.emit(event)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Releases the native contents. Only the first call has an effect.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        log::debug!("contents {}: destroyed", self.id());
        self.inner.backend.destroy();
    }

    pub fn same_as(&self, other: &WebContents) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn load_url(&self, url: &Url) -> anyhow::Result<()> {
        self.inner.backend.load_url(url)
    }

    pub fn url(&self) -> Option<Url> {
        self.inner.backend.url()
    }

    pub fn load_file(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.backend.load_file(path)
    }

    pub fn reload(&self) {
        self.inner.backend.reload()
    }

    pub fn send(&self, channel: &str, args: &serde_json::Value) -> anyhow::Result<()> {
        self.inner.backend.send(channel, args)
    }

    pub fn open_dev_tools(&self, mode: DevToolsMode) {
        self.inner.backend.open_dev_tools(mode)
    }

    pub fn close_dev_tools(&self) {
        self.inner.backend.close_dev_tools()
    }

    pub fn is_dev_tools_opened(&self) -> bool {
        self.inner.backend.is_dev_tools_opened()
    }

    pub fn is_dev_tools_focused(&self) -> bool {
        self.inner.backend.is_dev_tools_focused()
    }

    pub fn toggle_dev_tools(&self) {
        self.inner.backend.toggle_dev_tools()
    }

    pub fn inspect_element(&self, x: i32, y: i32) {
        self.inner.backend.inspect_element(x, y)
    }

    pub fn inspect_shared_worker(&self) {
        self.inner.backend.inspect_shared_worker()
    }

    pub fn inspect_service_worker(&self) {
        self.inner.backend.inspect_service_worker()
    }

    pub fn show_definition_for_selection(&self) {
        self.inner.backend.show_definition_for_selection()
    }

    pub fn dev_tools_surface(&self) -> Option<SurfaceHandle> {
        self.inner.backend.dev_tools_surface()
    }

    pub fn capture_page(&self, rect: Option<Rect>) -> anyhow::Result<RgbaImage> {
        self.inner.backend.capture_page(rect)
    }

    pub fn set_background_throttling(&self, allowed: bool) {
        self.inner.backend.set_background_throttling(allowed)
    }

    pub(crate) fn focus(&self) {
        self.inner.backend.focus()
    }

    pub(crate) fn blur(&self) {
        self.inner.backend.blur()
    }

    pub(crate) fn set_owner_window(&self, owner: Option<NativeWindowId>) {
        self.inner.backend.set_owner_window(owner)
    }

    pub(crate) fn set_visible(&self, visible: bool) {
        self.inner.backend.set_visible(visible)
    }

    pub(crate) fn set_size(&self, size: SurfaceSize) {
        self.inner.backend.set_size(size)
    }

    pub(crate) fn set_background_color(&self, color: Color) {
        self.inner.backend.set_background_color(color)
    }
}

impl Debug for WebContents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebContents")
            .field("id", &self.inner.id)
            .field("surface", &self.surface())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

/// View wrapper under which contents are attached to the host window.
#[derive(Debug, Clone)]
pub struct ContentsView {
    contents: WebContents,
}

impl ContentsView {
    pub fn new(contents: WebContents) -> Self {
        Self { contents }
    }

    pub fn id(&self) -> ContentsId {
        self.contents.id()
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.contents.surface()
    }

    pub fn contents(&self) -> &WebContents {
        &self.contents
    }
}
