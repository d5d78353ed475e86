use crate::engine::config::{WebPreferences, WindowOptions};
use crate::engine::window::Menu;
use crate::render::backend::{
    Color, ContentsBackend, DevToolsMode, NativeWindowId, PixelFormat, Rect, RenderBackend, RgbaImage,
    SurfaceHandle, SurfaceSize,
};
use anyhow::{anyhow, bail, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use url::Url;

/// Null backend that renders nothing but records every call.
///
/// Clones share the same state, so a test can keep one clone for inspection
/// while the [`App`](crate::engine::app::App) owns another. Failures of the
/// next attach/window/contents creation can be injected to exercise error paths.
#[derive(Clone, Default)]
pub struct NullBackend {
    state: Rc<RefCell<NullState>>,
}

#[derive(Default)]
struct NullState {
    next_id: u64,
    windows: BTreeMap<NativeWindowId, NullWindow>,
    contents: BTreeMap<SurfaceHandle, NullContentsState>,
    fail_next_attach: bool,
    fail_next_window: bool,
    fail_next_contents: bool,
}

impl NullState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Recorded state of a native window.
#[derive(Debug, Clone)]
pub struct NullWindow {
    pub options: WindowOptions,
    /// Attached surfaces, in attach order
    pub attached: Vec<SurfaceHandle>,
    pub menu: Option<Menu>,
    pub closed: bool,
}

/// Recorded state of a native content.
#[derive(Debug, Clone, Default)]
pub struct NullContentsState {
    pub prefs: WebPreferences,
    pub url: Option<Url>,
    pub reloads: u32,
    pub sent: Vec<(String, serde_json::Value)>,
    pub focus_calls: u32,
    pub blur_calls: u32,
    pub owner: Option<NativeWindowId>,
    pub visible: bool,
    pub size: Option<SurfaceSize>,
    pub background: Option<Color>,
    pub background_throttling: bool,
    pub dev_tools: Option<SurfaceHandle>,
    pub dev_tools_mode: Option<DevToolsMode>,
    pub inspected_elements: Vec<(i32, i32)>,
    pub worker_inspections: u32,
    pub definition_lookups: u32,
    pub destroyed: bool,
}

impl NullBackend {
    /// Creates a new instance of the null backend.
    pub fn new() -> Result<Self> {
        Ok(Self::default())
    }

    /// Make the next `attach_surface` call fail.
    pub fn fail_next_attach(&self) {
        self.state.borrow_mut().fail_next_attach = true;
    }

    /// Make the next `create_window` call fail.
    pub fn fail_next_window(&self) {
        self.state.borrow_mut().fail_next_window = true;
    }

    /// Make the next `create_contents` call fail.
    pub fn fail_next_contents(&self) {
        self.state.borrow_mut().fail_next_contents = true;
    }

    pub fn window(&self, id: NativeWindowId) -> Option<NullWindow> {
        self.state.borrow().windows.get(&id).cloned()
    }

    /// Native windows that have been created and not closed yet.
    pub fn open_windows(&self) -> Vec<NativeWindowId> {
        self.state
            .borrow()
            .windows
            .iter()
            .filter(|(_, w)| !w.closed)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn contents(&self, surface: SurfaceHandle) -> Option<NullContentsState> {
        self.state.borrow().contents.get(&surface).cloned()
    }

    pub fn attached_to(&self, window: NativeWindowId) -> Vec<SurfaceHandle> {
        self.window(window).map(|w| w.attached).unwrap_or_default()
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &str {
        "NullBackend"
    }

    fn create_contents(&self, prefs: &WebPreferences) -> Result<Box<dyn ContentsBackend>> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next_contents) {
            bail!("NullBackend: injected contents failure");
        }

        let surface = SurfaceHandle(state.next_id());
        state.contents.insert(
            surface,
            NullContentsState {
                prefs: prefs.clone(),
                background_throttling: prefs.background_throttling,
                ..Default::default()
            },
        );

        Ok(Box::new(NullContents {
            surface,
            state: self.state.clone(),
        }))
    }

    fn create_window(&self, options: &WindowOptions) -> Result<NativeWindowId> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next_window) {
            bail!("NullBackend: injected window failure");
        }

        let id = NativeWindowId(state.next_id());
        state.windows.insert(
            id,
            NullWindow {
                options: options.clone(),
                attached: Vec::new(),
                menu: None,
                closed: false,
            },
        );
        Ok(id)
    }

    fn close_window(&self, window: NativeWindowId) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.closed = true;
        }
    }

    fn attach_surface(&self, window: NativeWindowId, surface: SurfaceHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next_attach) {
            bail!("NullBackend: injected attach failure");
        }

        let w = state
            .windows
            .get_mut(&window)
            .ok_or_else(|| anyhow!("NullBackend: unknown window {:?}", window))?;
        if w.closed {
            bail!("NullBackend: window {:?} is closed", window);
        }
        w.attached.push(surface);
        Ok(())
    }

    fn detach_surface(&self, window: NativeWindowId, surface: SurfaceHandle) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.attached.retain(|s| *s != surface);
        }
    }

    fn set_menu(&self, window: NativeWindowId, menu: &Menu) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.menu = Some(menu.clone());
        }
    }
}

pub struct NullContents {
    surface: SurfaceHandle,
    state: Rc<RefCell<NullState>>,
}

impl NullContents {
    fn with<R>(&self, f: impl FnOnce(&mut NullContentsState) -> R) -> R {
        let mut state = self.state.borrow_mut();
        f(state.contents.entry(self.surface).or_default())
    }
}

impl ContentsBackend for NullContents {
    fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    fn load_url(&self, url: &Url) -> Result<()> {
        self.with(|c| c.url = Some(url.clone()));
        Ok(())
    }

    fn url(&self) -> Option<Url> {
        self.with(|c| c.url.clone())
    }

    fn load_file(&self, path: &Path) -> Result<()> {
        let url = Url::from_file_path(path)
            .map_err(|_| anyhow!("NullBackend: not an absolute path: {}", path.display()))?;
        self.load_url(&url)
    }

    fn reload(&self) {
        self.with(|c| c.reloads += 1);
    }

    fn send(&self, channel: &str, args: &serde_json::Value) -> Result<()> {
        self.with(|c| {
            if c.destroyed {
                bail!("NullBackend: send on destroyed contents");
            }
            c.sent.push((channel.to_string(), args.clone()));
            Ok(())
        })
    }

    fn open_dev_tools(&self, mode: DevToolsMode) {
        let mut state = self.state.borrow_mut();
        let devtools = SurfaceHandle(state.next_id());
        let c = state.contents.entry(self.surface).or_default();
        if c.dev_tools.is_none() {
            c.dev_tools = Some(devtools);
        }
        c.dev_tools_mode = Some(mode);
    }

    fn close_dev_tools(&self) {
        self.with(|c| {
            c.dev_tools = None;
            c.dev_tools_mode = None;
        });
    }

    fn is_dev_tools_opened(&self) -> bool {
        self.with(|c| c.dev_tools.is_some())
    }

    fn is_dev_tools_focused(&self) -> bool {
        self.with(|c| c.dev_tools.is_some() && c.dev_tools_mode == Some(DevToolsMode::Detach))
    }

    fn toggle_dev_tools(&self) {
        if self.is_dev_tools_opened() {
            self.close_dev_tools();
        } else {
            self.open_dev_tools(DevToolsMode::default());
        }
    }

    fn inspect_element(&self, x: i32, y: i32) {
        self.with(|c| c.inspected_elements.push((x, y)));
    }

    fn inspect_shared_worker(&self) {
        self.with(|c| c.worker_inspections += 1);
    }

    fn inspect_service_worker(&self) {
        self.with(|c| c.worker_inspections += 1);
    }

    fn show_definition_for_selection(&self) {
        self.with(|c| c.definition_lookups += 1);
    }

    fn dev_tools_surface(&self) -> Option<SurfaceHandle> {
        self.with(|c| c.dev_tools)
    }

    fn capture_page(&self, rect: Option<Rect>) -> Result<RgbaImage> {
        let size = self.with(|c| c.size).unwrap_or(SurfaceSize { width: 0, height: 0 });
        let (width, height) = match rect {
            Some(r) => (r.width.min(size.width), r.height.min(size.height)),
            None => (size.width, size.height),
        };

        let stride = width * 4;
        let pixels = vec![0u8; (stride * height) as usize];
        RgbaImage::from_raw(pixels, width, height, stride, PixelFormat::Rgba8)
    }

    fn set_background_throttling(&self, allowed: bool) {
        self.with(|c| c.background_throttling = allowed);
    }

    fn focus(&self) {
        self.with(|c| c.focus_calls += 1);
    }

    fn blur(&self) {
        self.with(|c| c.blur_calls += 1);
    }

    fn set_owner_window(&self, owner: Option<NativeWindowId>) {
        self.with(|c| c.owner = owner);
    }

    fn set_visible(&self, visible: bool) {
        self.with(|c| c.visible = visible);
    }

    fn set_size(&self, size: SurfaceSize) {
        self.with(|c| c.size = Some(size));
    }

    fn set_background_color(&self, color: Color) {
        self.with(|c| c.background = Some(color));
    }

    fn destroy(&self) {
        self.with(|c| {
            c.destroyed = true;
            c.visible = false;
        });
    }
}
