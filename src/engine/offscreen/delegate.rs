// Pass-throughs to the window's contents. Results come back unchanged.

use crate::engine::offscreen::OffscreenWindow;
use crate::render::backend::{DevToolsMode, Rect, RgbaImage};
use std::path::Path;
use url::Url;

impl OffscreenWindow {
    pub fn load_url(&self, url: &Url) -> anyhow::Result<()> {
        self.inner.contents.load_url(url)
    }

    pub fn url(&self) -> Option<Url> {
        self.inner.contents.url()
    }

    pub fn load_file(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.contents.load_file(path)
    }

    pub fn reload(&self) {
        self.inner.contents.reload()
    }

    pub fn send(&self, channel: &str, args: &serde_json::Value) -> anyhow::Result<()> {
        self.inner.contents.send(channel, args)
    }

    pub fn open_dev_tools(&self, mode: DevToolsMode) {
        self.inner.contents.open_dev_tools(mode)
    }

    pub fn close_dev_tools(&self) {
        self.inner.contents.close_dev_tools()
    }

    pub fn is_dev_tools_opened(&self) -> bool {
        self.inner.contents.is_dev_tools_opened()
    }

    pub fn is_dev_tools_focused(&self) -> bool {
        self.inner.contents.is_dev_tools_focused()
    }

    pub fn toggle_dev_tools(&self) {
        self.inner.contents.toggle_dev_tools()
    }

    pub fn inspect_element(&self, x: i32, y: i32) {
        self.inner.contents.inspect_element(x, y)
    }

    pub fn inspect_shared_worker(&self) {
        self.inner.contents.inspect_shared_worker()
    }

    pub fn inspect_service_worker(&self) {
        self.inner.contents.inspect_service_worker()
    }

    pub fn show_definition_for_selection(&self) {
        self.inner.contents.show_definition_for_selection()
    }

    pub fn capture_page(&self, rect: Option<Rect>) -> anyhow::Result<RgbaImage> {
        self.inner.contents.capture_page(rect)
    }

    pub fn set_background_throttling(&self, allowed: bool) {
        self.inner.contents.set_background_throttling(allowed)
    }
}
