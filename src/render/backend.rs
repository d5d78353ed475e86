use crate::engine::config::{WebPreferences, WindowOptions};
use crate::engine::window::Menu;
use std::path::Path;
use url::Url;

/// Native top-level window as known by the binding layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeWindowId(pub u64);

/// Opaque handle to an off-screen render surface. Pixels stay with the binding layer;
/// the host only tracks where a surface is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(pub u64);

/// Size of a surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Region of a surface, used to capture only part of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    PreMulArgb32,
}

/// ARGB colour as accepted by `set_background_color`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parses `#RGB`, `#RRGGBB` and `#AARRGGBB`. The leading `#` is optional.
    pub fn parse_hex(s: &str) -> Option<Color> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

        match hex.len() {
            3 => Some(Color { a: 0xff, r: nibble(0)?, g: nibble(1)?, b: nibble(2)? }),
            6 => Some(Color { a: 0xff, r: byte(0)?, g: byte(2)?, b: byte(4)? }),
            8 => Some(Color { a: byte(0)?, r: byte(2)?, g: byte(4)?, b: byte(6)? }),
            _ => None,
        }
    }
}

/// Where a dev-tools frontend is docked when opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DevToolsMode {
    #[default]
    Right,
    Bottom,
    Undocked,
    Detach,
}

/// Captured page pixels.
#[derive(Clone)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl RgbaImage {
    pub fn from_raw(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            pixels.len() >= (height as usize) * (stride as usize),
            "pixel buffer too small for image dimensions"
        );

        Ok(Self {
            pixels,
            width,
            height,
            stride,
            format,
        })
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Native side of one render content. Every call happens on the UI thread.
///
/// The navigation and dev-tools methods are plain pass-throughs from
/// [`WebContents`](crate::engine::contents::WebContents); the host layer keeps no state for them.
pub trait ContentsBackend {
    /// Surface this content renders into.
    fn surface(&self) -> SurfaceHandle;

    fn load_url(&self, url: &Url) -> anyhow::Result<()>;
    fn url(&self) -> Option<Url>;
    fn load_file(&self, path: &Path) -> anyhow::Result<()>;
    fn reload(&self);
    /// Send a message to the renderer on `channel`.
    fn send(&self, channel: &str, args: &serde_json::Value) -> anyhow::Result<()>;

    fn open_dev_tools(&self, mode: DevToolsMode);
    fn close_dev_tools(&self);
    fn is_dev_tools_opened(&self) -> bool;
    fn is_dev_tools_focused(&self) -> bool;
    fn toggle_dev_tools(&self);
    fn inspect_element(&self, x: i32, y: i32);
    fn inspect_shared_worker(&self);
    fn inspect_service_worker(&self);
    fn show_definition_for_selection(&self);
    /// Surface of the attached dev-tools frontend, if open.
    fn dev_tools_surface(&self) -> Option<SurfaceHandle>;

    /// Capture the whole page, or only `rect` when given.
    fn capture_page(&self, rect: Option<Rect>) -> anyhow::Result<RgbaImage>;
    fn set_background_throttling(&self, allowed: bool);

    fn focus(&self);
    fn blur(&self);
    fn set_owner_window(&self, owner: Option<NativeWindowId>);
    fn set_visible(&self, visible: bool);
    fn set_size(&self, size: SurfaceSize);
    fn set_background_color(&self, color: Color);

    /// Release the native content. No other call follows.
    fn destroy(&self);
}

/// Native binding layer. Calls occur on the UI thread.
pub trait RenderBackend {
    fn name(&self) -> &str;

    /// Create a new off-screen content with its render surface.
    fn create_contents(&self, prefs: &WebPreferences) -> anyhow::Result<Box<dyn ContentsBackend>>;

    /// Create a native top-level window.
    fn create_window(&self, options: &WindowOptions) -> anyhow::Result<NativeWindowId>;

    fn close_window(&self, window: NativeWindowId);

    /// Attach a render surface to a window's container view.
    fn attach_surface(&self, window: NativeWindowId, surface: SurfaceHandle) -> anyhow::Result<()>;

    fn detach_surface(&self, window: NativeWindowId, surface: SurfaceHandle);

    fn set_menu(&self, window: NativeWindowId, menu: &Menu);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_and_long_hex() {
        assert_eq!(Color::parse_hex("#fff"), Some(Color { a: 255, r: 255, g: 255, b: 255 }));
        assert_eq!(Color::parse_hex("#102030"), Some(Color { a: 255, r: 0x10, g: 0x20, b: 0x30 }));
        assert_eq!(Color::parse_hex("80ff0000"), Some(Color { a: 0x80, r: 0xff, g: 0, b: 0 }));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Color::parse_hex(""), None);
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("#gggggg"), None);
        assert_eq!(Color::parse_hex("#ééé"), None);
    }

    #[test]
    fn rgba_image_checks_buffer_size() {
        assert!(RgbaImage::from_raw(vec![0; 16], 2, 2, 8, PixelFormat::Rgba8).is_ok());
        assert!(RgbaImage::from_raw(vec![0; 15], 2, 2, 8, PixelFormat::Rgba8).is_err());
    }
}
