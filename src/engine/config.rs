//! Configuration for the app, visible windows and offscreen windows.
//!
//! [`OffscreenWindowOptions`] comes with [`Default`] values and a fluent
//! builder that validates the result:
//!
//! ```
//! use offscreen_host::engine::config::OffscreenWindowOptions;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = OffscreenWindowOptions::builder()
//!     .size(1280, 720)
//!     .transparent(true)
//!     .background_color("#80ff0000")
//!     .build()?;
//! assert!(opts.effective_web_preferences().offscreen);
//! # Ok(()) }
//! ```
//!
//! The hidden host window is always created with [`WindowOptions::hidden_host`];
//! that configuration is fixed and cannot be overridden.

use crate::engine::contents::WebContents;
use crate::render::backend::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Largest width or height accepted for an offscreen surface.
pub const MAX_SURFACE_DIMENSION: u32 = 16384;

const DEFAULT_OFFSCREEN_WIDTH: u32 = 800;
const DEFAULT_OFFSCREEN_HEIGHT: u32 = 600;
const DEFAULT_UNRESPONSIVE_DELAY: Duration = Duration::from_millis(50);

/// Platform the app runs on. Only macOS has a native application menu.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// When false, the application menu has to be attached to every window.
    pub fn has_native_app_menu(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

/// App-wide settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Platform used for the menu shim
    pub platform: Platform,
    /// How long a renderer must stay unresponsive before `unresponsive` is emitted
    pub unresponsive_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            unresponsive_delay: DEFAULT_UNRESPONSIVE_DELAY,
        }
    }
}

/// Options for a native top-level window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub title: String,
    pub show: bool,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub fullscreenable: bool,
    pub fullscreen: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            show: true,
            width: DEFAULT_OFFSCREEN_WIDTH,
            height: DEFAULT_OFFSCREEN_HEIGHT,
            resizable: true,
            fullscreenable: true,
            fullscreen: false,
        }
    }
}

impl WindowOptions {
    /// The fixed configuration of the hidden host window. It must never be presented.
    pub fn hidden_host() -> Self {
        Self {
            title: String::new(),
            show: false,
            width: 0,
            height: 0,
            resizable: false,
            fullscreenable: false,
            fullscreen: false,
        }
    }
}

/// Preferences handed to the native layer when contents are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebPreferences {
    pub offscreen: bool,
    pub transparent: bool,
    pub background_color: Option<String>,
    /// Initial visibility, only set when painting while hidden is disabled
    pub show: Option<bool>,
    pub background_throttling: bool,
}

impl Default for WebPreferences {
    fn default() -> Self {
        Self {
            offscreen: false,
            transparent: false,
            background_color: None,
            show: None,
            background_throttling: true,
        }
    }
}

/// Options for [`OffscreenWindow::new`](crate::engine::offscreen::OffscreenWindow::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OffscreenWindowOptions {
    pub width: u32,
    pub height: u32,
    /// Become visible once created, unless an `offscreen-window-created` observer prevents it
    pub show: bool,
    pub transparent: bool,
    pub background_color: Option<String>,
    pub paint_when_initially_hidden: bool,
    pub web_preferences: WebPreferences,
    /// Adopt existing contents instead of creating new ones
    #[serde(skip)]
    pub contents: Option<WebContents>,
}

impl Default for OffscreenWindowOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_OFFSCREEN_WIDTH,
            height: DEFAULT_OFFSCREEN_HEIGHT,
            show: true,
            transparent: false,
            background_color: None,
            paint_when_initially_hidden: true,
            web_preferences: WebPreferences::default(),
            contents: None,
        }
    }
}

impl OffscreenWindowOptions {
    pub fn builder() -> OffscreenWindowOptionsBuilder {
        OffscreenWindowOptionsBuilder::default()
    }

    /// Parse options from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let opts: OffscreenWindowOptions =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        validate(&opts)?;
        Ok(opts)
    }

    /// Preferences passed to the native layer. `offscreen` is always forced on,
    /// and colour/transparency are copied over from the window options.
    pub fn effective_web_preferences(&self) -> WebPreferences {
        let mut prefs = self.web_preferences.clone();
        prefs.offscreen = true;

        if let Some(color) = &self.background_color {
            prefs.background_color = Some(color.clone());
        }
        if self.transparent {
            prefs.transparent = true;
        }
        if !self.paint_when_initially_hidden {
            prefs.show = Some(self.show);
        }

        prefs
    }
}

#[derive(Debug, Clone, Default)]
pub struct OffscreenWindowOptionsBuilder {
    inner: OffscreenWindowOptions,
}

impl OffscreenWindowOptionsBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut OffscreenWindowOptions)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn size(self, width: u32, height: u32) -> Self {
        self.map(|o| {
            o.width = width;
            o.height = height;
        })
    }
    pub fn show(self, show: bool) -> Self { self.map(|o| o.show = show) }
    pub fn transparent(self, on: bool) -> Self { self.map(|o| o.transparent = on) }
    pub fn background_color<S: Into<String>>(self, color: S) -> Self { self.map(|o| o.background_color = Some(color.into())) }
    pub fn paint_when_initially_hidden(self, on: bool) -> Self { self.map(|o| o.paint_when_initially_hidden = on) }
    pub fn web_preferences(self, prefs: WebPreferences) -> Self { self.map(|o| o.web_preferences = prefs) }
    pub fn contents(self, contents: WebContents) -> Self { self.map(|o| o.contents = Some(contents)) }

    /// Validate and build the final options.
    pub fn build(self) -> Result<OffscreenWindowOptions, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidDimension { width: u32, height: u32 },
    InvalidColor(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDimension { width, height } =>
                write!(f, "size {width}x{height} exceeds the maximum of {MAX_SURFACE_DIMENSION} per side"),
            ConfigError::InvalidColor(c) =>
                write!(f, "background color '{c}' is not a #RGB, #RRGGBB or #AARRGGBB value"),
            ConfigError::Parse(e) =>
                write!(f, "cannot parse options: {e}"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(o: &OffscreenWindowOptions) -> Result<(), ConfigError> {
    if o.width > MAX_SURFACE_DIMENSION || o.height > MAX_SURFACE_DIMENSION {
        return Err(ConfigError::InvalidDimension {
            width: o.width,
            height: o.height,
        });
    }
    if let Some(color) = &o.background_color {
        if Color::parse_hex(color).is_none() {
            return Err(ConfigError::InvalidColor(color.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_host_options_are_fixed() {
        let opts = WindowOptions::hidden_host();
        assert!(!opts.show);
        assert_eq!((opts.width, opts.height), (0, 0));
        assert!(!opts.resizable);
        assert!(!opts.fullscreenable);
        assert!(!opts.fullscreen);
    }

    #[test]
    fn offscreen_defaults() {
        let opts = OffscreenWindowOptions::default();
        assert_eq!((opts.width, opts.height), (800, 600));
        assert!(opts.show);
        assert!(opts.paint_when_initially_hidden);
        assert!(opts.contents.is_none());
    }

    #[test]
    fn effective_preferences_force_offscreen_and_copy_settings() {
        let opts = OffscreenWindowOptions::builder()
            .transparent(true)
            .background_color("#fff")
            .build()
            .unwrap();

        let prefs = opts.effective_web_preferences();
        assert!(prefs.offscreen);
        assert!(prefs.transparent);
        assert_eq!(prefs.background_color.as_deref(), Some("#fff"));
        assert_eq!(prefs.show, None);
    }

    #[test]
    fn show_copied_only_when_not_painting_while_hidden() {
        let opts = OffscreenWindowOptions::builder()
            .show(false)
            .paint_when_initially_hidden(false)
            .build()
            .unwrap();
        assert_eq!(opts.effective_web_preferences().show, Some(false));
    }

    #[test]
    fn builder_rejects_oversized_surface() {
        let err = OffscreenWindowOptions::builder()
            .size(MAX_SURFACE_DIMENSION + 1, 10)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDimension { width: MAX_SURFACE_DIMENSION + 1, height: 10 }
        );
    }

    #[test]
    fn builder_rejects_bad_color() {
        let err = OffscreenWindowOptions::builder()
            .background_color("red")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidColor("red".into()));
        assert!(err.to_string().contains("red"));
    }

    #[test]
    fn from_json_fills_defaults() {
        let opts = OffscreenWindowOptions::from_json(r#"{ "width": 320, "show": false }"#).unwrap();
        assert_eq!(opts.width, 320);
        assert_eq!(opts.height, 600);
        assert!(!opts.show);
        assert!(opts.web_preferences.background_throttling);
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = OffscreenWindowOptions::from_json("{ width: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn platform_menu_shim() {
        assert!(Platform::MacOs.has_native_app_menu());
        assert!(!Platform::Windows.has_native_app_menu());
        assert!(!Platform::Linux.has_native_app_menu());
    }
}
