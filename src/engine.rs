//! Application side of offscreen rendering: the [`App`] context, windows,
//! render contents and the hidden host that aggregates offscreen surfaces.
pub mod app;
pub mod config;
pub mod contents;
pub mod emitter;
pub mod errors;
pub mod events;
pub mod host;
pub mod offscreen;
pub mod tick;
pub mod window;

pub use app::{App, WeakApp};
pub use config::{AppConfig, OffscreenWindowOptions, WindowOptions};
pub use contents::{ContentsId, WebContents};
pub use errors::EngineError;
pub use offscreen::OffscreenWindow;
pub use window::{WindowId, WindowKind};
