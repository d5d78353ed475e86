//! Window system: [`BaseWindow`], [`WindowRegistry`], [`TopLevelWindow`] and [`WindowId`].
//!
mod base;
mod menu;
mod registry;
mod top_level;

pub use base::{BaseWindow, WindowId, WindowKind};
pub use menu::{Menu, MenuItem};
pub use registry::WindowRegistry;
pub use top_level::TopLevelWindow;
