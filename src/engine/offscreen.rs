//! Offscreen windows: controllers for render surfaces that have no visible
//! window of their own.
//!
//! An [`OffscreenWindow`] attaches its contents' surface to the app's hidden
//! host (see [`crate::engine::host`]) and removes it again when closed. It
//! behaves like a window towards the app: it has focus and blur, a title and a
//! `closed` event, but it is never listed by
//! [`App::all_windows`](crate::engine::app::App::all_windows).
mod delegate;
mod window;

pub use window::{OffscreenWindow, WindowState};
