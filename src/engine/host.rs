//! Offscreen host system: [`HostRegistry`], [`HostWindow`] and [`HostSurfaceView`].
//!
//! All offscreen surfaces of the app are attached to one hidden native window,
//! the host. The host exists only while at least one surface is attached to
//! it: it is built lazily by [`HostRegistry::instance`] and torn down as soon
//! as its last surface is removed. A later request builds a fresh host.
mod registry;
mod view;
mod window;

pub use registry::HostRegistry;
pub use view::HostSurfaceView;
pub use window::HostWindow;
