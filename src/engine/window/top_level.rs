use crate::engine::app::{App, WeakApp};
use crate::engine::config::WindowOptions;
use crate::engine::emitter::{EventToken, ListenerId};
use crate::engine::errors::EngineError;
use crate::engine::events::WindowEvent;
use crate::engine::window::{BaseWindow, WindowId, WindowKind};

/// A regular, user-visible native window.
#[derive(Debug, Clone)]
pub struct TopLevelWindow {
    base: BaseWindow,
    app: WeakApp,
}

impl TopLevelWindow {
    pub(crate) fn new(app: &App, options: &WindowOptions) -> Result<Self, EngineError> {
        let native = app.backend().create_window(options)?;

        let base = BaseWindow::new(WindowKind::TopLevel, Some(native));
        base.set_title(options.title.clone());
        base.init(app);
        app.windows().register(base.clone());

        log::debug!("window {}: created top-level window {:?}", base.id(), native);
        Ok(Self {
            base,
            app: app.downgrade(),
        })
    }

    pub fn id(&self) -> WindowId {
        self.base.id()
    }

    pub fn base(&self) -> &BaseWindow {
        &self.base
    }

    pub fn focus(&self) {
        if self.base.is_closed() {
            return;
        }
        self.base.set_focused(true);
        self.base.events().emit(&WindowEvent::Focus { event: EventToken::new() });
    }

    pub fn blur(&self) {
        if self.base.is_closed() {
            return;
        }
        self.base.set_focused(false);
        self.base.events().emit(&WindowEvent::Blur { event: EventToken::new() });
    }

    pub fn is_focused(&self) -> bool {
        self.base.is_focused()
    }

    /// Closes the window. Closing twice is a no-op.
    pub fn close(&self) {
        if !self.base.mark_closed() {
            return;
        }

        if let Some(app) = self.app.upgrade() {
            if let Some(native) = self.base.native() {
                app.backend().close_window(native);
            }
            app.windows().unregister(self.base.id());
        }
        self.base.events().emit(&WindowEvent::Closed);
    }

    pub fn is_closed(&self) -> bool {
        self.base.is_closed()
    }

    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&WindowEvent) + 'static,
    {
        self.base.on(name, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AppConfig;
    use crate::render::backends::null::NullBackend;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn top_level_windows_are_enumerated_until_closed() {
        let backend = NullBackend::new().unwrap();
        let app = App::new(AppConfig::default(), Rc::new(backend.clone()));

        let window = app
            .create_window(WindowOptions {
                title: "Main".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(app.all_windows().len(), 1);
        assert_eq!(window.base().title(), "Main");

        window.focus();
        assert!(app.focused_window().unwrap().same_as(window.base()));

        let closed = Rc::new(Cell::new(0));
        let counter = closed.clone();
        window.on("closed", move |_| counter.set(counter.get() + 1));

        window.close();
        window.close();
        assert_eq!(closed.get(), 1);
        assert!(app.all_windows().is_empty());
        assert!(backend.open_windows().is_empty());
    }
}
