//! Event types emitted by contents, windows and the app.
//!
//! - [`ContentsEvent`]: emitted by a [`WebContents`](crate::engine::contents::WebContents),
//!   normally on behalf of the native binding.
//! - [`WindowEvent`]: emitted by windows (controllers, top-level windows, the host).
//! - [`AppEvent`]: process-wide events emitted on the [`App`](crate::engine::app::App).
//!
//! Each enum implements [`NamedEvent`]; the names are what listeners subscribe to.

use crate::engine::emitter::{EventToken, NamedEvent};
use crate::engine::offscreen::OffscreenWindow;
use std::fmt::{Display, Formatter};
use url::Url;

/// Input delivered to a contents' render widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseWheel,
    KeyDown,
    KeyUp,
    GestureScrollBegin,
    GestureScrollUpdate,
    GestureScrollEnd,
}

impl InputEventKind {
    /// Gesture scrolls are surfaced to the window as `scroll-touch-edge`.
    pub fn is_gesture_scroll(&self) -> bool {
        matches!(
            self,
            InputEventKind::GestureScrollBegin
                | InputEventKind::GestureScrollUpdate
                | InputEventKind::GestureScrollEnd
        )
    }
}

impl Display for InputEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub enum ContentsEvent {
    /// The page title changed. `explicit_set` is false when the title was synthesized from the URL.
    PageTitleUpdated {
        event: EventToken,
        title: String,
        explicit_set: bool,
    },
    /// A navigation to `url` has started
    DidStartNavigation { url: Url },
    /// First paint with visible content
    FirstVisuallyNonEmptyPaint,
    /// Renderer stopped answering
    RendererUnresponsive,
    /// Renderer is answering again
    RendererResponsive,
    /// Input reached the render widget
    InputEvent { kind: InputEventKind },
    /// The page asked to be closed (`window.close()`)
    CloseRequested,
}

impl NamedEvent for ContentsEvent {
    fn name(&self) -> &'static str {
        match self {
            ContentsEvent::PageTitleUpdated { .. } => "page-title-updated",
            ContentsEvent::DidStartNavigation { .. } => "did-start-navigation",
            ContentsEvent::FirstVisuallyNonEmptyPaint => "first-visually-non-empty-paint",
            ContentsEvent::RendererUnresponsive => "renderer-unresponsive",
            ContentsEvent::RendererResponsive => "renderer-responsive",
            ContentsEvent::InputEvent { .. } => "input-event",
            ContentsEvent::CloseRequested => "close-requested",
        }
    }
}

#[derive(Debug, Clone)]
pub enum WindowEvent {
    /// Window gained focus
    Focus { event: EventToken },
    /// Window lost focus
    Blur { event: EventToken },
    /// Window has been closed. Emitted exactly once.
    Closed,
    /// Title forwarded from the window's contents, unchanged
    PageTitleUpdated {
        event: EventToken,
        title: String,
        explicit_set: bool,
    },
    /// Contents painted something visible
    ReadyToShow,
    /// Renderer became responsive again
    Responsive,
    /// Renderer has been unresponsive for a while
    Unresponsive,
    /// A gesture scroll reached the window
    ScrollTouchEdge,
    /// Logical size changed
    Resize { width: u32, height: u32 },
}

impl NamedEvent for WindowEvent {
    fn name(&self) -> &'static str {
        match self {
            WindowEvent::Focus { .. } => "focus",
            WindowEvent::Blur { .. } => "blur",
            WindowEvent::Closed => "closed",
            WindowEvent::PageTitleUpdated { .. } => "page-title-updated",
            WindowEvent::ReadyToShow => "ready-to-show",
            WindowEvent::Responsive => "responsive",
            WindowEvent::Unresponsive => "unresponsive",
            WindowEvent::ScrollTouchEdge => "scroll-touch-edge",
            WindowEvent::Resize { .. } => "resize",
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The app has been marked ready; offscreen windows can be created from now on
    Ready,
    /// An offscreen window finished construction. Preventing default keeps it hidden.
    OffscreenWindowCreated {
        event: EventToken,
        window: OffscreenWindow,
    },
    /// An offscreen window lost focus
    OffscreenWindowBlur {
        event: EventToken,
        window: OffscreenWindow,
    },
    /// An offscreen window gained focus
    OffscreenWindowFocus {
        event: EventToken,
        window: OffscreenWindow,
    },
}

impl NamedEvent for AppEvent {
    fn name(&self) -> &'static str {
        match self {
            AppEvent::Ready => "ready",
            AppEvent::OffscreenWindowCreated { .. } => "offscreen-window-created",
            AppEvent::OffscreenWindowBlur { .. } => "offscreen-window-blur",
            AppEvent::OffscreenWindowFocus { .. } => "offscreen-window-focus",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_scroll_family() {
        assert!(InputEventKind::GestureScrollBegin.is_gesture_scroll());
        assert!(InputEventKind::GestureScrollUpdate.is_gesture_scroll());
        assert!(InputEventKind::GestureScrollEnd.is_gesture_scroll());
        assert!(!InputEventKind::MouseWheel.is_gesture_scroll());
        assert!(!InputEventKind::KeyDown.is_gesture_scroll());
    }

    #[test]
    fn contents_event_names() {
        let title = ContentsEvent::PageTitleUpdated {
            event: EventToken::new(),
            title: "Hello".into(),
            explicit_set: true,
        };
        let nav = ContentsEvent::DidStartNavigation {
            url: Url::parse("https://example.com/").unwrap(),
        };

        assert_eq!(title.name(), "page-title-updated");
        assert_eq!(nav.name(), "did-start-navigation");
        assert_eq!(ContentsEvent::CloseRequested.name(), "close-requested");
        assert_eq!(
            ContentsEvent::InputEvent { kind: InputEventKind::MouseDown }.name(),
            "input-event"
        );
    }

    #[test]
    fn window_event_names() {
        assert_eq!(WindowEvent::Focus { event: EventToken::new() }.name(), "focus");
        assert_eq!(WindowEvent::Blur { event: EventToken::new() }.name(), "blur");
        assert_eq!(WindowEvent::Closed.name(), "closed");
        assert_eq!(WindowEvent::ScrollTouchEdge.name(), "scroll-touch-edge");
        assert_eq!(WindowEvent::Resize { width: 1, height: 2 }.name(), "resize");
    }

    #[test]
    fn forwarded_title_event_shares_the_token() {
        let token = EventToken::new();
        let from_contents = ContentsEvent::PageTitleUpdated {
            event: token.clone(),
            title: "Docs".into(),
            explicit_set: false,
        };

        let forwarded = match &from_contents {
            ContentsEvent::PageTitleUpdated { event, title, explicit_set } => WindowEvent::PageTitleUpdated {
                event: event.clone(),
                title: title.clone(),
                explicit_set: *explicit_set,
            },
            _ => unreachable!(),
        };

        match forwarded {
            WindowEvent::PageTitleUpdated { event, title, explicit_set } => {
                assert!(event.same_as(&token));
                assert_eq!(title, "Docs");
                assert!(!explicit_set);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
