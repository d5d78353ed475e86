//! Publish/subscribe primitive shared by windows, contents and the app.
//!
//! Every component that emits events *has an* [`EventEmitter`] instead of
//! inheriting emitter behaviour. Listeners subscribe by event name (see
//! [`NamedEvent`]) and receive a reference to the emitted event.
//!
//! The emitter is single-threaded (`!Send`). Dispatch works on a snapshot of
//! the listener list, so a handler can subscribe, unsubscribe or emit again
//! while it is being called. One-shot listeners registered with
//! [`EventEmitter::once`] are detached *before* they are invoked, which makes
//! them fire at most once even when the handler re-emits the same event.

use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Events carry their own name, which listeners subscribe to.
pub trait NamedEvent {
    fn name(&self) -> &'static str;
}

/// Handle returned by a subscription, used to unsubscribe with [`EventEmitter::off`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

struct Listener<E> {
    id: ListenerId,
    name: &'static str,
    once: bool,
    callback: Callback<E>,
}

pub struct EventEmitter<E> {
    listeners: RefCell<Vec<Listener<E>>>,
    next_id: Cell<u64>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<E> Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.listeners.borrow().iter().map(|l| l.name).collect();
        f.debug_struct("EventEmitter").field("listeners", &names).finish()
    }
}

impl<E: NamedEvent> EventEmitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every future emission of `name`.
    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe(name, false, Rc::new(listener))
    }

    /// Subscribe to the next emission of `name` only. The listener detaches
    /// itself before it runs.
    pub fn once<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe(name, true, Rc::new(listener))
    }

    /// Remove a listener. Returns `false` when it was not (or no longer) subscribed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self, name: &'static str) -> usize {
        self.listeners.borrow().iter().filter(|l| l.name == name).count()
    }

    /// Dispatch `event` to its listeners in subscription order and return how
    /// many listeners were invoked.
    pub fn emit(&self, event: &E) -> usize {
        let name = event.name();

        let callbacks: Vec<Callback<E>> = {
            let mut listeners = self.listeners.borrow_mut();
            let matched = listeners
                .iter()
                .filter(|l| l.name == name)
                .map(|l| l.callback.clone())
                .collect();
            listeners.retain(|l| !(l.once && l.name == name));
            matched
        };

        for callback in &callbacks {
            callback(event);
        }

        callbacks.len()
    }

    fn subscribe(&self, name: &'static str, once: bool, callback: Callback<E>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        self.listeners.borrow_mut().push(Listener {
            id,
            name,
            once,
            callback,
        });
        id
    }
}

/// Inspectable event object handed to listeners alongside the payload.
///
/// Clones share state: a listener calling [`EventToken::prevent_default`]
/// is visible to the emitter that created the token.
#[derive(Clone, Debug, Default)]
pub struct EventToken {
    default_prevented: Rc<Cell<bool>>,
}

impl EventToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// True when both tokens originate from the same emission.
    pub fn same_as(&self, other: &EventToken) -> bool {
        Rc::ptr_eq(&self.default_prevented, &other.default_prevented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Ping(u32),
        Pong,
    }

    impl NamedEvent for Ping {
        fn name(&self) -> &'static str {
            match self {
                Ping::Ping(_) => "ping",
                Ping::Pong => "pong",
            }
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<Ping>>>, impl Fn(&Ping) + Clone) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |ev: &Ping| sink.borrow_mut().push(ev.clone()))
    }

    #[test]
    fn on_receives_every_emission_of_its_name() {
        let emitter = EventEmitter::new();
        let (seen, listener) = recorder();
        emitter.on("ping", listener);

        assert_eq!(emitter.emit(&Ping::Ping(1)), 1);
        assert_eq!(emitter.emit(&Ping::Pong), 0);
        assert_eq!(emitter.emit(&Ping::Ping(2)), 1);

        assert_eq!(*seen.borrow(), vec![Ping::Ping(1), Ping::Ping(2)]);
    }

    #[test]
    fn once_fires_at_most_once() {
        let emitter = EventEmitter::new();
        let (seen, listener) = recorder();
        emitter.once("ping", listener);
        assert_eq!(emitter.listener_count("ping"), 1);

        emitter.emit(&Ping::Ping(1));
        emitter.emit(&Ping::Ping(2));

        assert_eq!(*seen.borrow(), vec![Ping::Ping(1)]);
        assert_eq!(emitter.listener_count("ping"), 0);
    }

    #[test]
    fn once_is_detached_before_a_reentrant_emit() {
        let emitter = Rc::new(EventEmitter::new());
        let calls = Rc::new(Cell::new(0));

        let inner = emitter.clone();
        let counter = calls.clone();
        emitter.once("ping", move |ev: &Ping| {
            counter.set(counter.get() + 1);
            if let Ping::Ping(n) = ev {
                if *n < 3 {
                    inner.emit(&Ping::Ping(n + 1));
                }
            }
        });

        emitter.emit(&Ping::Ping(0));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn off_removes_only_the_given_listener() {
        let emitter = EventEmitter::new();
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();
        let id_a = emitter.on("ping", a);
        emitter.on("ping", b);

        assert!(emitter.off(id_a));
        assert!(!emitter.off(id_a));

        emitter.emit(&Ping::Ping(7));
        assert!(seen_a.borrow().is_empty());
        assert_eq!(*seen_b.borrow(), vec![Ping::Ping(7)]);
    }

    #[test]
    fn listener_added_during_dispatch_waits_for_next_emit() {
        let emitter = Rc::new(EventEmitter::new());
        let (seen, late) = recorder();

        let inner = emitter.clone();
        emitter.once("ping", move |_: &Ping| {
            inner.on("ping", late.clone());
        });

        emitter.emit(&Ping::Ping(1));
        assert!(seen.borrow().is_empty());

        emitter.emit(&Ping::Ping(2));
        assert_eq!(*seen.borrow(), vec![Ping::Ping(2)]);
    }

    #[test]
    fn event_token_clones_share_prevent_default() {
        let token = EventToken::new();
        let seen_by_listener = token.clone();
        assert!(!token.is_default_prevented());

        seen_by_listener.prevent_default();
        assert!(token.is_default_prevented());
        assert!(token.same_as(&seen_by_listener));
        assert!(!token.same_as(&EventToken::new()));
    }
}
