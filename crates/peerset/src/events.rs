//! Membership change notifications.
//!
//! Listeners register per event kind and are called synchronously, in
//! registration order, from inside the registry call that caused the change.

use std::collections::HashMap;

/// A membership change.
#[derive(Debug, PartialEq, Eq)]
pub enum PeerEvent<'a, P> {
    /// A record was stored under a new key.
    Add(&'a P),
    /// A record replaced an existing one under the same key.
    Update(&'a P),
    /// A key was removed, or removal was attempted for it.
    /// Fires even when nothing was stored under the key.
    Remove(&'a str),
}

impl<P> PeerEvent<'_, P> {
    pub fn kind(&self) -> EventKind {
        match self {
            PeerEvent::Add(_) => EventKind::Add,
            PeerEvent::Update(_) => EventKind::Update,
            PeerEvent::Remove(_) => EventKind::Remove,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Update,
    Remove,
}

/// Handle returned by `on`/`once`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<P> = Box<dyn FnMut(&PeerEvent<'_, P>)>;

struct Listener<P> {
    id: ListenerId,
    once: bool,
    callback: Callback<P>,
}

/// Per-kind listener lists.
pub(crate) struct EventEmitter<P> {
    listeners: HashMap<EventKind, Vec<Listener<P>>>,
    next_id: u64,
}

impl<P> EventEmitter<P> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn subscribe(
        &mut self,
        kind: EventKind,
        once: bool,
        callback: Callback<P>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push(Listener { id, once, callback });
        id
    }

    /// Returns false if the id was not registered (or a `once` listener already fired).
    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(pos) = listeners.iter().position(|l| l.id == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    pub(crate) fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map(Vec::len).unwrap_or(0)
    }

    pub(crate) fn emit(&mut self, event: &PeerEvent<'_, P>) {
        let Some(listeners) = self.listeners.get_mut(&event.kind()) else {
            return;
        };
        for listener in listeners.iter_mut() {
            (listener.callback)(event);
        }
        listeners.retain(|l| !l.once);
    }
}
