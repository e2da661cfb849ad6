use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::{EventData, EventType};
use crate::core::sync::{read, write};

pub type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Subscription handle returned by `on`/`once`, used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<P> {
    id: ListenerId,
    handler: Handler<P>,
    /// Set for `once` listeners; flips to true on the first invocation.
    fired: Option<Arc<AtomicBool>>,
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
            fired: self.fired.clone(),
        }
    }
}

/// Keyed publish/subscribe. Handlers run synchronously on the emitting thread
/// in registration order, outside the internal lock, so they may subscribe,
/// unsubscribe or emit re-entrantly.
pub struct EventEmitter<K = EventType, P = EventData> {
    listeners: RwLock<HashMap<K, Vec<Listener<P>>>>,
    next_id: AtomicU64,
}

impl<K: Eq + Hash + Clone, P> EventEmitter<K, P> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn on(&self, kind: K, handler: impl Fn(&P) + Send + Sync + 'static) -> ListenerId {
        self.subscribe(kind, Arc::new(handler), None)
    }

    /// Like `on`, but the handler runs at most once, even under concurrent emits.
    pub fn once(&self, kind: K, handler: impl Fn(&P) + Send + Sync + 'static) -> ListenerId {
        self.subscribe(kind, Arc::new(handler), Some(Arc::new(AtomicBool::new(false))))
    }

    fn subscribe(&self, kind: K, handler: Handler<P>, fired: Option<Arc<AtomicBool>>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        write(&self.listeners)
            .entry(kind)
            .or_default()
            .push(Listener { id, handler, fired });
        id
    }

    pub fn emit(&self, kind: &K, payload: &P) {
        let snapshot = match read(&self.listeners).get(kind) {
            Some(list) => list.clone(),
            None => return,
        };
        for listener in snapshot {
            if let Some(fired) = &listener.fired {
                if fired.swap(true, Ordering::AcqRel) {
                    continue;
                }
                self.remove_listener(kind, listener.id);
            }
            (listener.handler)(payload);
        }
    }

    /// Returns whether a listener was removed.
    pub fn remove_listener(&self, kind: &K, id: ListenerId) -> bool {
        let mut map = write(&self.listeners);
        let Some(list) = map.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            map.remove(kind);
        }
        removed
    }

    pub fn listener_count(&self, kind: &K) -> usize {
        read(&self.listeners).get(kind).map_or(0, Vec::len)
    }

    /// Drop every listener for `kind`.
    pub fn clear(&self, kind: &K) {
        write(&self.listeners).remove(kind);
    }
}

impl<K: Eq + Hash + Clone, P> Default for EventEmitter<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> fmt::Debug for EventEmitter<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds = read(&self.listeners).len();
        f.debug_struct("EventEmitter").field("kinds", &kinds).finish()
    }
}
