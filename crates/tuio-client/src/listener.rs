//! Listener and bundle source contracts

use std::cell::RefCell;
use std::rc::Rc;

use tuio_core::BundleStack;

/// Receives a callback after every successful load cycle of a source
pub trait Listener {
    /// `source` is the notifying client or adaptor; pull its stack from here
    fn notify(&mut self, source: &dyn BundleSource);
}

pub type ListenerRef = Rc<RefCell<dyn Listener>>;

/// Ordered set of listeners, compared by identity
#[derive(Default, Clone)]
pub struct ListenerSet {
    listeners: Vec<ListenerRef>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the listener is already present
    pub fn add(&mut self, listener: ListenerRef) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Returns false when the listener was not present
    pub fn remove(&mut self, listener: &ListenerRef) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &ListenerRef) -> bool {
        self.listeners.iter().any(|l| Rc::ptr_eq(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Call every listener in insertion order.
    ///
    /// Iterates a snapshot, so a listener may add or remove listeners on the
    /// source while being notified without affecting the current round.
    pub fn notify_all(&self, source: &dyn BundleSource) {
        let snapshot = self.listeners.clone();
        for listener in snapshot {
            listener.borrow_mut().notify(source);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Anything listeners can attach to: clients and adaptors
pub trait BundleSource {
    /// Bundles gathered in the last load cycle, oldest first.
    ///
    /// The returned stack holds handles aliasing the source's bundles.
    fn get_stack(&self) -> BundleStack;

    /// Discard the accumulated stack
    fn purge(&mut self);

    fn listeners(&self) -> &ListenerSet;

    fn listeners_mut(&mut self) -> &mut ListenerSet;

    /// Idempotent
    fn add_listener(&mut self, listener: ListenerRef) -> bool {
        self.listeners_mut().add(listener)
    }

    fn del_listener(&mut self, listener: &ListenerRef) -> bool {
        self.listeners_mut().remove(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    impl Listener for Counter {
        fn notify(&mut self, _source: &dyn BundleSource) {
            self.calls += 1;
        }
    }

    #[derive(Default)]
    struct Source {
        listeners: ListenerSet,
    }

    impl BundleSource for Source {
        fn get_stack(&self) -> BundleStack {
            BundleStack::new()
        }

        fn purge(&mut self) {}

        fn listeners(&self) -> &ListenerSet {
            &self.listeners
        }

        fn listeners_mut(&mut self) -> &mut ListenerSet {
            &mut self.listeners
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let listener: ListenerRef = counter.clone();
        let mut source = Source::default();

        assert!(source.add_listener(listener.clone()));
        assert!(!source.add_listener(listener.clone()));
        assert_eq!(source.listeners().len(), 1);

        source.listeners().notify_all(&source);
        assert_eq!(counter.borrow().calls, 1);

        assert!(source.del_listener(&listener));
        assert!(!source.del_listener(&listener));
        assert!(source.listeners().is_empty());
    }
}
