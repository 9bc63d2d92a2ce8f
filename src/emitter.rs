//! Named-event pub/sub with synchronous, registration-order dispatch
//! (spec §2 "Emitter", §5 "Event emitters perform synchronous dispatch...
//! handlers throwing an exception are caught so one bad listener cannot
//! break the pipeline").

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A type-erased event payload. Concrete payload types (`ScrollEvent`,
/// `RangeChangeEvent`, ...) live in [`crate::list`] and are downcast by
/// listeners via [`Any::downcast_ref`].
pub type Payload = Rc<dyn Any>;

/// A listener callback. Boxed so the emitter can hold a heterogeneous set
/// of listeners per event name.
pub type Listener = Rc<dyn Fn(&Payload)>;

/// Synchronous, lifecycle-scoped pub/sub keyed by event name.
#[derive(Default)]
pub struct Emitter {
    listeners: HashMap<String, Vec<Listener>>,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field(
                "events",
                &self.listeners.keys().cloned().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Emitter {
    /// Construct an emitter with no registered listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under `event`, appended after any existing
    /// listeners for that name.
    pub fn on(&mut self, event: impl Into<String>, listener: Listener) {
        self.listeners.entry(event.into()).or_default().push(listener);
    }

    /// Remove a previously registered listener by pointer identity.
    pub fn off(&mut self, event: &str, listener: &Listener) {
        if let Some(list) = self.listeners.get_mut(event) {
            list.retain(|l| !Rc::ptr_eq(l, listener));
        }
    }

    /// Dispatch `payload` to every listener registered for `event`, in
    /// registration order. A listener that panics is caught so later
    /// listeners still run; the panic is logged, not propagated.
    pub fn emit(&self, event: &str, payload: Payload) {
        let Some(list) = self.listeners.get(event) else {
            return;
        };
        for listener in list {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(&payload)));
            if result.is_err() {
                log::error!("listener for '{event}' panicked; continuing dispatch");
            }
        }
    }

    /// Whether any listener is registered for `event`.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listeners.get(event).is_some_and(|l| !l.is_empty())
    }

    /// Drop all listeners, e.g. during `destroy`.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn dispatch_is_synchronous_and_ordered() {
        let mut emitter = Emitter::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = order.clone();
        let b = order.clone();
        emitter.on("scroll", Rc::new(move |_: &Payload| a.borrow_mut().push(1)));
        emitter.on("scroll", Rc::new(move |_: &Payload| b.borrow_mut().push(2)));
        emitter.emit("scroll", Rc::new(()));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn off_removes_by_identity() {
        let mut emitter = Emitter::new();
        let hit = Rc::new(RefCell::new(false));
        let hit2 = hit.clone();
        let listener: Listener = Rc::new(move |_: &Payload| *hit2.borrow_mut() = true);
        emitter.on("x", listener.clone());
        emitter.off("x", &listener);
        emitter.emit("x", Rc::new(()));
        assert!(!*hit.borrow());
    }

    #[test]
    fn panicking_listener_does_not_stop_dispatch() {
        let mut emitter = Emitter::new();
        let hit = Rc::new(RefCell::new(false));
        let hit2 = hit.clone();
        emitter.on("x", Rc::new(|_: &Payload| panic!("boom")));
        emitter.on("x", Rc::new(move |_: &Payload| *hit2.borrow_mut() = true));
        emitter.emit("x", Rc::new(()));
        assert!(*hit.borrow());
    }
}
