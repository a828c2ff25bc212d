//! Observation helpers for recording handler side effects.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::handler::{wrap_into_exc_handler, Handler};
use crate::signal::{Signal, SignalKind};

/// Single-slot shared mutable box.
///
/// Clones share the same slot, so a handler can write into it while the test
/// or caller keeps a handle to read it afterwards.
pub struct Slot<T> {
    content: Rc<RefCell<Option<T>>>,
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Slot {
            content: Rc::new(RefCell::new(None)),
        }
    }

    pub fn with(value: T) -> Self {
        Slot {
            content: Rc::new(RefCell::new(Some(value))),
        }
    }

    pub fn set(&self, value: T) {
        *self.content.borrow_mut() = Some(value);
    }

    pub fn take(&self) -> Option<T> {
        self.content.borrow_mut().take()
    }

    pub fn is_empty(&self) -> bool {
        self.content.borrow().is_none()
    }

    /// Replace the stored value with `f(value)`. Does nothing when empty.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let mut content = self.content.borrow_mut();
        if let Some(value) = content.take() {
            *content = Some(f(value));
        }
    }

    /// Inspect the stored value without cloning it.
    pub fn inspect<U>(&self, f: impl FnOnce(Option<&T>) -> U) -> U {
        f(self.content.borrow().as_ref())
    }
}

impl<T: Clone> Slot<T> {
    pub fn get(&self) -> Option<T> {
        self.content.borrow().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot {
            content: Rc::clone(&self.content),
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&self.content.borrow()).finish()
    }
}

/// Total handler that stores the caught signal in `slot` and returns `default`.
pub fn box_exc<'a, R>(
    exc_type: &'static SignalKind,
    slot: &Slot<Signal>,
    default: R,
) -> Handler<'a, R>
where
    R: Clone + 'a,
{
    let slot = slot.clone();
    wrap_into_exc_handler(exc_type, move |signal: Signal| {
        slot.set(signal);
        default.clone()
    })
}
