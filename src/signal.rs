//! Signals and the kind hierarchy handlers match against.
//!
//! A [`SignalKind`] is a static tag with an optional parent. Kinds are
//! compared by address, so every kind must live in a `static`:
//!
//! ```
//! use rescue::signal::{SignalKind, EXCEPTION};
//!
//! static OUT_OF_STOCK: SignalKind = SignalKind::derived("OutOfStock", &EXCEPTION);
//!
//! assert!(OUT_OF_STOCK.is_subkind_of(&EXCEPTION));
//! ```

use std::fmt;
use std::ptr;

use crate::value::Value;

/// Runtime tag identifying the kind of a [`Signal`].
pub struct SignalKind {
    name: &'static str,
    parent: Option<&'static SignalKind>,
}

pub static EXCEPTION: SignalKind = SignalKind::root("Exception");
pub static VALUE_ERROR: SignalKind = SignalKind::derived("ValueError", &EXCEPTION);
pub static TYPE_ERROR: SignalKind = SignalKind::derived("TypeError", &EXCEPTION);
pub static RUNTIME_ERROR: SignalKind = SignalKind::derived("RuntimeError", &EXCEPTION);
pub static LOOKUP_ERROR: SignalKind = SignalKind::derived("LookupError", &EXCEPTION);
pub static KEY_ERROR: SignalKind = SignalKind::derived("KeyError", &LOOKUP_ERROR);
pub static ARITHMETIC_ERROR: SignalKind = SignalKind::derived("ArithmeticError", &EXCEPTION);
pub static ZERO_DIVISION_ERROR: SignalKind =
    SignalKind::derived("ZeroDivisionError", &ARITHMETIC_ERROR);

impl SignalKind {
    /// A kind with no parent.
    pub const fn root(name: &'static str) -> Self {
        SignalKind { name, parent: None }
    }

    /// A kind matched by handlers for `parent` and all of its ancestors.
    pub const fn derived(name: &'static str, parent: &'static SignalKind) -> Self {
        SignalKind {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static SignalKind> {
        self.parent
    }

    /// Reflexive: every kind is a subkind of itself.
    pub fn is_subkind_of(&self, other: &SignalKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if ptr::eq(kind, other) {
                return true;
            }
            current = kind.parent;
        }
        false
    }

    /// Iterate from this kind up to its root, starting with `self`.
    pub fn lineage(&self) -> impl Iterator<Item = &SignalKind> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }
}

impl PartialEq for SignalKind {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for SignalKind {}

impl fmt::Debug for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A raised domain condition, routed to handlers by its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    kind: &'static SignalKind,
    message: String,
    payload: Option<Value>,
}

impl Signal {
    pub fn new(kind: &'static SignalKind, message: impl Into<String>) -> Self {
        Signal {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Signal::new(&VALUE_ERROR, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Signal::new(&TYPE_ERROR, message)
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        Signal::new(&RUNTIME_ERROR, message)
    }

    /// Attach a value for handlers to inspect.
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn kind(&self) -> &'static SignalKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn is_a(&self, kind: &SignalKind) -> bool {
        self.kind.is_subkind_of(kind)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name, self.message)
    }
}
