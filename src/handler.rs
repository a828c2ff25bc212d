//! Handler types for signal handling.

use std::fmt;
use std::rc::Rc;

use crate::combinators::lazy;
use crate::computation::{BoxComputation, Computation, ComputationExt};
use crate::signal::{Signal, SignalKind};

/// Whether a handler's computation may raise further signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// The produced computation never suspends.
    Total,
    /// The produced computation may raise signals of its own, which the next
    /// bind layer outward gets to handle.
    Effectful,
}

pub type HandlerFn<'a, R> = dyn Fn(Signal) -> BoxComputation<'a, R> + 'a;

/// A signal kind paired with a factory for the computation to run on a match.
///
/// Handlers are immutable and cheap to clone; the same handler may be bound
/// into several computations.
pub struct Handler<'a, R> {
    exc_type: &'static SignalKind,
    kind: HandlerKind,
    handler: Rc<HandlerFn<'a, R>>,
}

impl<'a, R> Handler<'a, R> {
    pub fn new<F>(exc_type: &'static SignalKind, kind: HandlerKind, handler: F) -> Self
    where
        F: Fn(Signal) -> BoxComputation<'a, R> + 'a,
    {
        Handler {
            exc_type,
            kind,
            handler: Rc::new(handler),
        }
    }

    pub fn exc_type(&self) -> &'static SignalKind {
        self.exc_type
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Structural match: the signal's kind is `exc_type` or one of its subkinds.
    pub fn matches(&self, signal: &Signal) -> bool {
        signal.is_a(self.exc_type)
    }

    /// Build the handler computation for `signal`.
    pub fn invoke(&self, signal: Signal) -> BoxComputation<'a, R> {
        (self.handler)(signal)
    }
}

impl<'a, R> Clone for Handler<'a, R> {
    fn clone(&self) -> Self {
        Handler {
            exc_type: self.exc_type,
            kind: self.kind,
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<'a, R> fmt::Debug for Handler<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("exc_type", &self.exc_type)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Effectful handler: `handler` returns a computation that may raise.
pub fn exc_handler<'a, R, F, C>(exc_type: &'static SignalKind, handler: F) -> Handler<'a, R>
where
    F: Fn(Signal) -> C + 'a,
    C: Computation<Output = R> + 'a,
{
    Handler::new(exc_type, HandlerKind::Effectful, move |signal| {
        handler(signal).boxed()
    })
}

/// Lift a plain function into a handler function whose computation never
/// suspends.
pub fn wrap<'a, R, F>(f: F) -> impl Fn(Signal) -> BoxComputation<'a, R> + 'a
where
    R: 'a,
    F: Fn(Signal) -> R + 'a,
{
    let f = Rc::new(f);
    move |signal| {
        let f = Rc::clone(&f);
        lazy(move || f(signal)).boxed()
    }
}

/// Total handler built from a value-returning function.
pub fn wrap_into_exc_handler<'a, R, F>(exc_type: &'static SignalKind, f: F) -> Handler<'a, R>
where
    R: 'a,
    F: Fn(Signal) -> R + 'a,
{
    Handler::new(exc_type, HandlerKind::Total, wrap(f))
}
