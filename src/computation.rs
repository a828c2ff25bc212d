//! The computation interface every driver steps through.
//!
//! A computation is a single-threaded cooperative unit of work. Its driver
//! calls [`Computation::resume`] until it returns [`Step::Return`], may inject
//! a fault at a suspension point with [`Computation::inject`], or gives up on
//! it with [`Computation::cancel`]. Driving a computation after it returned or
//! was cancelled is a [`ContractFault`].

use crate::bind::Bind;
use crate::combinators::{AndThen, Map, Scoped};
use crate::error::{ContractFault, Operation, Terminal};
use crate::handler::Handler;
use crate::signal::Signal;
use crate::value::Value;

/// What a computation produced when it was last driven.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<R> {
    /// Suspended at a signal. Only a handler or the driver decides what
    /// happens next.
    Signal(Signal),
    /// Terminated with a value.
    Return(R),
}

impl<R> Step<R> {
    pub fn is_signal(&self) -> bool {
        matches!(self, Step::Signal(_))
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Step::Return(_))
    }

    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Step::Signal(signal) => Some(signal),
            Step::Return(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Step<U> {
        match self {
            Step::Signal(signal) => Step::Signal(signal),
            Step::Return(value) => Step::Return(f(value)),
        }
    }
}

pub trait Computation {
    type Output;

    /// Deliver `value` at the current suspension point and run to the next
    /// signal or to completion.
    fn resume(&mut self, value: Value) -> Result<Step<Self::Output>, ContractFault>;

    /// Raise `fault` at the current suspension point.
    fn inject(&mut self, fault: Signal) -> Result<Step<Self::Output>, ContractFault>;

    /// Release everything held across the current suspension point, innermost
    /// scope first.
    fn cancel(&mut self) -> Result<(), ContractFault>;
}

pub type BoxComputation<'a, R> = Box<dyn Computation<Output = R> + 'a>;

impl<C: Computation + ?Sized> Computation for Box<C> {
    type Output = C::Output;

    fn resume(&mut self, value: Value) -> Result<Step<Self::Output>, ContractFault> {
        (**self).resume(value)
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<Self::Output>, ContractFault> {
        (**self).inject(fault)
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        (**self).cancel()
    }
}

/// Combinators available on every computation.
pub trait ComputationExt: Computation + Sized {
    fn boxed<'a>(self) -> BoxComputation<'a, Self::Output>
    where
        Self: 'a,
    {
        Box::new(self)
    }

    /// Run `next` on this computation's return value.
    fn and_then<F, C2>(self, next: F) -> AndThen<Self, F, C2>
    where
        F: FnOnce(Self::Output) -> C2,
        C2: Computation,
    {
        AndThen::new(self, next)
    }

    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        F: FnOnce(Self::Output) -> U,
    {
        Map::new(self, f)
    }

    /// Run `release` exactly once when this computation is done with.
    fn scoped<F>(self, release: F) -> Scoped<Self, F>
    where
        F: FnOnce(),
    {
        Scoped::new(self, release)
    }

    /// Catch the first signal matching `handler` and continue with the
    /// handler's computation.
    fn bind<'a>(self, handler: Handler<'a, Self::Output>) -> Bind<'a, Self> {
        Bind::new(self, handler)
    }
}

impl<C: Computation> ComputationExt for C {}

/// Lifecycle of a computation that runs its body at most once.
///
/// A leaf that never suspends on its own can still be injected with a fault
/// before it starts. The fault escapes and the leaf becomes a dead end: it can
/// no longer be resumed but may still be cancelled.
#[derive(Debug)]
pub(crate) enum Leaf<T> {
    Pending(T),
    Escaped,
    Completed,
    Cancelled,
}

impl<T> Leaf<T> {
    pub(crate) fn new(body: T) -> Self {
        Leaf::Pending(body)
    }

    /// Take the body to run it. The leaf counts as completed afterwards.
    pub(crate) fn start(&mut self) -> Result<T, ContractFault> {
        match std::mem::replace(self, Leaf::Completed) {
            Leaf::Pending(body) => Ok(body),
            other => {
                let terminal = other.terminal();
                *self = other;
                Err(ContractFault::retired(Operation::Resume, terminal))
            }
        }
    }

    pub(crate) fn escape<R>(&mut self, fault: Signal) -> Result<Step<R>, ContractFault> {
        match self {
            Leaf::Pending(_) | Leaf::Escaped => {
                *self = Leaf::Escaped;
                Ok(Step::Signal(fault))
            }
            _ => Err(ContractFault::retired(Operation::Inject, self.terminal())),
        }
    }

    pub(crate) fn cancel(&mut self) -> Result<(), ContractFault> {
        match self {
            Leaf::Pending(_) | Leaf::Escaped => {
                *self = Leaf::Cancelled;
                Ok(())
            }
            _ => Err(ContractFault::retired(Operation::Cancel, self.terminal())),
        }
    }

    fn terminal(&self) -> Terminal {
        match self {
            Leaf::Escaped => Terminal::Escaped,
            Leaf::Cancelled => Terminal::Cancelled,
            Leaf::Pending(_) | Leaf::Completed => Terminal::Completed,
        }
    }
}
