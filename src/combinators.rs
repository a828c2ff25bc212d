//! Building blocks for writing computations without native coroutines.

use std::fmt;
use std::mem;

use crate::computation::{Computation, Leaf, Step};
use crate::error::{ContractFault, Operation, Terminal};
use crate::signal::Signal;
use crate::value::Value;

/// Computation that returns a value on its first resume.
#[derive(Debug)]
pub struct Done<R> {
    leaf: Leaf<R>,
}

pub fn done<R>(value: R) -> Done<R> {
    Done {
        leaf: Leaf::new(value),
    }
}

impl<R> Computation for Done<R> {
    type Output = R;

    fn resume(&mut self, _value: Value) -> Result<Step<R>, ContractFault> {
        self.leaf.start().map(Step::Return)
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<R>, ContractFault> {
        self.leaf.escape(fault)
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        self.leaf.cancel()
    }
}

/// Computation that runs a function on its first resume and returns its
/// result. It never suspends.
pub struct Lazy<F> {
    leaf: Leaf<F>,
}

pub fn lazy<F, R>(f: F) -> Lazy<F>
where
    F: FnOnce() -> R,
{
    Lazy { leaf: Leaf::new(f) }
}

impl<F> fmt::Debug for Lazy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = matches!(self.leaf, Leaf::Pending(_));
        f.debug_struct("Lazy").field("pending", &pending).finish()
    }
}

impl<F, R> Computation for Lazy<F>
where
    F: FnOnce() -> R,
{
    type Output = R;

    fn resume(&mut self, _value: Value) -> Result<Step<R>, ContractFault> {
        let f = self.leaf.start()?;
        Ok(Step::Return(f()))
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<R>, ContractFault> {
        self.leaf.escape(fault)
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        self.leaf.cancel()
    }
}

/// Sequencing: run `first`, then the computation built from its result.
///
/// Signals, resumption values, injected faults and cancellation all go to
/// whichever half is currently running.
pub struct AndThen<C, F, C2> {
    state: AndThenState<C, F, C2>,
}

enum AndThenState<C, F, C2> {
    First { first: C, next: F },
    Second(C2),
    Completed,
    Cancelled,
    Poisoned,
}

impl<C, F, C2> AndThen<C, F, C2>
where
    C: Computation,
    F: FnOnce(C::Output) -> C2,
    C2: Computation,
{
    pub fn new(first: C, next: F) -> Self {
        AndThen {
            state: AndThenState::First { first, next },
        }
    }

    fn after_first(
        &mut self,
        step: Result<Step<C::Output>, ContractFault>,
    ) -> Result<Step<C2::Output>, ContractFault> {
        match step {
            Err(fault) => {
                self.state = AndThenState::Poisoned;
                Err(fault)
            }
            Ok(Step::Signal(signal)) => Ok(Step::Signal(signal)),
            Ok(Step::Return(value)) => {
                match mem::replace(&mut self.state, AndThenState::Poisoned) {
                    AndThenState::First { next, .. } => {
                        let mut second = next(value);
                        let step = second.resume(Value::Unit);
                        self.state = AndThenState::Second(second);
                        self.after_second(step)
                    }
                    _ => Err(ContractFault::retired(
                        Operation::Resume,
                        Terminal::Poisoned,
                    )),
                }
            }
        }
    }

    fn after_second(
        &mut self,
        step: Result<Step<C2::Output>, ContractFault>,
    ) -> Result<Step<C2::Output>, ContractFault> {
        match step {
            Err(fault) => {
                self.state = AndThenState::Poisoned;
                Err(fault)
            }
            Ok(Step::Return(value)) => {
                self.state = AndThenState::Completed;
                Ok(Step::Return(value))
            }
            Ok(signal) => Ok(signal),
        }
    }

    fn retired(&self, op: Operation) -> ContractFault {
        let state = match self.state {
            AndThenState::Cancelled => Terminal::Cancelled,
            AndThenState::Poisoned => Terminal::Poisoned,
            _ => Terminal::Completed,
        };
        ContractFault::retired(op, state)
    }
}

impl<C, F, C2> Computation for AndThen<C, F, C2>
where
    C: Computation,
    F: FnOnce(C::Output) -> C2,
    C2: Computation,
{
    type Output = C2::Output;

    fn resume(&mut self, value: Value) -> Result<Step<C2::Output>, ContractFault> {
        match &mut self.state {
            AndThenState::First { first, .. } => {
                let step = first.resume(value);
                self.after_first(step)
            }
            AndThenState::Second(second) => {
                let step = second.resume(value);
                self.after_second(step)
            }
            _ => Err(self.retired(Operation::Resume)),
        }
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<C2::Output>, ContractFault> {
        match &mut self.state {
            AndThenState::First { first, .. } => {
                let step = first.inject(fault);
                self.after_first(step)
            }
            AndThenState::Second(second) => {
                let step = second.inject(fault);
                self.after_second(step)
            }
            _ => Err(self.retired(Operation::Inject)),
        }
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        let result = match &mut self.state {
            AndThenState::First { first, .. } => first.cancel(),
            AndThenState::Second(second) => second.cancel(),
            _ => return Err(self.retired(Operation::Cancel)),
        };
        self.state = if result.is_ok() {
            AndThenState::Cancelled
        } else {
            AndThenState::Poisoned
        };
        result
    }
}

/// Apply a function to a computation's return value.
pub struct Map<C, F> {
    inner: C,
    f: Option<F>,
}

impl<C, F> Map<C, F> {
    pub fn new(inner: C, f: F) -> Self {
        Map { inner, f: Some(f) }
    }

    fn finish<R, U>(&mut self, step: Step<R>) -> Result<Step<U>, ContractFault>
    where
        F: FnOnce(R) -> U,
    {
        match step {
            Step::Signal(signal) => Ok(Step::Signal(signal)),
            Step::Return(value) => {
                let f = self
                    .f
                    .take()
                    .ok_or_else(|| ContractFault::retired(Operation::Resume, Terminal::Completed))?;
                Ok(Step::Return(f(value)))
            }
        }
    }
}

impl<C, F, U> Computation for Map<C, F>
where
    C: Computation,
    F: FnOnce(C::Output) -> U,
{
    type Output = U;

    fn resume(&mut self, value: Value) -> Result<Step<U>, ContractFault> {
        let step = self.inner.resume(value)?;
        self.finish(step)
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<U>, ContractFault> {
        let step = self.inner.inject(fault)?;
        self.finish(step)
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        self.inner.cancel()
    }
}

/// A resource scope around a computation.
///
/// `release` runs exactly once: when the body returns, when the scope is
/// cancelled (after the body has been cancelled), or when the scope is
/// dropped while still holding the resource (after the body has been
/// dropped). Nested scopes therefore release in reverse acquisition order.
pub struct Scoped<C, F>
where
    F: FnOnce(),
{
    // Field order matters: `body` must drop before `guard` releases.
    body: C,
    guard: ReleaseGuard<F>,
}

/// Runs the release function at most once, at the latest on drop.
struct ReleaseGuard<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> ReleaseGuard<F> {
    fn is_held(&self) -> bool {
        self.0.is_some()
    }

    fn release(&mut self) {
        if let Some(release) = self.0.take() {
            crate::trace_log!("scope released");
            release();
        }
    }
}

impl<F: FnOnce()> Drop for ReleaseGuard<F> {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn scoped<C, F>(body: C, release: F) -> Scoped<C, F>
where
    C: Computation,
    F: FnOnce(),
{
    Scoped::new(body, release)
}

impl<C, F> Scoped<C, F>
where
    F: FnOnce(),
{
    pub fn new(body: C, release: F) -> Self {
        Scoped {
            body,
            guard: ReleaseGuard(Some(release)),
        }
    }

    /// Whether the resource is still held.
    pub fn is_held(&self) -> bool {
        self.guard.is_held()
    }

    fn observe<R>(&mut self, step: Step<R>) -> Step<R> {
        if step.is_return() {
            self.guard.release();
        }
        step
    }
}

impl<C, F> Computation for Scoped<C, F>
where
    C: Computation,
    F: FnOnce(),
{
    type Output = C::Output;

    fn resume(&mut self, value: Value) -> Result<Step<C::Output>, ContractFault> {
        let step = self.body.resume(value)?;
        Ok(self.observe(step))
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<C::Output>, ContractFault> {
        let step = self.body.inject(fault)?;
        Ok(self.observe(step))
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        let result = self.body.cancel();
        self.guard.release();
        result
    }
}
