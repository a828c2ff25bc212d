//! The suspend-once signal primitive.

use std::fmt;
use std::marker::PhantomData;

use crate::computation::{Computation, Step};
use crate::error::{ContractFault, Operation, Terminal};
use crate::signal::Signal;
use crate::value::Value;

/// Computation that raises one signal and never returns.
///
/// The first `resume` yields the signal. A signal is a dead end for its
/// emitter, so resuming again is [`ContractFault::ThrowResumed`]. `R` only
/// lets a `throw` stand where a computation returning `R` is expected.
pub struct Throw<R> {
    state: ThrowState,
    _output: PhantomData<fn() -> R>,
}

#[derive(Debug)]
enum ThrowState {
    Pending(Signal),
    Raised(Signal),
    Cancelled,
}

pub fn throw<R>(signal: Signal) -> Throw<R> {
    Throw {
        state: ThrowState::Pending(signal),
        _output: PhantomData,
    }
}

impl<R> Throw<R> {
    /// The signal this computation raises.
    pub fn signal(&self) -> Option<&Signal> {
        match &self.state {
            ThrowState::Pending(signal) | ThrowState::Raised(signal) => Some(signal),
            ThrowState::Cancelled => None,
        }
    }
}

impl<R> fmt::Debug for Throw<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throw").field("state", &self.state).finish()
    }
}

impl<R> Computation for Throw<R> {
    type Output = R;

    fn resume(&mut self, _value: Value) -> Result<Step<R>, ContractFault> {
        match std::mem::replace(&mut self.state, ThrowState::Cancelled) {
            ThrowState::Pending(signal) => {
                crate::trace_log!("throw raised {}", signal);
                self.state = ThrowState::Raised(signal.clone());
                Ok(Step::Signal(signal))
            }
            ThrowState::Raised(signal) => {
                self.state = ThrowState::Raised(signal.clone());
                Err(ContractFault::throw_resumed(signal))
            }
            ThrowState::Cancelled => Err(ContractFault::retired(
                Operation::Resume,
                Terminal::Cancelled,
            )),
        }
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<R>, ContractFault> {
        match std::mem::replace(&mut self.state, ThrowState::Cancelled) {
            ThrowState::Pending(signal) | ThrowState::Raised(signal) => {
                self.state = ThrowState::Raised(signal);
                Ok(Step::Signal(fault))
            }
            ThrowState::Cancelled => Err(ContractFault::retired(
                Operation::Inject,
                Terminal::Cancelled,
            )),
        }
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        match std::mem::replace(&mut self.state, ThrowState::Cancelled) {
            ThrowState::Pending(_) | ThrowState::Raised(_) => Ok(()),
            ThrowState::Cancelled => Err(ContractFault::retired(
                Operation::Cancel,
                Terminal::Cancelled,
            )),
        }
    }
}
