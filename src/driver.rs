//! Terminal drivers: run a composed computation to a final result.

use crate::computation::{Computation, Step};
use crate::error::ContractFault;
use crate::signal::Signal;
use crate::value::Value;

/// Whichever came first when a computation was driven once.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Signal(Signal),
    Value(R),
}

impl<R> Outcome<R> {
    pub fn is_signal(&self) -> bool {
        matches!(self, Outcome::Signal(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Outcome::Signal(signal) => Some(signal),
            Outcome::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<R> {
        match self {
            Outcome::Signal(_) => None,
            Outcome::Value(value) => Some(value),
        }
    }
}

/// Run a computation the caller asserts can no longer signal.
///
/// The computation is resumed exactly once. A signal at that point means a
/// handler is missing: the computation is cancelled so its scopes are released
/// and [`ContractFault::UnhandledSignal`] is returned.
pub fn unwrap<C: Computation>(mut computation: C) -> Result<C::Output, ContractFault> {
    match computation.resume(Value::Unit)? {
        Step::Return(value) => Ok(value),
        Step::Signal(signal) => {
            log::debug!(target: "rescue::driver", "unwrap observed unhandled {signal}");
            computation.cancel()?;
            Err(ContractFault::unhandled_signal(signal))
        }
    }
}

/// Run a computation once and report its first signal or its value.
pub fn try_eval<C: Computation>(mut computation: C) -> Result<Outcome<C::Output>, ContractFault> {
    match computation.resume(Value::Unit)? {
        Step::Return(value) => Ok(Outcome::Value(value)),
        Step::Signal(signal) => {
            computation.cancel()?;
            Ok(Outcome::Signal(signal))
        }
    }
}

/// Run a computation, answering its first signal with `handle`.
///
/// The computation is cancelled before `handle` runs, so anything it held is
/// already released when the handler observes the signal.
pub fn eval_with_handler<C, F>(mut computation: C, handle: F) -> Result<C::Output, ContractFault>
where
    C: Computation,
    F: FnOnce(Signal) -> C::Output,
{
    match computation.resume(Value::Unit)? {
        Step::Return(value) => Ok(value),
        Step::Signal(signal) => {
            computation.cancel()?;
            Ok(handle(signal))
        }
    }
}
