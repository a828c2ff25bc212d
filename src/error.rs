//! Contract faults: programming errors raised while driving computations.
//!
//! Contract faults never flow through handler matching. They are returned
//! through `Result` from every driving operation and propagate unchanged to
//! the outermost driver.

use std::fmt;

use thiserror::Error;

use crate::signal::Signal;

/// Driving operation that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Resume,
    Inject,
    Cancel,
}

/// Terminal state a computation was in when it was driven again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Completed,
    Cancelled,
    /// An injected fault escaped; the computation can only be cancelled.
    Escaped,
    /// A previous contract fault left the computation unusable.
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractFault {
    #[error("throw interrupts execution: {signal} cannot be resumed")]
    ThrowResumed { signal: Signal },

    #[error("{op} on a {state} computation")]
    Retired { op: Operation, state: Terminal },

    #[error("unhandled signal: {signal}")]
    UnhandledSignal { signal: Signal },
}

impl ContractFault {
    pub fn throw_resumed(signal: Signal) -> Self {
        ContractFault::ThrowResumed { signal }
    }

    pub fn retired(op: Operation, state: Terminal) -> Self {
        ContractFault::Retired { op, state }
    }

    pub fn unhandled_signal(signal: Signal) -> Self {
        ContractFault::UnhandledSignal { signal }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Resume => write!(f, "resume"),
            Operation::Inject => write!(f, "inject"),
            Operation::Cancel => write!(f, "cancel"),
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Completed => write!(f, "completed"),
            Terminal::Cancelled => write!(f, "cancelled"),
            Terminal::Escaped => write!(f, "escaped"),
            Terminal::Poisoned => write!(f, "poisoned"),
        }
    }
}
