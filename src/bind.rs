//! Bind: composing a computation with a handler.
//!
//! [`bind`] drives an outer computation and, on the first signal matching the
//! handler's kind, cancels the outer computation and substitutes the handler's
//! computation. Everything else passes through unchanged:
//!
//! - **DrivingOuter** (initial): signals from the outer computation are
//!   matched. The first match cancels the outer computation (its scopes are
//!   released before the handler runs), invokes the handler and immediately
//!   resumes its computation with [`Value::Unit`].
//! - **Substituted**: the handler computation is active. Its signals are never
//!   matched by this layer, even when they have the intercepted kind; they go
//!   to the next layer outward.
//! - **Done** / **Cancelled** / **Poisoned**: terminal. Driving again is a
//!   [`ContractFault`].
//!
//! Resumption values and injected faults are forwarded to whichever
//! sub-computation is active; a signal produced by an injected fault is
//! matched like any other. Stacking layers behaves like nested catch clauses
//! ordered innermost first:
//!
//! ```
//! use rescue::{bind, throw, unwrap, wrap_into_exc_handler, Signal};
//! use rescue::signal::{TYPE_ERROR, VALUE_ERROR};
//!
//! let c = throw::<i64>(Signal::value_error("odd"));
//! let c = bind(c, wrap_into_exc_handler(&TYPE_ERROR, |_| 1));
//! let c = bind(c, wrap_into_exc_handler(&VALUE_ERROR, |_| 2));
//! assert_eq!(unwrap(c).unwrap(), 2);
//! ```

use std::fmt;
use std::mem;

use crate::computation::{BoxComputation, Computation, Step};
use crate::error::{ContractFault, Operation, Terminal};
use crate::handler::Handler;
use crate::ids::LayerId;
use crate::signal::{Signal, SignalKind};
use crate::trace::{DispatchTrace, TraceEvent};
use crate::trace_log;
use crate::value::Value;

/// Compose `outer` with `handler`. See the [module docs](self).
pub fn bind<'a, C>(outer: C, handler: Handler<'a, C::Output>) -> Bind<'a, C>
where
    C: Computation,
{
    Bind::new(outer, handler)
}

pub struct Bind<'a, C: Computation> {
    layer: LayerId,
    exc_type: &'static SignalKind,
    state: BindState<'a, C>,
    trace: Option<DispatchTrace>,
}

enum BindState<'a, C: Computation> {
    DrivingOuter {
        outer: C,
        handler: Handler<'a, C::Output>,
    },
    Substituted(BoxComputation<'a, C::Output>),
    Done,
    Cancelled,
    Poisoned,
}

impl<'a, C: Computation> BindState<'a, C> {
    fn name(&self) -> &'static str {
        match self {
            BindState::DrivingOuter { .. } => "driving_outer",
            BindState::Substituted(_) => "substituted",
            BindState::Done => "done",
            BindState::Cancelled => "cancelled",
            BindState::Poisoned => "poisoned",
        }
    }

    fn terminal(&self) -> Terminal {
        match self {
            BindState::Cancelled => Terminal::Cancelled,
            BindState::Poisoned => Terminal::Poisoned,
            _ => Terminal::Completed,
        }
    }
}

impl<'a, C: Computation> Bind<'a, C> {
    pub fn new(outer: C, handler: Handler<'a, C::Output>) -> Self {
        let layer = LayerId::fresh();
        log::debug!(
            target: "rescue::bind",
            "{layer} created for {}",
            handler.exc_type()
        );
        Bind {
            layer,
            exc_type: handler.exc_type(),
            state: BindState::DrivingOuter { outer, handler },
            trace: None,
        }
    }

    /// Record this layer's decisions into `trace`.
    pub fn traced(mut self, trace: DispatchTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Kind this layer intercepts.
    pub fn exc_type(&self) -> &'static SignalKind {
        self.exc_type
    }

    /// Whether the handler computation has replaced the outer computation.
    pub fn is_substituted(&self) -> bool {
        matches!(self.state, BindState::Substituted(_))
    }

    fn record(&self, event: TraceEvent) {
        if let Some(trace) = &self.trace {
            trace.record(event);
        }
    }

    fn retired(&self, op: Operation) -> ContractFault {
        ContractFault::retired(op, self.state.terminal())
    }

    /// Apply the matching rule to whatever the active sub-computation produced.
    fn advance(
        &mut self,
        step: Result<Step<C::Output>, ContractFault>,
    ) -> Result<Step<C::Output>, ContractFault> {
        let step = match step {
            Ok(step) => step,
            Err(fault) => {
                log::debug!(target: "rescue::bind", "{} poisoned: {fault}", self.layer);
                self.state = BindState::Poisoned;
                return Err(fault);
            }
        };

        match step {
            Step::Return(value) => {
                trace_log!("{} completed from {}", self.layer, self.state.name());
                self.state = BindState::Done;
                self.record(TraceEvent::Completed { layer: self.layer });
                Ok(Step::Return(value))
            }
            Step::Signal(signal) => match mem::replace(&mut self.state, BindState::Poisoned) {
                BindState::DrivingOuter { outer, handler } if handler.matches(&signal) => {
                    self.substitute(outer, handler, signal)
                }
                state => {
                    self.state = state;
                    trace_log!("{} passed {} through", self.layer, signal);
                    self.record(TraceEvent::PassedThrough {
                        layer: self.layer,
                        signal_kind: signal.kind().name(),
                    });
                    Ok(Step::Signal(signal))
                }
            },
        }
    }

    fn substitute(
        &mut self,
        mut outer: C,
        handler: Handler<'a, C::Output>,
        signal: Signal,
    ) -> Result<Step<C::Output>, ContractFault> {
        log::debug!(target: "rescue::bind", "{} intercepted {signal}", self.layer);
        // Outer scopes must be released before the handler observes anything.
        outer.cancel()?;
        drop(outer);

        self.record(TraceEvent::Intercepted {
            layer: self.layer,
            signal_kind: signal.kind().name(),
            message: signal.message().to_string(),
        });

        let mut active = handler.invoke(signal);
        let step = active.resume(Value::Unit);
        self.state = BindState::Substituted(active);
        self.advance(step)
    }
}

impl<'a, C: Computation> Computation for Bind<'a, C> {
    type Output = C::Output;

    fn resume(&mut self, value: Value) -> Result<Step<C::Output>, ContractFault> {
        trace_log!("{} resume({}) in {}", self.layer, value, self.state.name());
        let step = match &mut self.state {
            BindState::DrivingOuter { outer, .. } => outer.resume(value),
            BindState::Substituted(active) => active.resume(value),
            _ => return Err(self.retired(Operation::Resume)),
        };
        self.advance(step)
    }

    fn inject(&mut self, fault: Signal) -> Result<Step<C::Output>, ContractFault> {
        log::debug!(
            target: "rescue::bind",
            "{} inject {fault} in {}",
            self.layer,
            self.state.name()
        );
        let step = match &mut self.state {
            BindState::DrivingOuter { outer, .. } => outer.inject(fault),
            BindState::Substituted(active) => active.inject(fault),
            _ => return Err(self.retired(Operation::Inject)),
        };
        self.advance(step)
    }

    fn cancel(&mut self) -> Result<(), ContractFault> {
        let result = match &mut self.state {
            BindState::DrivingOuter { outer, .. } => outer.cancel(),
            BindState::Substituted(active) => active.cancel(),
            _ => return Err(self.retired(Operation::Cancel)),
        };
        log::debug!(
            target: "rescue::bind",
            "{} cancelled in {}",
            self.layer,
            self.state.name()
        );
        match result {
            Ok(()) => {
                self.state = BindState::Cancelled;
                self.record(TraceEvent::Cancelled { layer: self.layer });
                Ok(())
            }
            Err(fault) => {
                self.state = BindState::Poisoned;
                Err(fault)
            }
        }
    }
}

impl<'a, C: Computation> fmt::Debug for Bind<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bind")
            .field("layer", &self.layer)
            .field("exc_type", &self.exc_type)
            .field("state", &self.state.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{done, scoped};
    use crate::computation::ComputationExt;
    use crate::handler::{exc_handler, wrap_into_exc_handler};
    use crate::signal::{EXCEPTION, RUNTIME_ERROR, TYPE_ERROR, VALUE_ERROR};
    use crate::throw::throw;
    use crate::util::Slot;

    /// Suspends at `signal`, then returns whatever it is resumed with.
    struct Ask {
        signal: Option<Signal>,
        finished: bool,
    }

    fn ask(signal: Signal) -> Ask {
        Ask {
            signal: Some(signal),
            finished: false,
        }
    }

    impl Computation for Ask {
        type Output = Value;

        fn resume(&mut self, value: Value) -> Result<Step<Value>, ContractFault> {
            if self.finished {
                return Err(ContractFault::retired(Operation::Resume, Terminal::Completed));
            }
            match self.signal.take() {
                Some(signal) => Ok(Step::Signal(signal)),
                None => {
                    self.finished = true;
                    Ok(Step::Return(value))
                }
            }
        }

        fn inject(&mut self, fault: Signal) -> Result<Step<Value>, ContractFault> {
            self.signal = None;
            Ok(Step::Signal(fault))
        }

        fn cancel(&mut self) -> Result<(), ContractFault> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_bind_without_signal_is_transparent() {
        let invoked = Slot::new();
        let flag = invoked.clone();
        let mut c = bind(
            done(4i64),
            wrap_into_exc_handler(&VALUE_ERROR, move |_| {
                flag.set(true);
                0
            }),
        );
        assert_eq!(c.resume(Value::Unit).unwrap(), Step::Return(4));
        assert!(invoked.is_empty());
        assert!(!c.is_substituted());
    }

    #[test]
    fn test_matching_signal_substitutes_handler() {
        let mut c = bind(
            throw::<i64>(Signal::value_error("odd")),
            wrap_into_exc_handler(&VALUE_ERROR, |_| 0),
        );
        assert_eq!(c.resume(Value::Unit).unwrap(), Step::Return(0));
        assert_eq!(
            c.resume(Value::Unit).unwrap_err(),
            ContractFault::retired(Operation::Resume, Terminal::Completed)
        );
    }

    #[test]
    fn test_unmatched_signal_passes_through() {
        let mut c = bind(
            throw::<i64>(Signal::type_error("not a number")),
            wrap_into_exc_handler(&VALUE_ERROR, |_| 0),
        );
        let step = c.resume(Value::Unit).unwrap();
        assert_eq!(step.signal().map(|s| s.kind()), Some(&TYPE_ERROR));
        assert!(!c.is_substituted());
    }

    #[test]
    fn test_subkind_signal_is_intercepted() {
        let mut c = bind(
            throw::<i64>(Signal::runtime_error("boom")),
            wrap_into_exc_handler(&EXCEPTION, |_| 9),
        );
        assert_eq!(c.resume(Value::Unit).unwrap(), Step::Return(9));
    }

    #[test]
    fn test_resumption_value_forwarded_verbatim() {
        let mut c = bind(
            ask(Signal::new(&RUNTIME_ERROR, "need input")),
            wrap_into_exc_handler(&VALUE_ERROR, |_| Value::Unit),
        );
        assert!(c.resume(Value::Unit).unwrap().is_signal());
        assert_eq!(
            c.resume(Value::from("answer")).unwrap(),
            Step::Return(Value::from("answer"))
        );
    }

    #[test]
    fn test_resumption_value_reaches_handler_computation() {
        let mut c = bind(
            throw::<Value>(Signal::value_error("odd")),
            exc_handler(&VALUE_ERROR, |_| ask(Signal::runtime_error("handler asks"))),
        );
        let step = c.resume(Value::Unit).unwrap();
        assert_eq!(step.signal().map(Signal::message), Some("handler asks"));
        assert!(c.is_substituted());
        assert_eq!(c.resume(Value::Int(3)).unwrap(), Step::Return(Value::Int(3)));
    }

    #[test]
    fn test_handler_signal_of_same_kind_not_recaught() {
        let calls = Slot::with(0);
        let counter = calls.clone();
        let mut c = bind(
            throw::<i64>(Signal::value_error("first")),
            exc_handler(&VALUE_ERROR, move |_| {
                counter.update(|n| n + 1);
                throw::<i64>(Signal::value_error("second"))
            }),
        );
        let step = c.resume(Value::Unit).unwrap();
        assert_eq!(step.signal().map(Signal::message), Some("second"));
        assert_eq!(calls.get(), Some(1));
    }

    #[test]
    fn test_injected_fault_can_trigger_substitution() {
        let mut c = bind(
            ask(Signal::runtime_error("suspended")),
            wrap_into_exc_handler(&VALUE_ERROR, |signal: Signal| {
                Value::from(signal.message())
            }),
        );
        assert!(c.resume(Value::Unit).unwrap().is_signal());
        let step = c.inject(Signal::value_error("injected")).unwrap();
        assert_eq!(step, Step::Return(Value::from("injected")));
    }

    #[test]
    fn test_unmatched_injected_fault_passes_through_before_substitution() {
        let released = Slot::new();
        let flag = released.clone();
        let mut c = bind(
            ask(Signal::runtime_error("suspended")).scoped(move || flag.set(true)),
            wrap_into_exc_handler(&VALUE_ERROR, |_| Value::Unit),
        );
        assert!(c.resume(Value::Unit).unwrap().is_signal());

        let fault = Signal::type_error("not for this layer");
        let step = c.inject(fault.clone()).unwrap();
        assert_eq!(step, Step::Signal(fault));
        assert!(!c.is_substituted());
        assert!(released.is_empty());

        c.cancel().unwrap();
        assert_eq!(released.get(), Some(true));
    }

    #[test]
    fn test_layer_still_intercepts_after_unmatched_injection() {
        let mut c = bind(
            ask(Signal::runtime_error("suspended")),
            wrap_into_exc_handler(&VALUE_ERROR, |signal: Signal| {
                Value::from(signal.message())
            }),
        );
        c.resume(Value::Unit).unwrap();
        assert!(c.inject(Signal::type_error("passes")).unwrap().is_signal());
        assert_eq!(
            c.inject(Signal::value_error("caught")).unwrap(),
            Step::Return(Value::from("caught"))
        );
    }

    #[test]
    fn test_injected_fault_after_substitution_goes_to_handler_computation() {
        let mut c = bind(
            throw::<Value>(Signal::value_error("odd")),
            exc_handler(&VALUE_ERROR, |_| ask(Signal::runtime_error("handler asks"))),
        );
        c.resume(Value::Unit).unwrap();
        let step = c.inject(Signal::value_error("late")).unwrap();
        assert_eq!(step.signal().map(Signal::message), Some("late"));
    }

    #[test]
    fn test_outer_released_before_handler_runs() {
        let log = Slot::with(Vec::new());
        let release_log = log.clone();
        let handler_log = log.clone();
        let outer = scoped(throw::<i64>(Signal::value_error("odd")), move || {
            release_log.update(|mut v| {
                v.push("release");
                v
            })
        });
        let c = bind(
            outer,
            wrap_into_exc_handler(&VALUE_ERROR, move |_| {
                handler_log.update(|mut v| {
                    v.push("handler");
                    v
                });
                0i64
            }),
        );
        assert_eq!(crate::driver::unwrap(c).unwrap(), 0);
        assert_eq!(log.get(), Some(vec!["release", "handler"]));
    }

    #[test]
    fn test_cancel_reaches_active_computation() {
        let released = Slot::new();
        let flag = released.clone();
        let mut c = bind(
            throw::<i64>(Signal::type_error("t")).scoped(move || flag.set(true)),
            wrap_into_exc_handler(&VALUE_ERROR, |_| 0),
        );
        assert!(c.resume(Value::Unit).unwrap().is_signal());
        c.cancel().unwrap();
        assert_eq!(released.get(), Some(true));
        assert_eq!(
            c.cancel().unwrap_err(),
            ContractFault::retired(Operation::Cancel, Terminal::Cancelled)
        );
        assert_eq!(
            c.resume(Value::Unit).unwrap_err(),
            ContractFault::retired(Operation::Resume, Terminal::Cancelled)
        );
    }

    #[test]
    fn test_contract_fault_poisons_layer() {
        let mut c = bind(
            throw::<i64>(Signal::type_error("t")),
            wrap_into_exc_handler(&VALUE_ERROR, |_| 0),
        );
        c.resume(Value::Unit).unwrap();
        let err = c.resume(Value::Unit).unwrap_err();
        assert!(matches!(err, ContractFault::ThrowResumed { .. }));
        assert_eq!(
            c.inject(Signal::value_error("v")).unwrap_err(),
            ContractFault::retired(Operation::Inject, Terminal::Poisoned)
        );
    }

    #[test]
    fn test_trace_records_decisions() {
        let trace = DispatchTrace::new();
        let inner = bind(
            throw::<i64>(Signal::value_error("odd")),
            wrap_into_exc_handler(&TYPE_ERROR, |_| 1),
        )
        .traced(trace.clone());
        let inner_layer = inner.layer();
        let mut outer = inner
            .bind(wrap_into_exc_handler(&VALUE_ERROR, |_| 2))
            .traced(trace.clone());
        let outer_layer = outer.layer();

        assert_eq!(outer.resume(Value::Unit).unwrap(), Step::Return(2));
        assert_eq!(
            trace.events(),
            vec![
                TraceEvent::PassedThrough {
                    layer: inner_layer,
                    signal_kind: "ValueError",
                },
                TraceEvent::Cancelled { layer: inner_layer },
                TraceEvent::Intercepted {
                    layer: outer_layer,
                    signal_kind: "ValueError",
                    message: "odd".to_string(),
                },
                TraceEvent::Completed { layer: outer_layer },
            ]
        );
    }
}
