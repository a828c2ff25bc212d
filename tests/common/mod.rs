#![allow(dead_code)]

use rescue::signal::RUNTIME_ERROR;
use rescue::{
    done, exc_handler, lazy, throw, BoxComputation, ComputationExt, Handler, Signal, SignalKind,
    Slot,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn echo_even(x: i64) -> BoxComputation<'static, i64> {
    if x % 2 != 0 {
        throw::<i64>(Signal::value_error("x must be an even number")).boxed()
    } else {
        done(x).boxed()
    }
}

/// Input that is either a number or something that is not.
#[derive(Debug, Clone)]
pub enum Input {
    Number(i64),
    Text(String),
}

pub fn echo_even_number(x: Input) -> BoxComputation<'static, i64> {
    match x {
        Input::Text(_) => throw::<i64>(Signal::type_error("x must be a number")).boxed(),
        Input::Number(n) => echo_even(n),
    }
}

/// Handler that re-raises a RuntimeError when the caught message contains
/// `pattern`, and returns `default` otherwise.
pub fn drop_exc_with_runtime_error_on_match(
    exc_type: &'static SignalKind,
    pattern: &'static str,
    default: i64,
) -> Handler<'static, i64> {
    exc_handler(exc_type, move |signal: Signal| {
        if signal.message().contains(pattern) {
            throw::<i64>(Signal::new(&RUNTIME_ERROR, "match pattern in error")).boxed()
        } else {
            done(default).boxed()
        }
    })
}

/// Raises a ValueError while holding a scope that records entry and exit.
///
/// Entry is recorded when the computation is first driven, not when it is
/// built.
pub fn throw_inside_scope(enter: &Slot<bool>, exit: &Slot<bool>) -> BoxComputation<'static, i64> {
    let enter = enter.clone();
    let exit = exit.clone();
    lazy(move || enter.set(true))
        .and_then(|_| throw::<i64>(Signal::value_error("inside context manager")))
        .scoped(move || exit.set(true))
        .boxed()
}
