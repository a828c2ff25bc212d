//! rescue: resumable, composable exception handlers for cooperative computations.
//!
//! # Architecture
//!
//! - **Computations**: explicit state machines stepped with `resume`, `inject`
//!   and `cancel`; signals are ordinary values in [`Step::Signal`]
//! - **Throw**: the suspend-once primitive; a raised signal is a dead end
//! - **Handlers**: a [`SignalKind`] filter plus a factory for the computation
//!   that replaces the signalling one
//! - **Bind**: catch-once, pass-through-otherwise composition; layers stack
//!   like nested catch clauses
//! - **Contract faults**: programming errors travel in `Result`, never through
//!   handler matching
//!
//! ```
//! use rescue::signal::VALUE_ERROR;
//! use rescue::{bind, done, throw, unwrap, wrap_into_exc_handler, ComputationExt, Signal};
//!
//! fn echo_even(x: i64) -> rescue::BoxComputation<'static, i64> {
//!     if x % 2 != 0 {
//!         throw(Signal::value_error("x must be an even number")).boxed()
//!     } else {
//!         done(x).boxed()
//!     }
//! }
//!
//! let handled = bind(echo_even(1), wrap_into_exc_handler(&VALUE_ERROR, |_| 0));
//! assert_eq!(unwrap(handled).unwrap(), 0);
//! ```

pub mod bind;
pub mod combinators;
pub mod computation;
pub mod driver;
pub mod error;
pub mod handler;
pub mod ids;
mod logging;
pub mod signal;
pub mod throw;
pub mod trace;
pub mod util;
pub mod value;

// Re-exports for convenience
pub use bind::{bind, Bind};
pub use combinators::{done, lazy, scoped, AndThen, Done, Lazy, Map, Scoped};
pub use computation::{BoxComputation, Computation, ComputationExt, Step};
pub use driver::{eval_with_handler, try_eval, unwrap, Outcome};
pub use error::{ContractFault, Operation, Terminal};
pub use handler::{exc_handler, wrap, wrap_into_exc_handler, Handler, HandlerKind};
pub use ids::LayerId;
pub use signal::{Signal, SignalKind};
pub use throw::{throw, Throw};
pub use trace::{DispatchTrace, TraceEvent};
pub use util::{box_exc, Slot};
pub use value::Value;
