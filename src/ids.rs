//! Layer identities for bind logs and dispatch traces.

use std::sync::atomic::{AtomicU64, Ordering};

/// Names one bind layer in a handler stack, as shown in `rescue::bind` logs
/// and [`TraceEvent`](crate::trace::TraceEvent)s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LayerId(pub u64);

static NEXT_LAYER: AtomicU64 = AtomicU64::new(1);

impl LayerId {
    /// Allocated by every [`bind`](crate::bind::bind) call.
    pub fn fresh() -> Self {
        LayerId(NEXT_LAYER.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild the id printed as `layer#N` in a log line.
    pub fn from_raw(value: u64) -> Self {
        LayerId(value)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}
