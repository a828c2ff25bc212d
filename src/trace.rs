//! Dispatch trace: what each bind layer decided about each signal.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ids::LayerId;

/// One decision taken by a bind layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The layer caught the signal and substituted its handler computation.
    Intercepted {
        layer: LayerId,
        signal_kind: &'static str,
        message: String,
    },
    /// The signal did not match, or the layer had already substituted.
    PassedThrough {
        layer: LayerId,
        signal_kind: &'static str,
    },
    Completed {
        layer: LayerId,
    },
    Cancelled {
        layer: LayerId,
    },
}

impl TraceEvent {
    pub fn layer(&self) -> LayerId {
        match self {
            TraceEvent::Intercepted { layer, .. }
            | TraceEvent::PassedThrough { layer, .. }
            | TraceEvent::Completed { layer }
            | TraceEvent::Cancelled { layer } => *layer,
        }
    }
}

/// Shared recorder for [`TraceEvent`]s. Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct DispatchTrace {
    events: Rc<RefCell<Vec<TraceEvent>>>,
}

impl DispatchTrace {
    pub fn new() -> Self {
        DispatchTrace::default()
    }

    pub fn record(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Snapshot of the events recorded so far, oldest first.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Number of signals `layer` intercepted.
    pub fn intercepts_by(&self, layer: LayerId) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, TraceEvent::Intercepted { layer: l, .. } if *l == layer))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_events() {
        let trace = DispatchTrace::new();
        let writer = trace.clone();
        let layer = LayerId::from_raw(9);

        writer.record(TraceEvent::Intercepted {
            layer,
            signal_kind: "ValueError",
            message: "odd".to_string(),
        });
        writer.record(TraceEvent::Completed { layer });

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.intercepts_by(layer), 1);
        assert_eq!(trace.intercepts_by(LayerId::from_raw(10)), 0);
        assert_eq!(trace.events()[1].layer(), layer);

        trace.clear();
        assert!(writer.is_empty());
    }
}
