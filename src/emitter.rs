//! Listener registry for event emission
//!
//! Maps event names to ordered lists of `(listener, priority)` pairs. The
//! registry is owned by one scheduler instance and never shared across
//! schedulers. Delivery order is settled at emission time: the list for an
//! event is re-sorted by priority (stable, ascending) on every emit, so
//! registration order only matters between listeners of equal priority.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::clock::Clock;
use crate::engine::Scheduler;

pub(crate) type SharedListener<C> = Rc<RefCell<dyn FnMut(&mut Scheduler<C>, &Value)>>;

// ============================================================================
// Listener
// ============================================================================

/// A registered listener and its delivery priority
pub struct Listener<C: Clock> {
    action: SharedListener<C>,
    priority: i32,
}

impl<C: Clock> Listener<C> {
    /// Delivery priority; lower values are delivered first
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn shared(&self) -> SharedListener<C> {
        Rc::clone(&self.action)
    }
}

impl<C: Clock> Clone for Listener<C> {
    fn clone(&self) -> Self {
        Self {
            action: Rc::clone(&self.action),
            priority: self.priority,
        }
    }
}

impl<C: Clock> fmt::Debug for Listener<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Per-scheduler mapping from event name to its listener list
pub(crate) struct Registry<C: Clock> {
    events: HashMap<String, Vec<Listener<C>>>,
}

impl<C: Clock> Registry<C> {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Append a listener for `event`; listeners are never removed
    pub fn register<F>(&mut self, event: String, priority: i32, action: F)
    where
        F: FnMut(&mut Scheduler<C>, &Value) + 'static,
    {
        let listener = Listener {
            action: Rc::new(RefCell::new(action)),
            priority,
        };
        self.events.entry(event).or_default().push(listener);
    }

    /// Sort the event's listener list by ascending priority, in place,
    /// and hand back a copy for delivery; `None` if nobody is registered
    pub fn sorted(&mut self, event: &str) -> Option<Vec<Listener<C>>> {
        let listeners = self.events.get_mut(event)?;
        listeners.sort_by_key(|listener| listener.priority);
        Some(listeners.clone())
    }

    /// Shallow copy of the whole registry; mutating it does not touch
    /// the live one
    pub fn snapshot(&self) -> HashMap<String, Vec<Listener<C>>> {
        self.events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    type TestRegistry = Registry<ManualClock>;

    #[test]
    fn test_register_and_snapshot() {
        let mut registry = TestRegistry::new();
        registry.register("tick".to_string(), 1, |_, _| {});
        registry.register("tick".to_string(), 2, |_, _| {});
        registry.register("tock".to_string(), 0, |_, _| {});

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["tick"].len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = TestRegistry::new();
        registry.register("tick".to_string(), 0, |_, _| {});

        let mut snapshot = registry.snapshot();
        snapshot.clear();

        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_sorted_orders_by_priority() {
        let mut registry = TestRegistry::new();
        registry.register("tick".to_string(), 5, |_, _| {});
        registry.register("tick".to_string(), 1, |_, _| {});
        registry.register("tick".to_string(), 3, |_, _| {});

        let sorted = registry.sorted("tick").unwrap();
        let priorities: Vec<i32> = sorted.iter().map(|l| l.priority()).collect();
        assert_eq!(priorities, vec![1, 3, 5]);
    }

    #[test]
    fn test_sorted_unknown_event_is_none() {
        let mut registry = TestRegistry::new();
        assert!(registry.sorted("missing").is_none());
    }
}
