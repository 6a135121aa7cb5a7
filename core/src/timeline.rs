//! Delayed-call queue
//!
//! Holds commands keyed by the simulation time at which they become due.
//! Calls sharing a due time fire in insertion order.

use std::collections::VecDeque;

use crate::clock::Millis;

/// A pending call owned by the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCall<C> {
    pub id: String,
    pub due_ms: Millis,
    pub command: C,
}

/// Due-time ordered queue of scheduled commands.
#[derive(Debug, Clone)]
pub struct Timeline<C> {
    calls: VecDeque<ScheduledCall<C>>,
}

impl<C> Default for Timeline<C> {
    fn default() -> Self {
        Self {
            calls: VecDeque::new(),
        }
    }
}

impl<C> Timeline<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a call. A due time in the past is legal and fires on the next flush.
    pub fn schedule(&mut self, id: impl Into<String>, due_ms: Millis, command: C) {
        // Insert after every call due at or before this one to keep ties stable
        let idx = self.calls.partition_point(|call| call.due_ms <= due_ms);
        self.calls.insert(
            idx,
            ScheduledCall {
                id: id.into(),
                due_ms,
                command,
            },
        );
    }

    /// Remove pending calls with this id without firing them.
    /// Returns whether anything was removed.
    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.calls.len();
        self.calls.retain(|call| call.id != id);
        before != self.calls.len()
    }

    /// Pop the earliest call if it is due at `now_ms`
    pub fn pop_due(&mut self, now_ms: Millis) -> Option<ScheduledCall<C>> {
        match self.calls.front() {
            Some(call) if call.due_ms <= now_ms => self.calls.pop_front(),
            _ => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.calls.iter().any(|call| call.id == id)
    }

    pub fn next_due_ms(&self) -> Option<Millis> {
        self.calls.front().map(|call| call.due_ms)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timeline: &mut Timeline<&'static str>, now: Millis) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(call) = timeline.pop_due(now) {
            fired.push(call.command);
        }
        fired
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timeline = Timeline::new();
        timeline.schedule("c", 300, "c");
        timeline.schedule("a", 100, "a");
        timeline.schedule("b", 200, "b");

        assert_eq!(timeline.next_due_ms(), Some(100));
        assert_eq!(drain(&mut timeline, 250), vec!["a", "b"]);
        assert_eq!(timeline.len(), 1);
        assert_eq!(drain(&mut timeline, 300), vec!["c"]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_same_due_time_keeps_insertion_order() {
        let mut timeline = Timeline::new();
        timeline.schedule("first", 500, "first");
        timeline.schedule("early", 100, "early");
        timeline.schedule("second", 500, "second");
        timeline.schedule("third", 500, "third");

        assert_eq!(
            drain(&mut timeline, 500),
            vec!["early", "first", "second", "third"]
        );
    }

    #[test]
    fn test_past_due_fires_on_next_flush() {
        let mut timeline = Timeline::new();
        timeline.schedule("late", 10, "late");
        assert_eq!(drain(&mut timeline, 1000), vec!["late"]);
    }

    #[test]
    fn test_cancel() {
        let mut timeline = Timeline::new();
        timeline.schedule("keep", 100, "keep");
        timeline.schedule("drop", 100, "drop");

        assert!(timeline.cancel("drop"));
        assert!(!timeline.cancel("drop"), "second cancel is a no-op");
        assert!(!timeline.cancel("missing"));
        assert!(!timeline.contains("drop"));
        assert_eq!(drain(&mut timeline, 100), vec!["keep"]);
    }

    #[test]
    fn test_nothing_due_yet() {
        let mut timeline = Timeline::new();
        timeline.schedule("later", 1000, "later");
        assert!(timeline.pop_due(999).is_none());
        assert_eq!(timeline.len(), 1);
    }
}
