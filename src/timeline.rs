//! Virtual-time scheduler for timed UI transitions.
//!
//! Delayed effects (alert dismissal, bar animation, preview fade-in) are
//! expressed as a [`Sequence`] of `(delay, action)` steps instead of nested
//! timer callbacks. A [`Timeline`] turns each step into an absolute due time
//! and hands the actions back once the host reports that time has passed.
//!
//! The timeline never reads a clock itself: the host calls
//! [`Timeline::advance_to`] with the elapsed time since startup. This keeps
//! the controller deterministic under test and lets the browser host use
//! `web_time::Instant` while sleeping on `setTimeout` until
//! [`Timeline::next_deadline`].

use std::time::Duration;

/// An ordered list of steps. Each delay is relative to the previous step
/// (the first one to the moment the sequence is scheduled).
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<A> {
    steps: Vec<(Duration, A)>,
}

impl<A> Sequence<A> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step that runs `delay` after the previous one.
    pub fn then(mut self, delay: Duration, action: A) -> Self {
        self.steps.push((delay, action));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<A> Default for Sequence<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Scheduled<A> {
    due: Duration,
    action: A,
}

/// Pending timed actions ordered by due time.
///
/// Actions with the same due time fire in the order they were scheduled.
#[derive(Debug)]
pub struct Timeline<A> {
    now: Duration,
    /// Sorted by due time, stable for equal times
    pending: Vec<Scheduled<A>>,
}

impl<A> Timeline<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            pending: Vec::new(),
        }
    }

    /// Current virtual time (the last value passed to `advance_to`).
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule every step of a sequence relative to the current time.
    pub fn schedule(&mut self, sequence: Sequence<A>) {
        let mut due = self.now;
        for (delay, action) in sequence.steps {
            due += delay;
            let index = self.pending.partition_point(|s| s.due <= due);
            self.pending.insert(index, Scheduled { due, action });
        }
    }

    /// Move time forward and return every action that became due, in order.
    ///
    /// Time never moves backwards; an earlier `now` is ignored.
    pub fn advance_to(&mut self, now: Duration) -> Vec<A> {
        if now > self.now {
            self.now = now;
        }
        let split = self.pending.partition_point(|s| s.due <= self.now);
        self.pending.drain(..split).map(|s| s.action).collect()
    }

    /// Due time of the earliest pending action.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first().map(|s| s.due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self::new()
    }
}
