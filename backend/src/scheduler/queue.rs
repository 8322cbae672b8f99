//! Phased event queue
//!
//! Events are ordered by `(day, phase, priority, submission sequence)`. The
//! sequence number is assigned at submission, so two events with the same
//! day, phase and priority fire in the order they were scheduled. Together
//! with the seeded RNG this makes every run reproducible.
//!
//! # Example
//!
//! ```rust
//! use firm_control_core_rs::{Phase, PhaseScheduler, Priority};
//!
//! let mut scheduler = PhaseScheduler::new(42);
//! scheduler.schedule_soon(Phase::Production, "produce", Priority::Standard);
//! scheduler.schedule_soon(Phase::Think, "think", Priority::Standard);
//! scheduler.schedule_tomorrow(Phase::Dawn, "wake up", Priority::Standard);
//!
//! let mut fired = Vec::new();
//! scheduler.run_until(10, |_, event| fired.push(event.task));
//! assert_eq!(fired, vec!["think", "produce", "wake up"]);
//! ```

use crate::core::time::{Phase, Priority, SimTime};
use crate::rng::RngManager;
use crate::scheduler::ScheduleError;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// An event waiting in the scheduler
///
/// The `task` identifies what should run; the scheduler never inspects it.
/// A fired event is consumed. Re-submitting creates a new event with a new
/// sequence number.
#[derive(Debug, Clone)]
pub struct ScheduledEvent<T> {
    /// When the event fires
    pub time: SimTime,
    /// Ordering inside the phase
    pub priority: Priority,
    /// Submission order, unique per scheduler
    pub sequence: u64,
    /// Caller-defined task
    pub task: T,
}

impl<T> ScheduledEvent<T> {
    /// Total-order key: `(day, phase, priority, sequence)`
    pub fn key(&self) -> (usize, Phase, Priority, u64) {
        (self.time.day, self.time.phase, self.priority, self.sequence)
    }
}

impl<T> PartialEq for ScheduledEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for ScheduledEvent<T> {}

impl<T> PartialOrd for ScheduledEvent<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledEvent<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Deterministic day-structured scheduler
///
/// Single-threaded: handlers run one at a time and may re-submit events
/// through the `&mut PhaseScheduler` they receive. There is no cancellation;
/// owners of an event flip an inactive flag and let the event fire as a
/// no-op.
#[derive(Debug)]
pub struct PhaseScheduler<T> {
    queue: BinaryHeap<Reverse<ScheduledEvent<T>>>,
    now: SimTime,
    next_sequence: u64,
    fired: u64,
    rng: RngManager,
}

impl<T> PhaseScheduler<T> {
    /// Create an empty scheduler at day 0, dawn
    pub fn new(seed: u64) -> Self {
        Self::with_rng(RngManager::new(seed))
    }

    /// Create an empty scheduler drawing its randomness from `rng`
    pub fn with_rng(rng: RngManager) -> Self {
        Self {
            queue: BinaryHeap::new(),
            now: SimTime::start(),
            next_sequence: 0,
            fired: 0,
            rng,
        }
    }

    /// Current position of the clock (the last fired event's day and phase)
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn current_day(&self) -> usize {
        self.now.day
    }

    pub fn current_phase(&self) -> Phase {
        self.now.phase
    }

    /// Number of events still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of events fired so far
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// The model-wide random source
    pub fn rng_mut(&mut self) -> &mut RngManager {
        &mut self.rng
    }

    /// When the next event fires, if any
    pub fn peek_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|Reverse(event)| event.time)
    }

    fn push(&mut self, time: SimTime, priority: Priority, task: T) {
        debug_assert!(time >= self.now, "cannot schedule in the past");
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(Reverse(ScheduledEvent {
            time,
            priority,
            sequence,
            task,
        }));
    }

    /// Run at the next occurrence of `phase`: today if it has not elapsed
    /// yet, otherwise tomorrow
    pub fn schedule_soon(&mut self, phase: Phase, task: T, priority: Priority) {
        let time = self.now.next_occurrence(phase);
        self.push(time, priority, task);
    }

    /// Run at `phase` on the following day
    pub fn schedule_tomorrow(&mut self, phase: Phase, task: T, priority: Priority) {
        let time = self.now.days_later(1, phase);
        self.push(time, priority, task);
    }

    /// Run at `phase` exactly `days_ahead` days from today
    ///
    /// # Errors
    /// `ScheduleError::NonPositiveDelay` when `days_ahead == 0`
    pub fn schedule_another_day(
        &mut self,
        phase: Phase,
        task: T,
        days_ahead: usize,
        priority: Priority,
    ) -> Result<(), ScheduleError> {
        if days_ahead == 0 {
            return Err(ScheduleError::NonPositiveDelay(days_ahead));
        }
        let time = self.now.days_later(days_ahead, phase);
        self.push(time, priority, task);
        Ok(())
    }

    /// Run at `phase` after a random number of days: each day after today
    /// triggers with probability `probability`, so the expected delay is
    /// `1 / probability` days and the minimum is one day
    ///
    /// # Errors
    /// `ScheduleError::InvalidProbability` unless `0 < probability <= 1`
    pub fn schedule_another_day_with_fixed_probability(
        &mut self,
        phase: Phase,
        task: T,
        probability: f64,
        priority: Priority,
    ) -> Result<usize, ScheduleError> {
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(ScheduleError::InvalidProbability(probability));
        }
        let mut days_ahead = 0;
        loop {
            days_ahead += 1;
            if self.rng.next_bool(probability) {
                break;
            }
        }
        self.schedule_another_day(phase, task, days_ahead, priority)?;
        Ok(days_ahead)
    }

    /// Remove the earliest event and move the clock to it
    pub fn pop_next(&mut self) -> Option<ScheduledEvent<T>> {
        let Reverse(event) = self.queue.pop()?;
        self.now = event.time;
        self.fired += 1;
        Some(event)
    }

    /// Fire events in order until the queue is empty or the next event
    /// lies after `last_day`
    ///
    /// Returns the number of events fired.
    pub fn run_until<F>(&mut self, last_day: usize, mut handler: F) -> usize
    where
        F: FnMut(&mut Self, ScheduledEvent<T>),
    {
        let result: Result<usize, std::convert::Infallible> =
            self.try_run_until(last_day, |scheduler, event| {
                handler(scheduler, event);
                Ok(())
            });
        match result {
            Ok(fired) => fired,
            Err(never) => match never {},
        }
    }

    /// Like [`run_until`](Self::run_until) but stops at the first handler error
    pub fn try_run_until<F, E>(&mut self, last_day: usize, mut handler: F) -> Result<usize, E>
    where
        F: FnMut(&mut Self, ScheduledEvent<T>) -> Result<(), E>,
    {
        let mut fired = 0;
        while self.peek_time().is_some_and(|time| time.day <= last_day) {
            let Some(event) = self.pop_next() else {
                break;
            };
            handler(self, event)?;
            fired += 1;
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_fires_in_submission_order() {
        let mut scheduler = PhaseScheduler::new(1);
        for i in 0..5 {
            scheduler.schedule_soon(Phase::Trade, i, Priority::Standard);
        }
        let mut fired = Vec::new();
        scheduler.run_until(0, |_, e| fired.push(e.task));
        assert_eq!(fired, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_priority_orders_within_phase() {
        let mut scheduler = PhaseScheduler::new(1);
        scheduler.schedule_soon(Phase::Trade, "final", Priority::Final);
        scheduler.schedule_soon(Phase::Trade, "after", Priority::AfterStandard);
        scheduler.schedule_soon(Phase::Trade, "standard", Priority::Standard);
        scheduler.schedule_soon(Phase::Trade, "before", Priority::BeforeStandard);
        let mut fired = Vec::new();
        scheduler.run_until(0, |_, e| fired.push(e.task));
        assert_eq!(fired, vec!["before", "standard", "after", "final"]);
    }

    #[test]
    fn test_schedule_soon_for_elapsed_phase_goes_to_tomorrow() {
        let mut scheduler = PhaseScheduler::new(1);
        scheduler.schedule_soon(Phase::Production, 0, Priority::Standard);
        let mut times = Vec::new();
        scheduler.run_until(5, |s, e| {
            times.push(s.now());
            if e.task == 0 {
                s.schedule_soon(Phase::Think, 1, Priority::Standard);
                s.schedule_soon(Phase::Production, 2, Priority::Standard);
                s.schedule_soon(Phase::Final, 3, Priority::Standard);
            }
        });
        assert_eq!(
            times,
            vec![
                SimTime::new(0, Phase::Production),
                SimTime::new(0, Phase::Production),
                SimTime::new(0, Phase::Final),
                SimTime::new(1, Phase::Think),
            ]
        );
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut scheduler = PhaseScheduler::new(1);
        let err = scheduler
            .schedule_another_day(Phase::Dawn, (), 0, Priority::Standard)
            .unwrap_err();
        assert_eq!(err, ScheduleError::NonPositiveDelay(0));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut scheduler = PhaseScheduler::new(1);
        for p in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(scheduler
                .schedule_another_day_with_fixed_probability(Phase::Dawn, (), p, Priority::Standard)
                .is_err());
        }
    }

    #[test]
    fn test_certain_probability_is_tomorrow() {
        let mut scheduler = PhaseScheduler::new(1);
        let days = scheduler
            .schedule_another_day_with_fixed_probability(Phase::Think, (), 1.0, Priority::Standard)
            .unwrap();
        assert_eq!(days, 1);
        assert_eq!(scheduler.peek_time(), Some(SimTime::new(1, Phase::Think)));
    }

    #[test]
    fn test_run_until_leaves_later_events_queued() {
        let mut scheduler = PhaseScheduler::new(1);
        scheduler
            .schedule_another_day(Phase::Dawn, (), 3, Priority::Standard)
            .unwrap();
        assert_eq!(scheduler.run_until(2, |_, _| {}), 0);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.run_until(3, |_, _| {}), 1);
    }
}
