//! Self-scheduling handle for a single task
//!
//! Components such as the workforce maximizer reschedule themselves at the
//! end of each step. They should not need to know the concrete task type of
//! the world that owns them, so they talk to an [`Agenda`]: a view of the
//! scheduler bound to the task that is currently running.

use crate::core::time::{Phase, Priority, SimTime};
use crate::rng::RngManager;
use crate::scheduler::{PhaseScheduler, ScheduleError};

/// Scheduling capabilities offered to the task that is currently running
pub trait Agenda {
    /// Current day and phase
    fn now(&self) -> SimTime;

    /// Re-run this task at the next occurrence of `phase`
    fn schedule_soon(&mut self, phase: Phase, priority: Priority);

    /// Re-run this task at `phase` tomorrow
    fn schedule_tomorrow(&mut self, phase: Phase, priority: Priority);

    /// Re-run this task at `phase`, `days_ahead` days from today
    fn schedule_another_day(
        &mut self,
        phase: Phase,
        days_ahead: usize,
        priority: Priority,
    ) -> Result<(), ScheduleError>;

    /// Re-run this task after a geometric delay with daily probability
    /// `probability`; returns the drawn delay in days
    fn schedule_with_fixed_probability(
        &mut self,
        phase: Phase,
        probability: f64,
        priority: Priority,
    ) -> Result<usize, ScheduleError>;

    /// Model-wide random source
    fn rng(&mut self) -> &mut RngManager;
}

/// [`Agenda`] backed by a [`PhaseScheduler`], re-submitting a fixed task
pub struct TaskAgenda<'a, T: Clone> {
    scheduler: &'a mut PhaseScheduler<T>,
    task: T,
}

impl<T: Clone> PhaseScheduler<T> {
    /// Bind this scheduler to `task` so the task can reschedule itself
    pub fn for_task(&mut self, task: T) -> TaskAgenda<'_, T> {
        TaskAgenda {
            scheduler: self,
            task,
        }
    }
}

impl<T: Clone> Agenda for TaskAgenda<'_, T> {
    fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    fn schedule_soon(&mut self, phase: Phase, priority: Priority) {
        self.scheduler
            .schedule_soon(phase, self.task.clone(), priority);
    }

    fn schedule_tomorrow(&mut self, phase: Phase, priority: Priority) {
        self.scheduler
            .schedule_tomorrow(phase, self.task.clone(), priority);
    }

    fn schedule_another_day(
        &mut self,
        phase: Phase,
        days_ahead: usize,
        priority: Priority,
    ) -> Result<(), ScheduleError> {
        self.scheduler
            .schedule_another_day(phase, self.task.clone(), days_ahead, priority)
    }

    fn schedule_with_fixed_probability(
        &mut self,
        phase: Phase,
        probability: f64,
        priority: Priority,
    ) -> Result<usize, ScheduleError> {
        self.scheduler.schedule_another_day_with_fixed_probability(
            phase,
            self.task.clone(),
            probability,
            priority,
        )
    }

    fn rng(&mut self) -> &mut RngManager {
        self.scheduler.rng_mut()
    }
}

/// One request captured by a [`RecordingAgenda`]
#[derive(Debug, Clone, PartialEq)]
pub enum AgendaRequest {
    Soon { phase: Phase },
    Tomorrow { phase: Phase },
    AnotherDay { phase: Phase, days_ahead: usize },
    FixedProbability { phase: Phase, probability: f64, days_ahead: usize },
}

impl AgendaRequest {
    /// Delay in days implied by the request, seen from `now`
    pub fn delay_from(&self, now: SimTime) -> usize {
        match self {
            AgendaRequest::Soon { phase } => now.next_occurrence(*phase).day - now.day,
            AgendaRequest::Tomorrow { .. } => 1,
            AgendaRequest::AnotherDay { days_ahead, .. } => *days_ahead,
            AgendaRequest::FixedProbability { days_ahead, .. } => *days_ahead,
        }
    }
}

/// [`Agenda`] that records requests instead of executing them
///
/// Lets a component be driven step by step from a test: the test moves the
/// clock itself and inspects what the component asked for.
#[derive(Debug)]
pub struct RecordingAgenda {
    now: SimTime,
    rng: RngManager,
    requests: Vec<AgendaRequest>,
}

impl RecordingAgenda {
    pub fn new(seed: u64) -> Self {
        Self {
            now: SimTime::start(),
            rng: RngManager::new(seed),
            requests: Vec::new(),
        }
    }

    pub fn set_now(&mut self, now: SimTime) {
        self.now = now;
    }

    pub fn requests(&self) -> &[AgendaRequest] {
        &self.requests
    }

    pub fn last_request(&self) -> Option<&AgendaRequest> {
        self.requests.last()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

impl Agenda for RecordingAgenda {
    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule_soon(&mut self, phase: Phase, _priority: Priority) {
        self.requests.push(AgendaRequest::Soon { phase });
    }

    fn schedule_tomorrow(&mut self, phase: Phase, _priority: Priority) {
        self.requests.push(AgendaRequest::Tomorrow { phase });
    }

    fn schedule_another_day(
        &mut self,
        phase: Phase,
        days_ahead: usize,
        _priority: Priority,
    ) -> Result<(), ScheduleError> {
        if days_ahead == 0 {
            return Err(ScheduleError::NonPositiveDelay(days_ahead));
        }
        self.requests
            .push(AgendaRequest::AnotherDay { phase, days_ahead });
        Ok(())
    }

    fn schedule_with_fixed_probability(
        &mut self,
        phase: Phase,
        probability: f64,
        _priority: Priority,
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
        self.requests.push(AgendaRequest::FixedProbability {
            phase,
            probability,
            days_ahead,
        });
        Ok(days_ahead)
    }

    fn rng(&mut self) -> &mut RngManager {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_agenda_resubmits_bound_task() {
        let mut scheduler = PhaseScheduler::new(3);
        {
            let mut agenda = scheduler.for_task("maximizer");
            agenda.schedule_soon(Phase::Think, Priority::Standard);
            agenda
                .schedule_another_day(Phase::Think, 7, Priority::Standard)
                .unwrap();
        }
        let mut fired = Vec::new();
        scheduler.run_until(10, |s, e| fired.push((s.current_day(), e.task)));
        assert_eq!(fired, vec![(0, "maximizer"), (7, "maximizer")]);
    }

    #[test]
    fn test_recording_agenda_reports_delays() {
        let mut agenda = RecordingAgenda::new(1);
        agenda.set_now(SimTime::new(4, Phase::AdjustPrices));
        agenda.schedule_soon(Phase::Think, Priority::Standard);
        agenda.schedule_tomorrow(Phase::Think, Priority::Standard);
        agenda
            .schedule_another_day(Phase::Think, 9, Priority::Standard)
            .unwrap();
        let now = agenda.now();
        let delays: Vec<usize> = agenda.requests().iter().map(|r| r.delay_from(now)).collect();
        assert_eq!(delays, vec![1, 1, 9]);
    }
}
