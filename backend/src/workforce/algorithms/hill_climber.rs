//! Profit hill climber
//!
//! Moves the target one worker at a time in the direction that raised
//! profits last time:
//!
//! `direction = sign(Δprofits) · sign(Δtarget)`, or the previous direction
//! when profits did not change.
//!
//! Every observed (target, profits) pair goes into a memory. The memory is
//! used twice:
//!
//! - **veto**: a step toward a target already in memory is only taken if
//!   that target made at least as much as the current one;
//! - **search**: when the climber wants to stay put but the profits at the
//!   current target moved (noise), it jumps to the best target in memory.

use crate::workforce::algorithms::{signum, MaximizationAlgorithm, TargetDecision, TargetObservation};
use crate::workforce::HeadcountOracle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One-worker-step hill climber with profit memory
///
/// # Example
/// ```
/// use firm_control_core_rs::workforce::{HillClimber, MaximizationAlgorithm, TargetDecision, TargetObservation};
///
/// let mut climber = HillClimber::new(0.0, 0, 10);
/// // going from 1 to 2 workers raised profits: keep going up
/// let decision = climber.choose_worker_target(&TargetObservation {
///     current_target: 2,
///     new_profits: 50.0,
///     new_revenues: 80.0,
///     new_costs: 30.0,
///     old_revenues: 40.0,
///     old_costs: 10.0,
///     old_target: 1,
///     old_profits: 30.0,
/// });
/// assert_eq!(decision, TargetDecision::Retarget(3));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HillClimber {
    memory: BTreeMap<u32, f64>,
    old_direction: i64,
    min_workers: u32,
    max_workers: u32,
}

impl HillClimber {
    /// # Panics
    /// Panics if `weekly_fixed_costs` is negative
    pub fn new(weekly_fixed_costs: f64, min_workers: u32, max_workers: u32) -> Self {
        assert!(weekly_fixed_costs >= 0.0, "weekly fixed costs must be non-negative");
        let mut memory = BTreeMap::new();
        memory.insert(0, -weekly_fixed_costs);
        Self {
            memory,
            old_direction: 1,
            min_workers,
            max_workers,
        }
    }

    /// Hill-climb with a caller-supplied step size
    ///
    /// The step is computed after the memory is updated and the direction
    /// chosen, so a step rule may rely on both.
    pub fn choose_with_step<F>(&mut self, observation: &TargetObservation, step: F) -> TargetDecision
    where
        F: FnOnce(&TargetObservation) -> u32,
    {
        let current = observation.current_target;
        let previous = self.memory.insert(current, observation.new_profits);
        let memory_changed = previous.is_some_and(|old| old != observation.new_profits);
        if memory_changed {
            debug!(
                worker_target = current,
                old = previous.unwrap_or_default(),
                new = observation.new_profits,
                "profit memory changed"
            );
        }

        let direction = self.direction(observation);
        self.old_direction = direction;

        let future = current as i64 + step(observation) as i64 * direction;

        if future == current as i64 {
            let noisy = memory_changed
                || (observation.old_target == current
                    && observation.old_profits != observation.new_profits);
            if noisy {
                return TargetDecision::Retarget(self.best_target_in_memory().unwrap_or(current));
            }
            return TargetDecision::Retarget(current);
        }

        let mut future = future.max(0).min(self.max_workers as i64);
        if future > 0 {
            future = future.max(self.min_workers as i64);
        }
        let future = future as u32;

        if self.memory_allows(future, observation.new_profits) {
            TargetDecision::Retarget(future)
        } else {
            TargetDecision::Retarget(current)
        }
    }

    fn direction(&self, observation: &TargetObservation) -> i64 {
        let profits_moved = signum(observation.new_profits - observation.old_profits);
        if profits_moved == 0 {
            return self.old_direction;
        }
        let workers_moved = (observation.current_target as i64 - observation.old_target as i64).signum();
        profits_moved * workers_moved
    }

    /// A remembered target is only revisited if it did at least as well
    pub fn memory_allows(&self, target: u32, current_profits: f64) -> bool {
        match self.memory.get(&target) {
            Some(remembered) => *remembered >= current_profits,
            None => true,
        }
    }

    /// Most profitable remembered target; the smallest target wins ties
    pub fn best_target_in_memory(&self) -> Option<u32> {
        let mut best: Option<(u32, f64)> = None;
        for (&target, &profits) in &self.memory {
            match best {
                Some((_, best_profits)) if profits <= best_profits => {}
                _ => best = Some((target, profits)),
            }
        }
        best.map(|(target, _)| target)
    }

    pub fn remembered(&self, target: u32) -> Option<f64> {
        self.memory.get(&target).copied()
    }

    /// Keep only the fixed-cost entry at zero workers
    pub fn clean_memory(&mut self) {
        let at_zero = self.memory.get(&0).copied();
        self.memory.clear();
        if let Some(loss) = at_zero {
            self.memory.insert(0, loss);
        }
    }

    pub fn min_workers(&self) -> u32 {
        self.min_workers
    }

    pub fn max_workers(&self) -> u32 {
        self.max_workers
    }
}

impl MaximizationAlgorithm for HillClimber {
    fn choose_worker_target(&mut self, observation: &TargetObservation) -> TargetDecision {
        self.choose_with_step(observation, |_| 1)
    }

    fn reset(&mut self, headcount: &dyn HeadcountOracle) {
        self.memory.clear();
        self.memory.insert(0, -headcount.weekly_fixed_costs());
        self.min_workers = headcount.min_workers();
        self.max_workers = headcount.max_workers();
    }

    fn turn_off(&mut self) {
        self.memory.clear();
    }

    fn name(&self) -> &'static str {
        "hill_climber"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(current: u32, new_profits: f64, old: u32, old_profits: f64) -> TargetObservation {
        TargetObservation {
            current_target: current,
            new_profits,
            new_revenues: 0.0,
            new_costs: 0.0,
            old_revenues: 0.0,
            old_costs: 0.0,
            old_target: old,
            old_profits,
        }
    }

    #[test]
    fn test_lower_profits_reverse_direction() {
        let mut climber = HillClimber::new(0.0, 0, 10);
        assert_eq!(
            climber.choose_worker_target(&observation(4, 10.0, 3, 20.0)),
            TargetDecision::Retarget(3)
        );
    }

    #[test]
    fn test_unchanged_profits_keep_direction() {
        let mut climber = HillClimber::new(0.0, 0, 10);
        // initial direction is up
        assert_eq!(
            climber.choose_worker_target(&observation(1, 0.0, 0, 0.0)),
            TargetDecision::Retarget(2)
        );
    }

    #[test]
    fn test_target_clamped_to_technology() {
        let mut climber = HillClimber::new(0.0, 3, 5);
        assert_eq!(
            climber.choose_worker_target(&observation(5, 100.0, 4, 50.0)),
            TargetDecision::Retarget(5)
        );
        // going down from 1 lands on 0, which is allowed below the minimum
        let mut climber = HillClimber::new(0.0, 3, 5);
        assert_eq!(
            climber.choose_worker_target(&observation(1, -5.0, 0, 0.0)),
            TargetDecision::Retarget(0)
        );
    }

    #[test]
    fn test_memory_vetoes_worse_target() {
        let mut climber = HillClimber::new(0.0, 0, 10);
        climber.choose_worker_target(&observation(3, 5.0, 2, 10.0));
        // 4 beats 5, so the climber heads down to 3, which made less than 4
        assert_eq!(
            climber.choose_worker_target(&observation(4, 8.0, 5, 6.0)),
            TargetDecision::Retarget(4)
        );
    }

    #[test]
    fn test_noise_triggers_memory_search() {
        let mut climber = HillClimber::new(0.0, 0, 10);
        climber.choose_worker_target(&observation(6, 100.0, 5, 90.0));
        climber.choose_worker_target(&observation(7, 95.0, 6, 100.0));
        // back at 6 with lower profits than before and no direction
        assert_eq!(
            climber.choose_worker_target(&observation(6, 80.0, 6, 95.0)),
            TargetDecision::Retarget(7)
        );
    }

    #[test]
    fn test_memory_search_prefers_smaller_target_on_ties() {
        let mut climber = HillClimber::new(0.0, 0, 10);
        climber.choose_worker_target(&observation(2, 50.0, 1, 10.0));
        climber.choose_worker_target(&observation(3, 50.0, 2, 50.0));
        assert_eq!(climber.best_target_in_memory(), Some(2));
    }

    #[test]
    fn test_turn_off_clears_memory() {
        let mut climber = HillClimber::new(20.0, 0, 10);
        assert_eq!(climber.remembered(0), Some(-20.0));
        climber.turn_off();
        assert_eq!(climber.remembered(0), None);
    }
}
