//! Constant target

use crate::workforce::algorithms::{MaximizationAlgorithm, TargetDecision, TargetObservation};
use crate::workforce::HeadcountOracle;
use serde::{Deserialize, Serialize};

/// Always answers with the same target, clamped to the technology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedTarget {
    target: u32,
    max_workers: Option<u32>,
}

impl FixedTarget {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            max_workers: None,
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}

impl MaximizationAlgorithm for FixedTarget {
    fn choose_worker_target(&mut self, _observation: &TargetObservation) -> TargetDecision {
        let target = match self.max_workers {
            Some(max) => self.target.min(max),
            None => self.target,
        };
        TargetDecision::Retarget(target)
    }

    fn reset(&mut self, headcount: &dyn HeadcountOracle) {
        self.max_workers = Some(headcount.max_workers());
    }

    fn name(&self) -> &'static str {
        "fixed_target"
    }
}
