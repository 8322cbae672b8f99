//! Strategy registry
//!
//! Maps a strategy name to a constructor. Entries flagged `drawable` take
//! part in random draws; the others can only be built by name. The registry
//! is a plain value: build one, register what you need, pass it to whatever
//! constructs strategies.

use crate::rng::RngManager;
use crate::workforce::algorithms::{
    FixedTarget, GradientHillClimber, HillClimber, MarginalMaximizer, MaximizationAlgorithm,
};
use std::fmt;

type Constructor<C, T> = Box<dyn Fn(&C) -> Box<T> + Send + Sync>;

struct StrategyEntry<C, T: ?Sized> {
    name: String,
    drawable: bool,
    constructor: Constructor<C, T>,
}

/// Named constructors for strategies of type `T`, built from a context `C`
pub struct StrategyRegistry<C, T: ?Sized> {
    entries: Vec<StrategyEntry<C, T>>,
}

impl<C, T: ?Sized> StrategyRegistry<C, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a strategy; a name already taken is replaced
    pub fn register<F>(&mut self, name: &str, drawable: bool, constructor: F)
    where
        F: Fn(&C) -> Box<T> + Send + Sync + 'static,
    {
        let entry = StrategyEntry {
            name: name.to_string(),
            drawable,
            constructor: Box::new(constructor),
        };
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Build the strategy registered under `name`
    pub fn build(&self, name: &str, context: &C) -> Option<Box<T>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.constructor)(context))
    }

    /// Build a uniformly drawn drawable strategy, with its name
    pub fn draw(&self, rng: &mut RngManager, context: &C) -> Option<(String, Box<T>)> {
        let drawable: Vec<&StrategyEntry<C, T>> =
            self.entries.iter().filter(|e| e.drawable).collect();
        if drawable.is_empty() {
            return None;
        }
        let entry = drawable[rng.index(drawable.len())];
        Some((entry.name.clone(), (entry.constructor)(context)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn drawable_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.drawable)
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C, T: ?Sized> Default for StrategyRegistry<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T: ?Sized> fmt::Debug for StrategyRegistry<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("names", &self.names())
            .field("drawable", &self.drawable_names())
            .finish()
    }
}

/// What an algorithm constructor gets to know about the plant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmContext {
    pub weekly_fixed_costs: f64,
    pub min_workers: u32,
    pub max_workers: u32,
    /// Target for constant-target strategies
    pub fixed_target: u32,
}

pub type AlgorithmRegistry = StrategyRegistry<AlgorithmContext, dyn MaximizationAlgorithm>;

impl StrategyRegistry<AlgorithmContext, dyn MaximizationAlgorithm> {
    /// The built-in algorithms
    ///
    /// `fixed_target` is not drawable: it never explores, so it makes no
    /// sense as a random pick. `marginal` is built by name only since it
    /// reads revenues and costs separately, which not every plant reports.
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::workforce::{AlgorithmContext, AlgorithmRegistry};
    /// use firm_control_core_rs::RngManager;
    ///
    /// let registry = AlgorithmRegistry::with_builtin_algorithms();
    /// let context = AlgorithmContext { weekly_fixed_costs: 0.0, min_workers: 0, max_workers: 50, fixed_target: 5 };
    ///
    /// let climber = registry.build("hill_climber", &context).unwrap();
    /// assert_eq!(climber.name(), "hill_climber");
    ///
    /// let (name, _) = registry.draw(&mut RngManager::new(1), &context).unwrap();
    /// assert_ne!(name, "fixed_target");
    /// ```
    pub fn with_builtin_algorithms() -> Self {
        let mut registry = Self::new();
        registry.register("hill_climber", true, |ctx: &AlgorithmContext| {
            Box::new(HillClimber::new(
                ctx.weekly_fixed_costs,
                ctx.min_workers,
                ctx.max_workers,
            )) as Box<dyn MaximizationAlgorithm>
        });
        registry.register("gradient_hill_climber", true, |ctx: &AlgorithmContext| {
            Box::new(GradientHillClimber::new(
                ctx.weekly_fixed_costs,
                ctx.min_workers,
                ctx.max_workers,
                0.05,
                5,
            )) as Box<dyn MaximizationAlgorithm>
        });
        registry.register("fixed_target", false, |ctx: &AlgorithmContext| {
            Box::new(FixedTarget::new(ctx.fixed_target)) as Box<dyn MaximizationAlgorithm>
        });
        registry.register("marginal", false, |ctx: &AlgorithmContext| {
            Box::new(MarginalMaximizer::new(ctx.min_workers, ctx.max_workers))
                as Box<dyn MaximizationAlgorithm>
        });
        registry
    }
}
