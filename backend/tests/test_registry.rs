//! Algorithm registry: building by name and drawing

use firm_control_core_rs::workforce::{
    AlgorithmContext, AlgorithmRegistry, FixedTarget, MaximizationAlgorithm,
};
use firm_control_core_rs::RngManager;
use std::collections::BTreeSet;

fn context() -> AlgorithmContext {
    AlgorithmContext {
        weekly_fixed_costs: 10.0,
        min_workers: 0,
        max_workers: 40,
        fixed_target: 7,
    }
}

#[test]
fn test_builtin_names() {
    let registry = AlgorithmRegistry::with_builtin_algorithms();
    assert_eq!(
        registry.names(),
        vec!["hill_climber", "gradient_hill_climber", "fixed_target", "marginal"]
    );
    assert_eq!(
        registry.drawable_names(),
        vec!["hill_climber", "gradient_hill_climber"]
    );
}

#[test]
fn test_build_by_name() {
    let registry = AlgorithmRegistry::with_builtin_algorithms();
    for name in registry.names() {
        let algorithm = registry.build(name, &context()).unwrap();
        assert_eq!(algorithm.name(), name);
    }
    assert!(registry.build("annealing", &context()).is_none());
}

#[test]
fn test_draws_are_seeded_and_cover_drawables() {
    let registry = AlgorithmRegistry::with_builtin_algorithms();
    let draw_names = |seed| {
        let mut rng = RngManager::new(seed);
        (0..50)
            .map(|_| registry.draw(&mut rng, &context()).unwrap().0)
            .collect::<Vec<_>>()
    };
    assert_eq!(draw_names(4), draw_names(4));

    let seen: BTreeSet<String> = draw_names(4).into_iter().collect();
    let expected: BTreeSet<String> = ["gradient_hill_climber", "hill_climber"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_custom_registration() {
    let mut registry = AlgorithmRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.draw(&mut RngManager::new(1), &context()).is_none());

    registry.register("always_three", true, |_: &AlgorithmContext| {
        Box::new(FixedTarget::new(3)) as Box<dyn MaximizationAlgorithm>
    });
    let (name, _) = registry.draw(&mut RngManager::new(1), &context()).unwrap();
    assert_eq!(name, "always_three");
    assert!(registry.contains("always_three"));
    assert_eq!(registry.len(), 1);
}
