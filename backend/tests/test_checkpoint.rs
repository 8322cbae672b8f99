//! Run fingerprints: determinism and config matching

use firm_control_core_rs::scenario::{
    compute_config_hash, verify_config_hash, BuyerConfig, BuyerScenario, MonopolistConfig,
    MonopolistScenario, ScenarioError,
};
use firm_control_core_rs::workforce::AlgorithmRegistry;

fn monopolist_digest(config: MonopolistConfig) -> String {
    let registry = AlgorithmRegistry::with_builtin_algorithms();
    let mut scenario = MonopolistScenario::new(config, &registry).unwrap();
    scenario.run().unwrap().trajectory_digest
}

#[test]
fn test_same_seed_same_trajectory() {
    let config = MonopolistConfig {
        days: 600,
        ..Default::default()
    };
    assert_eq!(monopolist_digest(config.clone()), monopolist_digest(config));
}

#[test]
fn test_different_seed_different_trajectory() {
    let a = monopolist_digest(MonopolistConfig {
        days: 600,
        seed: 1,
        ..Default::default()
    });
    let b = monopolist_digest(MonopolistConfig {
        days: 600,
        seed: 2,
        ..Default::default()
    });
    assert_ne!(a, b);
}

#[test]
fn test_buyer_is_deterministic() {
    let run = || {
        let mut buyer = BuyerScenario::new(BuyerConfig {
            days: 400,
            ..Default::default()
        })
        .unwrap();
        let summary = buyer.run().unwrap();
        (summary.trajectory_digest, buyer.event_log().len())
    };
    assert_eq!(run(), run());
}

#[test]
fn test_summary_carries_config_hash() {
    let config = BuyerConfig {
        days: 10,
        ..Default::default()
    };
    let mut buyer = BuyerScenario::new(config.clone()).unwrap();
    let summary = buyer.run().unwrap();
    assert_eq!(summary.config_hash, compute_config_hash(&config).unwrap());
    assert!(verify_config_hash(&config, &summary.config_hash).is_ok());
}

#[test]
fn test_changed_config_fails_verification() {
    let config = MonopolistConfig::default();
    let hash = compute_config_hash(&config).unwrap();
    let changed = MonopolistConfig {
        demand_intercept: 120.0,
        ..config
    };
    let err = verify_config_hash(&changed, &hash).unwrap_err();
    match err {
        ScenarioError::ConfigMismatch { expected, actual } => {
            assert_eq!(expected, hash);
            assert_ne!(actual, hash);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_hash_ignores_key_order() {
    let a: serde_json::Value = serde_json::json!({ "seed": 1, "days": 2 });
    let b: serde_json::Value = serde_json::json!({ "days": 2, "seed": 1 });
    assert_eq!(compute_config_hash(&a).unwrap(), compute_config_hash(&b).unwrap());
    assert_eq!(compute_config_hash(&a).unwrap().len(), 64);
}
