//! Run fingerprints
//!
//! Two runs are interchangeable when they were built from the same config
//! and produced the same trajectory. Both are reduced to SHA-256 hex
//! strings here.
//!
//! # Critical Invariants
//!
//! - **Determinism**: same seed + config produces the same digest
//! - **Config Matching**: a recorded run can only be compared against the
//!   config it was produced with

use crate::scenario::ScenarioError;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

fn to_canonical_value<T: Serialize>(value: &T) -> Result<Value, ScenarioError> {
    let value = serde_json::to_value(value)
        .map_err(|e| ScenarioError::Serialization(format!("Config serialization failed: {}", e)))?;

    // Recursively sort all object keys
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    Ok(canonicalize(value))
}

/// Deterministic SHA-256 of a config
///
/// Serializes to JSON with sorted keys, so field order and map iteration
/// order do not matter.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, ScenarioError> {
    let canonical = to_canonical_value(config)?;
    let json = serde_json::to_string(&canonical)
        .map_err(|e| ScenarioError::Serialization(format!("Config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA-256 over one JSON line per record
pub fn trajectory_digest<T: Serialize>(records: &[T]) -> Result<String, ScenarioError> {
    let mut hasher = Sha256::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| {
            ScenarioError::Serialization(format!("Trajectory serialization failed: {}", e))
        })?;
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fail unless `config` hashes to `expected`
pub fn verify_config_hash<T: Serialize>(config: &T, expected: &str) -> Result<(), ScenarioError> {
    let actual = compute_config_hash(config)?;
    if actual != expected {
        return Err(ScenarioError::ConfigMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_compute_config_hash_ignores_key_order() {
        let mut first = HashMap::new();
        first.insert("seed", 1);
        first.insert("days", 10);
        let mut second = HashMap::new();
        second.insert("days", 10);
        second.insert("seed", 1);

        assert_eq!(
            compute_config_hash(&first).unwrap(),
            compute_config_hash(&second).unwrap()
        );
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        #[derive(Serialize)]
        struct TestConfig {
            value: i32,
        }

        let hash1 = compute_config_hash(&TestConfig { value: 42 }).unwrap();
        let hash2 = compute_config_hash(&TestConfig { value: 43 }).unwrap();
        assert_ne!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_trajectory_digest_depends_on_order() {
        let forward = trajectory_digest(&[1, 2, 3]).unwrap();
        let backward = trajectory_digest(&[3, 2, 1]).unwrap();
        assert_ne!(forward, backward);
        assert_eq!(forward, trajectory_digest(&[1, 2, 3]).unwrap());
    }

    #[test]
    fn test_verify_config_hash_reports_mismatch() {
        let hash = compute_config_hash(&[1, 2]).unwrap();
        assert!(verify_config_hash(&[1, 2], &hash).is_ok());
        assert!(matches!(
            verify_config_hash(&[2, 1], &hash),
            Err(ScenarioError::ConfigMismatch { .. })
        ));
    }
}
